use crate::draw::default_border;
use crate::state::app_state::TeamsPage;
use tui::Frame;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Cell, Paragraph, Row, Table, TableState};
use vex_api::Team;

const COLUMNS: [&str; 8] = ["Team", "Name", "Organization", "Grade", "Region", "Skills", "Record", "Worlds"];

pub fn render_teams(f: &mut Frame, area: Rect, page: &TeamsPage) {
    let [filters, table, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_filter_bar(f, filters, page);

    let filtered = page.filtered();
    let total = filtered.len();
    let visible = page.pager.visible(&filtered);

    if visible.is_empty() {
        let block = default_border(Color::White).title(" Teams ");
        let inner = block.inner(table);
        f.render_widget(block, table);
        let msg = if page.loading { "Loading teams...".to_string() } else { empty_message(page) };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let header = Row::new(COLUMNS.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    }));
    let rows = visible.iter().copied().map(team_row);

    let widget = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Length(5),
            Constraint::Fill(1),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(default_border(Color::White).title(" Teams "))
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(Some(page.selected));
    f.render_stateful_widget(widget, table, &mut state);

    let mut spans = vec![Span::raw(format!(" Showing {} of {total}", visible.len()))];
    if page.pager.has_more(total) {
        spans.push(Span::styled(
            format!("   m: Load More ({} remaining)", page.pager.remaining(total)),
            Style::default().fg(Color::Yellow),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), footer);
}

fn render_filter_bar(f: &mut Frame, area: Rect, page: &TeamsPage) {
    let label = Style::default().fg(Color::Gray);
    let search = match page.search.as_deref() {
        Some(text) => Span::styled(format!("{text}_"), Style::default().fg(Color::Yellow)),
        None if page.filter.query.is_empty() => Span::styled("-", Style::default().fg(Color::DarkGray)),
        None => Span::raw(page.filter.query.clone()),
    };
    let grade = page.filter.grade.as_option().map_or("All", |g| g.label()).to_owned();
    let region = page.filter.region.as_option().map_or("All", String::as_str).to_owned();
    let worlds = if page.filter.qualified_only { "Qualified only" } else { "Any" };

    let line = Line::from(vec![
        Span::styled("Search (/): ", label),
        search,
        Span::styled("   Grade (g): ", label),
        Span::raw(grade),
        Span::styled("   Region (r): ", label),
        Span::raw(region),
        Span::styled("   Worlds (w): ", label),
        Span::raw(worlds),
    ]);
    f.render_widget(Paragraph::new(line).block(default_border(Color::DarkGray)), area);
}

fn team_row(team: &Team) -> Row<'_> {
    let grade = team.grade.as_ref().map(|g| g.abbrev().to_owned()).unwrap_or_default();
    let region = team.home_region().unwrap_or_default().to_owned();
    let skills = team
        .skills
        .map(|s| s.combined_score.to_string())
        .unwrap_or_else(|| "-".to_owned());
    let record = team
        .stats
        .map(|s| format!("{}-{}-{}", s.wins, s.losses, s.ties))
        .unwrap_or_else(|| "-".to_owned());
    let worlds = if team.is_worlds_qualified() { "✓" } else { "" };

    Row::new(vec![
        Cell::from(team.number.as_str()).style(Style::default().fg(Color::Yellow)),
        Cell::from(team.name.as_str()),
        Cell::from(team.organization.as_str()).style(Style::default().fg(Color::Gray)),
        Cell::from(grade),
        Cell::from(region),
        Cell::from(skills),
        Cell::from(record),
        Cell::from(worlds).style(Style::default().fg(Color::Green)),
    ])
}

/// `No teams found`, qualified by whichever filters are active.
pub fn empty_message(page: &TeamsPage) -> String {
    let mut msg = String::from("No teams found");
    let query = page.filter.query.trim();
    if !query.is_empty() {
        msg.push_str(&format!(" matching \"{query}\""));
    }
    if let Some(grade) = page.filter.grade.as_option() {
        msg.push_str(&format!(" in {grade}"));
    }
    if let Some(region) = page.filter.region.as_option() {
        msg.push_str(&format!(" in {region}"));
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use vex_api::Grade;
    use vex_api::filter::Choice;

    #[test]
    fn empty_message_names_active_filters() {
        let mut page = TeamsPage::default();
        assert_eq!(empty_message(&page), "No teams found");
        page.filter.query = "zz".into();
        page.filter.grade = Choice::Only(Grade::HighSchool);
        page.filter.region = Choice::Only("Ontario".into());
        assert_eq!(empty_message(&page), "No teams found matching \"zz\" in High School in Ontario");
    }
}
