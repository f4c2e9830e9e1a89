use crate::draw::default_border;
use crate::state::app_state::{EventRow, EventsPage, Section};
use chrono::{DateTime, Utc};
use tui::Frame;
use tui::layout::{Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span, Text};
use tui::widgets::{List, ListItem, ListState, Paragraph};
use vex_api::{Event, format_date_range};

pub fn render_events(f: &mut Frame, area: Rect, page: &EventsPage, now: DateTime<Utc>) {
    let [filters, list] = Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(area);

    let label = Style::default().fg(Color::Gray);
    let search = match page.search.as_deref() {
        Some(text) => Span::styled(format!("{text}_"), Style::default().fg(Color::Yellow)),
        None if page.filter.query.is_empty() => Span::styled("-", Style::default().fg(Color::DarkGray)),
        None => Span::raw(page.filter.query.clone()),
    };
    let region = page.filter.region.as_option().map_or("All Regions", String::as_str);
    let bar = Line::from(vec![
        Span::styled("Search (/): ", label),
        search,
        Span::styled("   Region (r): ", label),
        Span::raw(region),
        Span::styled("   u/p: toggle upcoming/past", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(bar).block(default_border(Color::DarkGray)), filters);

    let block = default_border(Color::White).title(" Events ");
    if page.loading && page.events.is_empty() {
        let inner = block.inner(list);
        f.render_widget(block, list);
        f.render_widget(
            Paragraph::new("Loading events...").style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let items: Vec<ListItem> = page.rows(now).into_iter().map(|row| row_item(row, now)).collect();
    let widget = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(page.selected));
    f.render_stateful_widget(widget, list, &mut state);
}

fn row_item(row: EventRow<'_>, now: DateTime<Utc>) -> ListItem<'static> {
    match row {
        EventRow::Header { section, count, expanded } => {
            let arrow = if expanded { "▾" } else { "▸" };
            let title = match section {
                Section::Upcoming => "Upcoming Events",
                Section::Past => "Past Events",
            };
            ListItem::new(Line::from(Span::styled(
                format!("{arrow} {title} ({count})"),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )))
        }
        EventRow::Empty { section } => {
            let msg = match section {
                Section::Upcoming => "No upcoming events found.",
                Section::Past => "No past events found.",
            };
            ListItem::new(Line::from(Span::styled(
                format!("    {msg}"),
                Style::default().fg(Color::DarkGray),
            )))
        }
        EventRow::Event { event, .. } => ListItem::new(event_card(event, now)),
    }
}

/// Three-line card: badges and name, when/where/capacity, RobotEvents link.
pub fn event_card(event: &Event, now: DateTime<Utc>) -> Text<'static> {
    let mut badges = vec![
        Span::raw("    "),
        Span::styled(
            format!("[{}]", event.program_code()),
            Style::default().fg(Color::Magenta),
        ),
    ];
    if let Some(grade) = event.grade_abbrev() {
        badges.push(Span::styled(format!(" [{grade}]"), Style::default().fg(Color::Blue)));
    }
    if event.is_live(now) {
        badges.push(Span::styled(
            " LIVE",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }
    badges.push(Span::styled(
        format!(" {}", event.name),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ));

    let when = format_date_range(&event.start.to_rfc3339(), Some(&event.end.to_rfc3339()))
        .unwrap_or_default();
    let details = format!(
        "      {when}  ·  {}  ·  {} Teams",
        location_label(event),
        event.capacity_label()
    );

    Text::from(vec![
        Line::from(badges),
        Line::from(Span::styled(details, Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("      {}", event.robotevents_url()),
            Style::default().fg(Color::DarkGray),
        )),
    ])
}

/// "city, region", skipping empty parts.
pub fn location_label(event: &Event) -> String {
    [event.location.city.as_str(), event.location.region.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vex_api::Location;

    fn event() -> Event {
        let start = Utc.with_ymd_and_hms(2026, 3, 15, 8, 0, 0).unwrap();
        Event {
            id: None,
            sku: "RE-V5RC-25-1111".into(),
            name: "Spring Open".into(),
            start,
            end: start + chrono::Duration::days(1),
            season_id: None,
            location: Location { city: "Toronto".into(), region: "Ontario".into(), ..Default::default() },
            capacity: None,
            division_ids: vec![],
            status: None,
            livestream_url: Some("https://stream.example".into()),
            grade: Some("High School".into()),
        }
    }

    fn plain(text: &Text) -> Vec<String> {
        text.lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn card_shows_badges_dates_and_capacity() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let lines = plain(&event_card(&event(), now));
        assert_eq!(lines[0].trim(), "[V5RC] [HS] LIVE Spring Open");
        assert!(lines[1].contains("Mar 15-16, 2026"));
        assert!(lines[1].contains("Toronto, Ontario"));
        assert!(lines[1].contains("N/A Teams"));
        assert!(lines[2].ends_with("RE-V5RC-25-1111.html#general-info"));
    }

    #[test]
    fn finished_events_are_not_live() {
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        let lines = plain(&event_card(&event(), now));
        assert!(!lines[0].contains("LIVE"));
    }

    #[test]
    fn location_skips_missing_parts() {
        let mut e = event();
        e.location.city.clear();
        assert_eq!(location_label(&e), "Ontario");
    }
}
