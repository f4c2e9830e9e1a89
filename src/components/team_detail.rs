use crate::draw::default_border;
use crate::state::app_state::{Profile, TeamDetailState};
use tui::Frame;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span, Text};
use tui::widgets::{List, ListItem, ListState, Paragraph};
use vex_api::aggregate::compute_record;
use vex_api::{Alliance, MatchGroup, Outcome, Record, Team, TeamMatch, format_date_range};

pub fn render_team_detail(f: &mut Frame, area: Rect, detail: &TeamDetailState) {
    if detail.number.is_empty() {
        render_message(f, area, "Select a team on the Teams tab and press Enter", Color::DarkGray);
        return;
    }

    let team = match &detail.profile {
        Profile::Loading => {
            render_message(f, area, &format!("Loading team {}...", detail.number), Color::DarkGray);
            return;
        }
        Profile::NotFound => {
            render_message(
                f,
                area,
                &format!("Team Not Found\n\nCould not find team {}", detail.number),
                Color::Red,
            );
            return;
        }
        Profile::Loaded(team) => team,
    };

    let [header, stats, history] = Layout::vertical([
        Constraint::Length(5),
        Constraint::Length(4),
        Constraint::Fill(1),
    ])
    .areas(area);

    render_header(f, header, team);
    render_stats(f, stats, team, detail);
    render_history(f, history, detail);
}

fn render_message(f: &mut Frame, area: Rect, msg: &str, color: Color) {
    let block = default_border(Color::White).title(" Team Detail ");
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg.to_owned())
            .style(Style::default().fg(color))
            .alignment(Alignment::Center),
        inner,
    );
}

fn render_header(f: &mut Frame, area: Rect, team: &Team) {
    let mut title = vec![
        Span::styled(
            team.number.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(team.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
    ];
    if team.is_worlds_qualified() {
        title.push(Span::styled(
            "  [Worlds Qualified]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    }

    let place = [team.region.as_str(), team.country.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    let about = [
        team.organization.clone(),
        place,
        team.grade.as_ref().map(|g| g.label().to_owned()).unwrap_or_default(),
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join("  ·  ");

    let mut lines = vec![Line::from(title), Line::from(Span::styled(about, Style::default().fg(Color::Gray)))];
    if let Some(robot) = team.robot_name.as_deref().filter(|r| !r.is_empty()) {
        lines.push(Line::from(Span::styled(
            format!("Robot: {robot}"),
            Style::default().fg(Color::DarkGray),
        )));
    }

    f.render_widget(Paragraph::new(lines).block(default_border(Color::White)), area);
}

fn render_stats(f: &mut Frame, area: Rect, team: &Team, detail: &TeamDetailState) {
    let [record_area, skills_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    let record = match detail.groups {
        Some(_) => record_lines(&detail.record),
        None => vec![Line::from(Span::styled("Loading matches...", Style::default().fg(Color::DarkGray)))],
    };
    f.render_widget(
        Paragraph::new(record).block(default_border(Color::DarkGray).title(" Record ")),
        record_area,
    );

    let skills = match team.skills {
        Some(s) => vec![
            Line::from(vec![
                Span::styled(
                    s.combined_score.to_string(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  World Rank #{}", s.rank), Style::default().fg(Color::Gray)),
            ]),
            Line::from(Span::styled(
                format!("Programming {}  ·  Driver {}", s.programming_score, s.driver_score),
                Style::default().fg(Color::Gray),
            )),
        ],
        None => vec![Line::from(Span::styled("No skills runs yet", Style::default().fg(Color::DarkGray)))],
    };
    f.render_widget(
        Paragraph::new(skills).block(default_border(Color::DarkGray).title(" Skills Score ")),
        skills_area,
    );
}

pub fn record_lines(record: &Record) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![
            Span::styled(record.wins.to_string(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" - "),
            Span::styled(record.losses.to_string(), Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" - "),
            Span::styled(record.ties.to_string(), Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(Span::styled(
            format!("{} Matches · {}% Win Rate", record.played, record.win_rate_label()),
            Style::default().fg(Color::Gray),
        )),
    ]
}

fn render_history(f: &mut Frame, area: Rect, detail: &TeamDetailState) {
    let block = default_border(Color::White).title(" Competition History ");

    let Some(groups) = detail.groups.as_ref().filter(|g| !g.is_empty()) else {
        let inner = block.inner(area);
        f.render_widget(block, area);
        let msg = if detail.groups.is_none() {
            "Loading matches..."
        } else {
            "No match data found for this team yet."
        };
        f.render_widget(Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)), inner);
        return;
    };

    let items: Vec<ListItem> = groups
        .iter()
        .map(|group| ListItem::new(group_text(group, !detail.is_collapsed(group))))
        .collect();
    let widget = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(detail.selected_group));
    f.render_stateful_widget(widget, area, &mut state);
}

pub fn group_text(group: &MatchGroup, expanded: bool) -> Text<'static> {
    let record = compute_record(&group.matches);
    let arrow = if expanded { "▾" } else { "▸" };
    let dates = group
        .event_start
        .as_deref()
        .and_then(|start| format_date_range(start, group.event_end.as_deref()));

    let mut header = vec![Span::styled(
        format!("{arrow} {}", group.name),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    for part in [dates, group.event_location.clone()].into_iter().flatten() {
        header.push(Span::styled(format!("  ·  {part}"), Style::default().fg(Color::Gray)));
    }
    header.push(Span::styled(
        format!("  ·  {} Matches  ·  {}W - {}L", group.matches.len(), record.wins, record.losses),
        Style::default().fg(Color::White),
    ));

    let mut lines = vec![Line::from(header)];
    if expanded {
        lines.extend(group.matches.iter().map(match_line));
    }
    Text::from(lines)
}

fn match_line(m: &TeamMatch) -> Line<'static> {
    let alliance_color = match m.alliance {
        Alliance::Red => Color::Red,
        Alliance::Blue => Color::Blue,
    };
    let mut spans = vec![
        Span::raw("      "),
        Span::styled(format!("{:<7}", m.label()), Style::default().fg(alliance_color)),
    ];

    match (m.outcome(), m.scores()) {
        (Some(outcome), Some((mine, theirs))) => {
            let color = match outcome {
                Outcome::Win => Color::Green,
                Outcome::Tie => Color::Yellow,
                Outcome::Loss => Color::Red,
            };
            spans.push(Span::styled(
                format!("{:<5}", outcome.label()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(format!("{mine}-{theirs}")));
        }
        _ => spans.push(Span::styled("Unscored", Style::default().fg(Color::DarkGray))),
    }

    if !m.partner_teams.is_empty() {
        spans.push(Span::styled(
            format!("   with {}", m.partner_teams.join(", ")),
            Style::default().fg(Color::Gray),
        ));
    }
    if !m.opponent_teams.is_empty() {
        spans.push(Span::styled(
            format!("   vs {}", m.opponent_teams.join(", ")),
            Style::default().fg(Color::Gray),
        ));
    }
    if let Some(video) = m.video_url.as_deref() {
        spans.push(Span::styled(format!("   ▶ {video}"), Style::default().fg(Color::Magenta)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vex_api::RoundKind;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn team_match(num: u32, scores: Option<(u32, u32)>) -> TeamMatch {
        TeamMatch {
            sk: format!("k{num}"),
            sku: Some("RE-1".into()),
            event_name: Some("Spring Open".into()),
            division_id: 1,
            match_num: num,
            round: RoundKind::Qualification,
            alliance: Alliance::Red,
            partner_teams: vec!["1590A".into()],
            opponent_teams: vec!["3588Y".into(), "13212D".into()],
            my_score: scores.map(|s| s.0),
            opp_score: scores.map(|s| s.1),
            won: scores.map(|(a, b)| a > b),
            scheduled: None,
            video_url: None,
            event_start: Some("2026-02-28T08:00:00Z".into()),
            event_end: Some("2026-03-01T17:00:00Z".into()),
            event_location: Some("Toronto, Ontario".into()),
        }
    }

    fn group(matches: Vec<TeamMatch>) -> MatchGroup {
        MatchGroup {
            key: "RE-1".into(),
            name: "Spring Open".into(),
            sku: Some("RE-1".into()),
            event_start: Some("2026-02-28T08:00:00Z".into()),
            event_end: Some("2026-03-01T17:00:00Z".into()),
            event_location: Some("Toronto, Ontario".into()),
            matches,
        }
    }

    #[test]
    fn group_header_summarises_the_event() {
        let text = group_text(&group(vec![team_match(2, Some((10, 4))), team_match(1, Some((2, 8)))]), true);
        assert_eq!(
            plain(&text.lines[0]),
            "▾ Spring Open  ·  Feb 28 - Mar 1, 2026  ·  Toronto, Ontario  ·  2 Matches  ·  1W - 1L"
        );
        assert_eq!(text.lines.len(), 3);
        let row = plain(&text.lines[1]);
        assert!(row.contains("Q2") && row.contains("WIN") && row.contains("10-4"));
        assert!(row.contains("with 1590A") && row.contains("vs 3588Y, 13212D"));
    }

    #[test]
    fn collapsed_group_hides_matches_and_unscored_rows_say_so() {
        let g = group(vec![team_match(1, None)]);
        assert_eq!(group_text(&g, false).lines.len(), 1);
        assert!(plain(&group_text(&g, true).lines[1]).contains("Unscored"));
    }

    #[test]
    fn record_lines_show_tally_and_rate() {
        let record = Record { played: 4, wins: 3, losses: 1, ties: 0 };
        let lines = record_lines(&record);
        assert_eq!(plain(&lines[0]), "3 - 1 - 0");
        assert_eq!(plain(&lines[1]), "4 Matches · 75.0% Win Rate");
    }
}
