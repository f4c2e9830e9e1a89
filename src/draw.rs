use chrono::Utc;
use tui::backend::Backend;
use tui::layout::{Alignment, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::Line;
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::event_list::render_events;
use crate::components::team_detail::render_team_detail;
use crate::components::teams_table::render_teams;
use crate::state::network::LoadingState;
use crate::ui::layout::LayoutAreas;

static TABS: &[&str; 3] = &["Teams", "Events", "Team Detail"];

const HELP_TEXT: &str = "\
Global:   q quit   1 Teams   2 Events   3 Team Detail   ? help   R reload   f full screen   \" logs

Teams:    j/k move   Enter open team   / search (Enter submits, Esc cancels)
          g cycle grade   r cycle region   w worlds-qualified only   m load more

Events:   j/k move   Enter/space toggle section   u upcoming   p past
          / search   r cycle region

Team:     j/k move between events   Enter/space collapse or expand   Esc back";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);
    let now = Utc::now();

    let _ = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Teams => render_teams(f, layout.main, &app.state.teams),
            MenuItem::Events => render_events(f, layout.main, &app.state.events, now),
            MenuItem::TeamDetail => render_team_detail(f, layout.main, &app.state.detail),
            MenuItem::Help => draw_placeholder(f, layout.main, HELP_TEXT),
        }

        if let Some(area) = layout.logs {
            draw_logs(f, area);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let source = if app.state.live_data { "" } else { " sample data " };
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type)
                .title_bottom(Line::from(source).style(Style::default().fg(Color::Yellow))),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index(app.state.active_tab, app.state.previous_tab))
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

/// Help keeps the tab it was opened from underlined.
fn tab_index(active: MenuItem, previous: MenuItem) -> usize {
    match active {
        MenuItem::Teams => 0,
        MenuItem::Events => 1,
        MenuItem::TeamDetail => 2,
        MenuItem::Help if previous == MenuItem::Help => 0,
        MenuItem::Help => tab_index(previous, MenuItem::Teams),
    }
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg).style(Style::default().fg(Color::Gray)),
        inner,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading {
        return;
    }
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(Style::default().fg(Color::White));
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
