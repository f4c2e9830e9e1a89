use crate::app::{App, MenuItem};
use crate::state::app_state::Section;
use crate::state::messages::NetworkRequest;
use chrono::Utc;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    let requests = if guard.is_editing() {
        handle_search_input(&mut guard, key_event)
    } else {
        handle_command(&mut guard, key_event)
    };

    drop(guard);
    for request in requests {
        let _ = network_requests.send(request).await;
    }
}

/// Keys while a search box has focus. Teams search submits on Enter;
/// events search filters as you type.
fn handle_search_input(app: &mut App, key_event: KeyEvent) -> Vec<NetworkRequest> {
    match (app.state.active_tab, key_event.code, key_event.modifiers) {
        (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        (MenuItem::Teams, KeyCode::Enter, _) => return app.submit_team_search().into_iter().collect(),
        (MenuItem::Teams, KeyCode::Esc, _) => app.state.teams.cancel_search(),
        (MenuItem::Teams, KeyCode::Backspace, _) => {
            if let Some(search) = app.state.teams.search.as_mut() {
                search.pop();
            }
        }
        (MenuItem::Teams, Char(c), _) => {
            if let Some(search) = app.state.teams.search.as_mut() {
                search.push(c);
            }
        }

        (MenuItem::Events, KeyCode::Enter | KeyCode::Esc, _) => app.state.events.finish_search(),
        (MenuItem::Events, KeyCode::Backspace, _) => app.state.events.pop_search_char(),
        (MenuItem::Events, Char(c), _) => app.state.events.push_search_char(c),

        _ => {}
    }
    Vec::new()
}

fn handle_command(app: &mut App, key_event: KeyEvent) -> Vec<NetworkRequest> {
    let now = Utc::now();

    match (app.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => app.update_tab(MenuItem::Teams),
        (_, Char('2'), _) => app.update_tab(MenuItem::Events),
        (_, Char('3'), _) => app.update_tab(MenuItem::TeamDetail),
        (_, Char('?'), _) => app.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => app.exit_help(),

        // Teams
        (MenuItem::Teams, Char('j') | KeyCode::Down, _) => app.state.teams.select_next(),
        (MenuItem::Teams, Char('k') | KeyCode::Up, _) => app.state.teams.select_prev(),
        (MenuItem::Teams, Char('/'), _) => app.state.teams.start_search(),
        (MenuItem::Teams, Char('g'), _) => app.state.teams.cycle_grade(),
        (MenuItem::Teams, Char('r'), _) => {
            let regions = app.state.top_regions.clone();
            app.state.teams.cycle_region(&regions);
        }
        (MenuItem::Teams, Char('w'), _) => app.state.teams.toggle_qualified(),
        (MenuItem::Teams, Char('m'), _) => app.state.teams.load_more(),
        (MenuItem::Teams, KeyCode::Enter, _) => return app.open_selected_team(),

        // Events
        (MenuItem::Events, Char('j') | KeyCode::Down, _) => app.state.events.select_next(now),
        (MenuItem::Events, Char('k') | KeyCode::Up, _) => app.state.events.select_prev(),
        (MenuItem::Events, Char('/'), _) => app.state.events.start_search(),
        (MenuItem::Events, Char('r'), _) => {
            let regions = app.state.top_regions.clone();
            app.state.events.cycle_region(&regions);
        }
        (MenuItem::Events, Char('u'), _) => {
            app.state.events.toggle_section(Section::Upcoming);
            app.state.events.selected = 0;
        }
        (MenuItem::Events, Char('p'), _) => {
            app.state.events.toggle_section(Section::Past);
            app.state.events.selected = 0;
        }
        (MenuItem::Events, KeyCode::Enter | Char(' '), _) => {
            app.state.events.toggle_selected_section(now)
        }

        // Team detail
        (MenuItem::TeamDetail, Char('j') | KeyCode::Down, _) => app.state.detail.select_next_group(),
        (MenuItem::TeamDetail, Char('k') | KeyCode::Up, _) => app.state.detail.select_prev_group(),
        (MenuItem::TeamDetail, KeyCode::Enter | Char(' '), _) => {
            app.state.detail.toggle_selected_group()
        }
        (MenuItem::TeamDetail, KeyCode::Esc, _) => app.exit_team_detail(),

        // Global
        (_, Char('R'), _) => return app.reload_requests(),
        (_, Char('f'), _) => app.toggle_full_screen(),
        (_, Char('"'), _) => app.toggle_show_logs(),

        _ => {}
    }
    Vec::new()
}
