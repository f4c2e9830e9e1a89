mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::info;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};
use vex_api::client::VexApi;

struct CliOptions {
    force_fixture: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(options) = handle_cli_args() else {
        return Ok(());
    };

    dotenvy::dotenv().ok();
    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Error)?;
    tui_logger::set_default_level(log::LevelFilter::Error);

    // Applies the configured log level before anything below logs.
    let mut app = App::new();

    let client = if options.force_fixture { VexApi::fixture() } else { VexApi::from_env() };
    app.state.live_data = client.is_live();
    info!(
        "data source: {}",
        if app.state.live_data { "live upstream" } else { "bundled sample data" }
    );

    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Initial fetches for every page
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();

    Ok(())
}

/// `None` when the invocation was fully handled (help, version).
fn handle_cli_args() -> Option<CliOptions> {
    let mut options = CliOptions { force_fixture: false };

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", usage_text());
                return None;
            }
            "-V" | "--version" => {
                println!("vextui {}", env!("CARGO_PKG_VERSION"));
                return None;
            }
            "--fixture" => options.force_fixture = true,
            _ => {
                eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
                std::process::exit(2);
            }
        }
    }

    Some(options)
}

fn usage_text() -> &'static str {
    "vextui - VEX Robotics competition dashboard

Usage:
  vextui
  vextui --fixture
  vextui --help
  vextui --version

Options:
  --fixture   Use the bundled sample data even if an API URL is configured

Environment (a .env file in the working directory is also read):
  VEXTUI_API_URL         Competition-data API base URL (unset: sample data)
  ROBOTEVENTS_TOKEN      Bearer token sent with every request
  VEXTUI_SEASON_ID       Season id (default 197)
  VEXTUI_PAGE_DELAY_MS   Delay between event pages in ms (default 200)
  VEXTUI_LOG_LEVEL       Log level shown in the log pane (default error)
  VEXTUI_FULL_SCREEN     Start without the tab bar (true/false)

Settings file:
  $XDG_CONFIG_HOME/vextui/settings.json or ~/.config/vextui/settings.json"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw = handle_network_response(response, &app, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let requests = app.lock().await.startup_requests();
            for request in requests {
                let _ = network_requests.send(request).await;
            }
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
    }
}

/// Applies a response; stale ones leave the screen untouched.
async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    loading: &mut LoadingState,
) -> bool {
    let mut guard = app.lock().await;
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            true
        }
        NetworkResponse::TeamsLoaded { teams, tag } => guard.on_teams_loaded(teams, tag),
        NetworkResponse::EventsLoaded { events, tag } => guard.on_events_loaded(events, tag),
        NetworkResponse::TopRegionsLoaded { regions, tag } => {
            guard.on_top_regions_loaded(regions, tag)
        }
        NetworkResponse::TeamProfileLoaded { team, tag } => {
            guard.on_team_profile_loaded(team, tag)
        }
        NetworkResponse::TeamMatchesLoaded { matches, tag } => {
            guard.on_team_matches_loaded(matches, tag)
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) if key_event.is_press() => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: also runs from the panic hook and the quit key.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
