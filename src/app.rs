use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::epoch::Tag;
use crate::state::messages::NetworkRequest;
use log::{debug, warn};
use vex_api::aggregate::stats_anomalies;
use vex_api::filter::Choice;
use vex_api::{Event, Grade, Team, TeamMatch};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Teams,
    Events,
    TeamDetail,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    /// Loads settings and applies their log level before reporting any
    /// settings problem, so the warning reaches the log pane.
    pub fn new() -> Self {
        let (settings, problem) = AppSettings::load();
        let app = Self::with_settings(settings);
        if let Some(problem) = problem {
            warn!("{problem}");
        }
        app
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        let mut state = AppState::new();
        if let Some(grade) = settings.default_grade.clone() {
            state.teams.filter.grade = Choice::Only(Grade::from(grade));
        }
        if let Some(region) = settings.default_region.clone() {
            state.teams.filter.region = Choice::Only(region);
        }

        let app = Self { state, settings };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Requests. Each one advances the owning page's epoch.
    // -----------------------------------------------------------------------

    pub fn startup_requests(&mut self) -> Vec<NetworkRequest> {
        vec![
            self.top_regions_request(),
            self.teams_request(),
            self.events_request(),
        ]
    }

    /// Reload whatever the active tab shows.
    pub fn reload_requests(&mut self) -> Vec<NetworkRequest> {
        match self.state.active_tab {
            MenuItem::Teams => vec![self.top_regions_request(), self.teams_request()],
            MenuItem::Events => vec![self.events_request()],
            MenuItem::TeamDetail if !self.state.detail.number.is_empty() => {
                let number = self.state.detail.number.clone();
                self.team_requests(&number)
            }
            MenuItem::TeamDetail | MenuItem::Help => Vec::new(),
        }
    }

    fn top_regions_request(&mut self) -> NetworkRequest {
        NetworkRequest::LoadTopRegions { tag: self.state.regions_epoch.advance() }
    }

    fn teams_request(&mut self) -> NetworkRequest {
        let tag = self.state.teams.begin_load();
        NetworkRequest::LoadTeams { query: self.state.teams.filter.query.clone(), tag }
    }

    fn events_request(&mut self) -> NetworkRequest {
        NetworkRequest::LoadEvents { tag: self.state.events.begin_load() }
    }

    fn team_requests(&mut self, number: &str) -> Vec<NetworkRequest> {
        let tag = self.state.detail.begin(number);
        vec![
            NetworkRequest::LoadTeamProfile { number: number.to_owned(), tag },
            NetworkRequest::LoadTeamMatches { number: number.to_owned(), tag },
        ]
    }

    /// Commits the search box; a changed query refetches from the server.
    pub fn submit_team_search(&mut self) -> Option<NetworkRequest> {
        self.state.teams.submit_search()?;
        Some(self.teams_request())
    }

    /// Switches to the detail tab for `number`.
    pub fn open_team(&mut self, number: &str) -> Vec<NetworkRequest> {
        self.update_tab(MenuItem::TeamDetail);
        self.team_requests(number)
    }

    pub fn open_selected_team(&mut self) -> Vec<NetworkRequest> {
        let Some(number) = self.state.teams.selected_team().map(|t| t.number.clone()) else {
            return Vec::new();
        };
        self.open_team(&number)
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop. Each returns
    // whether the response was applied; stale ones are dropped.
    // -----------------------------------------------------------------------

    pub fn on_teams_loaded(&mut self, teams: Vec<Team>, tag: Tag) -> bool {
        for team in stats_anomalies(&teams) {
            warn!("team {} reports more results than matches played", team.number);
        }
        let count = teams.len();
        let applied = self.state.teams.apply_teams(teams, tag);
        log_outcome("teams", count, applied);
        applied
    }

    pub fn on_events_loaded(&mut self, events: Vec<Event>, tag: Tag) -> bool {
        let count = events.len();
        let applied = self.state.events.apply_events(events, tag);
        log_outcome("events", count, applied);
        applied
    }

    pub fn on_top_regions_loaded(&mut self, regions: Vec<String>, tag: Tag) -> bool {
        if !self.state.regions_epoch.is_current(tag) {
            debug!("dropping stale top regions");
            return false;
        }
        self.state.top_regions = regions;
        true
    }

    pub fn on_team_profile_loaded(&mut self, team: Option<Team>, tag: Tag) -> bool {
        let applied = self.state.detail.apply_profile(team, tag);
        if !applied {
            debug!("dropping stale team profile");
        }
        applied
    }

    pub fn on_team_matches_loaded(&mut self, matches: Vec<TeamMatch>, tag: Tag) -> bool {
        let count = matches.len();
        let applied = self.state.detail.apply_matches(matches, tag);
        log_outcome("matches", count, applied);
        applied
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    /// Leave the detail tab for wherever the user came from.
    pub fn exit_team_detail(&mut self) {
        if self.state.active_tab != MenuItem::TeamDetail {
            return;
        }
        let back = match self.state.previous_tab {
            MenuItem::TeamDetail | MenuItem::Help => MenuItem::Teams,
            tab => tab,
        };
        self.update_tab(back);
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    /// True while a text field has keyboard focus.
    pub fn is_editing(&self) -> bool {
        match self.state.active_tab {
            MenuItem::Teams => self.state.teams.search.is_some(),
            MenuItem::Events => self.state.events.search.is_some(),
            MenuItem::TeamDetail | MenuItem::Help => false,
        }
    }
}

fn log_outcome(what: &str, count: usize, applied: bool) {
    if applied {
        debug!("applied {count} {what}");
    } else {
        debug!("dropping {count} stale {what}");
    }
}
