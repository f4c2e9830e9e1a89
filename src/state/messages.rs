use crate::state::epoch::Tag;
use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use vex_api::{Event, Team, TeamMatch};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadTeams { query: String, tag: Tag },
    LoadEvents { tag: Tag },
    LoadTopRegions { tag: Tag },
    LoadTeamProfile { number: String, tag: Tag },
    LoadTeamMatches { number: String, tag: Tag },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    TeamsLoaded { teams: Vec<Team>, tag: Tag },
    EventsLoaded { events: Vec<Event>, tag: Tag },
    TopRegionsLoaded { regions: Vec<String>, tag: Tag },
    /// `team` is `None` when no team has the requested number.
    TeamProfileLoaded { team: Option<Team>, tag: Tag },
    TeamMatchesLoaded { matches: Vec<TeamMatch>, tag: Tag },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
