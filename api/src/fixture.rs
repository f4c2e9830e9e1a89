//! Embedded offline dataset, served whenever the upstream API is
//! unconfigured or failing.
use crate::client::{ApiError, ApiResult};
use crate::robotevents::LegacyMatch;
use crate::{Event, Team, TeamMatch};
use log::error;
use serde::de::DeserializeOwned;

const TEAMS_JSON: &str = include_str!("../fixtures/teams.json");
const EVENTS_JSON: &str = include_str!("../fixtures/events.json");
const MATCHES_JSON: &str = include_str!("../fixtures/matches.json");

pub fn teams() -> Vec<Team> {
    load("teams", TEAMS_JSON)
}

pub fn events() -> Vec<Event> {
    load("events", EVENTS_JSON)
}

pub fn legacy_matches() -> Vec<LegacyMatch> {
    load("matches", MATCHES_JSON)
}

/// Case-insensitive substring search over team number and name.
/// An empty query returns every team.
pub fn search_teams(query: &str) -> Vec<Team> {
    let needle = query.trim().to_lowercase();
    teams()
        .into_iter()
        .filter(|t| {
            needle.is_empty()
                || t.number.to_lowercase().contains(&needle)
                || t.name.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn find_team(number: &str) -> Option<Team> {
    teams().into_iter().find(|t| t.number == number)
}

pub fn team_matches(number: &str) -> Vec<TeamMatch> {
    let events = events();
    legacy_matches()
        .iter()
        .filter_map(|m| m.for_team(number, &events))
        .collect()
}

fn load<T: DeserializeOwned>(name: &str, raw: &str) -> Vec<T> {
    parse(name, raw).unwrap_or_else(|e| {
        error!("{e}");
        Vec::new()
    })
}

fn parse<T: DeserializeOwned>(name: &str, raw: &str) -> ApiResult<Vec<T>> {
    serde_json::from_str(raw)
        .map_err(|e| ApiError::Other(format!("invalid embedded {name} fixture: {e}")))
}
