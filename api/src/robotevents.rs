//! RobotEvents v2 wire types: serde shapes for upstream payloads and their
//! conversions into the domain types.
use crate::{Alliance, Capacity, Event, EventStatus, Location, RoundKind, Skills, Team, TeamMatch};
use chrono::{DateTime, Utc};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Pagination envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
pub struct Page<T> {
    pub data: Option<Vec<T>>,
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Deserialize, Default, Clone, Copy)]
pub struct PageMeta {
    pub current_page: Option<u32>,
    pub last_page: Option<u32>,
}

/// Collection endpoints answer with either a bare array or a page envelope
/// depending on which server sits behind the base URL.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Paged(Page<T>),
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Listing::Bare(Vec::new())
    }
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Paged(page) => page.data.unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawEvent {
    pub id: Option<u64>,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub season_id: Option<u64>,
    pub location: Option<Location>,
    pub capacity: Option<Capacity>,
    pub division_ids: Option<Vec<u64>>,
    pub status: Option<String>,
    pub livestream_url: Option<String>,
    pub level: Option<String>,
    pub grade_level: Option<String>,
    pub program: Option<RawProgram>,
    pub grade: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawProgram {
    pub grade_level: Option<String>,
}

impl RawEvent {
    /// None when the event has no SKU or its dates do not parse.
    pub fn into_event(self) -> Option<Event> {
        let start = parse_timestamp(self.start.as_deref()?)?;
        let end = parse_timestamp(self.end.as_deref()?)?;
        let grade = self
            .level
            .or(self.grade_level)
            .or_else(|| self.program.and_then(|p| p.grade_level))
            .or(self.grade);
        Some(Event {
            id: self.id,
            sku: self.sku?,
            name: self.name.unwrap_or_default(),
            start,
            end,
            season_id: self.season_id,
            location: self.location.unwrap_or_default(),
            capacity: self.capacity,
            division_ids: self.division_ids.unwrap_or_default(),
            status: Some(
                self.status
                    .as_deref()
                    .and_then(EventStatus::parse)
                    .unwrap_or(EventStatus::Future),
            ),
            livestream_url: self.livestream_url,
            grade,
        })
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Skills standings
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawSkillEntry {
    pub team: RawSkillTeam,
    pub rank: Option<u32>,
    pub score: Option<u32>,
    pub driver_score: Option<u32>,
    pub programming_score: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawSkillTeam {
    pub id: u64,
    /// Team number ("3150N") on the skills endpoint.
    pub name: Option<String>,
    pub team_name: Option<String>,
    pub organization: Option<String>,
    pub grade: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl From<RawSkillEntry> for Team {
    fn from(entry: RawSkillEntry) -> Self {
        let t = entry.team;
        let number = t.name.clone().unwrap_or_default();
        Team {
            id: t.id,
            name: t.team_name.or(t.name).unwrap_or_default(),
            number,
            robot_name: None,
            organization: t.organization.unwrap_or_default(),
            grade: t.grade.map(Into::into),
            region: t.region.unwrap_or_default(),
            country: t.country.unwrap_or_default(),
            worlds_qualified: None,
            stats: None,
            skills: Some(Skills {
                driver_score: entry.driver_score.unwrap_or_default(),
                programming_score: entry.programming_score.unwrap_or_default(),
                combined_score: entry.score.unwrap_or_default(),
                rank: entry.rank.unwrap_or_default(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Team detail (proxy API embeds the team's match list)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
pub struct TeamDetail {
    #[serde(default)]
    pub matches: Option<Vec<TeamMatch>>,
}

// ---------------------------------------------------------------------------
// Legacy match schema: full red/blue rosters, numeric round codes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LegacyMatch {
    pub id: u64,
    pub event_id: u64,
    #[serde(default)]
    pub division_id: u64,
    pub round: u32,
    #[serde(default)]
    pub instance: u32,
    pub matchnum: u32,
    pub scheduled: Option<String>,
    pub started: Option<String>,
    pub field: Option<String>,
    pub alliances: LegacyAlliances,
    pub video_url: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LegacyAlliances {
    pub red: LegacyAlliance,
    pub blue: LegacyAlliance,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LegacyAlliance {
    pub score: Option<u32>,
    #[serde(default)]
    pub teams: Vec<LegacyTeamSlot>,
}

impl LegacyAlliance {
    fn numbers(&self) -> Vec<String> {
        self.teams.iter().map(|slot| slot.team.name.clone()).collect()
    }

    fn has(&self, team_number: &str) -> bool {
        self.teams.iter().any(|slot| slot.team.name == team_number)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LegacyTeamSlot {
    pub team: LegacyTeamRef,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LegacyTeamRef {
    pub id: u64,
    pub name: String,
}

impl LegacyMatch {
    pub fn involves(&self, team_number: &str) -> bool {
        self.alliances.red.has(team_number) || self.alliances.blue.has(team_number)
    }

    /// Re-express the match from `team_number`'s side. Event metadata is
    /// joined from `events` by id when the event is known.
    pub fn for_team(&self, team_number: &str, events: &[Event]) -> Option<TeamMatch> {
        let (alliance, mine, theirs) = if self.alliances.red.has(team_number) {
            (Alliance::Red, &self.alliances.red, &self.alliances.blue)
        } else if self.alliances.blue.has(team_number) {
            (Alliance::Blue, &self.alliances.blue, &self.alliances.red)
        } else {
            return None;
        };

        let event = events.iter().find(|e| e.id == Some(self.event_id));
        let sku = event
            .map(|e| e.sku.clone())
            .unwrap_or_else(|| format!("EVENT-{}", self.event_id));
        let won = mine.score.zip(theirs.score).map(|(m, o)| m > o);

        Some(TeamMatch {
            sk: format!(
                "MATCH#{sku}#{}#{}#{:02}#{:04}",
                self.division_id, self.round, self.instance, self.matchnum
            ),
            event_name: event.map(|e| e.name.clone()),
            event_start: event.map(|e| e.start.to_rfc3339()),
            event_end: event.map(|e| e.end.to_rfc3339()),
            event_location: event.map(|e| format!("{}, {}", e.location.city, e.location.region)),
            sku: Some(sku),
            division_id: self.division_id,
            match_num: self.matchnum,
            round: RoundKind::from_code(self.round),
            alliance,
            partner_teams: mine.numbers().into_iter().filter(|n| n != team_number).collect(),
            opponent_teams: theirs.numbers(),
            my_score: mine.score,
            opp_score: theirs.score,
            won,
            scheduled: self.scheduled.clone(),
            video_url: self.video_url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(teams: &[&str]) -> Vec<LegacyTeamSlot> {
        teams
            .iter()
            .enumerate()
            .map(|(i, n)| LegacyTeamSlot {
                team: LegacyTeamRef { id: i as u64, name: (*n).into() },
            })
            .collect()
    }

    fn legacy(red: &[&str], blue: &[&str], red_score: u32, blue_score: u32) -> LegacyMatch {
        LegacyMatch {
            id: 1,
            event_id: 99,
            division_id: 1,
            round: 2,
            instance: 1,
            matchnum: 42,
            alliances: LegacyAlliances {
                red: LegacyAlliance { score: Some(red_score), teams: slots(red) },
                blue: LegacyAlliance { score: Some(blue_score), teams: slots(blue) },
            },
            ..Default::default()
        }
    }

    #[test]
    fn listing_accepts_bare_and_paged_shapes() {
        let bare: Listing<u32> = serde_json::from_str("[1,2,3]").unwrap();
        assert_eq!(bare.into_vec(), vec![1, 2, 3]);
        let paged: Listing<u32> =
            serde_json::from_str(r#"{"meta":{"current_page":1,"last_page":1},"data":[4]}"#).unwrap();
        assert_eq!(paged.into_vec(), vec![4]);
        let empty: Listing<u32> = serde_json::from_str(r#"{"meta":null}"#).unwrap();
        assert!(empty.into_vec().is_empty());
    }

    #[test]
    fn raw_event_prefers_level_and_defaults_status() {
        let raw: RawEvent = serde_json::from_str(
            r#"{"id":5,"sku":"RE-V5RC-25-1","name":"Open",
                "start":"2026-01-10T08:00:00-05:00","end":"2026-01-10T17:00:00-05:00",
                "location":{"venue":null,"city":"Ottawa","region":"Ontario","country":"Canada"},
                "grade_level":"High School","program":{"grade_level":"Middle School"}}"#,
        )
        .unwrap();
        let event = raw.into_event().unwrap();
        assert_eq!(event.status, Some(EventStatus::Future));
        assert_eq!(event.grade.as_deref(), Some("High School"));
        assert_eq!(event.start.to_rfc3339(), "2026-01-10T13:00:00+00:00");
        assert_eq!(event.location.region, "Ontario");
    }

    #[test]
    fn raw_event_with_bad_dates_is_dropped() {
        let raw = RawEvent {
            sku: Some("RE-1".into()),
            start: Some("soon".into()),
            end: Some("later".into()),
            ..Default::default()
        };
        assert!(raw.into_event().is_none());
    }

    #[test]
    fn skill_entry_maps_number_and_name() {
        let entry: RawSkillEntry = serde_json::from_str(
            r#"{"team":{"id":3,"name":"3150N","team_name":"Nighthawks","region":"Ontario","country":"Canada"},
                "rank":12,"score":192,"driver_score":102,"programming_score":90}"#,
        )
        .unwrap();
        let team = Team::from(entry);
        assert_eq!(team.number, "3150N");
        assert_eq!(team.name, "Nighthawks");
        assert_eq!(team.skills.unwrap().combined_score, 192);
        assert_eq!(team.skills.unwrap().rank, 12);
    }

    #[test]
    fn legacy_match_seen_from_blue_side() {
        let m = legacy(&["1111A", "2222B"], &["3150N", "3333C"], 10, 28);
        let tm = m.for_team("3150N", &[]).unwrap();
        assert_eq!(tm.alliance, Alliance::Blue);
        assert_eq!(tm.partner_teams, vec!["3333C".to_string()]);
        assert_eq!(tm.opponent_teams, vec!["1111A".to_string(), "2222B".to_string()]);
        assert_eq!(tm.scores(), Some((28, 10)));
        assert_eq!(tm.won, Some(true));
        assert_eq!(tm.round, RoundKind::Qualification);
        assert_eq!(tm.sku.as_deref(), Some("EVENT-99"));
        assert_eq!(tm.sk, "MATCH#EVENT-99#1#2#01#0042");
    }

    #[test]
    fn legacy_match_for_absent_team_is_none() {
        let m = legacy(&["1A"], &["2B"], 1, 0);
        assert!(!m.involves("3C"));
        assert!(m.for_team("3C", &[]).is_none());
    }
}
