pub mod aggregate;
pub mod client;
pub mod filter;
pub mod fixture;
pub mod robotevents;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Domain types, shaped like the proxy API the UI consumes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    pub number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub robot_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub organization: String,
    #[serde(default)]
    pub grade: Option<Grade>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default)]
    pub worlds_qualified: Option<bool>,
    #[serde(default)]
    pub stats: Option<TeamStats>,
    #[serde(default)]
    pub skills: Option<Skills>,
}

impl Team {
    pub fn is_worlds_qualified(&self) -> bool {
        self.worlds_qualified == Some(true)
    }

    /// Region used for competitiveness tallies: region, else country.
    pub fn home_region(&self) -> Option<&str> {
        [self.region.as_str(), self.country.as_str()]
            .into_iter()
            .find(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Grade {
    HighSchool,
    MiddleSchool,
    College,
    ElementarySchool,
    Other(String),
}

impl Grade {
    pub fn label(&self) -> &str {
        match self {
            Grade::HighSchool => "High School",
            Grade::MiddleSchool => "Middle School",
            Grade::College => "College",
            Grade::ElementarySchool => "Elementary School",
            Grade::Other(label) => label,
        }
    }

    pub fn abbrev(&self) -> &str {
        match self {
            Grade::HighSchool => "HS",
            Grade::MiddleSchool => "MS",
            Grade::College => "VU",
            Grade::ElementarySchool => "ES",
            Grade::Other(label) => label,
        }
    }
}

impl From<String> for Grade {
    fn from(value: String) -> Self {
        match value.as_str() {
            "High School" => Grade::HighSchool,
            "Middle School" => Grade::MiddleSchool,
            "College" => Grade::College,
            "Elementary School" => Grade::ElementarySchool,
            _ => Grade::Other(value),
        }
    }
}

impl From<Grade> for String {
    fn from(value: Grade) -> Self {
        value.label().to_owned()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Upstream season totals. Missing or `null` counters read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rank: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wins: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub losses: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ties: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wp: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ap: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sp: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_matches: u32,
}

impl TeamStats {
    /// Upstream invariant; a violation is a data anomaly, not a derivation bug.
    pub fn is_consistent(&self) -> bool {
        let decided = u64::from(self.wins) + u64::from(self.losses) + u64::from(self.ties);
        decided <= u64::from(self.total_matches)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default, deserialize_with = "null_as_default")]
    pub driver_score: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub programming_score: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub combined_score: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: Option<u64>,
    pub sku: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub season_id: Option<u64>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub capacity: Option<Capacity>,
    #[serde(default)]
    pub division_ids: Vec<u64>,
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub livestream_url: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
}

impl Event {
    /// Upstream status when supplied, otherwise derived from the clock.
    pub fn resolved_status(&self, now: DateTime<Utc>) -> EventStatus {
        if let Some(status) = self.status {
            return status;
        }
        if self.end < now {
            EventStatus::Past
        } else if self.start <= now {
            EventStatus::Active
        } else {
            EventStatus::Future
        }
    }

    /// Program segment of the SKU ("RE-V5RC-25-1234" → "V5RC").
    pub fn program_code(&self) -> &str {
        self.sku
            .split('-')
            .nth(1)
            .filter(|s| !s.is_empty())
            .unwrap_or("VRC")
    }

    pub fn grade_abbrev(&self) -> Option<String> {
        self.grade.as_deref().map(|g| {
            g.replace("High School", "HS")
                .replace("Middle School", "MS")
                .replace("College", "VU")
                .replace("Elementary School", "ES")
        })
    }

    pub fn capacity_label(&self) -> String {
        self.capacity
            .map(|c| format!("{}/{}", c.current, c.max))
            .unwrap_or_else(|| "N/A".to_owned())
    }

    /// Public RobotEvents page. Older VRC SKUs of the current season were
    /// re-issued under the V5RC program prefix.
    pub fn robotevents_url(&self) -> String {
        format!(
            "https://www.robotevents.com/robot-competitions/vex-robotics-competition/{}.html#general-info",
            self.sku.replace("RE-VRC-25", "RE-V5RC-25")
        )
    }

    /// Streamed and not yet over.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.livestream_url.is_some() && self.resolved_status(now) != EventStatus::Past
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub max: u32,
    pub current: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Future,
    Active,
    Past,
}

impl EventStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "future" => Some(EventStatus::Future),
            "active" => Some(EventStatus::Active),
            "past" => Some(EventStatus::Past),
            _ => None,
        }
    }
}

/// One match seen from a single team's side of the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMatch {
    /// Composite sort key: MATCH#{sku}#{division}#{round}#{instance}#{match_num}.
    #[serde(rename = "SK", default, deserialize_with = "null_as_default")]
    pub sk: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub division_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub match_num: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub round: RoundKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alliance: Alliance,
    #[serde(default, deserialize_with = "null_as_default")]
    pub partner_teams: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub opponent_teams: Vec<String>,
    #[serde(default)]
    pub my_score: Option<u32>,
    #[serde(default)]
    pub opp_score: Option<u32>,
    #[serde(default)]
    pub won: Option<bool>,
    #[serde(default)]
    pub scheduled: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub event_start: Option<String>,
    #[serde(default)]
    pub event_end: Option<String>,
    #[serde(default)]
    pub event_location: Option<String>,
}

impl TeamMatch {
    pub fn scores(&self) -> Option<(u32, u32)> {
        self.my_score.zip(self.opp_score)
    }

    pub fn is_played(&self) -> bool {
        self.scores().is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        let (mine, theirs) = self.scores()?;
        Some(if self.won == Some(true) {
            Outcome::Win
        } else if mine == theirs {
            Outcome::Tie
        } else {
            Outcome::Loss
        })
    }

    /// Short label such as "Q42", "SF2" or "R16-4".
    pub fn label(&self) -> String {
        let n = self.match_num;
        match &self.round {
            RoundKind::Qualification => format!("Q{n}"),
            RoundKind::Practice => format!("P{n}"),
            RoundKind::Final => format!("F{n}"),
            RoundKind::Semifinal => format!("SF{n}"),
            RoundKind::Quarterfinal => format!("QF{n}"),
            RoundKind::RoundOf16 => format!("R16-{n}"),
            RoundKind::Other(_) => format!("#{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Tie,
    Loss,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Win => "WIN",
            Outcome::Tie => "TIE",
            Outcome::Loss => "LOSS",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alliance {
    #[default]
    Red,
    Blue,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoundKind {
    Practice,
    Qualification,
    RoundOf16,
    Quarterfinal,
    Semifinal,
    Final,
    Other(String),
}

/// An unlabelled round sorts with the unrecognised ones.
impl Default for RoundKind {
    fn default() -> Self {
        RoundKind::Other(String::new())
    }
}

impl RoundKind {
    pub fn label(&self) -> &str {
        match self {
            RoundKind::Practice => "Practice",
            RoundKind::Qualification => "Qualification",
            RoundKind::RoundOf16 => "Round of 16",
            RoundKind::Quarterfinal => "Quarterfinal",
            RoundKind::Semifinal => "Semifinal",
            RoundKind::Final => "Final",
            RoundKind::Other(label) => label,
        }
    }

    /// Display priority within an event; eliminations sort above qualifiers.
    pub fn importance(&self) -> u8 {
        match self {
            RoundKind::Final => 100,
            RoundKind::Semifinal => 80,
            RoundKind::Quarterfinal => 60,
            RoundKind::RoundOf16 => 40,
            RoundKind::Qualification => 20,
            RoundKind::Other(_) => 10,
            RoundKind::Practice => 0,
        }
    }

    /// RobotEvents numeric round codes.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => RoundKind::Practice,
            2 => RoundKind::Qualification,
            3 => RoundKind::Quarterfinal,
            4 => RoundKind::Semifinal,
            5 => RoundKind::Final,
            6 => RoundKind::RoundOf16,
            n => RoundKind::Other(format!("Round {n}")),
        }
    }
}

impl From<String> for RoundKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Practice" => RoundKind::Practice,
            "Qualification" => RoundKind::Qualification,
            "Round of 16" => RoundKind::RoundOf16,
            "Quarterfinal" => RoundKind::Quarterfinal,
            "Semifinal" => RoundKind::Semifinal,
            "Final" => RoundKind::Final,
            _ => RoundKind::Other(value),
        }
    }
}

impl From<RoundKind> for String {
    fn from(value: RoundKind) -> Self {
        value.label().to_owned()
    }
}

/// A team's matches at one event, ordered for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchGroup {
    pub key: String,
    pub name: String,
    pub sku: Option<String>,
    pub event_start: Option<String>,
    pub event_end: Option<String>,
    pub event_location: Option<String>,
    pub matches: Vec<TeamMatch>,
}

/// Win/loss/tie tally over played matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Record {
    pub played: usize,
    pub wins: usize,
    pub losses: usize,
    pub ties: usize,
}

impl Record {
    pub fn win_rate(&self) -> f64 {
        if self.played == 0 {
            return 0.0;
        }
        self.wins as f64 / self.played as f64 * 100.0
    }

    pub fn win_rate_label(&self) -> String {
        format!("{:.1}", self.win_rate())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSummary {
    pub name: String,
    pub count: usize,
}

/// Format an ISO-8601 date range the way event cards print it, e.g.
/// "Feb 14, 2026", "Feb 28 - Mar 1, 2026" or "Dec 30, 2025 - Jan 2, 2026".
pub fn format_date_range(start: &str, end: Option<&str>) -> Option<String> {
    let s = parse_date_prefix(start)?;
    let e = end.and_then(parse_date_prefix).filter(|e| *e != s);
    let Some(e) = e else {
        return Some(s.format("%b %-d, %Y").to_string());
    };
    let formatted = if s.format("%Y-%m").to_string() == e.format("%Y-%m").to_string() {
        format!("{}-{}", s.format("%b %-d"), e.format("%-d, %Y"))
    } else if s.format("%Y").to_string() == e.format("%Y").to_string() {
        format!("{} - {}", s.format("%b %-d"), e.format("%b %-d, %Y"))
    } else {
        format!("{} - {}", s.format("%b %-d, %Y"), e.format("%b %-d, %Y"))
    };
    Some(formatted)
}

fn parse_date_prefix(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok()
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
