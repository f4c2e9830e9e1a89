//! Filter predicates, event partitioning and the "load more" pager.
use crate::{Event, Grade, Team};
use chrono::{DateTime, Utc};

/// Values that compare against `country` rather than `region` when picked
/// in the region filter.
pub const COUNTRY_REGIONS: [&str; 3] = ["United States", "China", "Canada"];

pub const TEAM_PAGE_SIZE: usize = 100;

/// A filter selection where `All` disables the predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T> Choice<T> {
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Choice::All => None,
            Choice::Only(value) => Some(value),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }
}

impl<T> From<Option<T>> for Choice<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Choice::All, Choice::Only)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamFilter {
    pub query: String,
    pub grade: Choice<Grade>,
    pub region: Choice<String>,
    pub qualified_only: bool,
}

impl TeamFilter {
    pub fn matches(&self, team: &Team) -> bool {
        let needle = self.query.trim().to_lowercase();
        let text = needle.is_empty() || contains_ci(&team.number, &needle) || contains_ci(&team.name, &needle);

        let grade = match self.grade.as_option() {
            None => true,
            Some(grade) => team.grade.as_ref() == Some(grade),
        };

        let region = match self.region.as_option() {
            None => true,
            Some(r) if COUNTRY_REGIONS.contains(&r.as_str()) => team.country == *r,
            Some(r) => team.region == *r,
        };

        let qualified = !self.qualified_only || team.is_worlds_qualified();

        text && grade && region && qualified
    }

    /// Matching teams in their original order.
    pub fn apply<'a>(&self, teams: &'a [Team]) -> Vec<&'a Team> {
        teams.iter().filter(|t| self.matches(t)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.grade.is_all() && self.region.is_all() && !self.qualified_only
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub query: String,
    pub region: Choice<String>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        let needle = self.query.trim().to_lowercase();
        let text = needle.is_empty()
            || contains_ci(&event.name, &needle)
            || contains_ci(&event.location.city, &needle);
        let region = self
            .region
            .as_option()
            .is_none_or(|r| event.location.region == *r);
        text && region
    }

    pub fn apply<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        events.iter().filter(|e| self.matches(e)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSections<'a> {
    /// `end >= now`, soonest first.
    pub upcoming: Vec<&'a Event>,
    /// `end < now`, most recent first.
    pub past: Vec<&'a Event>,
}

pub fn partition_events<'a>(
    events: impl IntoIterator<Item = &'a Event>,
    now: DateTime<Utc>,
) -> EventSections<'a> {
    let (mut upcoming, mut past): (Vec<&Event>, Vec<&Event>) =
        events.into_iter().partition(|e| e.end >= now);
    upcoming.sort_by_key(|e| e.start);
    past.sort_by(|a, b| b.start.cmp(&a.start));
    EventSections { upcoming, past }
}

/// Incremental "load more" pagination over a filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    requested: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(TEAM_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self { page_size, requested: page_size }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Items shown out of `total`.
    pub fn displayed(&self, total: usize) -> usize {
        self.requested.min(total)
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.displayed(total) < total
    }

    pub fn remaining(&self, total: usize) -> usize {
        total - self.displayed(total)
    }

    /// Appends one page. A no-op once everything is shown, so the count
    /// never runs past `total`.
    pub fn load_more(&mut self, total: usize) {
        if self.has_more(total) {
            self.requested = (self.requested + self.page_size).min(total);
        }
    }

    pub fn visible<'s, T>(&self, items: &'s [T]) -> &'s [T] {
        &items[..self.displayed(items.len())]
    }

    pub fn reset(&mut self) {
        self.requested = self.page_size;
    }
}
