use crate::app::MenuItem;
use crate::state::epoch::{Epoch, Tag};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use vex_api::aggregate::{compute_record, event_regions, group_matches};
use vex_api::filter::{COUNTRY_REGIONS, Choice, EventFilter, Pager, TeamFilter, partition_events};
use vex_api::{Event, Grade, MatchGroup, Record, Team, TeamMatch};

/// Advance to the option after `current`, wrapping. Unknown values restart
/// at the first option.
fn cycle<T: PartialEq + Clone>(options: &[Choice<T>], current: &Choice<T>) -> Choice<T> {
    let next = options
        .iter()
        .position(|o| o == current)
        .map_or(0, |i| (i + 1) % options.len().max(1));
    options.get(next).cloned().unwrap_or(Choice::All)
}

// ---------------------------------------------------------------------------
// Teams page
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TeamsPage {
    pub epoch: Epoch,
    pub loading: bool,
    pub teams: Vec<Team>,
    pub filter: TeamFilter,
    pub pager: Pager,
    pub selected: usize,
    /// Search box contents while it has focus.
    pub search: Option<String>,
}

impl TeamsPage {
    pub fn grade_options() -> Vec<Choice<Grade>> {
        vec![
            Choice::All,
            Choice::Only(Grade::HighSchool),
            Choice::Only(Grade::MiddleSchool),
        ]
    }

    /// "All", the competitive regions, then the country-wide options.
    pub fn region_options(top_regions: &[String]) -> Vec<Choice<String>> {
        let mut options = vec![Choice::All];
        for region in top_regions.iter().map(String::as_str).chain(COUNTRY_REGIONS) {
            let option = Choice::Only(region.to_owned());
            if !options.contains(&option) {
                options.push(option);
            }
        }
        options
    }

    pub fn begin_load(&mut self) -> Tag {
        self.loading = true;
        self.epoch.advance()
    }

    pub fn apply_teams(&mut self, teams: Vec<Team>, tag: Tag) -> bool {
        if !self.epoch.is_current(tag) {
            return false;
        }
        self.teams = teams;
        self.loading = false;
        self.filter_changed();
        true
    }

    pub fn filtered(&self) -> Vec<&Team> {
        self.filter.apply(&self.teams)
    }

    pub fn total(&self) -> usize {
        self.filtered().len()
    }

    pub fn displayed(&self) -> usize {
        self.pager.displayed(self.total())
    }

    pub fn selected_team(&self) -> Option<&Team> {
        let filtered = self.filtered();
        self.pager.visible(&filtered).get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let max = self.displayed().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn load_more(&mut self) {
        let total = self.total();
        self.pager.load_more(total);
    }

    pub fn cycle_grade(&mut self) {
        self.filter.grade = cycle(&Self::grade_options(), &self.filter.grade);
        self.filter_changed();
    }

    pub fn cycle_region(&mut self, top_regions: &[String]) {
        self.filter.region = cycle(&Self::region_options(top_regions), &self.filter.region);
        self.filter_changed();
    }

    pub fn toggle_qualified(&mut self) {
        self.filter.qualified_only = !self.filter.qualified_only;
        self.filter_changed();
    }

    pub fn start_search(&mut self) {
        self.search = Some(self.filter.query.clone());
    }

    pub fn cancel_search(&mut self) {
        self.search = None;
    }

    /// Commit the search box as the new query. Returns the query when it
    /// changed and a fetch is due.
    pub fn submit_search(&mut self) -> Option<String> {
        let query = self.search.take()?.trim().to_owned();
        if query == self.filter.query {
            return None;
        }
        self.filter.query = query.clone();
        self.filter_changed();
        Some(query)
    }

    fn filter_changed(&mut self) {
        self.pager.reset();
        self.selected = 0;
    }
}

// ---------------------------------------------------------------------------
// Events page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Upcoming,
    Past,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventRow<'a> {
    Header { section: Section, count: usize, expanded: bool },
    Event { section: Section, event: &'a Event },
    /// Placeholder inside an expanded section with no events.
    Empty { section: Section },
}

#[derive(Debug)]
pub struct EventsPage {
    pub epoch: Epoch,
    pub loading: bool,
    pub events: Vec<Event>,
    pub filter: EventFilter,
    pub search: Option<String>,
    pub upcoming_expanded: bool,
    pub past_expanded: bool,
    pub selected: usize,
}

impl Default for EventsPage {
    fn default() -> Self {
        Self {
            epoch: Epoch::default(),
            loading: false,
            events: Vec::new(),
            filter: EventFilter::default(),
            search: None,
            upcoming_expanded: true,
            past_expanded: false,
            selected: 0,
        }
    }
}

impl EventsPage {
    pub fn region_options(&self, top_regions: &[String]) -> Vec<Choice<String>> {
        std::iter::once(Choice::All)
            .chain(event_regions(&self.events, top_regions).into_iter().map(Choice::Only))
            .collect()
    }

    pub fn begin_load(&mut self) -> Tag {
        self.loading = true;
        self.epoch.advance()
    }

    pub fn apply_events(&mut self, events: Vec<Event>, tag: Tag) -> bool {
        if !self.epoch.is_current(tag) {
            return false;
        }
        self.events = events;
        self.loading = false;
        self.selected = 0;
        true
    }

    /// Flattened section headers and events as drawn.
    pub fn rows(&self, now: DateTime<Utc>) -> Vec<EventRow<'_>> {
        let sections = partition_events(self.filter.apply(&self.events), now);
        let mut rows = Vec::new();
        for (section, events, expanded) in [
            (Section::Upcoming, sections.upcoming, self.upcoming_expanded),
            (Section::Past, sections.past, self.past_expanded),
        ] {
            rows.push(EventRow::Header { section, count: events.len(), expanded });
            if !expanded {
                continue;
            }
            if events.is_empty() {
                rows.push(EventRow::Empty { section });
            }
            rows.extend(events.into_iter().map(|event| EventRow::Event { section, event }));
        }
        rows
    }

    pub fn selected_row(&self, now: DateTime<Utc>) -> Option<EventRow<'_>> {
        self.rows(now).get(self.selected).copied()
    }

    pub fn select_next(&mut self, now: DateTime<Utc>) {
        let max = self.rows(now).len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn toggle_section(&mut self, section: Section) {
        match section {
            Section::Upcoming => self.upcoming_expanded = !self.upcoming_expanded,
            Section::Past => self.past_expanded = !self.past_expanded,
        }
    }

    /// Toggle the section under the cursor and keep the cursor on its header.
    pub fn toggle_selected_section(&mut self, now: DateTime<Utc>) {
        let Some(section) = self.selected_row(now).map(|row| match row {
            EventRow::Header { section, .. }
            | EventRow::Event { section, .. }
            | EventRow::Empty { section } => section,
        }) else {
            return;
        };
        self.toggle_section(section);
        self.selected = self
            .rows(now)
            .iter()
            .position(|row| matches!(row, EventRow::Header { section: s, .. } if *s == section))
            .unwrap_or(0);
    }

    pub fn cycle_region(&mut self, top_regions: &[String]) {
        self.filter.region = cycle(&self.region_options(top_regions), &self.filter.region);
        self.selected = 0;
    }

    pub fn start_search(&mut self) {
        self.search = Some(self.filter.query.clone());
    }

    /// Event search filters as you type.
    pub fn push_search_char(&mut self, c: char) {
        if let Some(search) = self.search.as_mut() {
            search.push(c);
            self.filter.query = search.clone();
            self.selected = 0;
        }
    }

    pub fn pop_search_char(&mut self) {
        if let Some(search) = self.search.as_mut() {
            search.pop();
            self.filter.query = search.clone();
            self.selected = 0;
        }
    }

    pub fn finish_search(&mut self) {
        self.search = None;
    }
}

// ---------------------------------------------------------------------------
// Team detail page
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq)]
pub enum Profile {
    #[default]
    Loading,
    NotFound,
    Loaded(Box<Team>),
}

#[derive(Debug, Default)]
pub struct TeamDetailState {
    pub epoch: Epoch,
    pub number: String,
    pub profile: Profile,
    /// `None` until the match list arrives.
    pub groups: Option<Vec<MatchGroup>>,
    pub record: Record,
    pub collapsed: HashSet<String>,
    pub selected_group: usize,
}

impl TeamDetailState {
    /// Reset for a new team; profile and matches share the returned tag.
    pub fn begin(&mut self, number: &str) -> Tag {
        *self = Self {
            epoch: self.epoch,
            number: number.to_owned(),
            ..Self::default()
        };
        self.epoch.advance()
    }

    pub fn apply_profile(&mut self, team: Option<Team>, tag: Tag) -> bool {
        if !self.epoch.is_current(tag) {
            return false;
        }
        self.profile = match team {
            Some(team) => Profile::Loaded(Box::new(team)),
            None => Profile::NotFound,
        };
        true
    }

    pub fn apply_matches(&mut self, matches: Vec<TeamMatch>, tag: Tag) -> bool {
        if !self.epoch.is_current(tag) {
            return false;
        }
        self.record = compute_record(&matches);
        self.groups = Some(group_matches(&matches));
        self.selected_group = 0;
        true
    }

    pub fn is_collapsed(&self, group: &MatchGroup) -> bool {
        self.collapsed.contains(&group.key)
    }

    pub fn group_count(&self) -> usize {
        self.groups.as_ref().map_or(0, Vec::len)
    }

    pub fn select_next_group(&mut self) {
        let max = self.group_count().saturating_sub(1);
        if self.selected_group < max {
            self.selected_group += 1;
        }
    }

    pub fn select_prev_group(&mut self) {
        self.selected_group = self.selected_group.saturating_sub(1);
    }

    pub fn toggle_selected_group(&mut self) {
        let Some(key) = self
            .groups
            .as_ref()
            .and_then(|groups| groups.get(self.selected_group))
            .map(|group| group.key.clone())
        else {
            return;
        };
        if !self.collapsed.remove(&key) {
            self.collapsed.insert(key);
        }
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    /// False while the client serves bundled sample data.
    pub live_data: bool,
    pub regions_epoch: Epoch,
    /// Skills-ranked regions, shared by the teams and events filters.
    pub top_regions: Vec<String>,
    pub teams: TeamsPage,
    pub events: EventsPage,
    pub detail: TeamDetailState,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vex_api::{Alliance, Location, RoundKind};

    fn team(number: &str, grade: Grade, region: &str, country: &str) -> Team {
        Team {
            number: number.into(),
            name: number.into(),
            grade: Some(grade),
            region: region.into(),
            country: country.into(),
            ..Default::default()
        }
    }

    fn event(sku: &str, day: u32) -> Event {
        let start = Utc.with_ymd_and_hms(2026, 2, day, 8, 0, 0).unwrap();
        Event {
            id: None,
            sku: sku.into(),
            name: sku.into(),
            start,
            end: start + chrono::Duration::hours(9),
            season_id: None,
            location: Location { city: "City".into(), region: "Ontario".into(), ..Default::default() },
            capacity: None,
            division_ids: vec![],
            status: None,
            livestream_url: None,
            grade: None,
        }
    }

    fn team_match(sku: &str, num: u32, scores: (u32, u32)) -> TeamMatch {
        TeamMatch {
            sk: format!("{sku}-{num}"),
            sku: Some(sku.into()),
            event_name: Some(sku.into()),
            division_id: 1,
            match_num: num,
            round: RoundKind::Qualification,
            alliance: Alliance::Blue,
            partner_teams: vec![],
            opponent_teams: vec![],
            my_score: Some(scores.0),
            opp_score: Some(scores.1),
            won: Some(scores.0 > scores.1),
            scheduled: None,
            video_url: None,
            event_start: None,
            event_end: None,
            event_location: None,
        }
    }

    fn loaded_teams(count: usize) -> TeamsPage {
        let mut page = TeamsPage::default();
        let tag = page.begin_load();
        let teams = (0..count)
            .map(|i| team(&format!("{i}A"), Grade::HighSchool, "Ontario", "Canada"))
            .collect();
        assert!(page.apply_teams(teams, tag));
        page
    }

    #[test]
    fn stale_team_results_are_dropped() {
        let mut page = TeamsPage::default();
        let old = page.begin_load();
        let new = page.begin_load();
        assert!(!page.apply_teams(vec![team("OLD", Grade::HighSchool, "", "")], old));
        assert!(page.loading);
        assert!(page.apply_teams(vec![team("NEW", Grade::HighSchool, "", "")], new));
        assert_eq!(page.teams[0].number, "NEW");
        assert!(!page.loading);
    }

    #[test]
    fn any_filter_change_resets_the_pager() {
        let mut page = loaded_teams(250);
        page.load_more();
        page.load_more();
        page.selected = 120;
        assert_eq!(page.displayed(), 250);

        page.cycle_grade();
        assert_eq!(page.filter.grade, Choice::Only(Grade::HighSchool));
        assert_eq!(page.displayed(), 100);
        assert_eq!(page.selected, 0);

        page.load_more();
        page.toggle_qualified();
        assert_eq!(page.displayed(), 0);
        page.toggle_qualified();
        assert_eq!(page.displayed(), 100);

        page.load_more();
        page.cycle_region(&["Ontario".to_string()]);
        assert_eq!(page.filter.region, Choice::Only("Ontario".into()));
        assert_eq!(page.displayed(), 100);
    }

    #[test]
    fn selection_stays_within_displayed_rows() {
        let mut page = loaded_teams(3);
        for _ in 0..5 {
            page.select_next();
        }
        assert_eq!(page.selected, 2);
        assert_eq!(page.selected_team().map(|t| t.number.as_str()), Some("2A"));
        page.select_prev();
        assert_eq!(page.selected, 1);
    }

    #[test]
    fn search_submits_only_changed_queries() {
        let mut page = loaded_teams(3);
        page.start_search();
        page.search.as_mut().unwrap().push_str(" 1A ");
        assert_eq!(page.submit_search(), Some("1A".to_string()));
        assert!(page.search.is_none());
        assert_eq!(page.filter.query, "1A");

        page.start_search();
        assert_eq!(page.submit_search(), None);
        assert_eq!(page.submit_search(), None);
    }

    #[test]
    fn region_options_keep_top_regions_first_without_duplicates() {
        let options = TeamsPage::region_options(&["California".into(), "Canada".into()]);
        let labels: Vec<_> = options.iter().map(|o| o.as_option().map(String::as_str)).collect();
        assert_eq!(
            labels,
            vec![None, Some("California"), Some("Canada"), Some("United States"), Some("China")]
        );
        assert_eq!(cycle(&options, &Choice::Only("China".into())), Choice::All);
        assert_eq!(cycle(&options, &Choice::Only("Nowhere".into())), Choice::All);
    }

    #[test]
    fn event_sections_default_and_toggle_independently() {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap();
        let mut page = EventsPage::default();
        let tag = page.begin_load();
        assert!(page.apply_events(vec![event("PAST", 1), event("NEXT", 20)], tag));

        let rows = page.rows(now);
        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[0], EventRow::Header { section: Section::Upcoming, count: 1, expanded: true }));
        assert!(matches!(rows[1], EventRow::Event { event, .. } if event.sku == "NEXT"));
        assert!(matches!(rows[2], EventRow::Header { section: Section::Past, count: 1, expanded: false }));

        page.selected = 2;
        page.toggle_selected_section(now);
        assert!(page.upcoming_expanded && page.past_expanded);
        assert_eq!(page.selected, 2);
        assert_eq!(page.rows(now).len(), 4);

        page.selected = 1;
        page.toggle_selected_section(now);
        assert!(!page.upcoming_expanded && page.past_expanded);
        assert_eq!(page.selected, 0);
    }

    #[test]
    fn empty_expanded_section_shows_placeholder() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let mut page = EventsPage::default();
        let tag = page.begin_load();
        page.apply_events(vec![event("PAST", 1)], tag);
        let rows = page.rows(now);
        assert!(matches!(rows[1], EventRow::Empty { section: Section::Upcoming }));
    }

    #[test]
    fn event_search_filters_while_typing() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut page = EventsPage::default();
        let tag = page.begin_load();
        page.apply_events(vec![event("ALPHA", 5), event("BETA", 6)], tag);
        page.start_search();
        for c in "bet".chars() {
            page.push_search_char(c);
        }
        assert_eq!(page.rows(now).len(), 3);
        page.pop_search_char();
        page.pop_search_char();
        page.pop_search_char();
        assert_eq!(page.rows(now).len(), 4);
        page.finish_search();
        page.push_search_char('x');
        assert_eq!(page.filter.query, "");
    }

    #[test]
    fn unknown_team_is_not_found_and_stale_profiles_are_ignored() {
        let mut detail = TeamDetailState::default();
        let first = detail.begin("3150N");
        let second = detail.begin("0000Z");
        assert_eq!(detail.number, "0000Z");
        assert!(!detail.apply_profile(Some(team("3150N", Grade::MiddleSchool, "", "")), first));
        assert_eq!(detail.profile, Profile::Loading);
        assert!(detail.apply_profile(None, second));
        assert_eq!(detail.profile, Profile::NotFound);
    }

    #[test]
    fn matches_may_arrive_before_the_profile() {
        let mut detail = TeamDetailState::default();
        let tag = detail.begin("3150N");
        assert!(detail.apply_matches(
            vec![team_match("RE-1", 1, (10, 5)), team_match("RE-1", 2, (3, 9)), team_match("RE-2", 1, (4, 4))],
            tag
        ));
        assert_eq!(detail.profile, Profile::Loading);
        assert_eq!(detail.group_count(), 2);
        assert_eq!(detail.record, Record { played: 3, wins: 1, losses: 1, ties: 1 });

        assert!(detail.apply_profile(Some(team("3150N", Grade::MiddleSchool, "", "")), tag));
        assert!(matches!(detail.profile, Profile::Loaded(_)));
        assert_eq!(detail.group_count(), 2);
    }

    #[test]
    fn groups_collapse_individually_and_reset_per_team() {
        let mut detail = TeamDetailState::default();
        let tag = detail.begin("3150N");
        detail.apply_matches(vec![team_match("RE-1", 1, (1, 0)), team_match("RE-2", 1, (1, 0))], tag);

        let first_key = detail.groups.as_ref().unwrap()[0].key.clone();
        detail.toggle_selected_group();
        assert!(detail.collapsed.contains(&first_key));
        detail.select_next_group();
        detail.select_next_group();
        assert_eq!(detail.selected_group, 1);
        detail.toggle_selected_group();
        assert_eq!(detail.collapsed.len(), 2);
        detail.toggle_selected_group();
        assert_eq!(detail.collapsed.len(), 1);

        detail.begin("1590A");
        assert!(detail.collapsed.is_empty());
        assert!(detail.groups.is_none());
    }
}
