//! Pure derivations over fetched records: region rankings, per-event match
//! groups and win/loss/tie records. Inputs are never mutated.
use crate::{Event, MatchGroup, Record, RegionSummary, Team, TeamMatch};
use std::collections::{BTreeSet, HashMap};

/// Number of skills-ranked teams the region ranking is computed over.
pub const TOP_SKILLS_LIMIT: usize = 100;

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// Count teams per home region (region, else country), most represented
/// first. Equal counts keep first-appearance order.
pub fn region_summaries(teams: &[Team]) -> Vec<RegionSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<RegionSummary> = Vec::new();

    for region in teams.iter().filter_map(Team::home_region) {
        match index.get(region) {
            Some(&i) => summaries[i].count += 1,
            None => {
                index.insert(region, summaries.len());
                summaries.push(RegionSummary { name: region.to_owned(), count: 1 });
            }
        }
    }

    summaries.sort_by(|a, b| b.count.cmp(&a.count));
    summaries
}

pub fn top_regions(teams: &[Team]) -> Vec<String> {
    region_summaries(teams).into_iter().map(|s| s.name).collect()
}

/// Region filter options for the events page: competitive regions first,
/// then every other event region alphabetically.
pub fn event_regions(events: &[Event], top_regions: &[String]) -> Vec<String> {
    let others: BTreeSet<&str> = events
        .iter()
        .map(|e| e.location.region.as_str())
        .filter(|r| !r.is_empty() && !top_regions.iter().any(|t| t == r))
        .collect();

    top_regions
        .iter()
        .cloned()
        .chain(others.into_iter().map(str::to_owned))
        .collect()
}

/// Teams whose reported record exceeds their match count.
pub fn stats_anomalies(teams: &[Team]) -> Vec<&Team> {
    teams
        .iter()
        .filter(|t| t.stats.is_some_and(|s| !s.is_consistent()))
        .collect()
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

/// Tally a list of matches. Only matches with both scores count as played.
pub fn compute_record(matches: &[TeamMatch]) -> Record {
    let mut record = Record::default();
    for (mine, theirs, won) in matches
        .iter()
        .filter_map(|m| m.scores().map(|(a, b)| (a, b, m.won)))
    {
        record.played += 1;
        if won == Some(true) {
            record.wins += 1;
        }
        if won == Some(false) && mine != theirs {
            record.losses += 1;
        }
        if mine == theirs {
            record.ties += 1;
        }
    }
    record
}

/// Sort by round importance, then match number, both descending.
pub fn sort_matches(matches: &mut [TeamMatch]) {
    matches.sort_by(|a, b| {
        b.round
            .importance()
            .cmp(&a.round.importance())
            .then_with(|| b.match_num.cmp(&a.match_num))
    });
}

/// Group a team's matches by event (sku, else event name), most recent
/// event first. Matches inside each group are ordered by [`sort_matches`].
pub fn group_matches(matches: &[TeamMatch]) -> Vec<MatchGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<MatchGroup> = Vec::new();

    for m in matches {
        let key = m
            .sku
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| m.event_name.clone())
            .unwrap_or_default();
        let i = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(MatchGroup {
                key,
                name: m.event_name.clone().unwrap_or_default(),
                sku: m.sku.clone(),
                event_start: m.event_start.clone(),
                event_end: m.event_end.clone(),
                event_location: m.event_location.clone(),
                matches: Vec::new(),
            });
            groups.len() - 1
        });
        groups[i].matches.push(m.clone());
    }

    // The first scheduled time is taken before matches are reordered.
    let mut keyed: Vec<(String, MatchGroup)> = groups
        .into_iter()
        .map(|mut g| {
            let date = g
                .event_start
                .clone()
                .or_else(|| g.matches.first().and_then(|m| m.scheduled.clone()))
                .unwrap_or_default();
            sort_matches(&mut g.matches);
            (date, g)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| b.cmp(a));
    keyed.into_iter().map(|(_, g)| g).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Alliance, Location, RoundKind, TeamStats};
    use chrono::{TimeZone, Utc};

    fn team(number: &str, region: &str, country: &str) -> Team {
        Team {
            number: number.into(),
            region: region.into(),
            country: country.into(),
            ..Default::default()
        }
    }

    fn m(sk: &str, round: RoundKind, num: u32, scores: Option<(u32, u32)>, won: Option<bool>) -> TeamMatch {
        TeamMatch {
            sk: sk.into(),
            sku: Some(sk.into()),
            event_name: Some(format!("Event {sk}")),
            division_id: 1,
            match_num: num,
            round,
            alliance: Alliance::Red,
            partner_teams: vec![],
            opponent_teams: vec![],
            my_score: scores.map(|s| s.0),
            opp_score: scores.map(|s| s.1),
            won,
            scheduled: None,
            video_url: None,
            event_start: None,
            event_end: None,
            event_location: None,
        }
    }

    #[test]
    fn top_regions_rank_by_count() {
        let teams = vec![
            team("1A", "Ontario", "Canada"),
            team("2A", "Ontario", "Canada"),
            team("3A", "California", "United States"),
        ];
        assert_eq!(top_regions(&teams), vec!["Ontario", "California"]);
    }

    #[test]
    fn top_regions_fall_back_to_country_and_skip_unknown() {
        let teams = vec![
            team("1A", "", "China"),
            team("2A", "", ""),
            team("3A", "Shanghai", "China"),
            team("4A", "", "China"),
        ];
        let summaries = region_summaries(&teams);
        assert_eq!(
            summaries,
            vec![
                RegionSummary { name: "China".into(), count: 2 },
                RegionSummary { name: "Shanghai".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn equal_counts_keep_first_appearance() {
        let teams = vec![team("1A", "Texas", ""), team("2A", "Alberta", ""), team("3A", "Ohio", "")];
        assert_eq!(top_regions(&teams), vec!["Texas", "Alberta", "Ohio"]);
    }

    #[test]
    fn event_regions_put_top_regions_first() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let event = |region: &str| Event {
            id: None,
            sku: "RE".into(),
            name: "E".into(),
            start: at,
            end: at,
            season_id: None,
            location: Location { region: region.into(), ..Default::default() },
            capacity: None,
            division_ids: vec![],
            status: None,
            livestream_url: None,
            grade: None,
        };
        let events = vec![event("Ohio"), event("Ontario"), event("Alberta"), event(""), event("Ohio")];
        let out = event_regions(&events, &["Ontario".to_string()]);
        assert_eq!(out, vec!["Ontario", "Alberta", "Ohio"]);
    }

    #[test]
    fn anomalies_flag_overfull_records() {
        let mut ok = team("1A", "", "");
        ok.stats = Some(TeamStats { wins: 2, losses: 1, ties: 0, total_matches: 3, ..Default::default() });
        let mut bad = team("2A", "", "");
        bad.stats = Some(TeamStats { wins: 5, losses: 1, ties: 0, total_matches: 3, ..Default::default() });
        let teams = vec![ok, bad, team("3A", "", "")];
        let flagged: Vec<_> = stats_anomalies(&teams).iter().map(|t| t.number.as_str()).collect();
        assert_eq!(flagged, vec!["2A"]);
    }

    #[test]
    fn final_outranks_qualification_and_record_counts() {
        let matches = vec![
            m("A", RoundKind::Qualification, 5, Some((10, 20)), Some(false)),
            m("B", RoundKind::Final, 1, Some((30, 10)), Some(true)),
        ];
        let mut sorted = matches.clone();
        sort_matches(&mut sorted);
        let order: Vec<_> = sorted.iter().map(|m| m.sk.as_str()).collect();
        assert_eq!(order, vec!["B", "A"]);

        let record = compute_record(&matches);
        assert_eq!(record.wins, 1);
        assert_eq!(record.losses, 1);
        assert_eq!(record.ties, 0);
        assert_eq!(record.win_rate(), 50.0);
        assert_eq!(record.win_rate_label(), "50.0");
    }

    #[test]
    fn ties_are_not_losses_and_unscored_are_not_played() {
        let matches = vec![
            m("A", RoundKind::Qualification, 1, Some((12, 12)), Some(false)),
            m("A", RoundKind::Qualification, 2, None, None),
            m("A", RoundKind::Qualification, 3, Some((5, 9)), Some(false)),
        ];
        let record = compute_record(&matches);
        assert_eq!(record, Record { played: 2, wins: 0, losses: 1, ties: 1 });
        assert_eq!(compute_record(&[]).win_rate(), 0.0);
    }

    #[test]
    fn within_group_match_number_breaks_round_ties() {
        let mut matches = vec![
            m("A", RoundKind::Qualification, 3, None, None),
            m("A", RoundKind::Other("Exhibition".into()), 9, None, None),
            m("A", RoundKind::Qualification, 12, None, None),
            m("A", RoundKind::Practice, 50, None, None),
            m("A", RoundKind::Semifinal, 1, None, None),
        ];
        sort_matches(&mut matches);
        let labels: Vec<_> = matches.iter().map(TeamMatch::label).collect();
        assert_eq!(labels, vec!["SF1", "Q12", "Q3", "#9", "P50"]);
    }

    #[test]
    fn groups_are_keyed_by_sku_then_name_and_ordered_by_date() {
        let mut old = m("OLD", RoundKind::Qualification, 1, None, None);
        old.event_start = Some("2025-11-01T08:00:00Z".into());
        let mut new = m("NEW", RoundKind::Qualification, 2, None, None);
        new.event_start = Some("2026-02-01T08:00:00Z".into());
        let mut by_name = m("X", RoundKind::Final, 1, None, None);
        by_name.sku = None;
        by_name.event_name = Some("Unlisted Scrimmage".into());
        by_name.scheduled = Some("2026-01-10T10:00:00Z".into());
        let mut anon = m("Y", RoundKind::Final, 1, None, None);
        anon.sku = Some(String::new());
        anon.event_name = None;
        let mut anon2 = anon.clone();
        anon2.sk = "Y2".into();

        let groups = group_matches(&[old, anon, new.clone(), by_name, new, anon2]);
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["NEW", "Unlisted Scrimmage", "OLD", ""]);
        assert_eq!(groups[0].matches.len(), 2);
        assert_eq!(groups[3].matches.len(), 2, "matches without sku or name collapse together");
    }

    #[test]
    fn grouping_is_idempotent() {
        let mut a = m("A", RoundKind::Qualification, 4, Some((1, 2)), Some(false));
        a.event_start = Some("2026-01-01".into());
        let mut b = m("B", RoundKind::Final, 1, Some((3, 2)), Some(true));
        b.event_start = Some("2026-02-01".into());
        let c = m("A", RoundKind::Semifinal, 2, None, None);
        let input = vec![a, b, c];
        assert_eq!(group_matches(&input), group_matches(&input));
    }
}
