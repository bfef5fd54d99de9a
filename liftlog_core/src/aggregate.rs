//! History aggregation: flat entries -> per-day, per-lift ranked summary.
//!
//! Aggregation is a pure pass over an already-fetched slice. It owns the
//! groups it builds and hands them back; nothing is cached between calls,
//! so a refresh is simply another call over a freshly fetched collection.

use crate::estimate::estimate;
use crate::{AssistanceSet, DayGroup, DayKey, Lift, LogEntry, Result, ScoredSet, SelectionPolicy};
use chrono::{DateTime, FixedOffset, Local, Utc};
use std::collections::BTreeMap;

/// Knobs for a single aggregation pass
#[derive(Clone, Debug, Default)]
pub struct AggregateOptions {
    pub policy: SelectionPolicy,
    /// Trim + lowercase exercise names before matching primary lifts
    pub normalize_names: bool,
    /// Offset used to derive the calendar day; `None` uses the system timezone
    pub utc_offset: Option<FixedOffset>,
}

impl AggregateOptions {
    /// Calendar day an entry belongs to
    pub fn day_key(&self, performed_at: DateTime<Utc>) -> DayKey {
        let date = match self.utc_offset {
            Some(offset) => performed_at.with_timezone(&offset).date_naive(),
            None => performed_at.with_timezone(&Local).date_naive(),
        };
        DayKey::new(date)
    }
}

/// Decide whether an exercise name denotes a primary lift
pub fn classify(name: &str, normalize: bool) -> Option<Lift> {
    if normalize {
        Lift::from_exercise(&name.trim().to_lowercase())
    } else {
        Lift::from_exercise(name)
    }
}

/// Group entries by calendar day and rank primary-lift sets within each day.
///
/// Groups come back newest day first. Each lift list is sorted by
/// descending strength index (stable, so equal scores keep input order)
/// and cut to the policy limit. Assistance sets keep input order.
pub fn aggregate(entries: &[LogEntry], options: &AggregateOptions) -> Vec<DayGroup> {
    let mut days: BTreeMap<DayKey, DayGroup> = BTreeMap::new();

    for entry in entries {
        let key = options.day_key(entry.performed_at);
        let group = days.entry(key).or_insert_with(|| DayGroup::new(key));

        match classify(&entry.exercise, options.normalize_names) {
            Some(lift) => group.lift_mut(lift).push(ScoredSet {
                id: entry.id,
                weight: entry.weight,
                reps: entry.reps,
                strength_index: estimate(entry.weight, entry.reps),
            }),
            None => group.others.push(AssistanceSet {
                id: entry.id,
                name: entry.exercise.clone(),
                weight: entry.weight,
                reps: entry.reps,
            }),
        }
    }

    let limit = options.policy.limit();
    let groups: Vec<DayGroup> = days
        .into_values()
        .rev()
        .map(|mut group| {
            for lift in Lift::ALL {
                let sets = group.lift_mut(lift);
                sets.sort_by(|a, b| b.strength_index.total_cmp(&a.strength_index));
                sets.truncate(limit);
            }
            group
        })
        .collect();

    tracing::debug!(
        "Aggregated {} entries into {} day groups ({:?})",
        entries.len(),
        groups.len(),
        options.policy
    );

    groups
}

/// Inclusive calendar-day range; a missing bound is open-ended
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DayRange {
    pub start: Option<DayKey>,
    pub end: Option<DayKey>,
}

impl DayRange {
    /// Build a range from optional `YYYY-MM-DD` / `YYYY/MM/DD` bounds
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        Ok(Self {
            start: start.map(DayKey::parse).transpose()?,
            end: end.map(DayKey::parse).transpose()?,
        })
    }

    pub fn contains(&self, key: DayKey) -> bool {
        self.start.map_or(true, |start| key >= start) && self.end.map_or(true, |end| key <= end)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

impl std::fmt::Display for DayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let start = self.start.map(|k| k.to_string());
        let end = self.end.map(|k| k.to_string());
        write!(
            f,
            "{} .. {}",
            start.as_deref().unwrap_or("*"),
            end.as_deref().unwrap_or("*")
        )
    }
}

/// Keep only the groups whose day falls inside `range`
pub fn filter_by_range(groups: Vec<DayGroup>, range: &DayRange) -> Vec<DayGroup> {
    if range.is_unbounded() {
        return groups;
    }
    groups
        .into_iter()
        .filter(|group| range.contains(group.date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use uuid::Uuid;

    fn utc_options(policy: SelectionPolicy) -> AggregateOptions {
        AggregateOptions {
            policy,
            normalize_names: false,
            utc_offset: Some(FixedOffset::east_opt(0).unwrap()),
        }
    }

    fn entry(exercise: &str, weight: f64, reps: u32, at: DateTime<Utc>) -> LogEntry {
        LogEntry {
            id: Uuid::new_v4(),
            performed_at: at,
            exercise: exercise.into(),
            weight,
            reps,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> DayKey {
        DayKey::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn t(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_input() {
        crate::logging::init_test();
        assert!(aggregate(&[], &AggregateOptions::default()).is_empty());
    }

    #[test]
    fn test_same_day_ranking() {
        let t1 = t(2024, 1, 15, 18);
        let entries = vec![
            entry("bench", 100.0, 5, t1),
            entry("bench", 100.0, 10, t1 - Duration::hours(1)),
            entry("squat", 140.0, 3, t1 - Duration::hours(2)),
        ];

        let groups = aggregate(&entries, &utc_options(SelectionPolicy::TopN(3)));
        assert_eq!(groups.len(), 1);

        let group = &groups[0];
        assert_eq!(group.date, day(2024, 1, 15));
        let bench: Vec<(f64, u32, f64)> = group
            .bench
            .iter()
            .map(|s| (s.weight, s.reps, s.strength_index))
            .collect();
        assert_eq!(bench, vec![(100.0, 10, 133.0), (100.0, 5, 117.0)]);
        assert_eq!(group.squat.len(), 1);
        assert_eq!(group.squat[0].strength_index, 154.0);
        assert!(group.deadlift.is_empty());
        assert!(group.others.is_empty());
    }

    #[test]
    fn test_top_n_truncates_and_sorts() {
        let at = t(2024, 2, 1, 10);
        let entries: Vec<LogEntry> = (1..=6)
            .map(|reps| entry("deadlift", 180.0, reps, at))
            .collect();

        let groups = aggregate(&entries, &utc_options(SelectionPolicy::TopN(3)));
        let reps: Vec<u32> = groups[0].deadlift.iter().map(|s| s.reps).collect();
        assert_eq!(reps, vec![6, 5, 4]);
    }

    #[test]
    fn test_best_of_day_keeps_single_winner() {
        let at = t(2024, 2, 1, 10);
        let entries = vec![
            entry("bench", 80.0, 8, at),
            entry("bench", 100.0, 1, at),
            entry("bench", 90.0, 5, at),
        ];

        let groups = aggregate(&entries, &utc_options(SelectionPolicy::BestOfDay));
        assert_eq!(groups[0].bench.len(), 1);
        // 80x8 -> 101, 100x1 -> 100, 90x5 -> 105
        assert_eq!(groups[0].bench[0].weight, 90.0);
        assert_eq!(groups[0].bench[0].strength_index, 105.0);
    }

    #[test]
    fn test_groups_ordered_newest_first() {
        let entries = vec![
            entry("bench", 60.0, 10, t(2024, 1, 2, 9)),
            entry("bench", 60.0, 10, t(2024, 1, 10, 9)),
            entry("Dip", 0.0, 12, t(2023, 12, 31, 9)),
            entry("squat", 100.0, 5, t(2024, 1, 2, 20)),
        ];

        let groups = aggregate(&entries, &utc_options(SelectionPolicy::default()));
        let days: Vec<String> = groups.iter().map(|g| g.date.to_string()).collect();
        assert_eq!(days, vec!["2024/01/10", "2024/01/02", "2023/12/31"]);
        assert_eq!(groups[1].bench.len(), 1);
        assert_eq!(groups[1].squat.len(), 1);
    }

    #[test]
    fn test_assistance_only_day() {
        let at = t(2024, 3, 3, 7);
        let entries = vec![entry("Lunge", 20.0, 10, at), entry("Chin-up", 0.0, 8, at)];

        let groups = aggregate(&entries, &utc_options(SelectionPolicy::default()));
        assert_eq!(groups.len(), 1);
        assert!(groups[0].bench.is_empty());
        assert!(groups[0].squat.is_empty());
        assert!(groups[0].deadlift.is_empty());
        let names: Vec<&str> = groups[0].others.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Lunge", "Chin-up"]);
    }

    #[test]
    fn test_case_variants_are_assistance_by_default() {
        let at = t(2024, 3, 3, 7);
        let entries = vec![
            entry("Bench", 100.0, 5, at),
            entry("bench", 100.0, 5, at),
            entry("", 10.0, 10, at),
        ];

        let groups = aggregate(&entries, &utc_options(SelectionPolicy::default()));
        assert_eq!(groups[0].bench.len(), 1);
        assert_eq!(groups[0].others.len(), 2);
        assert_eq!(groups[0].others[0].name, "Bench");
        assert_eq!(groups[0].others[1].name, "");
    }

    #[test]
    fn test_normalized_names_match_lifts() {
        let at = t(2024, 3, 3, 7);
        let entries = vec![entry(" Bench ", 100.0, 5, at), entry("SQUAT", 120.0, 2, at)];

        let mut options = utc_options(SelectionPolicy::default());
        options.normalize_names = true;
        let groups = aggregate(&entries, &options);
        assert_eq!(groups[0].bench.len(), 1);
        assert_eq!(groups[0].squat.len(), 1);
        assert!(groups[0].others.is_empty());
    }

    #[test]
    fn test_every_entry_accounted_for() {
        let base = t(2024, 5, 1, 6);
        let names = ["bench", "squat", "deadlift", "Row", "Dip"];
        let entries: Vec<LogEntry> = (0..40)
            .map(|i| {
                entry(
                    names[i % names.len()],
                    40.0 + i as f64,
                    (i % 4) as u32 + 1,
                    base + Duration::hours(i as i64 * 7),
                )
            })
            .collect();

        // Large N so nothing is truncated
        let groups = aggregate(&entries, &utc_options(SelectionPolicy::TopN(usize::MAX)));
        let total: usize = groups.iter().map(DayGroup::len).sum();
        assert_eq!(total, entries.len());

        let groups = aggregate(&entries, &utc_options(SelectionPolicy::TopN(2)));
        for group in &groups {
            for lift in Lift::ALL {
                let sets = group.lift(lift);
                assert!(sets.len() <= 2);
                assert!(sets
                    .windows(2)
                    .all(|w| w[0].strength_index >= w[1].strength_index));
            }
        }
    }

    #[test]
    fn test_day_boundary_follows_offset() {
        // 23:30 UTC on Jan 1 is already Jan 2 in UTC+9
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap();
        let entries = vec![entry("bench", 100.0, 3, at)];

        let utc = aggregate(&entries, &utc_options(SelectionPolicy::default()));
        assert_eq!(utc[0].date, day(2024, 1, 1));

        let mut tokyo = utc_options(SelectionPolicy::default());
        tokyo.utc_offset = FixedOffset::east_opt(9 * 3600);
        let shifted = aggregate(&entries, &tokyo);
        assert_eq!(shifted[0].date, day(2024, 1, 2));
    }

    #[test]
    fn test_identical_timestamps_keep_input_order_on_ties() {
        let at = t(2024, 4, 4, 12);
        let first = entry("squat", 100.0, 5, at);
        let second = entry("squat", 100.0, 5, at);
        let ids = (first.id, second.id);

        let groups = aggregate(&[first, second], &utc_options(SelectionPolicy::default()));
        assert_eq!(groups[0].squat[0].id, ids.0);
        assert_eq!(groups[0].squat[1].id, ids.1);
    }

    #[test]
    fn test_filter_by_range_inclusive() {
        let entries = vec![
            entry("bench", 60.0, 5, t(2024, 1, 1, 9)),
            entry("bench", 60.0, 5, t(2024, 1, 15, 9)),
            entry("bench", 60.0, 5, t(2024, 1, 31, 9)),
            entry("bench", 60.0, 5, t(2024, 2, 1, 9)),
        ];
        let groups = aggregate(&entries, &utc_options(SelectionPolicy::default()));

        let range = DayRange::parse(Some("2024-01-01"), Some("2024-01-31")).unwrap();
        let kept: Vec<String> = filter_by_range(groups, &range)
            .iter()
            .map(|g| g.date.to_string())
            .collect();
        assert_eq!(kept, vec!["2024/01/31", "2024/01/15", "2024/01/01"]);
    }

    #[test]
    fn test_filter_open_bounds() {
        let entries = vec![
            entry("bench", 60.0, 5, t(2023, 6, 1, 9)),
            entry("bench", 60.0, 5, t(2024, 6, 1, 9)),
        ];
        let groups = aggregate(&entries, &utc_options(SelectionPolicy::default()));

        let all = filter_by_range(groups.clone(), &DayRange::default());
        assert_eq!(all.len(), 2);

        let since = DayRange::parse(Some("2024/01/01"), None).unwrap();
        let kept = filter_by_range(groups.clone(), &since);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].date, day(2024, 6, 1));

        let until = DayRange::parse(None, Some("2023-12-31")).unwrap();
        let kept = filter_by_range(groups, &until);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].date, day(2023, 6, 1));
    }

    #[test]
    fn test_range_rejects_garbage_bounds() {
        assert!(DayRange::parse(Some("last week"), None).is_err());
    }
}
