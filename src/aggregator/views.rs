//! Date-based derivations over a task list.
//!
//! Pure functions so they can be checked without a clock or stores.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset, Utc};

use crate::task::when::{day_key, parse_instant};
use crate::task::Task;

/// Tasks whose `start` string begins with `day` (`YYYY-MM-DD`), ascending.
///
/// Tasks without a `start` are left out.
#[must_use]
pub fn on_day(tasks: &[Task], day: &str, local: FixedOffset) -> Vec<Task> {
    let mut matching: Vec<Task> =
        tasks.iter().filter(|t| t.start().is_some_and(|s| s.starts_with(day))).cloned().collect();
    matching.sort_by(|a, b| compare_start(a, b, local));
    matching
}

/// Tasks on the local calendar day containing `now`.
#[must_use]
pub fn today(tasks: &[Task], now: DateTime<Utc>, local: FixedOffset) -> Vec<Task> {
    on_day(tasks, &day_key(&now, local), local)
}

/// The first `limit` tasks starting strictly after `now`, ascending.
///
/// Tasks whose `start` is missing or unparseable are skipped.
#[must_use]
pub fn upcoming(tasks: &[Task], now: DateTime<Utc>, local: FixedOffset, limit: usize) -> Vec<Task> {
    let mut future: Vec<(DateTime<FixedOffset>, &Task)> = tasks
        .iter()
        .filter_map(|t| t.start().and_then(|s| parse_instant(s, local)).map(|at| (at, t)))
        .filter(|(at, _)| *at > now)
        .collect();
    future.sort_by(|(a, ta), (b, tb)| a.cmp(b).then_with(|| ta.start().cmp(&tb.start())));
    future.into_iter().take(limit).map(|(_, t)| t.clone()).collect()
}

/// Orders by parsed start, unparseable starts last, raw string as tie-break.
fn compare_start(a: &Task, b: &Task, local: FixedOffset) -> Ordering {
    let at = a.start().and_then(|s| parse_instant(s, local));
    let bt = b.start().and_then(|s| parse_instant(s, local));
    match (at, bt) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.start().cmp(&b.start()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskFields;
    use chrono::TimeZone;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(id: &str, start: Option<&str>) -> Task {
        let mut fields = TaskFields::new(id, id);
        fields.start = start.map(str::to_string);
        Task::Personal(fields)
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(Task::id).collect()
    }

    #[test]
    fn today_partitions_on_local_day() {
        let tasks = vec![
            at("c", Some("2024-01-02T00:00")),
            at("b", Some("2024-01-01T23:59")),
            at("a", Some("2024-01-01T08:00")),
        ];
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(ids(&today(&tasks, now, utc())), vec!["a", "b"]);
    }

    #[test]
    fn today_skips_tasks_without_start() {
        let tasks = vec![at("a", None), at("b", Some("2024-01-01"))];
        assert_eq!(ids(&on_day(&tasks, "2024-01-01", utc())), vec!["b"]);
    }

    #[test]
    fn today_empty_is_valid() {
        let now = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();
        assert!(today(&[at("a", Some("2024-01-01T08:00"))], now, utc()).is_empty());
    }

    #[test]
    fn upcoming_truncates_to_earliest() {
        let tasks: Vec<Task> = (1..=8)
            .rev()
            .map(|d| at(&format!("d{d}"), Some(format!("2024-02-0{d}T10:00").as_str())))
            .collect();
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(ids(&upcoming(&tasks, now, utc(), 5)), vec!["d1", "d2", "d3", "d4", "d5"]);
    }

    #[test]
    fn upcoming_is_strictly_after_now() {
        let tasks = vec![at("now", Some("2024-01-01T12:00")), at("later", Some("2024-01-01T12:01"))];
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(ids(&upcoming(&tasks, now, utc(), 5)), vec!["later"]);
    }

    #[test]
    fn upcoming_drops_unparseable_starts() {
        let tasks = vec![at("bad", Some("soon")), at("none", None), at("ok", Some("2099-01-01"))];
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(ids(&upcoming(&tasks, now, utc(), 5)), vec!["ok"]);
    }
}
