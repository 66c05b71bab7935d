//! Per-day cumulative upload series.
//!
//! Values are cumulative bytes uploaded as reported by the torrent client, one
//! entry per calendar day (the last observation of that day wins). Storing
//! cumulative values turns "bytes uploaded in the last N days" into a single
//! subtraction, at the cost of requiring an exact-day match for the lookback.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};

/// Days of history (and of untouched records) retained by the store.
pub const STORE_MAX_DAYS: u32 = 30;

/// Key format for history entries.
pub const HISTORY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Map from `YYYY-MM-DD` (service-local calendar) to cumulative uploaded bytes.
///
/// Serialized as a plain JSON object so the stored column stays readable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadHistory(BTreeMap<String, i64>);

impl UploadHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set today's entry to `cumulative_bytes`, overwriting any earlier value
    /// recorded today.
    pub fn record_today(&mut self, cumulative_bytes: i64) {
        self.record_on(Local::now().date_naive(), cumulative_bytes);
    }

    /// Set the entry for `date`, overwriting any earlier value for that day.
    pub fn record_on(&mut self, date: NaiveDate, cumulative_bytes: i64) {
        self.0.insert(date_key(date), cumulative_bytes);
    }

    /// Value recorded exactly `n` days before today.
    ///
    /// Returns `None` when that exact day was never observed. The series is
    /// sparse and the lookback deliberately does not fall back to the closest
    /// earlier entry.
    pub fn value_n_days_ago(&self, n: u32) -> Option<i64> {
        self.value_days_before(Local::now().date_naive(), n)
    }

    /// Value recorded exactly `n` days before `today`.
    pub fn value_days_before(&self, today: NaiveDate, n: u32) -> Option<i64> {
        let day = today.checked_sub_days(Days::new(u64::from(n)))?;
        self.0.get(&date_key(day)).copied()
    }

    /// Drop every entry more than `max_days * 24h` older than now.
    ///
    /// Returns the number of entries removed.
    pub fn prune_older_than(&mut self, max_days: u32) -> usize {
        self.prune_relative_to(Local::now().naive_local(), max_days)
    }

    /// Drop every entry whose day started more than `max_days * 24h` before
    /// `now`. Keys that do not parse as dates are dropped as well.
    pub fn prune_relative_to(&mut self, now: NaiveDateTime, max_days: u32) -> usize {
        let max_age = TimeDelta::hours(i64::from(max_days) * 24);
        let before = self.0.len();
        self.0.retain(|key, _| {
            NaiveDate::parse_from_str(key, HISTORY_DATE_FORMAT)
                .is_ok_and(|day| now - day.and_time(chrono::NaiveTime::MIN) <= max_age)
        });
        before - self.0.len()
    }

    /// Raw value for a `YYYY-MM-DD` key.
    pub fn get(&self, key: &str) -> Option<i64> {
        self.0.get(key).copied()
    }

    /// Number of recorded days.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in date order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl From<BTreeMap<String, i64>> for UploadHistory {
    fn from(entries: BTreeMap<String, i64>) -> Self {
        Self(entries)
    }
}

impl<const N: usize> From<[(NaiveDate, i64); N]> for UploadHistory {
    fn from(entries: [(NaiveDate, i64); N]) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(day, value)| (date_key(day), value))
                .collect(),
        )
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format(HISTORY_DATE_FORMAT).to_string()
}

/// Calendar day of `now` in the service's local timezone.
pub(crate) fn local_day<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    now.with_timezone(&Local).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, HISTORY_DATE_FORMAT).unwrap()
    }

    fn noon(s: &str) -> NaiveDateTime {
        day(s).and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap())
    }

    #[test]
    fn test_record_overwrites_same_day() {
        let mut history = UploadHistory::new();
        history.record_on(day("2025-06-05"), 12_345);
        history.record_on(day("2025-06-05"), 12_445);

        assert_eq!(history.len(), 1);
        assert_eq!(history.get("2025-06-05"), Some(12_445));
    }

    #[test]
    fn test_record_today_uses_local_date() {
        let mut history = UploadHistory::new();
        history.record_today(7);

        let today = Local::now().date_naive().format(HISTORY_DATE_FORMAT).to_string();
        assert_eq!(history.get(&today), Some(7));
    }

    #[test]
    fn test_value_days_before_exact_match() {
        let history = UploadHistory::from([(day("2025-06-04"), 100), (day("2025-06-01"), 500)]);
        let today = day("2025-06-05");

        assert_eq!(history.value_days_before(today, 1), Some(100));
        assert_eq!(history.value_days_before(today, 4), Some(500));
    }

    #[test]
    fn test_value_days_before_missing_day_is_none() {
        // Entries on either side of the requested day do not count: the
        // lookback is an exact-day match, not "closest earlier entry".
        let history = UploadHistory::from([(day("2025-06-01"), 0), (day("2025-06-03"), 10)]);
        let today = day("2025-06-05");

        assert_eq!(history.value_days_before(today, 3), None);
        assert_eq!(history.value_days_before(today, 0), None);
    }

    #[test]
    fn test_prune_drops_entries_past_max_age() {
        let now = noon("2025-07-31");
        let mut history = UploadHistory::from([
            (day("2025-06-30"), 100), // 31 days
            (day("2025-06-26"), 200), // 35 days
            (day("2025-07-26"), 300), // 5 days
            (day("2025-07-02"), 400), // 29 days
        ]);

        let removed = history.prune_relative_to(now, STORE_MAX_DAYS);

        assert_eq!(removed, 2);
        assert_eq!(history.get("2025-06-30"), None);
        assert_eq!(history.get("2025-06-26"), None);
        assert_eq!(history.get("2025-07-26"), Some(300));
        assert_eq!(history.get("2025-07-02"), Some(400));
    }

    #[test]
    fn test_prune_drops_unparseable_keys() {
        let mut entries = BTreeMap::new();
        entries.insert("not-a-date".to_string(), 1);
        entries.insert("2025-07-30".to_string(), 2);
        let mut history = UploadHistory::from(entries);

        history.prune_relative_to(noon("2025-07-31"), STORE_MAX_DAYS);

        assert_eq!(history.len(), 1);
        assert_eq!(history.get("2025-07-30"), Some(2));
    }

    #[test]
    fn test_value_n_days_ago_reads_local_calendar() {
        let today = Local::now().date_naive();
        let mut history = UploadHistory::new();
        history.record_on(today - Days::new(30), 900);

        assert_eq!(history.value_n_days_ago(30), Some(900));
        assert_eq!(history.value_n_days_ago(29), None);
    }

    #[test]
    fn test_prune_older_than_keeps_recent_entries() {
        let today = Local::now().date_naive();
        let mut history = UploadHistory::new();
        history.record_on(today, 1);
        history.record_on(today - Days::new(40), 2);

        assert_eq!(history.prune_older_than(STORE_MAX_DAYS), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.value_n_days_ago(0), Some(1));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let history =
            UploadHistory::from([(day("2025-06-04"), 100_000), (day("2025-06-05"), 100_001)]);

        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, r#"{"2025-06-04":100000,"2025-06-05":100001}"#);

        let back: UploadHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, history);
    }
}
