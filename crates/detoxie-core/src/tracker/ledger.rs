//! Per-calendar-day accumulator and threshold flags.
//!
//! The ledger is pure data. It is loaded once from the store when the
//! tracker starts and written back after every change; the in-memory copy
//! stays authoritative if a write fails.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::platform::Platform;
use crate::storage::keys;
use crate::storage::KvStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLedger {
    /// Day the counters belong to. `None` until the first rollover.
    date: Option<NaiveDate>,
    instagram_ms: u64,
    youtube_ms: u64,
    half_shown: bool,
    limit_reached: bool,
}

impl DailyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn platform_ms(&self, platform: Platform) -> u64 {
        match platform {
            Platform::Instagram => self.instagram_ms,
            Platform::YouTube => self.youtube_ms,
        }
    }

    pub fn total_today(&self) -> u64 {
        Platform::ALL
            .iter()
            .map(|p| self.platform_ms(*p))
            .fold(0u64, u64::saturating_add)
    }

    pub fn half_shown(&self) -> bool {
        self.half_shown
    }

    pub fn limit_reached(&self) -> bool {
        self.limit_reached
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Reset everything if the ledger belongs to another day.
    ///
    /// Returns `true` when a rollover happened. Calling it again on the
    /// same day changes nothing.
    pub fn ensure_day(&mut self, today: NaiveDate) -> bool {
        if self.date == Some(today) {
            return false;
        }
        *self = Self {
            date: Some(today),
            ..Self::default()
        };
        info!(%today, "daily ledger reset");
        true
    }

    pub fn accumulate(&mut self, platform: Platform, duration_ms: u64) {
        let slot = match platform {
            Platform::Instagram => &mut self.instagram_ms,
            Platform::YouTube => &mut self.youtube_ms,
        };
        *slot = slot.saturating_add(duration_ms);
    }

    /// Returns `true` if the flag flipped.
    pub fn mark_half_shown(&mut self) -> bool {
        !std::mem::replace(&mut self.half_shown, true)
    }

    /// Returns `true` if the flag flipped.
    pub fn mark_limit_reached(&mut self) -> bool {
        !std::mem::replace(&mut self.limit_reached, true)
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Load from the store. Missing or unreadable values default.
    pub fn load(store: &dyn KvStore) -> Self {
        Self {
            date: keys::read_date(store, keys::DAILY_DATE),
            instagram_ms: keys::read_u64(store, keys::INSTAGRAM_DAILY_MS),
            youtube_ms: keys::read_u64(store, keys::YOUTUBE_DAILY_MS),
            half_shown: keys::read_bool(store, keys::DAILY_HALF_SHOWN),
            limit_reached: keys::read_bool(store, keys::DAILY_LIMIT_REACHED),
        }
    }

    /// Write every field in one batch. Failures are logged, never returned.
    pub fn save(&self, store: &dyn KvStore) {
        keys::write_batch(store, &self.entries());
    }

    /// Key-value pairs persisting this ledger.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![
            (keys::INSTAGRAM_DAILY_MS, self.instagram_ms.to_string()),
            (keys::YOUTUBE_DAILY_MS, self.youtube_ms.to_string()),
            (keys::DAILY_HALF_SHOWN, self.half_shown.to_string()),
            (keys::DAILY_LIMIT_REACHED, self.limit_reached.to_string()),
        ];
        if let Some(date) = self.date {
            entries.push((keys::DAILY_DATE, date.format(keys::DATE_FORMAT).to_string()));
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn first_ensure_day_stamps_date() {
        let mut ledger = DailyLedger::new();
        assert!(ledger.ensure_day(day(14)));
        assert_eq!(ledger.date(), Some(day(14)));
        assert_eq!(ledger.total_today(), 0);
    }

    #[test]
    fn ensure_day_is_idempotent() {
        let mut ledger = DailyLedger::new();
        ledger.ensure_day(day(14));
        ledger.accumulate(Platform::Instagram, 1_000);
        ledger.mark_half_shown();
        let before = ledger.clone();

        assert!(!ledger.ensure_day(day(14)));
        assert!(!ledger.ensure_day(day(14)));
        assert_eq!(ledger, before);
    }

    #[test]
    fn day_change_resets_counters_and_flags() {
        let mut ledger = DailyLedger::new();
        ledger.ensure_day(day(14));
        ledger.accumulate(Platform::Instagram, 10_000);
        ledger.accumulate(Platform::YouTube, 5_000);
        ledger.mark_half_shown();
        ledger.mark_limit_reached();

        assert!(ledger.ensure_day(day(15)));
        assert_eq!(ledger.total_today(), 0);
        assert!(!ledger.half_shown());
        assert!(!ledger.limit_reached());
    }

    #[test]
    fn total_is_sum_of_platforms() {
        let mut ledger = DailyLedger::new();
        ledger.ensure_day(day(14));
        ledger.accumulate(Platform::Instagram, 1_200);
        ledger.accumulate(Platform::YouTube, 800);
        ledger.accumulate(Platform::Instagram, 0);
        assert_eq!(ledger.platform_ms(Platform::Instagram), 1_200);
        assert_eq!(ledger.total_today(), 2_000);
    }

    #[test]
    fn flags_flip_once() {
        let mut ledger = DailyLedger::new();
        assert!(ledger.mark_half_shown());
        assert!(!ledger.mark_half_shown());
        assert!(ledger.mark_limit_reached());
        assert!(!ledger.mark_limit_reached());
        assert!(ledger.half_shown() && ledger.limit_reached());
    }

    #[test]
    fn survives_a_restart_through_the_store() {
        let store = MemoryStore::new();
        let mut ledger = DailyLedger::new();
        ledger.ensure_day(day(14));
        ledger.accumulate(Platform::YouTube, 42_000);
        ledger.mark_half_shown();
        ledger.save(&store);

        let reloaded = DailyLedger::load(&store);
        assert_eq!(reloaded, ledger);
    }

    #[test]
    fn stale_store_rolls_over_on_load() {
        let store = MemoryStore::new();
        let mut ledger = DailyLedger::new();
        ledger.ensure_day(day(13));
        ledger.accumulate(Platform::Instagram, 99_000);
        ledger.mark_limit_reached();
        ledger.save(&store);

        let mut reloaded = DailyLedger::load(&store);
        assert!(reloaded.ensure_day(day(14)));
        assert_eq!(reloaded.total_today(), 0);
        assert!(!reloaded.limit_reached());
    }
}
