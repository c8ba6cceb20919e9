//! Persisted key names and lenient typed accessors.
//!
//! Reads never fail: a store error or an unparsable value is logged and
//! treated as absent so the default applies.

use chrono::NaiveDate;
use tracing::warn;

use super::KvStore;

pub const DAILY_DATE: &str = "daily_date";
pub const INSTAGRAM_DAILY_MS: &str = "instagram_daily_ms";
pub const YOUTUBE_DAILY_MS: &str = "youtube_daily_ms";
pub const DAILY_HALF_SHOWN: &str = "daily_half_shown";
pub const DAILY_LIMIT_REACHED: &str = "daily_limit_reached";
pub const TOTAL_TIME_SPENT: &str = "total_time_spent";
pub const SESSION_COUNT: &str = "session_count";
pub const LAST_SESSION_DATE: &str = "last_session_date";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn read_raw(store: &dyn KvStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "store read failed, using default");
            None
        }
    }
}

fn read_parsed<T: std::str::FromStr>(store: &dyn KvStore, key: &str) -> Option<T> {
    let raw = read_raw(store, key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "unparsable stored value, using default");
            None
        }
    }
}

pub fn read_u64(store: &dyn KvStore, key: &str) -> u64 {
    read_parsed(store, key).unwrap_or(0)
}

pub fn read_bool(store: &dyn KvStore, key: &str) -> bool {
    read_parsed(store, key).unwrap_or(false)
}

pub fn read_date(store: &dyn KvStore, key: &str) -> Option<NaiveDate> {
    let raw = read_raw(store, key)?;
    match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            warn!(key, value = %raw, "unparsable stored date, using default");
            None
        }
    }
}

/// Fire-and-forget batch write.
pub fn write_batch(store: &dyn KvStore, entries: &[(&str, String)]) {
    if let Err(e) = store.set_many(entries) {
        warn!(error = %e, keys = entries.len(), "store write failed, keeping in-memory state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn garbage_reads_as_default() {
        let store = MemoryStore::new();
        store.set(SESSION_COUNT, "not-a-number").unwrap();
        store.set(DAILY_HALF_SHOWN, "maybe").unwrap();
        store.set(DAILY_DATE, "14/10/2026").unwrap();
        assert_eq!(read_u64(&store, SESSION_COUNT), 0);
        assert!(!read_bool(&store, DAILY_HALF_SHOWN));
        assert!(read_date(&store, DAILY_DATE).is_none());
    }

    #[test]
    fn well_formed_values_parse() {
        let store = MemoryStore::new();
        store.set(TOTAL_TIME_SPENT, "123456").unwrap();
        store.set(DAILY_LIMIT_REACHED, "true").unwrap();
        store.set(DAILY_DATE, "2026-10-14").unwrap();
        assert_eq!(read_u64(&store, TOTAL_TIME_SPENT), 123_456);
        assert!(read_bool(&store, DAILY_LIMIT_REACHED));
        assert_eq!(
            read_date(&store, DAILY_DATE),
            NaiveDate::from_ymd_opt(2026, 10, 14)
        );
    }
}
