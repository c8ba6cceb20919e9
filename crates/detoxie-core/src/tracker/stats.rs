//! Lifetime statistics, updated once per closed session.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::session::ClosedSession;
use crate::storage::keys;
use crate::storage::KvStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifetimeStats {
    pub total_time_ms: u64,
    pub session_count: u64,
    /// `YYYY-MM-DD` of the most recent session close.
    pub last_session_date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StatsRecorder {
    stats: LifetimeStats,
}

impl StatsRecorder {
    pub fn new(stats: LifetimeStats) -> Self {
        Self { stats }
    }

    pub fn stats(&self) -> &LifetimeStats {
        &self.stats
    }

    pub fn total_time_ms(&self) -> u64 {
        self.stats.total_time_ms
    }

    /// Strictly additive. Call exactly once per [`ClosedSession`].
    pub fn record_session_close(&mut self, session: &ClosedSession, now: DateTime<Local>) -> &LifetimeStats {
        self.stats.total_time_ms = self.stats.total_time_ms.saturating_add(session.duration_ms);
        self.stats.session_count += 1;
        self.stats.last_session_date = Some(now.date_naive().format(keys::DATE_FORMAT).to_string());
        info!(
            platform = %session.platform,
            duration_ms = session.duration_ms,
            total_ms = self.stats.total_time_ms,
            sessions = self.stats.session_count,
            "session recorded"
        );
        &self.stats
    }

    pub fn load(store: &dyn KvStore) -> Self {
        Self::new(LifetimeStats {
            total_time_ms: keys::read_u64(store, keys::TOTAL_TIME_SPENT),
            session_count: keys::read_u64(store, keys::SESSION_COUNT),
            last_session_date: keys::read_raw(store, keys::LAST_SESSION_DATE),
        })
    }

    pub fn save(&self, store: &dyn KvStore) {
        keys::write_batch(store, &self.entries());
    }

    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = vec![
            (keys::TOTAL_TIME_SPENT, self.stats.total_time_ms.to_string()),
            (keys::SESSION_COUNT, self.stats.session_count.to_string()),
        ];
        if let Some(date) = &self.stats.last_session_date {
            entries.push((keys::LAST_SESSION_DATE, date.clone()));
        }
        entries
    }
}
