//! Single open-session state machine.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --active(p)--> Active(p) --inactive(p) | foreground lost--> Idle
//! Active(p) --active(q), q != p--> Active(q)   (close p, then open q)
//! ```
//!
//! The tracker never reads a clock: every call carries `now`.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Active {
        platform: Platform,
        started_at: DateTime<Local>,
    },
}

/// A session that just ended. Produced exactly once per open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedSession {
    pub platform: Platform,
    pub started_at: DateTime<Local>,
    pub ended_at: DateTime<Local>,
    pub duration_ms: u64,
}

/// What a single section signal did to the tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalOutcome {
    pub closed: Option<ClosedSession>,
    pub opened: Option<Platform>,
    /// Elapsed time of the session open after the signal, 0 when idle.
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone)]
pub struct SessionTracker {
    state: SessionState,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTracker {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn active_platform(&self) -> Option<Platform> {
        match self.state {
            SessionState::Active { platform, .. } => Some(platform),
            SessionState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_platform().is_some()
    }

    pub fn elapsed_ms(&self, now: DateTime<Local>) -> u64 {
        match self.state {
            SessionState::Active { started_at, .. } => elapsed_between(started_at, now),
            SessionState::Idle => 0,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn on_section_signal(
        &mut self,
        platform: Platform,
        active: bool,
        now: DateTime<Local>,
    ) -> SignalOutcome {
        let mut outcome = SignalOutcome::default();
        match (self.state, active) {
            (SessionState::Idle, true) => {
                self.open(platform, now);
                outcome.opened = Some(platform);
            }
            (SessionState::Idle, false) => {}
            (SessionState::Active { platform: current, .. }, true) if current != platform => {
                outcome.closed = self.close(now);
                self.open(platform, now);
                outcome.opened = Some(platform);
            }
            (SessionState::Active { platform: current, .. }, false) if current == platform => {
                outcome.closed = self.close(now);
            }
            // Same platform still active, or another platform going inactive.
            (SessionState::Active { .. }, _) => {}
        }
        outcome.elapsed_ms = self.elapsed_ms(now);
        outcome
    }

    /// The user left both tracked apps. No-op when already idle.
    pub fn on_foreground_lost(&mut self, now: DateTime<Local>) -> Option<ClosedSession> {
        self.close(now)
    }

    /// Close the open session, if any.
    pub fn close(&mut self, now: DateTime<Local>) -> Option<ClosedSession> {
        let SessionState::Active { platform, started_at } = self.state else {
            return None;
        };
        self.state = SessionState::Idle;
        let closed = ClosedSession {
            platform,
            started_at,
            ended_at: now,
            duration_ms: elapsed_between(started_at, now),
        };
        debug!(%platform, duration_ms = closed.duration_ms, "session closed");
        Some(closed)
    }

    /// Restart tracking with a fresh start instant after an overlay was
    /// dismissed. Only acts when idle and the section was reconfirmed active.
    ///
    /// Returns `true` if a session was opened.
    pub fn resume(&mut self, platform: Platform, now: DateTime<Local>, section_confirmed: bool) -> bool {
        if !section_confirmed || self.is_active() {
            return false;
        }
        self.open(platform, now);
        true
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn open(&mut self, platform: Platform, now: DateTime<Local>) {
        debug!(%platform, "session opened");
        self.state = SessionState::Active {
            platform,
            started_at: now,
        };
    }
}

/// Milliseconds from `start` to `end`. A clock stepping backwards counts as 0.
pub fn elapsed_between(start: DateTime<Local>, end: DateTime<Local>) -> u64 {
    (end - start).num_milliseconds().max(0) as u64
}
