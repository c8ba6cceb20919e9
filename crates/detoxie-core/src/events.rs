use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// Status carried by a [`Event::ContentEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentStatus {
    #[serde(rename = "Entered Reels")]
    EnteredReels,
    #[serde(rename = "Entered Shorts")]
    EnteredShorts,
    #[serde(rename = "Left Reels")]
    LeftReels,
    #[serde(rename = "Left Shorts")]
    LeftShorts,
    #[serde(rename = "Left App")]
    LeftApp,
    #[serde(rename = "Overlay Shown")]
    OverlayShown,
    #[serde(rename = "Overlay Dismissed")]
    OverlayDismissed,
    #[serde(rename = "Service Connected")]
    ServiceConnected,
}

/// Every observable change in the tracker produces an Event.
/// The host bridge forwards them to the UI; all times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename_all = "camelCase")]
    ContentEvent {
        status: ContentStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        platform: Option<Platform>,
        /// Lifetime total.
        total_time_spent: f64,
    },
    /// Periodic report while signals for a tracked platform keep arriving.
    #[serde(rename_all = "camelCase")]
    ContentTimeUpdate {
        current_session_time: f64,
        total_time_spent: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        platform: Option<Platform>,
        instagram_time_today: f64,
        youtube_time_today: f64,
    },
    /// Sent once per closed session with the new lifetime totals.
    #[serde(rename_all = "camelCase")]
    ContentStatsUpdate {
        total_time: f64,
        session_count: u64,
        last_session_date: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        platform: Option<Platform>,
        instagram_time_today: f64,
        youtube_time_today: f64,
    },
}

impl Event {
    pub fn content(status: ContentStatus, platform: Option<Platform>, total_ms: u64) -> Self {
        Event::ContentEvent {
            status,
            platform,
            total_time_spent: ms_to_secs(total_ms),
        }
    }

    /// Status of a `ContentEvent`, `None` for the other kinds.
    pub fn status(&self) -> Option<ContentStatus> {
        match self {
            Event::ContentEvent { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub fn ms_to_secs(ms: u64) -> f64 {
    ms as f64 / 1000.0
}
