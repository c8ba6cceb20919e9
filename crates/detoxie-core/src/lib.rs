//! # Detoxie Core Library
//!
//! Tracks time spent in short-form video sections (Instagram Reels,
//! YouTube Shorts) against a daily budget and decides when to interrupt
//! the user. The library owns the accounting; the host owns the screen.
//!
//! ## Architecture
//!
//! - **Tracker**: a clock-free state machine fed one observation at a time.
//!   Every call carries its own timestamp, returns the events it produced,
//!   and never spawns threads or blocks on I/O beyond the store writes
//! - **Storage**: a key-value seam with SQLite and in-memory backends, plus
//!   TOML-based configuration
//! - **Classifier**: heuristics that read a host UI tree and report whether
//!   the tracked section is on screen
//! - **Presenter**: the seam through which overlays are shown and removed
//!
//! ## Key Components
//!
//! - [`TrackerFacade`]: single entry point for the observation stream
//! - [`DailyLedger`]: per-day counters and threshold flags
//! - [`Database`]: persistence across restarts
//! - [`Config`]: daily budget, vacation mode, overlay appearance

pub mod classifier;
pub mod error;
pub mod events;
pub mod platform;
pub mod presenter;
pub mod storage;
pub mod tracker;

pub use classifier::{classify, SectionProbe, UiNode, UiSnapshot};
pub use error::{ConfigError, CoreError, PresenterError, StoreError, ValidationError};
pub use events::{ContentStatus, Event};
pub use platform::{PackageKind, Platform};
pub use presenter::{NullPresenter, OverlayKind, OverlayRequest, Presenter};
pub use storage::{Config, ConfigProvider, Database, FileConfigProvider, KvStore, MemoryStore};
pub use tracker::{DailyLedger, Decision, LifetimeStats, Observation, SessionTracker, StatsRecorder, TrackerFacade};
