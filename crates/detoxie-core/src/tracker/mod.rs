mod facade;
mod ledger;
pub mod policy;
mod session;
mod stats;

pub use facade::{Observation, TrackerFacade};
pub use ledger::DailyLedger;
pub use policy::{Decision, PolicyInput};
pub use session::{elapsed_between, ClosedSession, SessionState, SessionTracker, SignalOutcome};
pub use stats::{LifetimeStats, StatsRecorder};
