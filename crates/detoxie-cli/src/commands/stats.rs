use chrono::Local;
use clap::Subcommand;
use detoxie_core::storage::Database;
use detoxie_core::{DailyLedger, Platform, StatsRecorder};
use serde_json::json;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's per-platform usage and threshold flags
    Today,
    /// Lifetime totals
    All,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Today => {
            let mut ledger = DailyLedger::load(&db);
            // A stored ledger from an earlier day reads as an empty today.
            ledger.ensure_day(Local::now().date_naive());
            let report = json!({
                "date": ledger.date(),
                "instagram_ms": ledger.platform_ms(Platform::Instagram),
                "youtube_ms": ledger.platform_ms(Platform::YouTube),
                "total_ms": ledger.total_today(),
                "half_shown": ledger.half_shown(),
                "limit_reached": ledger.limit_reached(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        StatsAction::All => {
            let stats = StatsRecorder::load(&db);
            println!("{}", serde_json::to_string_pretty(stats.stats())?);
        }
    }
    Ok(())
}
