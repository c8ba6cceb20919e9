use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::Args;
use detoxie_core::storage::Database;
use detoxie_core::{
    ConfigProvider, FileConfigProvider, KvStore, MemoryStore, Observation, OverlayRequest, Presenter,
    PresenterError, TrackerFacade,
};
use tracing::{info, warn};

#[derive(Args)]
pub struct ReplayArgs {
    /// NDJSON file of observations (reads stdin when omitted)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Keep state in memory instead of the on-disk database
    #[arg(long)]
    memory: bool,
}

/// Headless presenter: overlays only show up in the log.
struct LogPresenter;

impl Presenter for LogPresenter {
    fn show(&mut self, request: &OverlayRequest) -> Result<(), PresenterError> {
        info!(
            kind = ?request.kind,
            elapsed_ms = request.elapsed_today_ms,
            limit_ms = request.limit_ms,
            title = %request.appearance.title,
            "overlay shown"
        );
        Ok(())
    }

    fn hide(&mut self) -> Result<(), PresenterError> {
        info!("overlay hidden");
        Ok(())
    }
}

pub fn run(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input: Box<dyn BufRead> = match &args.file {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let config = FileConfigProvider::default_location()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.memory {
        replay(MemoryStore::new(), config, input, &mut out)
    } else {
        replay(Database::open()?, config, input, &mut out)
    }
}

/// Feed every line through the tracker and print the resulting events as
/// JSON lines. Blank lines are skipped; malformed lines are logged and skipped.
pub fn replay<S, C>(
    store: S,
    config: C,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: KvStore,
    C: ConfigProvider,
{
    let mut tracker = TrackerFacade::new(store, LogPresenter, config);

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let observation: Observation = match serde_json::from_str(line) {
            Ok(observation) => observation,
            Err(e) => {
                warn!(line = index + 1, error = %e, "skipping malformed observation");
                continue;
            }
        };
        for event in tracker.handle(observation) {
            writeln!(out, "{}", serde_json::to_string(&event)?)?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use detoxie_core::Config;

    fn run_lines(lines: &str) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        replay(MemoryStore::new(), Config::default(), lines.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn replays_a_short_session() {
        let events = run_lines(concat!(
            r#"{"kind":"connected","at":"2026-10-14T10:00:00+00:00"}"#,
            "\n",
            r#"{"kind":"section","platform":"instagram","active":true,"at":"2026-10-14T10:00:00+00:00"}"#,
            "\n\n",
            r#"{"kind":"foreground","package":"com.whatsapp","at":"2026-10-14T10:01:00+00:00"}"#,
            "\n",
        ));
        let statuses: Vec<&str> = events.iter().filter_map(|e| e["status"].as_str()).collect();
        assert_eq!(statuses, vec!["Service Connected", "Entered Reels", "Left App"]);
        let stats = events
            .iter()
            .find(|e| e["type"] == "ContentStatsUpdate")
            .unwrap();
        assert_eq!(stats["sessionCount"], 1);
        assert_eq!(stats["totalTime"], 60.0);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let events = run_lines("not json\n{\"kind\":\"connected\",\"at\":\"2026-10-14T10:00:00+00:00\"}\n");
        assert_eq!(events.len(), 1);
    }
}
