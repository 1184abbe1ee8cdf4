use std::path::Path;

use seedgauge::config::Config;
use seedgauge::engine::EngineParams;
use seedgauge::replay::{self, ReplayFile};
use seedgauge::Decimal;

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config) {
        eprintln!("Replay failed: {:#}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    let started = chrono::Utc::now();

    let file = ReplayFile::load(Path::new(&config.event_log))?;
    let params = EngineParams {
        first_eligible_season: config.first_eligible_season,
        cached_season_cutoff: config.cached_season_cutoff,
        initial_ratio_pct: Decimal::from_int(50),
    };
    let event_count = file.events.len();
    let (engine, report) = replay::run(&file, params)?;

    let digest = engine.state_digest()?;
    if let Some(path) = &config.state_digest_out {
        std::fs::write(path, format!("{}\n", digest))?;
        tracing::info!(path, "state digest written");
    }

    let elapsed = chrono::Utc::now() - started;
    tracing::info!(
        events = event_count,
        processed = report.processed,
        rejected = report.errors.len(),
        last_season = ?engine.last_season(),
        elapsed_ms = elapsed.num_milliseconds(),
        digest = %digest,
        "replay complete"
    );

    for (key, err) in &report.errors {
        tracing::error!(key = %key, error = %err, "rejected event");
    }
    if !report.ok() {
        anyhow::bail!("{} event(s) rejected", report.errors.len());
    }
    Ok(())
}
