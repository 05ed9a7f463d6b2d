//! AGV Replay - Main Entry Point
//!
//! Streams a historical telemetry export as if the vehicle were live.
//!
//! ```text
//! agv-replay <export.csv> [--score <model>] [--strict]
//! ```
//!
//! Without `--score`, messages go to `TELEMETRY_SINK_URL` when set, or to
//! the log otherwise. With `--score`, each message is fed into the named
//! model from `MODEL_DIR` and the scores are logged.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use agv_health_core::constants;
use agv_health_core::logic::model::load_engine;
use agv_health_core::logic::replay::{
    ColumnMapping, CsvSource, EngineSink, HttpSink, LogSink, ReplayConfig, ReplayIngestor,
    RowErrorPolicy, TelemetrySink,
};

#[derive(Parser)]
#[command(name = "agv-replay")]
#[command(about = "Replay a telemetry export as a live vehicle stream")]
#[command(version)]
struct Cli {
    /// Telemetry export (CSV with an isoTimestamp column)
    csv: PathBuf,

    /// Score each message with this model from MODEL_DIR instead of sending it
    #[arg(long, value_name = "MODEL")]
    score: Option<String>,

    /// Abort on the first row that cannot be mapped or cast
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();

    log::info!("Starting {} replay v{}", constants::APP_NAME, constants::APP_VERSION);

    let mut config = ReplayConfig::from_env();
    if args.strict {
        config.on_row_error = RowErrorPolicy::Abort;
    }

    let sink: Box<dyn TelemetrySink> = match (&args.score, constants::get_sink_url()) {
        (Some(model), _) => {
            let model_dir = constants::get_model_dir();
            let engine = load_engine(&model_dir, model)
                .with_context(|| format!("loading model '{}' from {}", model, model_dir.display()))?;
            Box::new(EngineSink::new(Arc::new(engine)))
        }
        (None, Some(url)) => {
            log::info!("Sending to {}", url);
            Box::new(HttpSink::new(
                url,
                Duration::from_secs(constants::DEFAULT_SINK_TIMEOUT_SECS),
            )?)
        }
        (None, None) => {
            log::info!("No TELEMETRY_SINK_URL set - logging messages only");
            Box::new(LogSink)
        }
    };

    let mut source = CsvSource::open(&args.csv)
        .with_context(|| format!("opening {}", args.csv.display()))?;

    let mut ingestor = ReplayIngestor::new(ColumnMapping::v1(), config);
    let handle = ingestor.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Ctrl-C received, stopping replay");
            handle.stop();
        }
    });

    let stats = ingestor.run(&mut source, sink.as_ref()).await?;
    log::info!(
        "Done: {} sent, {} duplicates skipped, {} rejected",
        stats.sent,
        stats.duplicates_skipped,
        stats.rejected
    );

    Ok(())
}
