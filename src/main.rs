use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use dripwatch::{
    init_logging, load_drip_log, log_status, replay, App, DripSource, FileSource, Settings,
    StreamSource,
};
use dripwatch_sdk::{ManualClock, Output, Reporter, Session, Status, SystemClock, Timestamp};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "dripwatch")]
#[command(about = "Drip-counting IV infusion monitor")]
#[command(group(ArgGroup::new("mode").required(true).args(["replay", "follow", "stdin"])))]
struct Args {
    /// Settings file (defaults to ./dripwatch.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bag volume in millilitres
    #[arg(long)]
    volume: Option<f64>,

    /// Giving set calibration in drops per millilitre
    #[arg(long)]
    factor: Option<f64>,

    /// Report interval (e.g., "1s", "500ms")
    #[arg(short, long)]
    refresh: Option<String>,

    /// Rewrite this file with the status JSON on every report
    #[arg(long)]
    status_out: Option<PathBuf>,

    /// Evaluate a complete drip log and print the status JSON
    #[arg(long, conflicts_with_all = ["follow", "stdin"])]
    replay: Option<PathBuf>,

    /// Evaluate the replay at this time in seconds (default: the last drip)
    #[arg(long, requires = "replay")]
    at: Option<f64>,

    /// Tail a drip log written as Unix-time seconds
    #[arg(short, long, conflicts_with_all = ["replay", "stdin"])]
    follow: Option<PathBuf>,

    /// Count one drip per line read from stdin
    #[arg(long, conflicts_with_all = ["replay", "follow"])]
    stdin: bool,
}

impl Args {
    /// Command-line values win over the settings file and environment.
    fn apply(&self, settings: &mut Settings) {
        if let Some(volume) = self.volume {
            settings.infusion.volume_ml = volume;
        }
        if let Some(factor) = self.factor {
            settings.infusion.dripping_factor = factor;
        }
        if let Some(ref refresh) = self.refresh {
            settings.report.interval = refresh.clone();
        }
        if let Some(ref path) = self.status_out {
            settings.report.status_file = Some(path.clone());
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(run(args));

    // A pending stdin read cannot be cancelled; don't wait for it
    rt.shutdown_background();
    result
}

async fn run(args: Args) -> Result<()> {
    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);
    init_logging(&settings.log)?;

    let calibration = settings.calibration()?;
    let session = Session::with_calibration(calibration);
    info!(
        total_volume_ml = calibration.total_volume_ml(),
        dripping_factor = calibration.dripping_factor(),
        "Monitoring infusion"
    );

    // Handle replay mode (non-interactive)
    if let Some(ref path) = args.replay {
        let at = args
            .at
            .map(|secs| {
                Timestamp::from_secs_f64(secs)
                    .with_context(|| format!("Invalid evaluation time: {}", secs))
            })
            .transpose()?;
        return run_replay(&session, path, at, &settings).await;
    }

    if let Some(ref path) = args.follow {
        let source = Box::new(FileSource::new(path));
        return run_live(session, source, &settings).await;
    }

    let source = Box::new(StreamSource::spawn(
        tokio::io::stdin(),
        Arc::new(SystemClock),
        "stdin",
    ));
    run_live(session, source, &settings).await
}

/// Feed a recorded drip log through a fresh session and print the result
async fn run_replay(
    session: &Session,
    path: &Path,
    at: Option<Timestamp>,
    settings: &Settings,
) -> Result<()> {
    let drips = load_drip_log(path)?;
    let total = replay(session, &drips)?;
    info!(path = %path.display(), total_drips = total, "Drip log replayed");

    let at = at
        .or_else(|| drips.iter().copied().max())
        .unwrap_or(Timestamp::ZERO);

    let mut builder = Reporter::builder().clock(ManualClock::new(at));
    if let Some(ref status_file) = settings.report.status_file {
        builder = builder.output(Output::file(status_file));
    }
    let status = builder.build(session.clone()).emit_now().await;

    print_status(&status)
}

/// Record drips from `source` until it closes or Ctrl-C, reporting as we go
async fn run_live(
    session: Session,
    source: Box<dyn DripSource>,
    settings: &Settings,
) -> Result<()> {
    let interval = settings.report_interval()?;
    let mut app = App::new(session.clone(), source);
    info!(source = %app.source_description(), ?interval, "Watching for drips");

    let mut builder = Reporter::builder().interval(interval);
    if let Some(ref status_file) = settings.report.status_file {
        builder = builder.output(Output::file(status_file));
    }
    let reporter = builder.build(session);
    let emission = settings.report.status_file.is_some().then(|| reporter.start());

    let mut ticker = tokio::time::interval(interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if app.pump() > 0 {
                    log_status(&reporter.collect());
                }
                if app.source_closed() {
                    info!("Drip source closed");
                    break;
                }
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                info!("Shutting down");
                break;
            }
        }
    }

    if let Some(handle) = emission {
        handle.stop();
    }
    if app.rejected() > 0 {
        warn!(rejected = app.rejected(), "Drips dropped while no infusion was configured");
    }

    // Final report goes to the status file as well
    let status = reporter.emit_now().await;
    print_status(&status)
}

fn print_status(status: &Status) -> Result<()> {
    let json = serde_json::to_string_pretty(status)?;
    println!("{}", json);
    Ok(())
}
