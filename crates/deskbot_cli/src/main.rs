//! Deskbot CLI
//!
//! Runs the limbic system against the wall clock for a fixed number of
//! heartbeat ticks, optionally poking the bot every few ticks, and prints the
//! final snapshot as JSON.

use anyhow::Context;
use clap::Parser;
use deskbot_core::{BotSnapshot, DeskbotConfig};
use deskbot_expression::Expression;
use deskbot_limbic::{
    Clock, HeartbeatConfig, InteractionKind, LimbicSystem, StateChange, StateDriver, Stimulus,
    SystemClock,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "deskbot.toml")]
    config: PathBuf,

    /// Seed for the random generator (reproducible runs)
    #[arg(long, env = "DESKBOT_SEED")]
    seed: Option<u64>,

    /// Number of heartbeat ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Heartbeat interval in milliseconds (overrides the config)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Simulate a user interaction every N ticks
    #[arg(long)]
    interact_every: Option<u64>,

    /// Pretend it is 23:00 regardless of the wall clock
    #[arg(long)]
    night: bool,

    /// Resume from a snapshot file and write the final snapshot back to it
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Print every accepted state change as a JSON line
    #[arg(long)]
    print_changes: bool,

    /// Log as JSON
    #[arg(long)]
    log_json: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// System clock with the hour pinned, for trying out night behaviour by day.
#[derive(Debug, Clone)]
struct PinnedHourClock {
    inner: SystemClock,
    hour: f32,
}

impl Clock for PinnedHourClock {
    fn elapsed(&self) -> Duration {
        self.inner.elapsed()
    }

    fn hour_of_day(&self) -> f32 {
        self.hour
    }
}

const NIGHT_HOUR: f32 = 23.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_logging(&args)?;

    let config = load_config(&args)?;
    info!(
        "Starting deskbot: {} ticks at {}ms, seed={:?}",
        args.ticks, config.heartbeat.tick_ms, config.driver.seed
    );

    let snapshot = if args.night {
        let clock = PinnedHourClock {
            inner: SystemClock::new(),
            hour: NIGHT_HOUR,
        };
        run(&args, &config, clock).await?
    } else {
        run(&args, &config, SystemClock::new()).await?
    };

    let json = snapshot.to_json().context("Failed to serialize snapshot")?;
    if let Some(path) = &args.state_file {
        std::fs::write(path, &json)
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
        info!("Saved snapshot to {}", path.display());
    }
    println!("{}", json);
    Ok(())
}

fn init_logging(args: &Args) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = match args.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let stderr_layer = if args.log_json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_target(true).with_writer(std::io::stderr).boxed()
    };

    let (file_layer, guard) = match &args.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "deskbot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(guard)
}

fn load_config(args: &Args) -> anyhow::Result<DeskbotConfig> {
    let mut config = if args.config.exists() {
        DeskbotConfig::load(&args.config)?
    } else {
        DeskbotConfig::load_or_default(&args.config)
    };
    if args.seed.is_some() {
        config.driver.seed = args.seed;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.heartbeat.tick_ms = tick_ms;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_state(path: &Path) -> anyhow::Result<Option<BotSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot = BotSnapshot::from_json(&json)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
    Ok(Some(snapshot))
}

async fn run<C: Clock + 'static>(
    args: &Args,
    config: &DeskbotConfig,
    clock: C,
) -> anyhow::Result<BotSnapshot> {
    let mut driver = StateDriver::new(config, clock);
    if let Some(path) = &args.state_file {
        if let Some(snapshot) = load_state(path)? {
            driver.restore(&snapshot);
        }
    }

    let heartbeat = HeartbeatConfig::from_settings(&config.heartbeat);
    let tick = heartbeat.interval;
    let limbic = LimbicSystem::spawn(heartbeat, driver);

    let watcher = tokio::spawn(watch_changes(limbic.subscribe_changes(), args.print_changes));

    let mut interval = tokio::time::interval(tick);
    for n in 1..=args.ticks {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted after {} ticks", n - 1);
                break;
            }
        }
        if args.interact_every.is_some_and(|every| every > 0 && n % every == 0) {
            limbic
                .send(Stimulus::Interaction(InteractionKind::Plain))
                .await?;
        }
    }

    let snapshot = limbic.shutdown().await?;
    // Change channel closed with the heartbeat; the watcher drains and ends
    if let Err(e) = watcher.await {
        warn!("Change watcher failed: {}", e);
    }
    Ok(snapshot)
}

/// Log every accepted change with the mood indicator colour, optionally
/// printing it as a JSON line.
async fn watch_changes(mut rx: broadcast::Receiver<StateChange>, print: bool) {
    loop {
        let change = match rx.recv().await {
            Ok(change) => change,
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!("Change watcher fell behind, {} changes dropped", missed);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        let expression = Expression::for_state(change.to);
        info!(
            "Mood: {} ({}) after {:.1}s",
            expression.mood.label,
            expression.mood.color.to_hex(),
            change.at.as_secs_f32()
        );
        if print {
            match serde_json::to_string(&change) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize state change: {}", e),
            }
        }
    }
}
