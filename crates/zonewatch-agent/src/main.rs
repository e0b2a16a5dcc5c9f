//! # zonewatch
//!
//! Long-running residency tracker. Loads settings and the zone catalog,
//! opens the database, and polls the AIS position window until interrupted.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use zonewatch_core::{PlanarContainment, ZoneCatalog};
use zonewatch_engine::{CycleConfig, DriverConfig, PollDriver, SqlitePositionSource};
use zonewatch_settings::ZonewatchSettings;
use zonewatch_store::{ConnectionConfig, ResidencyStore};

/// How long shutdown waits for an abandoned cycle before exiting anyway.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Track vessel residency in maritime zones.
#[derive(Parser, Debug)]
#[command(name = "zonewatch", about = "Track vessel residency in maritime zones")]
struct Cli {
    /// Settings file (defaults to `~/.zonewatch/settings.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// `SQLite` database path (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// GeoJSON zone catalog (overrides settings).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Run a single cycle and exit.
    #[arg(long)]
    once: bool,

    /// Log filter, e.g. `info` or `zonewatch_engine=debug` (overrides settings).
    #[arg(long)]
    log_level: Option<String>,
}

/// Load settings and apply CLI overrides on top.
fn resolve_settings(cli: &Cli) -> Result<ZonewatchSettings> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(zonewatch_settings::settings_path);
    let mut settings = zonewatch_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;

    if let Some(ref db_path) = cli.db_path {
        settings.store.db_path.clone_from(db_path);
    }
    if let Some(ref catalog) = cli.catalog {
        settings.catalog.path.clone_from(catalog);
    }
    if let Some(ref level) = cli.log_level {
        settings.logging.level.clone_from(level);
    }
    if cli.once {
        settings.poll.max_cycles = Some(1);
    }
    Ok(settings)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Open the pool, migrate, and optionally enforce open-row uniqueness.
fn open_store(settings: &ZonewatchSettings) -> Result<ResidencyStore> {
    let db_path = &settings.store.db_path;
    ensure_parent_dir(db_path)?;
    let config = ConnectionConfig {
        pool_size: settings.store.pool_size,
        busy_timeout_ms: settings.store.busy_timeout_ms,
        ..ConnectionConfig::default()
    };
    let pool = zonewatch_store::sqlite::new_file(db_path, &config)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    let store = ResidencyStore::new(pool);
    let _ = store.migrate().context("Failed to run migrations")?;
    if settings.store.enforce_open_uniqueness {
        store
            .ensure_open_uniqueness_index()
            .context("Failed to create open residency uniqueness index")?;
    }
    Ok(store)
}

fn cycle_config(settings: &ZonewatchSettings) -> Result<CycleConfig> {
    let secs = settings.tracker.tss_dwell_limit_secs;
    let tss_dwell_limit = i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .with_context(|| format!("tracker.tssDwellLimitSecs out of range: {secs}"))?;
    Ok(CycleConfig {
        chunk_size: settings.commit.chunk_size,
        tss_dwell_limit,
        screen_with_region: settings.source.screen_with_region,
    })
}

fn lookback(settings: &ZonewatchSettings) -> Result<chrono::Duration> {
    let hours = settings.source.lookback_hours;
    i64::try_from(hours)
        .ok()
        .and_then(chrono::Duration::try_hours)
        .with_context(|| format!("source.lookbackHours out of range: {hours}"))
}

fn driver_config(settings: &ZonewatchSettings) -> DriverConfig {
    DriverConfig {
        poll_interval: Duration::from_millis(settings.poll.interval_ms),
        error_delay: Duration::from_millis(settings.poll.error_delay_ms),
        max_cycles: settings.poll.max_cycles,
    }
}

fn build_driver(
    settings: &ZonewatchSettings,
) -> Result<PollDriver<SqlitePositionSource, ResidencyStore, PlanarContainment>> {
    let catalog = ZoneCatalog::load(&settings.catalog.path).context("Failed to load zone catalog")?;
    let store = open_store(settings)?;

    for (zone_id, open) in store
        .open_counts_by_zone()
        .context("Failed to count open residencies")?
    {
        let name = catalog.get(zone_id).map_or("unknown zone", |z| z.name.as_str());
        info!(%zone_id, zone = name, open, "open residencies at startup");
    }

    let source = SqlitePositionSource::new(store.clone(), lookback(settings)?);
    Ok(PollDriver::new(
        source,
        store,
        catalog,
        PlanarContainment,
        cycle_config(settings)?,
        driver_config(settings),
    ))
}

async fn run(settings: ZonewatchSettings) -> Result<()> {
    info!(
        db = %settings.store.db_path.display(),
        catalog = %settings.catalog.path.display(),
        "zonewatch starting"
    );
    let driver = Arc::new(build_driver(&settings)?);

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    let _signal = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("interrupt received, shutting down"),
            Err(e) => warn!(error = %e, "failed to listen for interrupt"),
        }
        signal_token.cancel();
    });

    let summary = driver.run(cancel).await;
    info!(
        cycles = summary.cycles,
        failed = summary.failed,
        interrupted = summary.interrupted,
        "zonewatch stopped"
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    zonewatch_core::logging::init_subscriber(&settings.logging.level, settings.logging.format);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;
    let result = runtime.block_on(run(settings));
    // An interrupted cycle may still be blocked on the store.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
