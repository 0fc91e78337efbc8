use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use relwatch::checker::checkers_from_config;
use relwatch::config::{self, DEFAULT_WATCH_INTERVAL_SECS, MonitorConfig, load_projects};
use relwatch::cycle::runner::CycleRunner;
use relwatch::notify::LogSink;
use relwatch::project::Project;
use relwatch::store::SqliteStore;

#[derive(Parser)]
#[command(name = "relwatch")]
#[command(version, about = "Watches hosted software projects for new releases")]
struct Cli {
    /// Log level filter, e.g. "info" or "relwatch=debug"
    #[arg(long, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single checking cycle and exit
    Check {
        /// Projects file (JSON)
        #[arg(long)]
        projects: PathBuf,
        /// Monitor configuration file (JSON); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Release database path; defaults to the data directory
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Run checking cycles on an interval until interrupted
    Watch {
        /// Projects file (JSON)
        #[arg(long)]
        projects: PathBuf,
        /// Monitor configuration file (JSON); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,
        /// Release database path; defaults to the data directory
        #[arg(long)]
        db: Option<PathBuf>,
        /// Seconds between cycles
        #[arg(long, default_value_t = DEFAULT_WATCH_INTERVAL_SECS)]
        interval_secs: u64,
    },
    /// Print the releases recorded so far for the configured projects
    Releases {
        /// Projects file (JSON)
        #[arg(long)]
        projects: PathBuf,
        /// Release database path; defaults to the data directory
        #[arg(long)]
        db: Option<PathBuf>,
        /// Emit one JSON object per release instead of plain lines
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(&cli.log);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command))
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Check {
            projects,
            config,
            db,
        } => run_check(&projects, config.as_deref(), db).await,
        Command::Watch {
            projects,
            config,
            db,
            interval_secs,
        } => run_watch(&projects, config.as_deref(), db, interval_secs).await,
        Command::Releases { projects, db, json } => run_releases(&projects, db, json),
    }
}

async fn run_check(
    projects_path: &Path,
    config_path: Option<&Path>,
    db: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (runner, projects) = setup(projects_path, config_path, db)?;
    let report = runner.run_cycle(&projects).await;

    for (identifier, outcome) in &report.outcomes {
        println!("{identifier}: {outcome}");
    }
    println!("{}", report.summary());

    if report.has_failures() {
        anyhow::bail!("{} project checks failed", report.failure_count());
    }
    Ok(())
}

async fn run_watch(
    projects_path: &Path,
    config_path: Option<&Path>,
    db: Option<PathBuf>,
    interval_secs: u64,
) -> anyhow::Result<()> {
    let (runner, projects) = setup(projects_path, config_path, db)?;

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    info!(
        "Watching {} projects every {} seconds",
        projects.len(),
        interval_secs
    );

    loop {
        // Wait for the next tick, bailing out on ctrl-c in between cycles
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
        }

        // A cycle in flight is dropped on ctrl-c; projects whose persist
        // step has not started yet are simply left for a later run
        tokio::select! {
            report = runner.run_cycle(&projects) => {
                if report.has_failures() {
                    warn!("Cycle had {} failures", report.failure_count());
                }
                let totals = runner.metrics().snapshot();
                debug!(
                    "Totals since start: {} checks, {} new releases, {} transient failures, {} permanent failures, {} store errors",
                    totals.checks_attempted,
                    totals.new_releases,
                    totals.transient_failures,
                    totals.permanent_failures,
                    totals.store_errors
                );
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted mid-cycle, shutting down");
                break;
            }
        }
    }

    Ok(())
}

fn run_releases(projects_path: &Path, db: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let projects = load_projects(projects_path)
        .with_context(|| format!("loading projects from {}", projects_path.display()))?;
    let store = open_store(db)?;

    for project in &projects {
        let releases = store.stored_releases(&project.identifier)?;
        if json {
            for release in &releases {
                println!("{}", serde_json::to_string(release)?);
            }
            continue;
        }

        println!(
            "{} ({}): {} known releases",
            project.name,
            project.identifier,
            releases.len()
        );
        for release in &releases {
            match &release.published_at {
                Some(at) => println!("  {} ({})", release.version, at.format("%Y-%m-%d")),
                None => println!("  {}", release.version),
            }
        }
    }

    Ok(())
}

fn setup(
    projects_path: &Path,
    config_path: Option<&Path>,
    db: Option<PathBuf>,
) -> anyhow::Result<(CycleRunner<SqliteStore>, Vec<Project>)> {
    let config = match config_path {
        Some(path) => MonitorConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => MonitorConfig::default(),
    };
    let projects = load_projects(projects_path)
        .with_context(|| format!("loading projects from {}", projects_path.display()))?;

    let store = Arc::new(open_store(db)?);
    let checkers = checkers_from_config(&config.hosts);
    let runner = CycleRunner::new(checkers, store, Arc::new(LogSink), &config.cycle);

    Ok((runner, projects))
}

fn open_store(db: Option<PathBuf>) -> anyhow::Result<SqliteStore> {
    let db_path = match db {
        Some(path) => path,
        None => {
            let data_dir = config::data_dir();
            std::fs::create_dir_all(&data_dir)
                .with_context(|| format!("creating data directory {}", data_dir.display()))?;
            config::db_path()
        }
    };

    Ok(SqliteStore::new(&db_path)?)
}

/// Logs go to stderr and, when the data directory is writable, to a JSON
/// file next to the database. The guard must stay alive for the file
/// writer to flush.
fn init_tracing(filter: &str) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let stderr_layer = fmt::layer().compact().with_writer(std::io::stderr);

    let log_file = config::log_path();
    let log_dir = log_file.parent().unwrap_or(Path::new("."));
    if std::fs::create_dir_all(log_dir).is_err() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return None;
    }

    let file_name = log_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "relwatch.log".to_string());
    let appender = tracing_appender::rolling::never(log_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(fmt::layer().json().with_writer(writer))
        .init();

    Some(guard)
}
