//! aisubscalp: discover, classify, verify and store free-access AI tool promos.
//! One-shot scans, a periodic runner, exports, and a read-only HTTP API.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aisubscalp::api::{self, AppState};
use aisubscalp::config::{config_dir_or_default, load_config, ENV_CONFIG_DIR};
use aisubscalp::export::{to_flat_records, write_export, ExportFormat};
use aisubscalp::ingest::scheduler::{run_periodic, SchedulerCfg};
use aisubscalp::metrics::Metrics;
use aisubscalp::{DealStore, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "aisubscalp", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Directory holding keywords.toml and sources.toml
    #[arg(long, global = true, env = ENV_CONFIG_DIR)]
    config_dir: Option<PathBuf>,
    /// SQLite database file
    #[arg(long, global = true, env = "AISUBSCALP_DB", default_value = "data/aisubscalp.db")]
    db_path: PathBuf,
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "AISUBSCALP_LOG_JSON")]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one discovery scan and store the results
    Scan {
        /// Also write this run's deals to a file
        #[arg(long)]
        export: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },
    /// Export every stored deal
    Export {
        #[arg(long)]
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },
    /// Scan repeatedly
    Run {
        /// Minutes between scan starts
        #[arg(long, default_value_t = 360, value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
    /// Serve the read-only deals API and /metrics
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
}

fn init_tracing(verbose: bool, json: bool) {
    let fallback = if verbose {
        "aisubscalp=debug,warn"
    } else {
        "aisubscalp=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer().compact()))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env in local/dev; absent file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.global.verbose, cli.global.log_json);

    match cli.cmd {
        Command::Scan { export, format } => scan(&cli.global, export.as_deref(), format).await,
        Command::Export { output, format } => {
            let store = DealStore::open(&cli.global.db_path)?;
            let deals = store.fetch_all()?;
            write_export(&to_flat_records(&deals), &output, format)
        }
        Command::Run { interval } => {
            let cfg = SchedulerCfg::every_minutes(interval);
            tracing::info!(interval_minutes = interval, "starting periodic scans");
            run_periodic(cfg, || scan(&cli.global, None, ExportFormat::Json)).await;
            Ok(())
        }
        Command::Serve { addr } => serve(&cli.global.db_path, addr).await,
    }
}

async fn scan(opts: &GlobalOpts, export: Option<&Path>, format: ExportFormat) -> Result<()> {
    let dir = config_dir_or_default(opts.config_dir.as_deref());
    let config = load_config(&dir)?;
    let pipeline = Pipeline::from_config(config)?;
    let mut store = DealStore::open(&opts.db_path)
        .with_context(|| format!("opening {}", opts.db_path.display()))?;

    let outcome = pipeline.run_once(&mut store).await?;
    let r = outcome.report;
    tracing::info!(
        discovered = r.discovered,
        accepted = r.accepted,
        unique = r.unique,
        verified = r.verified,
        stored = r.stored,
        "scan finished"
    );

    if let Some(path) = export {
        write_export(&to_flat_records(&outcome.deals), path, format)?;
    }
    Ok(())
}

async fn serve(db_path: &Path, addr: SocketAddr) -> Result<()> {
    let metrics = Metrics::init()?;
    let store =
        DealStore::open(db_path).with_context(|| format!("opening {}", db_path.display()))?;
    let app = api::router(AppState::new(store)).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "serving deals API");
    axum::serve(listener, app).await.context("http server")?;
    Ok(())
}
