use clap::Parser;
use colstats::{CancellationSignal, ColumnReducer, Config, Error};
use std::path::PathBuf;
use tracing::{debug, error, trace, warn};

/// Compute statistics over a column of one or more CSV files
#[derive(Parser)]
#[command(name = "colstats", version)]
#[command(
    about = "Compute sum, average, min or max of a CSV column across many files",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging on stderr (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Operation to execute: sum, avg, min or max (default: sum)
    #[arg(long)]
    op: Option<String>,

    /// 1-based CSV column on which to execute the operation
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    col: i64,

    /// Number of concurrent workers (default: available CPUs)
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Path to configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// CSV files to process; each must start with a header row
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(mut config) => {
            config.merge_env_vars();
            config
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(cli.verbose, config.log_level.as_deref());

    debug!("colstats started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli, config).await {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8, configured: Option<&str>) {
    let filter = match (verbose, configured) {
        (0, Some(level)) => level,
        (0, None) => "warn",
        (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_thread_ids(verbose >= 3)
        .with_line_number(verbose >= 3)
        .init();
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    if cli.files.is_empty() {
        return Err(Error::NoFiles.into());
    }

    let operation = cli
        .op
        .or_else(|| config.operation.map(|op| op.to_string()))
        .unwrap_or_else(|| "sum".to_string());

    let pool = match cli.workers {
        Some(workers) => colstats::WorkerPool::new(workers),
        None => config.worker_pool(),
    };

    let cancel = CancellationSignal::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let reducer = ColumnReducer::parse(&operation, cli.col)?
        .with_pool(pool)
        .with_cancellation(cancel);

    debug!(
        "Computing {} of column {} with {} workers",
        reducer.operation(),
        reducer.column(),
        reducer.pool().size()
    );

    let mut stdout = std::io::stdout();
    reducer.run_to(&cli.files, &mut stdout).await?;

    Ok(())
}
