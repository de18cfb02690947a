use anyhow::{ensure, Result};
use clap::Parser;
use reviewd::{config::WatchConfig, rest, watcher::Watcher, AppContext};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "reviewd",
    about = "reviewd — commit-watching AI code review daemon",
    version
)]
struct Args {
    /// Path to the repository clone under watch. Required — the daemon
    /// refuses to start without it. Destructively synced, so point this
    /// at a dedicated automation clone, not a developer workspace.
    #[arg(long, env = "REVIEWD_REPO")]
    repo: std::path::PathBuf,

    /// Branch watched on origin (default: main)
    #[arg(long, env = "REVIEWD_BRANCH")]
    branch: Option<String>,

    /// Seconds between upstream polls (default: 60)
    #[arg(long, env = "REVIEWD_POLL_INTERVAL")]
    poll_interval: Option<u64>,

    /// Data directory for config.toml and the reports directory
    #[arg(long, env = "REVIEWD_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "REVIEWD_LOG")]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Arc::new(WatchConfig::new(
        args.repo,
        args.branch,
        args.poll_interval,
        args.data_dir,
        args.log,
    ));
    init_tracing(&config);

    ensure!(
        config.repo_path.join(".git").exists(),
        "{} is not a git repository clone",
        config.repo_path.display()
    );

    info!(
        target = %config.repo_path.display(),
        branch = %config.branch,
        backend = %config.backend_url,
        model = %config.model,
        "starting reviewd"
    );

    let ctx = Arc::new(AppContext {
        config: Arc::clone(&config),
        started_at: std::time::Instant::now(),
    });

    let watcher = Watcher::new(Arc::clone(&config))?;
    let watcher_handle = watcher.spawn();

    // Serves until the process is killed; the watcher loop runs alongside.
    let result = rest::start_rest_server(ctx).await;
    watcher_handle.abort();
    result
}

fn init_tracing(config: &WatchConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log).unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).compact().init();
    }
}
