use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_BRANCH: &str = "main";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:11434/api/generate";
const DEFAULT_MODEL: &str = "qwen2.5-coder:7b";
const DEFAULT_REST_PORT: u16 = 4311;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// Branch watched on origin (default: "main").
    branch: Option<String>,
    /// Seconds between upstream polls (default: 60).
    poll_interval_secs: Option<u64>,
    /// Inference backend generate endpoint (default: local Ollama).
    backend_url: Option<String>,
    /// Model identifier sent with every review request.
    model: Option<String>,
    /// Port for the health HTTP endpoint (default: 4311).
    rest_port: Option<u16>,
    /// Bind address for the health endpoint (default: "127.0.0.1").
    bind_address: Option<String>,
    /// Directory for review reports (default: `{data_dir}/reports`).
    reports_dir: Option<PathBuf>,
    /// Log level filter string, e.g. "debug", "info,reviewd=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured for log aggregators).
    log_format: Option<String>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

// ─── WatchConfig ──────────────────────────────────────────────────────────────

/// Immutable daemon configuration, built once at startup and shared by
/// reference. The watched repository path is the only required input;
/// the process refuses to start without it.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Local clone of the repository under watch. Destructively synced,
    /// so this must be a dedicated automation clone.
    pub repo_path: PathBuf,
    /// Branch watched on origin (REVIEWD_BRANCH env var, default: "main").
    pub branch: String,
    /// Seconds between upstream polls (REVIEWD_POLL_INTERVAL env var, default: 60).
    pub poll_interval_secs: u64,
    /// Inference backend generate endpoint (REVIEWD_OLLAMA_URL env var).
    pub backend_url: String,
    /// Model identifier sent with every review request (REVIEWD_MODEL env var).
    pub model: String,
    /// Port for the health HTTP endpoint.
    pub rest_port: u16,
    /// Bind address for the health endpoint (default: "127.0.0.1").
    pub bind_address: String,
    /// Data directory holding config.toml and the default reports dir.
    pub data_dir: PathBuf,
    /// Directory review reports are written to, created on demand.
    pub reports_dir: PathBuf,
    /// Log level filter (REVIEWD_LOG env var, default: "info").
    pub log: String,
    /// Log output format: "pretty" | "json" (REVIEWD_LOG_FORMAT env var).
    pub log_format: String,
}

impl WatchConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(
        repo_path: PathBuf,
        branch: Option<String>,
        poll_interval_secs: Option<u64>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let branch = branch
            .or(toml.branch)
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        let poll_interval_secs = poll_interval_secs
            .or(toml.poll_interval_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let backend_url = std::env::var("REVIEWD_OLLAMA_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.backend_url)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let model = std::env::var("REVIEWD_MODEL")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let rest_port = std::env::var("REVIEWD_REST_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(toml.rest_port)
            .unwrap_or(DEFAULT_REST_PORT);

        let bind_address = std::env::var("REVIEWD_BIND")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let log_format = std::env::var("REVIEWD_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let reports_dir = toml
            .reports_dir
            .unwrap_or_else(|| data_dir.join("reports"));

        Self {
            repo_path,
            branch,
            poll_interval_secs,
            backend_url,
            model,
            rest_port,
            bind_address,
            data_dir,
            reports_dir,
            log,
            log_format,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/reviewd
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("reviewd");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/reviewd or ~/.local/share/reviewd
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("reviewd");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("reviewd");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\reviewd
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("reviewd");
        }
    }
    // Fallback
    PathBuf::from(".reviewd")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            r#"
branch = "develop"
poll_interval_secs = 15
rest_port = 9000
"#,
        )
        .unwrap();

        let cfg = WatchConfig::new(
            PathBuf::from("/tmp/repo"),
            None,
            None,
            Some(dir.path().to_path_buf()),
            None,
        );
        assert_eq!(cfg.branch, "develop");
        assert_eq!(cfg.poll_interval_secs, 15);
        assert_eq!(cfg.rest_port, 9000);
        assert_eq!(cfg.reports_dir, dir.path().join("reports"));
    }

    #[test]
    fn cli_beats_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "branch = \"develop\"\n").unwrap();

        let cfg = WatchConfig::new(
            PathBuf::from("/tmp/repo"),
            Some("release".to_string()),
            None,
            Some(dir.path().to_path_buf()),
            None,
        );
        assert_eq!(cfg.branch, "release");
    }

    #[test]
    fn defaults_without_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = WatchConfig::new(
            PathBuf::from("/tmp/repo"),
            None,
            None,
            Some(dir.path().to_path_buf()),
            None,
        );
        assert_eq!(cfg.branch, "main");
        assert_eq!(cfg.poll_interval_secs, 60);
        assert_eq!(cfg.log, "info");
        assert_eq!(cfg.bind_address, "127.0.0.1");
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "branch = [not toml").unwrap();

        let cfg = WatchConfig::new(
            PathBuf::from("/tmp/repo"),
            None,
            None,
            Some(dir.path().to_path_buf()),
            None,
        );
        assert_eq!(cfg.branch, "main");
    }
}
