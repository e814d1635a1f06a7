//! Configuration system for the `todos` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/todos/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use todos_proto::UserId;
use url::Url;

use crate::dispatch::DEFAULT_CHANNEL_CAPACITY;
use crate::engine::notify::{DEFAULT_DELAY, NotifyMode, Notifier};

/// Owner used when none is configured.
pub const DEFAULT_USER_ID: UserId = UserId::new(1096);

/// Backend used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Event loop poll timeout when none is configured.
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Backlog size for the queued notification mode when none is configured.
const DEFAULT_NOTIFY_BACKLOG: usize = 4;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The API URL does not parse.
    #[error("invalid API URL {url:?}: {source}")]
    InvalidUrl {
        /// Value as configured.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },

    /// `notify_mode` is neither `single` nor `queued`.
    #[error("unknown notify_mode {0:?} (expected \"single\" or \"queued\")")]
    UnknownNotifyMode(String),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    api: ApiFileConfig,
    ui: UiFileConfig,
    runtime: RuntimeFileConfig,
}

/// `[api]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ApiFileConfig {
    url: Option<String>,
    user_id: Option<u64>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    notification_delay_ms: Option<u64>,
    notify_mode: Option<String>,
    notify_backlog: Option<usize>,
}

/// `[runtime]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct RuntimeFileConfig {
    channel_capacity: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- API --
    /// Base URL of the task backend.
    pub api_url: Url,
    /// Owner whose tasks are listed and created.
    pub user_id: UserId,
    /// Use the in-memory demo store instead of the backend.
    pub demo: bool,

    // -- UI --
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// Delay before a signalled notification is shown again.
    pub notification_delay: Duration,
    /// How overlapping notifications share the banner.
    pub notify_mode: NotifyMode,

    // -- Runtime --
    /// Channel capacity for dispatcher command/outcome channels.
    pub channel_capacity: usize,
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path
    /// (`~/.config/todos/config.toml`) is tried and silently ignored if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed, or if a configured value is invalid.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file)
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default. This is separated from `load()` to
    /// enable unit testing without CLI parsing.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Result<Self, ConfigError> {
        let raw_url = cli
            .api_url
            .as_deref()
            .or(file.api.url.as_deref())
            .unwrap_or(DEFAULT_API_URL);
        let api_url = Url::parse(raw_url).map_err(|source| ConfigError::InvalidUrl {
            url: raw_url.to_string(),
            source,
        })?;

        let backlog = file.ui.notify_backlog.unwrap_or(DEFAULT_NOTIFY_BACKLOG);
        let notify_mode = match file.ui.notify_mode.as_deref() {
            None | Some("single") => NotifyMode::SingleSlot,
            Some("queued") => NotifyMode::Queued { capacity: backlog },
            Some(other) => return Err(ConfigError::UnknownNotifyMode(other.to_string())),
        };

        Ok(Self {
            api_url,
            user_id: cli
                .user_id
                .or(file.api.user_id)
                .map_or(DEFAULT_USER_ID, UserId::new),
            demo: cli.demo,
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(DEFAULT_POLL_TIMEOUT, Duration::from_millis),
            notification_delay: file
                .ui
                .notification_delay_ms
                .map_or(DEFAULT_DELAY, Duration::from_millis),
            notify_mode,
            channel_capacity: file
                .runtime
                .channel_capacity
                .unwrap_or(DEFAULT_CHANNEL_CAPACITY),
        })
    }
}

impl ClientConfig {
    /// Notification banner configured with this delay and mode.
    #[must_use]
    pub const fn notifier(&self) -> Notifier {
        Notifier::new(self.notification_delay, self.notify_mode)
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Terminal to-do list client")]
pub struct CliArgs {
    /// Base URL of the task backend.
    #[arg(long, env = "TODOS_API_URL")]
    pub api_url: Option<String>,

    /// Owner whose tasks are shown.
    #[arg(long, env = "TODOS_USER_ID")]
    pub user_id: Option<u64>,

    /// Path to config file (default: `~/.config/todos/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run against an in-memory store seeded with sample tasks.
    #[arg(long)]
    pub demo: bool,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TODOS_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/todos.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("todos").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
