//! Server configuration from command-line flags and `WAYFARE_*` environment variables.

use std::{path::PathBuf, time::Duration};

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "wayfare-server")]
#[command(about = "Real-time chat and shared expense ledger server", long_about = None)]
pub struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "WAYFARE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "WAYFARE_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Number of messages returned by getMessages when no limit is given
    #[arg(long, env = "WAYFARE_MESSAGE_LIMIT", default_value_t = 100)]
    pub message_limit: usize,

    /// Lifetime of a typing indicator without refresh (milliseconds)
    #[arg(long, env = "WAYFARE_TYPING_TTL_MS", default_value_t = 3000)]
    pub typing_ttl_ms: u64,

    /// Interval of the typing expiry sweep (milliseconds)
    #[arg(long, env = "WAYFARE_TYPING_SWEEP_MS", default_value_t = 1000)]
    pub typing_sweep_ms: u64,

    /// Drop a connection that sends nothing for this long (seconds)
    #[arg(
        long,
        env = "WAYFARE_IDLE_TIMEOUT_SECS",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub idle_timeout_secs: u64,

    /// Interval between server pings (seconds)
    #[arg(long, env = "WAYFARE_PING_INTERVAL_SECS", default_value_t = 20)]
    pub ping_interval_secs: u64,

    /// JSON file with user profiles for the in-memory directory
    #[arg(long, env = "WAYFARE_USERS_FILE")]
    pub users_file: Option<PathBuf>,

    /// Base URL of the HTTP user directory; takes precedence over --users-file
    #[arg(long, env = "WAYFARE_USER_DIRECTORY_URL")]
    pub user_directory_url: Option<String>,
}

/// Where display names come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectorySource {
    Empty,
    File(PathBuf),
    Http(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub message_limit: usize,
    pub typing_ttl: Duration,
    pub typing_sweep_interval: Duration,
    pub idle_timeout: Duration,
    pub ping_interval: Duration,
    pub directory: DirectorySource,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Typing ttl as the tracker's millisecond count
    pub fn typing_ttl_ms(&self) -> i64 {
        i64::try_from(self.typing_ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            message_limit: 100,
            typing_ttl: Duration::from_millis(3000),
            typing_sweep_interval: Duration::from_millis(1000),
            idle_timeout: Duration::from_secs(60),
            ping_interval: Duration::from_secs(20),
            directory: DirectorySource::Empty,
        }
    }
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        let directory = match (args.user_directory_url, args.users_file) {
            (Some(url), _) => DirectorySource::Http(url),
            (None, Some(path)) => DirectorySource::File(path),
            (None, None) => DirectorySource::Empty,
        };

        Self {
            host: args.host,
            port: args.port,
            message_limit: args.message_limit,
            typing_ttl: Duration::from_millis(args.typing_ttl_ms),
            // a zero interval would make tokio's interval panic
            typing_sweep_interval: Duration::from_millis(args.typing_sweep_ms.max(1)),
            idle_timeout: Duration::from_secs(args.idle_timeout_secs.max(1)),
            ping_interval: Duration::from_secs(args.ping_interval_secs.max(1)),
            directory,
        }
    }
}
