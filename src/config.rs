//! Server configuration.
//!
//! Values come from command-line flags, which fall back to `ACCELERATOR_*`
//! environment variables and then to the defaults below.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Where the entity store lives and how long to wait on a locked file.
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    #[arg(long = "database", env = "ACCELERATOR_DATABASE")]
    pub database: Option<PathBuf>,

    /// How long a write waits on a database locked by another process
    #[arg(long, env = "ACCELERATOR_BUSY_TIMEOUT_MS", default_value_t = DEFAULT_BUSY_TIMEOUT_MS)]
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// The configured path, or the platform data directory.
    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => default_database_path(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "ACCELERATOR_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port for HTTP API
    #[arg(short, long, env = "ACCELERATOR_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Allowed CORS origins, comma-separated. Any origin is allowed when unset.
    #[arg(long, env = "ACCELERATOR_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    #[command(flatten)]
    pub store: StoreConfig,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Defaults overridden by `ACCELERATOR_*` variables, for runs without
    /// explicit flags.
    pub fn from_env() -> Self {
        #[derive(clap::Parser)]
        struct EnvOnly {
            #[command(flatten)]
            server: ServerConfig,
        }

        <EnvOnly as clap::Parser>::parse_from(["accelerator"]).server
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            cors_origins: None,
            store: StoreConfig::default(),
        }
    }
}

pub fn default_database_path() -> anyhow::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "accelerator")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("accelerator.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Probe {
        #[command(flatten)]
        server: ServerConfig,
    }

    #[test]
    fn defaults_bind_localhost_3000() {
        let config = ServerConfig::default();
        assert_eq!(config.addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.store.busy_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn flags_override_defaults() {
        let probe = Probe::parse_from([
            "probe",
            "--port",
            "8080",
            "--database",
            "/tmp/lib.db",
            "--cors-origins",
            "http://a.test,http://b.test",
        ]);
        assert_eq!(probe.server.port, 8080);
        assert_eq!(
            probe.server.store.database_path().unwrap(),
            PathBuf::from("/tmp/lib.db")
        );
        assert_eq!(
            probe.server.cors_origins,
            Some(vec!["http://a.test".to_string(), "http://b.test".to_string()])
        );
    }
}
