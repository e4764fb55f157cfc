use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds. Covers sampling, OCR and analysis.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// YAML pipeline configuration; stage defaults when unset.
    #[serde(default)]
    pub pipeline_config: Option<PathBuf>,

    /// Directory under which per-request upload areas are created.
    /// The system temp directory when unset.
    #[serde(default)]
    pub upload_root: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            pipeline_config: None,
            upload_root: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server.{toml,yaml}` file
    /// and `VIDCRED_SERVER__*` environment variables, in that order.
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }

        let builder = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(
                config::Environment::with_prefix("VIDCRED_SERVER")
                    .prefix_separator("__")
                    .separator("__"),
            );

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_max_body_size_mb() -> usize {
    512
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.timeout_secs, 300);
        assert_eq!(cfg.max_body_size(), 512 * 1024 * 1024);
        assert!(cfg.enable_cors);
        assert!(cfg.metrics_enabled);
        assert!(cfg.pipeline_config.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_bad_bind_addr() {
        let cfg = ServerConfig {
            bind_addr: "not an address".into(),
            ..Default::default()
        };
        assert!(cfg.socket_addr().is_err());
    }

    #[test]
    fn test_partial_file_config() {
        let cfg: ServerConfig = serde_json::from_str(
            r#"{"port": 9000, "upload_root": "/srv/uploads", "enable_cors": false}"#,
        )
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert!(!cfg.enable_cors);
        assert_eq!(cfg.upload_root, Some(PathBuf::from("/srv/uploads")));
        assert_eq!(cfg.log_level, "info");
    }
}
