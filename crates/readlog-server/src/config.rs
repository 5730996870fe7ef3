use std::time::Duration;

use crate::error::Result;
pub use clap::Parser;
use readlog_types::config::BackendConfig;

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about = "Server tracking reading progress of books")]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "READLOG_LISTEN_PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "READLOG_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[command(flatten)]
    pub backend: BackendConfig,

    #[arg(
        long,
        env = "READLOG_TOKEN_VALIDITY",
        default_value = "1 day",
        help = "Default token validity in human friendly format (e.g. 1d, 1h, 1m, 1s - or combined)",
        value_parser = humantime::parse_duration
    )]
    pub token_validity: Duration,

    #[arg(long, env = "READLOG_CORS", help = "Enable permissive CORS")]
    pub cors: bool,
}

impl ServerConfig {
    pub fn load() -> Result<Self> {
        ServerConfig::try_parse().map_err(|e| e.into())
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.listen_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::try_parse_from(["readlog-server", "--data-dir", "/tmp/rl"]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.token_validity, Duration::from_secs(24 * 3600));
        assert_eq!(config.base_url(), "http://127.0.0.1:3000");
        assert!(!config.cors);
    }

    #[test]
    fn test_config_token_validity() {
        let config = ServerConfig::try_parse_from([
            "readlog-server",
            "--token-validity",
            "1h 30m",
            "--port",
            "8080",
        ])
        .unwrap();
        assert_eq!(config.token_validity, Duration::from_secs(5400));
        assert_eq!(config.port, 8080);
    }
}
