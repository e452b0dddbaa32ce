//! Command line and environment configuration.
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "typhoon-server", version)]
#[command(about = "HTTP API for the Typhoon Night disaster-preparedness game")]
pub struct Config {
    /// Address to bind
    #[arg(long, env = "TYPHOON_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// TCP port to listen on
    #[arg(long, env = "TYPHOON_PORT", default_value_t = 8787)]
    pub port: u16,

    /// Choice catalog JSON to load instead of the embedded one
    #[arg(long, env = "TYPHOON_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Narration service endpoint; offline narration is used when unset
    #[arg(long, env = "TYPHOON_NARRATION_URL")]
    pub narration_url: Option<String>,

    /// Bearer token sent to the narration service
    #[arg(long, env = "TYPHOON_NARRATION_API_KEY", hide_env_values = true)]
    pub narration_api_key: Option<String>,

    /// Give up on narration after this many milliseconds
    #[arg(long, env = "TYPHOON_NARRATION_TIMEOUT_MS", default_value_t = 4000)]
    pub narration_timeout_ms: u64,
}

impl Config {
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub const fn narration_timeout(&self) -> Duration {
        Duration::from_millis(self.narration_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8787,
            catalog: None,
            narration_url: None,
            narration_api_key: None,
            narration_timeout_ms: 4000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "typhoon-server",
            "--port",
            "9000",
            "--narration-url",
            "http://localhost:5000/narrate",
            "--narration-timeout-ms",
            "250",
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.narration_timeout(), Duration::from_millis(250));
        assert_eq!(
            config.narration_url.as_deref(),
            Some("http://localhost:5000/narrate")
        );
        assert!(config.catalog.is_none());
    }

    #[test]
    fn default_matches_parser_defaults() {
        let parsed = Config::try_parse_from(["typhoon-server"]).unwrap();
        let fallback = Config::default();
        assert_eq!(parsed.host, fallback.host);
        assert_eq!(parsed.narration_timeout_ms, fallback.narration_timeout_ms);
    }
}
