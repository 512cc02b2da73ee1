//! Start-up configuration.
//!
//! Everything comes from the command line, with environment fallbacks for the
//! settings people tend to pin per machine.

use std::time::Duration;

use clap::Parser;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9997";

#[derive(Debug, Clone, Parser)]
#[command(name = "bin-console")]
#[command(version)]
#[command(about = "Desktop console for request bins", long_about = None)]
pub struct Config {
    /// Base URL of the request-bin backend
    #[arg(long, env = "BIN_CONSOLE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Seconds between automatic refreshes of the bin list
    #[arg(long, env = "BIN_CONSOLE_REFRESH_SECS", default_value_t = 30)]
    refresh_secs: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Base URL without a trailing slash, ready for path concatenation.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_secs: 30,
            timeout_secs: 10,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        let config =
            Config::try_parse_from(["bin-console", "--base-url", "http://bins.local:8080/"])
                .unwrap();
        assert_eq!(config.base_url(), "http://bins.local:8080");
    }

    #[test]
    fn refresh_interval_never_zero() {
        let config = Config::try_parse_from(["bin-console", "--refresh-secs", "0"]).unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
    }

    #[test]
    fn defaults_match_backend_port() {
        let config = Config::default();
        assert_eq!(config.base_url(), "http://localhost:9997");
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert!(!config.verbose);
    }
}
