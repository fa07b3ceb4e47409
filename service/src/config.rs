use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use events::error::{self, Error};
use log::LevelFilter;
use std::time::Duration;

/// Default realtime stream endpoint used when `REALTIME_URL` is not set.
pub const DEFAULT_REALTIME_URL: &str = "https://realtime.www.linkedin.com/realtime/connect";

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The `li_at` session cookie of an already logged in user.
    #[arg(long, env = "LI_AT", hide_env_values = true)]
    li_at: Option<String>,

    /// The `JSESSIONID` cookie of the same session. Also used as the CSRF token.
    #[arg(long, env = "JSESSIONID", hide_env_values = true)]
    jsessionid: Option<String>,

    /// The realtime event stream endpoint.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_REALTIME_URL)]
    realtime_url: String,

    /// Timeout in seconds for the stream endpoint to answer
    #[arg(long, env, default_value_t = 120)]
    pub connect_timeout_secs: u64,

    /// Seconds without a line from the stream before the connection is dropped
    #[arg(long, env, default_value_t = 120)]
    pub idle_timeout_secs: u64,

    /// Delay in milliseconds before the first reconnect after a failure
    #[arg(long, env, default_value_t = 1000)]
    pub backoff_initial_ms: u64,

    /// Upper bound in seconds on the reconnect delay
    #[arg(long, env, default_value_t = 60)]
    pub backoff_max_secs: u64,

    /// Consecutive failed connections tolerated before the listener gives up (0 = never)
    #[arg(long, env, default_value_t = 0)]
    pub max_consecutive_failures: u32,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap_or(LevelFilter::Info)),
        )]
    pub log_level_filter: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn li_at(&self) -> Result<&str, Error> {
        non_empty(self.li_at.as_deref()).ok_or_else(|| error::config_error("No li_at cookie provided"))
    }

    pub fn jsessionid(&self) -> Result<&str, Error> {
        non_empty(self.jsessionid.as_deref())
            .ok_or_else(|| error::config_error("No JSESSIONID cookie provided"))
    }

    pub fn set_session_cookies(mut self, li_at: String, jsessionid: String) -> Self {
        self.li_at = Some(li_at);
        self.jsessionid = Some(jsessionid);
        self
    }

    pub fn realtime_url(&self) -> &str {
        &self.realtime_url
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn backoff_initial_delay(&self) -> Duration {
        Duration::from_millis(self.backoff_initial_ms)
    }

    pub fn backoff_max_delay(&self) -> Duration {
        Duration::from_secs(self.backoff_max_secs)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use events::StreamErrorKind;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("linkedin_messaging_rs").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults_match_the_web_client() {
        let config = parse(&["--li-at", "token", "--jsessionid", "\"ajax:1\""]);

        assert_eq!(config.realtime_url(), DEFAULT_REALTIME_URL);
        assert_eq!(config.connect_timeout(), Duration::from_secs(120));
        assert_eq!(config.idle_timeout(), Duration::from_secs(120));
        assert_eq!(config.backoff_initial_delay(), Duration::from_secs(1));
        assert_eq!(config.backoff_max_delay(), Duration::from_secs(60));
        assert_eq!(config.max_consecutive_failures, 0);
        assert_eq!(config.log_level_filter, LevelFilter::Info);
        assert_eq!(config.li_at().unwrap(), "token");
        assert_eq!(config.jsessionid().unwrap(), "\"ajax:1\"");
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--li-at",
            "token",
            "--jsessionid",
            "ajax:1",
            "--realtime-url",
            "http://127.0.0.1:9000/realtime/connect",
            "--idle-timeout-secs",
            "30",
            "--backoff-initial-ms",
            "250",
            "--max-consecutive-failures",
            "5",
            "--log-level-filter",
            "DEBUG",
        ]);

        assert_eq!(config.realtime_url(), "http://127.0.0.1:9000/realtime/connect");
        assert_eq!(config.idle_timeout(), Duration::from_secs(30));
        assert_eq!(config.backoff_initial_delay(), Duration::from_millis(250));
        assert_eq!(config.max_consecutive_failures, 5);
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
    }

    #[test]
    fn missing_cookies_are_config_errors() {
        let config = parse(&["--jsessionid", ""]);

        let err = config.li_at().unwrap_err();
        assert_eq!(err.error_kind, StreamErrorKind::Config);
        assert!(err.to_string().contains("li_at"));
        assert!(config.jsessionid().is_err());

        let config = config.set_session_cookies("token".to_string(), "ajax:1".to_string());
        assert_eq!(config.li_at().unwrap(), "token");
        assert_eq!(config.jsessionid().unwrap(), "ajax:1");
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let result = Config::try_parse_from(["linkedin_messaging_rs", "--log-level-filter", "LOUD"]);
        assert!(result.is_err());
    }
}
