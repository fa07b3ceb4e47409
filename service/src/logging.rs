use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{ConfigBuilder, TermLogger};

/// Modules to filter out from logging when not in Trace mode.
/// These are the HTTP and TLS stack underneath the event stream, which log
/// every connection attempt and frame read.
const FILTERED_MODULES: &[&str] = &["reqwest", "hyper", "hyper_util", "rustls", "h2", "tokio_util"];

pub struct Logger {}

impl Logger {
    /// Installs a terminal logger at the configured level.
    ///
    /// Dependency logs are filtered out below Trace. Fails if a global logger
    /// has already been installed.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let level = config.log_level_filter;

        TermLogger::init(
            level,
            Self::build_log_config(Self::ignored_modules(level)),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
    }

    /// Only Trace shows dependency logs.
    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    /// Module prefixes whose records are dropped at `level`.
    fn ignored_modules(level: LevelFilter) -> &'static [&'static str] {
        if Self::should_filter_dependencies(level) {
            FILTERED_MODULES
        } else {
            &[]
        }
    }

    fn build_log_config(ignored: &[&'static str]) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();
        for &module in ignored {
            builder.add_filter_ignore_str(module);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_stack_is_filtered() {
        for module in ["reqwest", "hyper", "hyper_util", "rustls", "h2", "tokio_util"] {
            assert!(
                FILTERED_MODULES.contains(&module),
                "{module} should be filtered"
            );
        }
    }

    #[test]
    fn test_workspace_crates_are_never_filtered() {
        for module in ["sse", "events", "entity", "service", "linkedin_messaging_rs"] {
            assert!(
                !FILTERED_MODULES.contains(&module),
                "{module} should not be filtered"
            );
        }
    }

    #[test]
    fn test_only_trace_disables_filtering() {
        assert!(!Logger::should_filter_dependencies(LevelFilter::Trace));
        for level in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ] {
            assert!(
                Logger::should_filter_dependencies(level),
                "{level} should filter dependencies"
            );
        }
    }

    #[test]
    fn test_ignored_modules_follow_the_level() {
        assert_eq!(Logger::ignored_modules(LevelFilter::Info), FILTERED_MODULES);
        assert_eq!(Logger::ignored_modules(LevelFilter::Off), FILTERED_MODULES);
        assert!(Logger::ignored_modules(LevelFilter::Trace).is_empty());
    }
}
