//! Tracing subscriber setup
//!
//! Logs go to stderr so the report printed on stdout stays clean.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Filter directives in order of precedence: `--verbose`, then `RUST_LOG`,
/// then the configured level.
fn filter_directives(config: &LoggingConfig, verbose: bool, rust_log: Option<&str>) -> String {
    if verbose {
        return "outfitai=debug,warn".to_string();
    }
    match rust_log.map(str::trim) {
        Some(directives) if !directives.is_empty() => directives.to_string(),
        _ => format!("outfitai={},warn", config.level),
    }
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::try_new(filter_directives(config, verbose, rust_log.as_deref()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };

    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_overrides_rust_log() {
        let config = LoggingConfig::default();
        assert_eq!(
            filter_directives(&config, true, Some("outfitai=error")),
            "outfitai=debug,warn"
        );
    }

    #[test]
    fn test_rust_log_overrides_config_level() {
        let config = LoggingConfig::default();
        assert_eq!(
            filter_directives(&config, false, Some("outfitai=trace")),
            "outfitai=trace"
        );
    }

    #[test]
    fn test_config_level_is_the_fallback() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(filter_directives(&config, false, None), "outfitai=warn,warn");
        assert_eq!(filter_directives(&config, false, Some("  ")), "outfitai=warn,warn");
    }
}
