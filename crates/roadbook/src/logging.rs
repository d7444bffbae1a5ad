//! Tracing setup for the `roadbook` binary.
//!
//! Diagnostics go to stderr so that `--format json` output on stdout can be
//! piped. The level comes from the `-v`/`-q` flags unless `ROADBOOK_LOG` (or
//! failing that `RUST_LOG`) holds a filter directive.

use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "ROADBOOK_LOG";

/// Crates whose events are shown by default.
const LOG_TARGETS: [&str; 2] = ["roadbook", "roadbook_core"];

/// How much the CLI reports while it works.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// Errors only (`-q`).
    Quiet,
    /// Warnings, such as a failed delivery listing or an unusual status change.
    #[default]
    Normal,
    /// Store and service activity (`-v`).
    Verbose,
    /// Per-record normalization detail (`-vv`).
    Trace,
}

impl Verbosity {
    /// Map the CLI flags onto a verbosity. `quiet` wins over any `-v`.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// The level applied to roadbook's own crates.
    #[must_use]
    pub fn level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::ERROR,
            Self::Normal => LevelFilter::WARN,
            Self::Verbose => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    /// Filter directive enabling [`Self::level`] for roadbook crates only.
    #[must_use]
    pub fn directive(self) -> String {
        let level = self.level();
        LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Build the event filter.
///
/// A parseable `custom` directive replaces the flag-derived one; an empty or
/// malformed one is ignored.
#[must_use]
pub fn build_filter(verbosity: Verbosity, custom: Option<&str>) -> EnvFilter {
    custom
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity.directive()))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(verbosity: Verbosity) {
    let custom = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
        .ok();
    let filter = build_filter(verbosity, custom.as_deref());

    // Module paths only help once debug output is on.
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity >= Verbosity::Verbose)
        .without_time()
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}

/// Route warnings from code under test through the test harness output.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(1, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(5, false), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(2, true), Verbosity::Quiet);
    }

    #[test]
    fn test_normal_shows_warnings() {
        assert_eq!(Verbosity::default().level(), LevelFilter::WARN);
        assert_eq!(Verbosity::Quiet.level(), LevelFilter::ERROR);
    }

    #[test]
    fn test_directive_names_both_crates() {
        assert_eq!(
            Verbosity::Verbose.directive(),
            "roadbook=debug,roadbook_core=debug"
        );
    }

    #[test]
    fn test_custom_directive_replaces_flags() {
        let filter = build_filter(Verbosity::Quiet, Some("roadbook_core=trace"));
        let shown = filter.to_string();
        assert!(shown.contains("roadbook_core=trace"), "{shown}");
        assert!(!shown.contains("error"), "{shown}");
    }

    #[test]
    fn test_blank_custom_directive_is_ignored() {
        for custom in [None, Some(""), Some("   ")] {
            let filter = build_filter(Verbosity::Verbose, custom);
            assert!(filter.to_string().contains("roadbook=debug"), "{custom:?}");
        }
    }
}
