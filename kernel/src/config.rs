//! Configuration for how scans collect and report metrics.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, Level};

use crate::metrics::{
    DefaultMetricsContext, LoggingMetricsReporter, MetricsContext, NoopMetricsContext,
};
use crate::{Error, KernelResult};

/// Property key that turns metrics collection on or off.
pub const METRICS_ENABLED: &str = "metrics.enabled";
/// Property key for the log level [`LoggingMetricsReporter`] reports at.
pub const METRICS_REPORT_LEVEL: &str = "metrics.report-level";
/// Property key that makes reported JSON indented.
pub const METRICS_PRETTY_PRINT: &str = "metrics.pretty-print";

/// Metrics settings, built fluently or parsed from string properties.
///
/// # Example
///
/// ```
/// # use scan_report_kernel::config::MetricsConfig;
/// let config = MetricsConfig::from_properties([
///     ("metrics.enabled", "false"),
///     ("metrics.report-level", "debug"),
/// ])
/// .unwrap();
/// assert!(!config.enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsConfig {
    enabled: bool,
    report_level: Level,
    pretty: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            report_level: Level::INFO,
            pretty: false,
        }
    }
}

impl MetricsConfig {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_report_level(mut self, report_level: Level) -> Self {
        self.report_level = report_level;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn report_level(&self) -> Level {
        self.report_level
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }

    /// Build a config from `(key, value)` properties, starting from the defaults. Keys other than
    /// the `metrics.*` keys defined in this module are ignored.
    pub fn from_properties<I, K, V>(properties: I) -> KernelResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in properties {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                METRICS_ENABLED => config.enabled = parse(key, value)?,
                METRICS_REPORT_LEVEL => config.report_level = parse(key, value)?,
                METRICS_PRETTY_PRINT => config.pretty = parse(key, value)?,
                _ => debug!("Ignoring unrelated property {key}"),
            }
        }
        Ok(config)
    }

    /// The context scans should create their metrics from.
    pub fn metrics_context(&self) -> Arc<dyn MetricsContext> {
        if self.enabled {
            Arc::new(DefaultMetricsContext::new())
        } else {
            Arc::new(NoopMetricsContext)
        }
    }

    /// A reporter that logs at the configured level and layout.
    pub fn reporter(&self) -> LoggingMetricsReporter {
        LoggingMetricsReporter::new(self.report_level).with_pretty(self.pretty)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> KernelResult<T> {
    value
        .trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| Error::generic(format!("Invalid value for {key}: {value}")))
}
