//! Metrics reporter trait and implementations.

use tracing::{event, warn, Level, Span};

use super::{scan_report_parser, ScanReport};

/// Trait for publishing finished [`ScanReport`]s.
///
/// Implementations receive each report once its scan has been planned and can forward it to
/// monitoring systems, log pipelines, or test harnesses.
pub trait MetricsReporter: Send + Sync + std::fmt::Debug {
    /// Report a finished scan.
    fn report(&self, report: &ScanReport);
}

/// A metrics reporter that logs each report as JSON at the specified level
#[derive(Debug, Clone)]
pub struct LoggingMetricsReporter {
    level: Level,
    pretty: bool,
}

impl LoggingMetricsReporter {
    pub fn new(level: Level) -> Self {
        LoggingMetricsReporter {
            level,
            pretty: false,
        }
    }

    /// Log reports indented over several lines instead of on a single line.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for LoggingMetricsReporter {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl MetricsReporter for LoggingMetricsReporter {
    fn report(&self, report: &ScanReport) {
        let encoded = if self.pretty {
            scan_report_parser::to_json_pretty(report)
        } else {
            scan_report_parser::to_json(report)
        };
        let json = match encoded {
            Ok(json) => json,
            Err(err) => {
                warn!("Failed to encode scan report for {}: {err}", report.table_name());
                return;
            }
        };
        // event! wants a constant level, hence the match. The parent span is cleared so the log
        // line carries just the report and not the context of whatever span produced it.
        match self.level {
            Level::ERROR => event!(parent: Span::none(), Level::ERROR, "{}", json),
            Level::WARN => event!(parent: Span::none(), Level::WARN, "{}", json),
            Level::INFO => event!(parent: Span::none(), Level::INFO, "{}", json),
            Level::DEBUG => event!(parent: Span::none(), Level::DEBUG, "{}", json),
            Level::TRACE => event!(parent: Span::none(), Level::TRACE, "{}", json),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::metrics::{DefaultMetricsContext, ScanMetrics};

    /// Collects reported table names, the way an engine-side reporter would forward them.
    #[derive(Debug, Default)]
    struct CollectingReporter {
        tables: Mutex<Vec<String>>,
    }

    impl MetricsReporter for CollectingReporter {
        fn report(&self, report: &ScanReport) {
            self.tables
                .lock()
                .unwrap()
                .push(report.table_name().to_string());
        }
    }

    fn report(table: &str) -> ScanReport {
        let context = DefaultMetricsContext::new();
        let metrics = ScanMetrics::new(&context);
        metrics.result_data_files().increment(1);
        ScanReport::builder()
            .with_table_name(table)
            .with_snapshot_id(1)
            .from_scan_metrics(&metrics)
            .build()
            .unwrap()
    }

    #[test]
    fn reporters_are_object_safe() {
        let collecting = Arc::new(CollectingReporter::default());
        let reporters: Vec<Arc<dyn MetricsReporter>> = vec![
            collecting.clone(),
            Arc::new(LoggingMetricsReporter::new(Level::DEBUG)),
        ];
        for table in ["a", "b"] {
            let report = report(table);
            reporters.iter().for_each(|r| r.report(&report));
        }
        assert_eq!(*collecting.tables.lock().unwrap(), ["a", "b"]);
    }

    #[test_log::test]
    fn logging_reporter_logs_at_every_level() {
        let report = report("logged");
        for level in [
            Level::ERROR,
            Level::WARN,
            Level::INFO,
            Level::DEBUG,
            Level::TRACE,
        ] {
            LoggingMetricsReporter::new(level)
                .with_pretty(true)
                .report(&report);
        }
        assert_eq!(LoggingMetricsReporter::default().level(), Level::INFO);
    }
}
