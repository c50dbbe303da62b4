//! Metrics collection for table scans.
//!
//! A scan engine obtains a [`MetricsContext`] and creates a [`ScanMetrics`] from it. While the scan
//! is planned the engine increments the counters and records into the timer; when planning is done
//! it builds a [`ScanReport`], which snapshots the metrics into an immutable
//! [`ScanMetricsResult`]. Reports are handed to a [`MetricsReporter`] and converted to and from
//! JSON with [`scan_report_parser`].
//!
//! Telemetry can be switched off by creating the metrics from a [`NoopMetricsContext`] (or with
//! [`ScanMetrics::noop`]): every update is then dropped and the report carries no metrics.
//!
//! # Example: Reporting a scan
//!
//! ```
//! use scan_report_kernel::expressions::Expression;
//! use scan_report_kernel::metrics::{
//!     scan_report_parser, DefaultMetricsContext, ScanMetrics, ScanReport, TimeUnit,
//! };
//! use scan_report_kernel::schema::{NestedField, PrimitiveType, Schema};
//!
//! let context = DefaultMetricsContext::new();
//! let scan_metrics = ScanMetrics::new(&context);
//! scan_metrics.total_planning_duration().time(|| {
//!     // plan the scan
//!     scan_metrics.scanned_data_manifests().increment(2);
//!     scan_metrics.result_data_files().increment(7);
//! });
//! scan_metrics.total_planning_duration().record(3, TimeUnit::Milliseconds);
//!
//! let report = ScanReport::builder()
//!     .with_table_name("db.events")
//!     .with_snapshot_id(23)
//!     .with_filter(Expression::greater_than("id", 100))
//!     .with_projection(Schema::new([NestedField::required(1, "id", PrimitiveType::Long)]))
//!     .from_scan_metrics(&scan_metrics)
//!     .build()
//!     .unwrap();
//!
//! let json = scan_report_parser::to_json(&report).unwrap();
//! assert_eq!(scan_report_parser::from_json(&json).unwrap(), report);
//! ```
//!
//! # Example: Implementing a Custom MetricsReporter
//!
//! ```
//! use scan_report_kernel::metrics::{MetricsReporter, ScanReport};
//!
//! #[derive(Debug)]
//! struct PrintingReporter;
//!
//! impl MetricsReporter for PrintingReporter {
//!     fn report(&self, report: &ScanReport) {
//!         if let Some(files) = report.scan_metrics().result_data_files() {
//!             println!("{} planned {} data files", report.table_name(), files.value());
//!         }
//!     }
//! }
//! ```

mod context;
mod counter;
mod reporter;
mod scan_metrics;
mod scan_report;
pub mod scan_report_parser;
mod timer;

pub use context::{DefaultMetricsContext, MetricsContext, NoopMetricsContext};
pub use counter::{Counter, CounterResult, Unit};
pub use reporter::{LoggingMetricsReporter, MetricsReporter};
pub use scan_metrics::{MetricKind, MetricResult, ScanMetricName, ScanMetrics, ScanMetricsResult};
pub use scan_report::{ScanReport, ScanReportBuilder};
pub use timer::{TimeUnit, Timed, Timer, TimerResult};

pub(crate) use timer::TimerState;
