//! Scan Report Kernel
//!
//! This crate captures performance telemetry for a single scan of a table and converts it to and
//! from a strictly validated JSON document.
//!
//! The pieces, from the bottom up:
//!
//! - [`metrics::MetricsContext`] hands out named [`metrics::Counter`]s and [`metrics::Timer`]s.
//!   [`metrics::DefaultMetricsContext`] backs them with atomics so scan threads can update them
//!   concurrently; [`metrics::NoopMetricsContext`] drops every update.
//! - [`metrics::ScanMetrics`] is the fixed set of counters and timers a scan records, and
//!   [`metrics::ScanMetricsResult`] is an immutable snapshot of it.
//! - [`metrics::ScanReport`] combines that snapshot with the identity of the scan: table name,
//!   snapshot id, [filter](expressions::Expression) and [projection](schema::Schema).
//! - [`metrics::scan_report_parser`] encodes reports as JSON and decodes them again, failing with
//!   fixed, documented messages on malformed input.
//!
//! Scan engines that want to publish reports implement [`metrics::MetricsReporter`], or use
//! [`metrics::LoggingMetricsReporter`] configured through [`config::MetricsConfig`].

pub mod config;
pub mod error;
pub mod expressions;
pub mod metrics;
pub mod schema;

pub(crate) mod json;

pub use error::{Error, KernelResult};
pub use json::IndentedFormatter;
