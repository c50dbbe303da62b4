//! The immutable [`ScanReport`] and its builder.

use tracing::debug;

use super::{ScanMetrics, ScanMetricsResult};
use crate::expressions::Expression;
use crate::schema::Schema;
use crate::{Error, KernelResult};

/// What one scan of a table read and how long it took to plan.
///
/// Reports are only constructed through [`ScanReport::builder`] and cannot be changed afterwards.
/// They own all their data, so they can be shared freely between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    table_name: String,
    snapshot_id: i64,
    filter: Expression,
    projection: Schema,
    scan_metrics: ScanMetricsResult,
}

impl ScanReport {
    pub fn builder() -> ScanReportBuilder {
        ScanReportBuilder::default()
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn snapshot_id(&self) -> i64 {
        self.snapshot_id
    }

    pub fn filter(&self) -> &Expression {
        &self.filter
    }

    pub fn projection(&self) -> &Schema {
        &self.projection
    }

    pub fn scan_metrics(&self) -> &ScanMetricsResult {
        &self.scan_metrics
    }
}

/// Builder for [`ScanReport`].
///
/// `table_name` and `snapshot_id` are required. The filter defaults to
/// [`Expression::always_true`], the projection to an empty [`Schema`], and the metrics to an empty
/// [`ScanMetricsResult`].
///
/// # Example
///
/// ```
/// # use scan_report_kernel::metrics::{DefaultMetricsContext, ScanMetrics, ScanReport, TimeUnit};
/// # fn example() -> scan_report_kernel::KernelResult<()> {
/// let context = DefaultMetricsContext::new();
/// let scan_metrics = ScanMetrics::new(&context);
/// scan_metrics.total_planning_duration().record(12, TimeUnit::Milliseconds);
/// scan_metrics.result_data_files().increment(3);
///
/// let report = ScanReport::builder()
///     .with_table_name("db.events")
///     .with_snapshot_id(42)
///     .from_scan_metrics(&scan_metrics)
///     .build()?;
/// assert_eq!(report.scan_metrics().len(), 2);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct ScanReportBuilder {
    table_name: Option<String>,
    snapshot_id: Option<i64>,
    filter: Option<Expression>,
    projection: Option<Schema>,
    scan_metrics: Option<ScanMetricsResult>,
}

impl ScanReportBuilder {
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn with_snapshot_id(mut self, snapshot_id: i64) -> Self {
        self.snapshot_id = Some(snapshot_id);
        self
    }

    pub fn with_filter(mut self, filter: Expression) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_projection(mut self, projection: Schema) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Snapshot `scan_metrics` now. Later updates to the live metrics do not affect the report.
    pub fn from_scan_metrics(self, scan_metrics: &ScanMetrics) -> Self {
        self.with_scan_metrics_result(ScanMetricsResult::from_scan_metrics(scan_metrics))
    }

    pub fn with_scan_metrics_result(mut self, scan_metrics: ScanMetricsResult) -> Self {
        self.scan_metrics = Some(scan_metrics);
        self
    }

    /// Create the [`ScanReport`], failing if a required attribute was never set.
    pub fn build(self) -> KernelResult<ScanReport> {
        let (table_name, snapshot_id) = match (self.table_name, self.snapshot_id) {
            (Some(table_name), Some(snapshot_id)) => (table_name, snapshot_id),
            (table_name, snapshot_id) => {
                let missing = [
                    table_name.is_none().then_some("tableName"),
                    snapshot_id.is_none().then_some("snapshotId"),
                ];
                let missing: Vec<_> = missing.into_iter().flatten().collect();
                return Err(Error::MissingAttributes(missing.join(", ")));
            }
        };
        if table_name.is_empty() {
            return Err(Error::generic("Invalid table name: (empty)"));
        }
        let report = ScanReport {
            table_name,
            snapshot_id,
            filter: self.filter.unwrap_or_default(),
            projection: self.projection.unwrap_or_default(),
            scan_metrics: self.scan_metrics.unwrap_or_default(),
        };
        debug!(
            "Built scan report for {} at snapshot {} with {} metrics",
            report.table_name,
            report.snapshot_id,
            report.scan_metrics.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{DefaultMetricsContext, TimeUnit};
    use crate::schema::{NestedField, PrimitiveType};

    #[test]
    fn build_requires_table_name_and_snapshot_id() {
        let err = ScanReport::builder().build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot build ScanReport, some of required attributes are not set [tableName, snapshotId]"
        );

        let err = ScanReport::builder()
            .with_table_name("t")
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot build ScanReport, some of required attributes are not set [snapshotId]"
        );

        let err = ScanReport::builder()
            .with_snapshot_id(1)
            .build()
            .unwrap_err();
        assert!(err.to_string().ends_with("[tableName]"));
    }

    #[test]
    fn build_rejects_empty_table_name() {
        let err = ScanReport::builder()
            .with_table_name("")
            .with_snapshot_id(1)
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid table name: (empty)");
    }

    #[test]
    fn optional_attributes_default() {
        let report = ScanReport::builder()
            .with_table_name("t")
            .with_snapshot_id(-1)
            .build()
            .unwrap();
        assert_eq!(report.table_name(), "t");
        assert_eq!(report.snapshot_id(), -1);
        assert_eq!(report.filter(), &Expression::always_true());
        assert_eq!(report.projection(), &Schema::default());
        assert!(report.scan_metrics().is_empty());
    }

    #[test]
    fn report_is_detached_from_live_metrics() {
        let context = DefaultMetricsContext::new();
        let metrics = ScanMetrics::new(&context);
        metrics.total_planning_duration().record(1, TimeUnit::Seconds);
        let projection = Schema::new([NestedField::required(1, "c1", PrimitiveType::String)]);
        let report = ScanReport::builder()
            .with_table_name("t")
            .with_snapshot_id(23)
            .with_filter(Expression::is_null("c1"))
            .with_projection(projection.clone())
            .from_scan_metrics(&metrics)
            .build()
            .unwrap();

        metrics.total_planning_duration().record(1, TimeUnit::Seconds);
        assert_eq!(
            report
                .scan_metrics()
                .total_planning_duration()
                .map(|t| t.count()),
            Some(1)
        );
        assert_eq!(report.projection(), &projection);
        assert_eq!(report.filter(), &Expression::is_null("c1"));
    }
}
