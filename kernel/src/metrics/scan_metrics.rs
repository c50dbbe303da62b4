//! The fixed set of metrics recorded while planning a scan, live and snapshotted.

use std::collections::BTreeMap;

use serde::ser::SerializeMap as _;
use serde::{Serialize, Serializer};
use serde_json::Value;
use strum::{AsRefStr, Display as StrumDisplay, EnumCount, EnumIter, EnumString, IntoEnumIterator};

use super::{
    Counter, CounterResult, MetricsContext, NoopMetricsContext, TimeUnit, Timer, TimerResult, Unit,
};
use crate::json::as_object;
use crate::KernelResult;

/// The metrics a scan records. Declaration order is the order they appear in on the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    EnumString,
    EnumCount,
    StrumDisplay,
    AsRefStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum ScanMetricName {
    TotalPlanningDuration,
    ResultDataFiles,
    ResultDeleteFiles,
    TotalDataManifests,
    TotalDeleteManifests,
    ScannedDataManifests,
    SkippedDataManifests,
    TotalFileSizeInBytes,
    TotalDeleteFileSizeInBytes,
}

/// Whether a metric is a timer or a counter, and in which unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Timer(TimeUnit),
    Counter(Unit),
}

impl ScanMetricName {
    pub fn kind(self) -> MetricKind {
        use ScanMetricName::*;
        match self {
            TotalPlanningDuration => MetricKind::Timer(TimeUnit::Nanoseconds),
            ResultDataFiles | ResultDeleteFiles | TotalDataManifests | TotalDeleteManifests
            | ScannedDataManifests | SkippedDataManifests => MetricKind::Counter(Unit::Count),
            TotalFileSizeInBytes | TotalDeleteFileSizeInBytes => MetricKind::Counter(Unit::Bytes),
        }
    }
}

/// Live handles for every [`ScanMetricName`], created from one [`MetricsContext`].
///
/// The scan engine updates these while it plans; [`ScanMetricsResult::from_scan_metrics`] takes
/// the snapshot that ends up in a [`ScanReport`](super::ScanReport).
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    total_planning_duration: Timer,
    result_data_files: Counter,
    result_delete_files: Counter,
    total_data_manifests: Counter,
    total_delete_manifests: Counter,
    scanned_data_manifests: Counter,
    skipped_data_manifests: Counter,
    total_file_size_in_bytes: Counter,
    total_delete_file_size_in_bytes: Counter,
}

impl ScanMetrics {
    pub fn new(context: &dyn MetricsContext) -> Self {
        use ScanMetricName::*;
        let counter = |name: ScanMetricName, unit| context.counter(name.as_ref(), unit);
        Self {
            total_planning_duration: context
                .timer(TotalPlanningDuration.as_ref(), TimeUnit::Nanoseconds),
            result_data_files: counter(ResultDataFiles, Unit::Count),
            result_delete_files: counter(ResultDeleteFiles, Unit::Count),
            total_data_manifests: counter(TotalDataManifests, Unit::Count),
            total_delete_manifests: counter(TotalDeleteManifests, Unit::Count),
            scanned_data_manifests: counter(ScannedDataManifests, Unit::Count),
            skipped_data_manifests: counter(SkippedDataManifests, Unit::Count),
            total_file_size_in_bytes: counter(TotalFileSizeInBytes, Unit::Bytes),
            total_delete_file_size_in_bytes: counter(TotalDeleteFileSizeInBytes, Unit::Bytes),
        }
    }

    /// Scan metrics that record nothing.
    pub fn noop() -> Self {
        Self::new(&NoopMetricsContext)
    }

    pub fn total_planning_duration(&self) -> &Timer {
        &self.total_planning_duration
    }

    pub fn result_data_files(&self) -> &Counter {
        &self.result_data_files
    }

    pub fn result_delete_files(&self) -> &Counter {
        &self.result_delete_files
    }

    pub fn total_data_manifests(&self) -> &Counter {
        &self.total_data_manifests
    }

    pub fn total_delete_manifests(&self) -> &Counter {
        &self.total_delete_manifests
    }

    pub fn scanned_data_manifests(&self) -> &Counter {
        &self.scanned_data_manifests
    }

    pub fn skipped_data_manifests(&self) -> &Counter {
        &self.skipped_data_manifests
    }

    pub fn total_file_size_in_bytes(&self) -> &Counter {
        &self.total_file_size_in_bytes
    }

    pub fn total_delete_file_size_in_bytes(&self) -> &Counter {
        &self.total_delete_file_size_in_bytes
    }

    fn counter(&self, name: ScanMetricName) -> Option<&Counter> {
        use ScanMetricName::*;
        match name {
            TotalPlanningDuration => None,
            ResultDataFiles => Some(&self.result_data_files),
            ResultDeleteFiles => Some(&self.result_delete_files),
            TotalDataManifests => Some(&self.total_data_manifests),
            TotalDeleteManifests => Some(&self.total_delete_manifests),
            ScannedDataManifests => Some(&self.scanned_data_manifests),
            SkippedDataManifests => Some(&self.skipped_data_manifests),
            TotalFileSizeInBytes => Some(&self.total_file_size_in_bytes),
            TotalDeleteFileSizeInBytes => Some(&self.total_delete_file_size_in_bytes),
        }
    }

    fn result(&self, name: ScanMetricName) -> Option<MetricResult> {
        match name.kind() {
            MetricKind::Timer(_) => self.total_planning_duration.result().map(MetricResult::Timer),
            MetricKind::Counter(_) => self
                .counter(name)
                .and_then(Counter::result)
                .map(MetricResult::Counter),
        }
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::noop()
    }
}

/// A snapshot of a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricResult {
    Counter(CounterResult),
    Timer(TimerResult),
}

impl Serialize for MetricResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetricResult::Counter(counter) => counter.serialize(serializer),
            MetricResult::Timer(timer) => timer.serialize(serializer),
        }
    }
}

/// An immutable snapshot of [`ScanMetrics`].
///
/// Only metrics that saw activity are present: a counter that was never incremented or a timer
/// with no samples is absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanMetricsResult {
    metrics: BTreeMap<ScanMetricName, MetricResult>,
}

impl ScanMetricsResult {
    /// Snapshot `scan_metrics`. Each accumulator is read independently, so metrics updated
    /// concurrently with the snapshot may be slightly skewed relative to each other.
    pub fn from_scan_metrics(scan_metrics: &ScanMetrics) -> Self {
        let metrics = ScanMetricName::iter()
            .filter_map(|name| Some((name, scan_metrics.result(name)?)))
            .collect();
        Self { metrics }
    }

    pub fn get(&self, name: ScanMetricName) -> Option<&MetricResult> {
        self.metrics.get(&name)
    }

    /// The recorded metrics, in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (ScanMetricName, &MetricResult)> + '_ {
        self.metrics.iter().map(|(name, result)| (*name, result))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    fn timer(&self, name: ScanMetricName) -> Option<&TimerResult> {
        match self.get(name)? {
            MetricResult::Timer(timer) => Some(timer),
            MetricResult::Counter(_) => None,
        }
    }

    fn counter(&self, name: ScanMetricName) -> Option<&CounterResult> {
        match self.get(name)? {
            MetricResult::Counter(counter) => Some(counter),
            MetricResult::Timer(_) => None,
        }
    }

    pub fn total_planning_duration(&self) -> Option<&TimerResult> {
        self.timer(ScanMetricName::TotalPlanningDuration)
    }

    pub fn result_data_files(&self) -> Option<&CounterResult> {
        self.counter(ScanMetricName::ResultDataFiles)
    }

    pub fn result_delete_files(&self) -> Option<&CounterResult> {
        self.counter(ScanMetricName::ResultDeleteFiles)
    }

    pub fn total_data_manifests(&self) -> Option<&CounterResult> {
        self.counter(ScanMetricName::TotalDataManifests)
    }

    pub fn total_delete_manifests(&self) -> Option<&CounterResult> {
        self.counter(ScanMetricName::TotalDeleteManifests)
    }

    pub fn scanned_data_manifests(&self) -> Option<&CounterResult> {
        self.counter(ScanMetricName::ScannedDataManifests)
    }

    pub fn skipped_data_manifests(&self) -> Option<&CounterResult> {
        self.counter(ScanMetricName::SkippedDataManifests)
    }

    pub fn total_file_size_in_bytes(&self) -> Option<&CounterResult> {
        self.counter(ScanMetricName::TotalFileSizeInBytes)
    }

    pub fn total_delete_file_size_in_bytes(&self) -> Option<&CounterResult> {
        self.counter(ScanMetricName::TotalDeleteFileSizeInBytes)
    }

    /// Decode the `metrics` wire object. Keys that are not a [`ScanMetricName`] are skipped.
    pub(crate) fn from_json(json: &Value) -> KernelResult<Self> {
        let node = as_object("scan metrics", json)?;
        let mut metrics = BTreeMap::new();
        for name in ScanMetricName::iter() {
            let result = match name.kind() {
                MetricKind::Timer(_) => {
                    TimerResult::from_json_field(name.as_ref(), node)?.map(MetricResult::Timer)
                }
                MetricKind::Counter(_) => {
                    CounterResult::from_json_field(name.as_ref(), node)?.map(MetricResult::Counter)
                }
            };
            if let Some(result) = result {
                metrics.insert(name, result);
            }
        }
        Ok(Self { metrics })
    }
}

impl Serialize for ScanMetricsResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.metrics.len()))?;
        for (name, result) in &self.metrics {
            map.serialize_entry(name.as_ref(), result)?;
        }
        map.end()
    }
}
