//! Encoding and decoding [`ScanReport`]s as JSON.
//!
//! The wire form is an object with, in this order, `table-name`, `snapshot-id`, `filter`,
//! `projection` and `metrics`. Decoding is strict about the fields it knows (presence and type are
//! checked in that order and reported with fixed messages) and ignores every other key, at the top
//! level and inside `metrics`. Encoding is deterministic: equal reports produce identical bytes.

use std::io;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap as _, Serializer};
use serde_json::Value;
use tracing::debug;

use super::{ScanMetricsResult, ScanReport};
use crate::expressions::Expression;
use crate::json::{self, as_object, get, get_long, get_string};
use crate::schema::Schema;
use crate::{Error, KernelResult};

const TABLE_NAME: &str = "table-name";
const SNAPSHOT_ID: &str = "snapshot-id";
const FILTER: &str = "filter";
const PROJECTION: &str = "projection";
const METRICS: &str = "metrics";

/// Encode `report` as compact JSON.
pub fn to_json(report: &ScanReport) -> KernelResult<String> {
    json::to_string(report, false)
}

/// Encode `report` as indented JSON.
///
/// The layout uses two spaces per level and `" : "` between keys and values, with arrays
/// kept on one line:
///
/// ```text
/// {
///   "table-name" : "db.events",
///   "snapshot-id" : 23,
///   "filter" : true,
///   "projection" : {
///     "type" : "struct",
///     "schema-id" : 0,
///     "fields" : [ ]
///   },
///   "metrics" : { }
/// }
/// ```
pub fn to_json_pretty(report: &ScanReport) -> KernelResult<String> {
    json::to_string(report, true)
}

/// Encode `report` into `writer`, indented when `pretty` is set.
pub fn write_json(writer: impl io::Write, report: &ScanReport, pretty: bool) -> KernelResult<()> {
    json::write_to(writer, report, pretty)
}

/// Decode a report from JSON text.
pub fn from_json(json: &str) -> KernelResult<ScanReport> {
    let value: Value = serde_json::from_str(json)?;
    from_json_value(&value)
}

/// Decode a report from an already parsed JSON document.
pub fn from_json_value(json: &Value) -> KernelResult<ScanReport> {
    if json.is_null() {
        return Err(Error::NullReport);
    }
    let node = as_object("scan report", json)?;

    let table_name = get_string(TABLE_NAME, node)?;
    let snapshot_id = get_long(SNAPSHOT_ID, node)?;
    let filter = match node.get(FILTER) {
        Some(filter) => Expression::from_json(filter)?,
        None => Expression::always_true(),
    };
    let projection = Schema::from_json(get(PROJECTION, node)?)?;
    let scan_metrics = ScanMetricsResult::from_json(get(METRICS, node)?)?;

    debug!(
        "Decoded scan report for {table_name} at snapshot {snapshot_id} with {} metrics",
        scan_metrics.len()
    );
    ScanReport::builder()
        .with_table_name(table_name)
        .with_snapshot_id(snapshot_id)
        .with_filter(filter)
        .with_projection(projection)
        .with_scan_metrics_result(scan_metrics)
        .build()
}

impl Serialize for ScanReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry(TABLE_NAME, self.table_name())?;
        map.serialize_entry(SNAPSHOT_ID, &self.snapshot_id())?;
        map.serialize_entry(FILTER, self.filter())?;
        map.serialize_entry(PROJECTION, self.projection())?;
        map.serialize_entry(METRICS, self.scan_metrics())?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScanReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        from_json_value(&value).map_err(de::Error::custom)
    }
}
