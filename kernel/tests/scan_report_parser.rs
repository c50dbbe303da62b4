use std::time::Duration;

use serde_json::{json, Value};

use scan_report_kernel::expressions::Expression;
use scan_report_kernel::metrics::scan_report_parser::{
    from_json, from_json_value, to_json, to_json_pretty,
};
use scan_report_kernel::metrics::{
    CounterResult, DefaultMetricsContext, ScanMetrics, ScanMetricsResult, ScanReport, TimeUnit,
    Unit,
};
use scan_report_kernel::schema::{NestedField, PrimitiveType, Schema};
use scan_report_kernel::Error;

const TABLE_NAME: &str = "roundTripTableName";

fn projection() -> Schema {
    Schema::new([NestedField::required(1, "c1", PrimitiveType::String).with_doc("c1")])
}

/// The metrics every scenario below records. `total-delete-manifests` is deliberately untouched.
fn record_scan(scan_metrics: &ScanMetrics) {
    scan_metrics
        .total_planning_duration()
        .record(10, TimeUnit::Minutes);
    scan_metrics.result_data_files().increment(5);
    scan_metrics.result_delete_files().increment(5);
    scan_metrics.scanned_data_manifests().increment(5);
    scan_metrics.skipped_data_manifests().increment(5);
    scan_metrics.total_file_size_in_bytes().increment(1024);
    scan_metrics.total_data_manifests().increment(5);
    scan_metrics.total_file_size_in_bytes().increment(45);
    scan_metrics.total_delete_file_size_in_bytes().increment(23);
}

fn scan_report(scan_metrics: &ScanMetrics) -> ScanReport {
    ScanReport::builder()
        .with_table_name(TABLE_NAME)
        .with_projection(projection())
        .with_snapshot_id(23)
        .with_filter(Expression::always_true())
        .from_scan_metrics(scan_metrics)
        .build()
        .unwrap()
}

fn recorded_report() -> ScanReport {
    let context = DefaultMetricsContext::new();
    let scan_metrics = ScanMetrics::new(&context);
    record_scan(&scan_metrics);
    scan_report(&scan_metrics)
}

fn error_message(json: &str) -> String {
    from_json(json).unwrap_err().to_string()
}

#[test]
fn null_scan_report() {
    let err = from_json_value(&Value::Null).unwrap_err();
    assert!(matches!(err, Error::NullReport));
    assert_eq!(err.to_string(), "Cannot parse scan report from null object");
}

#[test]
fn missing_fields() {
    assert_eq!(
        error_message("{}"),
        "Cannot parse missing string: table-name"
    );
    assert_eq!(
        error_message(r#"{"table-name":"roundTripTableName"}"#),
        "Cannot parse missing long: snapshot-id"
    );
    assert_eq!(
        error_message(r#"{"table-name":"roundTripTableName","snapshot-id":23,"filter":true}"#),
        "Cannot parse missing field: projection"
    );
    assert_eq!(
        error_message(concat!(
            r#"{"table-name":"roundTripTableName","snapshot-id":23,"filter":true,"#,
            r#""projection":{"type":"struct","schema-id":0,"fields":[{"id":1,"name":"c1","required":true,"type":"string","doc":"c1"}]}}"#
        )),
        "Cannot parse missing field: metrics"
    );
}

#[test]
fn extra_fields() {
    let json = concat!(
        r#"{"table-name":"roundTripTableName","snapshot-id":23,"#,
        r#""filter":true,"projection":{"type":"struct","schema-id":0,"fields":[{"id":1,"name":"c1","required":true,"type":"string","doc":"c1"}]},"#,
        r#""metrics":{"total-planning-duration":{"count":1,"time-unit":"nanoseconds","total-duration":600000000000},"#,
        r#""result-data-files":{"unit":"count","value":5},"#,
        r#""result-delete-files":{"unit":"count","value":5},"#,
        r#""total-data-manifests":{"unit":"count","value":5},"#,
        r#""total-delete-manifests":{"unit":"count","value":0},"#,
        r#""scanned-data-manifests":{"unit":"count","value":5},"#,
        r#""skipped-data-manifests":{"unit":"count","value":5},"#,
        r#""total-file-size-in-bytes":{"unit":"bytes","value":1069},"#,
        r#""total-delete-file-size-in-bytes":{"unit":"bytes","value":23},"#,
        r#""extra-metric":"extra-val"},"#,
        r#""extra":"extraVal"}"#
    );
    assert_eq!(from_json(json).unwrap(), recorded_report());
}

#[test]
fn invalid_table_name() {
    assert_eq!(
        error_message(r#"{"table-name":23}"#),
        "Cannot parse to a string value: table-name: 23"
    );
}

#[test]
fn invalid_snapshot_id() {
    assert_eq!(
        error_message(r#"{"table-name":"roundTripTableName","snapshot-id":"invalid"}"#),
        "Cannot parse to a long value: snapshot-id: \"invalid\""
    );
}

#[test]
fn invalid_expression_filter() {
    assert_eq!(
        error_message(
            r#"{"table-name":"roundTripTableName","snapshot-id":23,"filter":23,"projection":23}"#
        ),
        "Cannot parse expression from non-object: 23"
    );
}

#[test]
fn invalid_schema() {
    assert_eq!(
        error_message(
            r#"{"table-name":"roundTripTableName","snapshot-id":23,"filter":true,"projection":23}"#
        ),
        "Cannot parse type from json: 23"
    );
}

#[test]
fn null_metrics() {
    let json = json!({
        "table-name": TABLE_NAME,
        "snapshot-id": 23,
        "projection": {"type": "struct", "fields": []},
        "metrics": null,
    });
    assert_eq!(
        from_json_value(&json).unwrap_err().to_string(),
        "Cannot parse scan metrics from non-object: null"
    );
}

#[test]
fn non_finite_filter_literal_fails_to_encode() {
    for (value, name) in [(f64::NAN, "NaN"), (f64::INFINITY, "inf")] {
        let scan_report = ScanReport::builder()
            .with_table_name(TABLE_NAME)
            .with_snapshot_id(23)
            .with_filter(Expression::less_than("x", value))
            .build()
            .unwrap();
        let expected = format!("Cannot create expression literal from {name}");
        assert_eq!(to_json(&scan_report).unwrap_err().to_string(), expected);
        assert_eq!(to_json_pretty(&scan_report).unwrap_err().to_string(), expected);
    }
}

#[test]
fn round_trip_serde() {
    let scan_report = recorded_report();

    let expected_json = r#"{
  "table-name" : "roundTripTableName",
  "snapshot-id" : 23,
  "filter" : true,
  "projection" : {
    "type" : "struct",
    "schema-id" : 0,
    "fields" : [ {
      "id" : 1,
      "name" : "c1",
      "required" : true,
      "type" : "string",
      "doc" : "c1"
    } ]
  },
  "metrics" : {
    "total-planning-duration" : {
      "count" : 1,
      "time-unit" : "nanoseconds",
      "total-duration" : 600000000000
    },
    "result-data-files" : {
      "unit" : "count",
      "value" : 5
    },
    "result-delete-files" : {
      "unit" : "count",
      "value" : 5
    },
    "total-data-manifests" : {
      "unit" : "count",
      "value" : 5
    },
    "scanned-data-manifests" : {
      "unit" : "count",
      "value" : 5
    },
    "skipped-data-manifests" : {
      "unit" : "count",
      "value" : 5
    },
    "total-file-size-in-bytes" : {
      "unit" : "bytes",
      "value" : 1069
    },
    "total-delete-file-size-in-bytes" : {
      "unit" : "bytes",
      "value" : 23
    }
  }
}"#;

    let json = to_json_pretty(&scan_report).unwrap();
    assert_eq!(from_json(&json).unwrap(), scan_report);
    assert_eq!(json, expected_json);
}

#[test]
fn round_trip_serde_with_noop_metrics() {
    let scan_report = scan_report(&ScanMetrics::noop());

    let expected_json = r#"{
  "table-name" : "roundTripTableName",
  "snapshot-id" : 23,
  "filter" : true,
  "projection" : {
    "type" : "struct",
    "schema-id" : 0,
    "fields" : [ {
      "id" : 1,
      "name" : "c1",
      "required" : true,
      "type" : "string",
      "doc" : "c1"
    } ]
  },
  "metrics" : { }
}"#;

    let json = to_json_pretty(&scan_report).unwrap();
    assert_eq!(from_json(&json).unwrap(), scan_report);
    assert_eq!(json, expected_json);
}

#[test]
fn compact_round_trip_with_nested_filter() {
    let context = DefaultMetricsContext::new();
    let scan_metrics = ScanMetrics::new(&context);
    scan_metrics
        .total_planning_duration()
        .record_duration(Duration::from_millis(250));
    scan_metrics.total_delete_manifests().increment(2);
    let scan_report = ScanReport::builder()
        .with_table_name("db.events")
        .with_snapshot_id(-7)
        .with_filter(Expression::and(
            Expression::greater_than("id", 100),
            Expression::or(
                Expression::is_null("name"),
                Expression::is_in("region", ["eu", "us"]),
            ),
        ))
        .with_projection(projection().with_schema_id(5))
        .from_scan_metrics(&scan_metrics)
        .build()
        .unwrap();

    let json = to_json(&scan_report).unwrap();
    assert!(!json.contains('\n'));
    assert_eq!(from_json(&json).unwrap(), scan_report);

    let decoded = from_json(&json).unwrap();
    assert_eq!(
        decoded.scan_metrics().total_delete_manifests(),
        Some(&CounterResult::new(Unit::Count, 2))
    );
    assert_eq!(
        decoded
            .scan_metrics()
            .total_planning_duration()
            .map(|t| t.total_duration()),
        Some(Duration::from_millis(250))
    );
    assert_eq!(decoded.projection().schema_id(), 5);
}

#[test]
fn encoding_is_deterministic() {
    let first = recorded_report();
    let second = recorded_report();
    assert_eq!(first, second);
    assert_eq!(
        to_json_pretty(&first).unwrap(),
        to_json_pretty(&second).unwrap()
    );
    assert_eq!(to_json(&first).unwrap(), to_json(&first).unwrap());
}

#[test]
fn timer_units_are_normalized_on_read() {
    let json = json!({
        "table-name": TABLE_NAME,
        "snapshot-id": 23,
        "projection": {"type": "struct", "fields": []},
        "metrics": {
            "total-planning-duration": {"count": 2, "time-unit": "seconds", "total-duration": 3},
        },
    });
    let report = from_json_value(&json).unwrap();
    let timer = report.scan_metrics().total_planning_duration().unwrap();
    assert_eq!(timer.count(), 2);
    assert_eq!(timer.total_duration(), Duration::from_secs(3));

    let encoded: Value = serde_json::from_str(&to_json(&report).unwrap()).unwrap();
    assert_eq!(
        encoded["metrics"]["total-planning-duration"],
        json!({"count": 2, "time-unit": "nanoseconds", "total-duration": 3_000_000_000_u64})
    );
}

#[test]
fn metrics_object_only_carries_recorded_entries() {
    let report = scan_report(&ScanMetrics::noop());
    assert_eq!(report.scan_metrics(), &ScanMetricsResult::default());

    let encoded: Value = serde_json::from_str(&to_json(&report).unwrap()).unwrap();
    assert_eq!(encoded["metrics"], json!({}));

    let encoded: Value = serde_json::from_str(&to_json(&recorded_report()).unwrap()).unwrap();
    let metrics = encoded["metrics"].as_object().unwrap();
    assert_eq!(metrics.len(), 8);
    assert!(!metrics.contains_key("total-delete-manifests"));
}
