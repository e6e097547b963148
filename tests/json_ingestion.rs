use submission_analytics::ingestion::json::{ingest_json_from_path, ingest_json_from_str};
use submission_analytics::types::Value;

#[test]
fn ingest_json_array_from_path_happy_path() {
    let records = ingest_json_from_path("tests/fixtures/submissions.json").unwrap();

    assert_eq!(records.record_count(), 6);
    assert_eq!(records.records[0].int("created_at_i"), Some(0));
    assert_eq!(records.records[0].text("title"), Some("a b"));
    assert_eq!(records.records[2].text("author"), Some("linus"));
    // the fifth fixture record has no title attribute at all
    assert!(records.records[4].get("title").is_none());
    // the fourth has an extra url attribute
    assert_eq!(
        records.records[3].text("url"),
        Some("https://example.com")
    );
}

#[test]
fn ingest_json_ndjson_happy_path() {
    let input = r#"
{"created_at_i":1,"points":98,"title":"Ada"}
{"created_at_i":2,"points":87,"title":"Grace"}
"#;
    let records = ingest_json_from_str(input).unwrap();
    assert_eq!(records.record_count(), 2);
    assert_eq!(records.records[0].text("title"), Some("Ada"));
    assert_eq!(records.records[1].int("created_at_i"), Some(2));
}

#[test]
fn ingest_json_single_object_is_one_record() {
    let records = ingest_json_from_str(r#"{"created_at_i":5,"points":1}"#).unwrap();
    assert_eq!(records.record_count(), 1);
    assert_eq!(records.records[0].int("points"), Some(1));
}

#[test]
fn ingest_json_attributes_vary_per_record() {
    let records = ingest_json_from_str(r#"[{"a":1},{"b":2.5},{}]"#).unwrap();
    assert_eq!(records.record_count(), 3);
    assert_eq!(records.records[0].get("a"), Some(&Value::Int64(1)));
    assert_eq!(records.records[1].get("b"), Some(&Value::Float64(2.5)));
    assert!(records.records[2].attributes.is_empty());
}

#[test]
fn ingest_json_null_members_are_absent() {
    let records = ingest_json_from_str(r#"[{"title":null,"points":3}]"#).unwrap();
    assert!(records.records[0].get("title").is_none());
    assert_eq!(records.records[0].int("points"), Some(3));
}

#[test]
fn ingest_json_errors_on_non_object_record() {
    let err = ingest_json_from_str(r#"[1, 2]"#).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("malformed input"));
    assert!(msg.contains("record 1 is not a json object"));
}

#[test]
fn ingest_json_errors_on_nested_member() {
    let err = ingest_json_from_str(r#"[{"user":{"name":"Ada"}}]"#).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("record 1"));
    assert!(msg.contains("attribute 'user'"));
}

#[test]
fn ingest_json_errors_on_invalid_ndjson_line() {
    let err = ingest_json_from_str("{\"a\":1}\nnot json\n").unwrap_err();
    assert!(err.to_string().contains("invalid ndjson at line 2"));
}
