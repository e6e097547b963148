use submission_analytics::ingestion::csv::{ingest_csv_from_path, ingest_csv_from_reader};
use submission_analytics::types::Value;

#[test]
fn ingest_csv_from_path_happy_path() {
    let records = ingest_csv_from_path("tests/fixtures/submissions.csv").unwrap();

    assert_eq!(records.record_count(), 3);
    assert_eq!(records.records[0].get("created_at_i"), Some(&Value::Int64(0)));
    assert_eq!(records.records[0].text("title"), Some("a b"));
    assert_eq!(records.records[2].text("author"), Some("linus"));
}

#[test]
fn ingest_csv_infers_cell_types() {
    let input = "id,score,active,name\n1,4.5,true,ada\n2,7,FALSE,grace\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());
    let records = ingest_csv_from_reader(&mut rdr).unwrap();

    assert_eq!(records.records[0].get("score"), Some(&Value::Float64(4.5)));
    assert_eq!(records.records[0].get("active"), Some(&Value::Bool(true)));
    // a bare integer stays an integer even in a column that elsewhere holds floats
    assert_eq!(records.records[1].get("score"), Some(&Value::Int64(7)));
    assert_eq!(records.records[1].get("active"), Some(&Value::Bool(false)));
}

#[test]
fn ingest_csv_empty_cells_are_absent_attributes() {
    let records = ingest_csv_from_path("tests/fixtures/submissions.csv").unwrap();
    // second data row has an empty title cell
    assert!(records.records[1].get("title").is_none());
    assert_eq!(
        records.records[1].attribute_names().collect::<Vec<_>>(),
        vec!["author", "created_at_i", "num_comments", "points"]
    );
}

#[test]
fn ingest_csv_missing_file_is_io_error() {
    let err = ingest_csv_from_path("tests/fixtures/does_not_exist.csv").unwrap_err();
    assert!(err.to_string().contains("csv error") || err.to_string().contains("io error"));
}
