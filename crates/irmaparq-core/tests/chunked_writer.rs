use irmaparq_core::*;

mod test_helpers;
use test_helpers::*;

// =============================================================================
// Chunking and Close Semantics
// =============================================================================

#[test]
fn test_table_larger_than_one_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let rows = CHUNK_ROWS + 1;
    let values: Vec<CellValue> = (0..rows as i64).map(CellValue::Int).collect();
    let table = Table::from_columns([("value".to_string(), values)]).unwrap();

    let path = dir.path().join("big.parq");
    write_table(&table, RecordKind::Delimited, &path).unwrap();

    assert_eq!(artifact_rows(&path), rows as i64);

    let back = read_artifact(&path);
    assert_eq!(back.num_rows(), rows);
    let column = back.column("value").unwrap();
    assert_eq!(column[0], CellValue::Int(0));
    assert_eq!(column[rows - 1], CellValue::Int(rows as i64 - 1));
}

#[test]
fn test_zero_row_table_writes_schema_only_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let table = Table::from_columns([("value".to_string(), Vec::new())]).unwrap();

    let path = dir.path().join("empty.parq");
    write_table(&table, RecordKind::Delimited, &path).unwrap();

    assert_eq!(artifact_rows(&path), 0);
    let back = read_artifact(&path);
    let names: Vec<_> = back.column_names().collect();
    assert_eq!(names, vec!["value"]);
    assert_eq!(back.num_rows(), 0);
}

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn test_typed_cells_survive_a_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let table = Table::from_columns([
        (
            "name".to_string(),
            vec![CellValue::from("s1"), CellValue::from("s2")],
        ),
        (
            "count".to_string(),
            vec![CellValue::Int(12), CellValue::Null],
        ),
        (
            "fraction".to_string(),
            vec![CellValue::from(0.25), CellValue::from(0.75)],
        ),
        (
            "seen".to_string(),
            vec![CellValue::Timestamp(0), CellValue::Timestamp(1_726_582_865)],
        ),
    ])
    .unwrap();

    let path = dir.path().join("mixed.parq");
    write_table(&table, RecordKind::Delimited, &path).unwrap();

    assert_eq!(read_artifact(&path), table);
}
