//! Kind-specific input parsers
//!
//! Each parser turns one input file into a [`Table`] of typed cells.
//! Delimited text cells are typed lexically (`CellValue::lex`); parsers
//! that construct columns themselves (sequence files, provenance) insert
//! string cells directly so nothing numeric-looking gets retyped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use calamine::{Data, Reader as WorkbookReader};

use crate::error::{IngestError, Result};
use crate::table::Table;
use crate::units::{parse_byte_size, parse_duration, parse_timestamp, quote_identifier};
use crate::value::CellValue;

/// Columns quoted in a benchmark trace so numeric-looking identifiers
/// stay strings.
const QUOTED_COLUMNS: [&str; 3] = ["task_id", "native_id", "exit"];
/// Benchmark columns holding `"<number> <suffix>"` byte sizes.
const BYTE_COLUMNS: [&str; 4] = ["peak_rss", "peak_vmem", "rchar", "wchar"];
/// Benchmark columns holding composite duration strings.
const DURATION_COLUMNS: [&str; 2] = ["duration", "realtime"];

/// Parse a generic delimited table, choosing the delimiter from the file
/// extension: comma for `.csv`, tab otherwise.
pub fn generic_delimited(path: &Path) -> Result<Table> {
    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => b',',
        _ => b'\t',
    };
    delimited(path, delimiter)
}

/// Parse a run metadata sheet.
///
/// Returns the tab-delimited table together with the file's modification
/// time as UTC epoch seconds; the caller broadcasts it as the `timestamp`
/// column after provenance attachment.
pub fn run_info(path: &Path) -> Result<(Table, i64)> {
    let table = delimited(path, b'\t')?;
    let mtime = file_mtime(path)?;
    Ok((table, mtime))
}

/// Parse and normalize a workflow benchmark trace.
///
/// Beyond the tab-delimited read this strips `%` characters from text
/// cells, quotes the identifier columns, converts the `submit` column to
/// epoch seconds, and converts byte-size and duration columns to
/// canonical units.
pub fn benchmark(path: &Path) -> Result<Table> {
    let mut table = delimited(path, b'\t')?;

    table.map_cells(|cell| match cell {
        CellValue::Str(s) if s.contains('%') => CellValue::from(s.replace('%', "")),
        other => other,
    });

    for column in QUOTED_COLUMNS {
        require_column(&table, column, path)?;
        table.map_column(column, |cell| {
            Ok(match cell {
                CellValue::Null => CellValue::Null,
                other => CellValue::from(quote_identifier(&other.to_string())),
            })
        })?;
    }

    convert_submit(&mut table, path)?;

    for column in BYTE_COLUMNS {
        require_column(&table, column, path)?;
        table.map_column(column, |cell| {
            Ok(match cell {
                // `"<number> <suffix>"`; bare numbers pass through as-is
                CellValue::Str(s) if s.contains(' ') => CellValue::from(parse_byte_size(&s)?),
                other => other,
            })
        })?;
    }

    for column in DURATION_COLUMNS {
        require_column(&table, column, path)?;
        table.map_column(column, |cell| {
            Ok(match cell {
                CellValue::Null => CellValue::from(0.0),
                other => CellValue::from(parse_duration(&other.to_string())?),
            })
        })?;
    }

    // blank cells elsewhere in the trace count as zero
    table.map_cells(|cell| {
        if cell.is_null() {
            CellValue::Int(0)
        } else {
            cell
        }
    });

    Ok(table)
}

/// Convert the `submit` column to epoch seconds.
///
/// Every row must parse, but only the last parsed value survives: it is
/// broadcast over the entire column. This mirrors the column the fleet's
/// existing artifacts carry and is kept deliberately; see DESIGN.md
/// before changing it.
fn convert_submit(table: &mut Table, path: &Path) -> Result<()> {
    let submit = table
        .column("submit")
        .ok_or_else(|| IngestError::parse(path, "missing column \"submit\""))?;

    let mut last: Option<i64> = None;
    for cell in submit {
        match cell {
            CellValue::Str(s) => {
                let parsed = parse_timestamp(s).map_err(|_| {
                    IngestError::parse(path, format!("bad submit timestamp {:?}", s))
                })?;
                last = Some(parsed);
            }
            CellValue::Timestamp(ts) => last = Some(*ts),
            other => {
                return Err(IngestError::parse(
                    path,
                    format!("bad submit timestamp {:?}", other),
                ))
            }
        }
    }

    if let Some(ts) = last {
        table.set_scalar("submit", CellValue::Timestamp(ts));
    }
    Ok(())
}

/// Parse the first sheet of a workbook.
pub fn spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = calamine::open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::parse(path, "workbook has no sheets"))??;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(|cell| cell.to_string()).collect(),
        None => return Ok(Table::new()),
    };

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            columns[index].push(sheet_cell(cell));
        }
    }

    Table::from_columns(headers.into_iter().zip(columns))
        .map_err(|e| IngestError::parse(path, e.to_string()))
}

/// A workbook cell keeps its sheet-level type; integral numbers become
/// integers the way a typed sheet reader reports them.
fn sheet_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            CellValue::Int(*f as i64)
        }
        Data::Float(f) => CellValue::from(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        other => CellValue::from(other.to_string()),
    }
}

/// Parse a multi-record sequence file.
///
/// Records start with a `>`-prefixed header, pipe-delimited into sample
/// identifier, reference segment and an optional QC decision defaulting
/// to "pass". Body lines until the next header concatenate into the
/// record's sequence. Produces columns
/// {sample_id, reference, qc_decision, sequence}.
pub fn fasta(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut sample_ids: Vec<CellValue> = Vec::new();
    let mut references: Vec<CellValue> = Vec::new();
    let mut qc_decisions: Vec<CellValue> = Vec::new();
    let mut sequences: Vec<String> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if let Some(header) = line.strip_prefix('>') {
            let header = header.trim_end();
            let mut parts = header.split('|');
            let sample_id = parts.next().unwrap_or_default();
            let reference = parts.next().ok_or_else(|| {
                IngestError::parse(path, format!("header {:?} lacks a reference segment", line))
            })?;
            let qc_decision = parts.next().unwrap_or("pass");

            sample_ids.push(CellValue::from(sample_id));
            references.push(CellValue::from(reference));
            qc_decisions.push(CellValue::from(qc_decision));
            sequences.push(String::new());
        } else {
            let body = line.trim();
            if body.is_empty() {
                continue;
            }
            match sequences.last_mut() {
                Some(sequence) => sequence.push_str(body),
                None => {
                    return Err(IngestError::parse(
                        path,
                        "sequence data before first record header",
                    ))
                }
            }
        }
    }

    if let Some(index) = sequences.iter().position(|s| s.is_empty()) {
        return Err(IngestError::parse(
            path,
            format!("record {:?} has no sequence lines", sample_ids[index]),
        ));
    }

    Table::from_columns([
        ("sample_id".to_string(), sample_ids),
        ("reference".to_string(), references),
        ("qc_decision".to_string(), qc_decisions),
        (
            "sequence".to_string(),
            sequences.into_iter().map(CellValue::from).collect(),
        ),
    ])
    .map_err(|e| IngestError::parse(path, e.to_string()))
}

/// Parse a single-character-delimited table with a header row.
pub fn delimited(path: &Path, delimiter: u8) -> Result<Table> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (index, cell) in record.iter().enumerate() {
            columns[index].push(CellValue::lex(cell));
        }
    }

    Table::from_columns(headers.into_iter().zip(columns))
        .map_err(|e| IngestError::parse(path, e.to_string()))
}

/// Parse a table delimited by arbitrary whitespace runs, as insertion
/// tables are written.
pub fn whitespace_delimited(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let headers: Vec<String> = loop {
        match lines.next() {
            Some(line) => {
                let line = line?;
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.is_empty() {
                    continue;
                }
                break fields.into_iter().map(String::from).collect();
            }
            None => return Ok(Table::new()),
        }
    };

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for line in lines {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != headers.len() {
            return Err(IngestError::parse(
                path,
                format!(
                    "row has {} fields, expected {}",
                    fields.len(),
                    headers.len()
                ),
            ));
        }
        for (index, field) in fields.iter().enumerate() {
            columns[index].push(CellValue::lex(field));
        }
    }

    Table::from_columns(headers.into_iter().zip(columns))
        .map_err(|e| IngestError::parse(path, e.to_string()))
}

/// Modification time of a file as UTC epoch seconds
pub fn file_mtime(path: &Path) -> Result<i64> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(jiff::Timestamp::try_from(modified)?.as_second())
}

fn require_column(table: &Table, column: &str, path: &Path) -> Result<()> {
    if table.contains_column(column) {
        return Ok(());
    }
    Err(IngestError::parse(
        path,
        format!("missing column {:?}", column),
    ))
}
