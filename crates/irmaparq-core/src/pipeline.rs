//! Orchestration: classify, parse, attach provenance, write.
//!
//! All configuration arrives in an explicit [`RunConfig`]; nothing here
//! reads process state, so the same pipeline runs identically from the
//! CLI and from tests.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::classify::{classify, RecordKind};
use crate::error::{IngestError, Result};
use crate::merge;
use crate::parse;
use crate::table::Table;
use crate::value::CellValue;
use crate::writer::write_table;

/// Everything one ingest run needs to know.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Working directory root; run-directory mode reads `<root>/IRMA` and
    /// writes its artifacts here.
    pub root: PathBuf,
    /// Single input file; `None` selects run-directory mode.
    pub input: Option<PathBuf>,
    /// Output artifact path for single-file mode; defaults to the input
    /// path with a `parq` extension.
    pub output: Option<PathBuf>,
    /// Run identifier attached to every row
    pub run_id: String,
    /// Instrument name attached to every row
    pub instrument: String,
    /// Keep every variant column instead of the standard projection
    pub full_alleles: bool,
}

/// Append `runid` and `instrument` columns broadcast over every row.
pub fn attach_provenance(table: &mut Table, run_id: &str, instrument: &str) {
    table.set_scalar("runid", CellValue::from(run_id));
    table.set_scalar("instrument", CellValue::from(instrument));
}

/// Ingest one input file into one artifact.
///
/// Classifies the file, runs its kind's parser, attaches provenance
/// (run metadata additionally gets its file modification time broadcast
/// as a `timestamp` column) and writes the artifact. Returns the path
/// written.
pub fn ingest_file(config: &RunConfig, path: &Path) -> Result<PathBuf> {
    let kind = classify(path)?;
    debug!(path = %path.display(), kind = kind.name(), "classified input");

    let table = match kind {
        RecordKind::RunInfo => {
            let (mut table, mtime) = parse::run_info(path)?;
            attach_provenance(&mut table, &config.run_id, &config.instrument);
            table.set_scalar("timestamp", CellValue::Timestamp(mtime));
            table
        }
        RecordKind::Benchmark => with_provenance(parse::benchmark(path)?, config),
        RecordKind::Indel | RecordKind::Delimited => {
            with_provenance(parse::generic_delimited(path)?, config)
        }
        RecordKind::Spreadsheet => with_provenance(parse::spreadsheet(path)?, config),
        RecordKind::Fasta => with_provenance(parse::fasta(path)?, config),
        RecordKind::Reads | RecordKind::Coverage | RecordKind::Alleles => {
            return Err(IngestError::internal(format!(
                "{} tables come from run directories, not single files",
                kind.name()
            )))
        }
    };
    if table.is_empty() {
        return Err(IngestError::parse(path, "no columns parsed from input"));
    }

    let output = match &config.output {
        Some(configured) => configured.clone(),
        None => path.with_extension("parq"),
    };
    let schema = write_table(&table, kind, &output)?;
    info!(
        rows = table.num_rows(),
        columns = schema.len(),
        path = %output.display(),
        "wrote artifact"
    );
    Ok(output)
}

/// Ingest an assembly run directory into up to three artifacts.
///
/// Merges read counts, coverage and variant calls from `<root>/IRMA`,
/// attaches provenance to each, and writes
/// `<run_id>_{reads,coverage,alleles}.parq` into the root. A run with no
/// coverage tables logs a warning and skips that artifact; every other
/// failure aborts the remaining artifacts. Returns the paths written.
pub fn ingest_run_directory(config: &RunConfig) -> Result<Vec<PathBuf>> {
    let run_dir = config.root.join("IRMA");
    info!(run_dir = %run_dir.display(), run_id = %config.run_id, "ingesting run directory");
    let mut written = Vec::new();

    let reads = with_provenance(merge::merge(&run_dir, RecordKind::Reads, false)?, config);
    written.push(write_artifact(config, reads, RecordKind::Reads)?);

    match merge::merge(&run_dir, RecordKind::Coverage, false) {
        Ok(coverage) => {
            let coverage = with_provenance(coverage, config);
            written.push(write_artifact(config, coverage, RecordKind::Coverage)?);
        }
        Err(IngestError::NoFilesFound { pattern }) => {
            warn!(pattern = %pattern, "no coverage files found, skipping coverage artifact");
        }
        Err(other) => return Err(other),
    }

    let alleles = with_provenance(
        merge::merge(&run_dir, RecordKind::Alleles, config.full_alleles)?,
        config,
    );
    written.push(write_artifact(config, alleles, RecordKind::Alleles)?);

    Ok(written)
}

fn with_provenance(mut table: Table, config: &RunConfig) -> Table {
    attach_provenance(&mut table, &config.run_id, &config.instrument);
    table
}

fn write_artifact(config: &RunConfig, table: Table, kind: RecordKind) -> Result<PathBuf> {
    let output = config
        .root
        .join(format!("{}_{}.parq", config.run_id, kind.name()));
    let schema = write_table(&table, kind, &output)?;
    info!(
        rows = table.num_rows(),
        columns = schema.len(),
        path = %output.display(),
        "wrote artifact"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(root: &Path) -> RunConfig {
        RunConfig {
            root: root.to_path_buf(),
            input: None,
            output: None,
            run_id: "run7".to_string(),
            instrument: "M02345".to_string(),
            full_alleles: false,
        }
    }

    #[test]
    fn test_provenance_lands_on_the_right() {
        let mut table = Table::from_columns([(
            "Record".to_string(),
            vec![CellValue::from("1-initial")],
        )])
        .unwrap();
        attach_provenance(&mut table, "run7", "M02345");

        let names: Vec<_> = table.column_names().collect();
        assert_eq!(names, vec!["Record", "runid", "instrument"]);
        assert_eq!(table.column("runid").unwrap(), &[CellValue::from("run7")]);
        assert_eq!(
            table.column("instrument").unwrap(),
            &[CellValue::from("M02345")]
        );
    }

    #[test]
    fn test_ingest_file_rejects_unknown_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"x").unwrap();

        let err = ingest_file(&config(dir.path()), &path).unwrap_err();
        assert!(matches!(err, IngestError::Unclassified { .. }));
    }

    #[test]
    fn test_single_file_output_defaults_to_input_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.txt");
        std::fs::write(&path, "a\tb\n1\t2\n").unwrap();

        let written = ingest_file(&config(dir.path()), &path).unwrap();
        assert_eq!(written, dir.path().join("counts.parq"));
        assert!(written.exists());
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        let err = ingest_file(&config(dir.path()), &path).unwrap_err();
        assert!(matches!(err, IngestError::Parse { .. }));
    }
}
