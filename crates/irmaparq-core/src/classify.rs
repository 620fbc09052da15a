use std::path::Path;

use crate::error::{IngestError, Result};

/// The closed set of input kinds the pipeline understands.
///
/// `Reads`, `Coverage` and `Alleles` are produced by the directory merger
/// rather than classified from a file name; everything is dispatched by
/// matching on this tag, never by re-inspecting names downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Sequencing run metadata sheet (`run_info` files)
    RunInfo,
    /// Workflow resource-accounting trace (`benchmark` files)
    Benchmark,
    /// Insertion/deletion table (`indel` files), pinned schema at write
    Indel,
    /// Generic single-character-delimited table with header
    Delimited,
    /// Workbook, first sheet with header
    Spreadsheet,
    /// Multi-record sequence file
    Fasta,
    /// Merged per-sample read counts
    Reads,
    /// Merged per-sample coverage depth
    Coverage,
    /// Merged per-sample allele calls
    Alleles,
}

impl RecordKind {
    /// Short display tag, used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::RunInfo => "run_info",
            RecordKind::Benchmark => "benchmark",
            RecordKind::Indel => "indel",
            RecordKind::Delimited => "delimited",
            RecordKind::Spreadsheet => "spreadsheet",
            RecordKind::Fasta => "fasta",
            RecordKind::Reads => "reads",
            RecordKind::Coverage => "coverage",
            RecordKind::Alleles => "alleles",
        }
    }
}

/// Classify a single input file from its name alone.
///
/// Name-substring rules run before extension rules, so `run_info.txt` is
/// `RunInfo` rather than `Delimited`. Content is never inspected.
pub fn classify(path: &Path) -> Result<RecordKind> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if name.contains("run_info") {
        return Ok(RecordKind::RunInfo);
    }
    if name.contains("benchmark") {
        return Ok(RecordKind::Benchmark);
    }
    if name.contains("indel") {
        return Ok(RecordKind::Indel);
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => Ok(RecordKind::Delimited),
        Some("xls") | Some("xlsx") => Ok(RecordKind::Spreadsheet),
        Some("txt") | Some("tsv") => Ok(RecordKind::Delimited),
        Some("fasta") | Some("fa") => Ok(RecordKind::Fasta),
        _ => Err(IngestError::unclassified(path)),
    }
}
