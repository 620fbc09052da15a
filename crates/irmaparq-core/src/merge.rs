//! Sample-table discovery and merging for assembly run directories
//!
//! A run directory holds one subdirectory per sample, each with a
//! `tables/` directory of per-sample outputs. A merge globs one pattern
//! under the run directory, parses every match in lexical path order,
//! prepends the owning sample's name as the leftmost column, and stacks
//! the tables top to bottom.

use std::path::{Path, PathBuf};

use crate::classify::RecordKind;
use crate::error::{IngestError, Result};
use crate::parse;
use crate::table::Table;
use crate::value::CellValue;

/// Pattern for per-sample read count tables
const READS_PATTERN: &str = "*/tables/READ_COUNTS.txt";
/// Primary and fallback patterns for per-sample coverage tables
const COVERAGE_PATTERNS: [&str; 2] = ["*/tables/*a2m.txt", "*/tables/*coverage.txt"];
/// Pattern for per-sample variant call tables
const ALLELES_PATTERN: &str = "*/tables/*variants.txt";

/// Columns kept from merged variant tables when the references carry
/// model positions, in output order.
const ALLELE_COLUMNS_WITH_MODEL: [&str; 10] = [
    "Sample",
    "Reference_Name",
    "HMM_Position",
    "Position",
    "Total",
    "Consensus_Allele",
    "Minority_Allele",
    "Consensus_Count",
    "Minority_Count",
    "Minority_Frequency",
];

/// The same projection for tables without model positions
const ALLELE_COLUMNS: [&str; 9] = [
    "Sample",
    "Reference_Name",
    "Position",
    "Total",
    "Consensus_Allele",
    "Minority_Allele",
    "Consensus_Count",
    "Minority_Count",
    "Minority_Frequency",
];

/// Output names for the projected variant columns
const ALLELE_RENAMES: [(&str, &str); 9] = [
    ("Reference_Name", "Reference"),
    ("HMM_Position", "Reference Position"),
    ("Position", "Sample Position"),
    ("Total", "Coverage"),
    ("Consensus_Allele", "Consensus Allele"),
    ("Minority_Allele", "Minority Allele"),
    ("Consensus_Count", "Consensus Count"),
    ("Minority_Count", "Minority Count"),
    ("Minority_Frequency", "Minority Frequency"),
];

/// Merge the per-sample tables of one directory kind under `run_dir`.
///
/// `full` is consulted only for `Alleles`, where it disables the
/// standard projection. Asking for a kind that isn't directory-merged is
/// a caller bug.
pub fn merge(run_dir: &Path, kind: RecordKind, full: bool) -> Result<Table> {
    match kind {
        RecordKind::Reads => merge_reads(run_dir),
        RecordKind::Coverage => merge_coverage(run_dir),
        RecordKind::Alleles => merge_alleles(run_dir, full),
        other => Err(IngestError::internal(format!(
            "{} is not a directory-merged kind",
            other.name()
        ))),
    }
}

/// Merge every sample's read count table and append a `Stage` column
/// derived from the numeric prefix of `Record`.
fn merge_reads(run_dir: &Path) -> Result<Table> {
    let paths = discover(run_dir, READS_PATTERN)?;
    if paths.is_empty() {
        return Err(IngestError::no_files(pattern_string(
            run_dir,
            READS_PATTERN,
        )));
    }
    let mut merged = stack(&paths)?;
    append_stage(&mut merged, run_dir)?;
    Ok(merged)
}

/// Merge every sample's coverage table, preferring model-aligned
/// coverage and falling back to plain coverage files.
fn merge_coverage(run_dir: &Path) -> Result<Table> {
    for pattern in COVERAGE_PATTERNS {
        let paths = discover(run_dir, pattern)?;
        if !paths.is_empty() {
            return stack(&paths);
        }
    }
    let tried = COVERAGE_PATTERNS
        .iter()
        .map(|p| pattern_string(run_dir, p))
        .collect::<Vec<_>>()
        .join(" or ");
    Err(IngestError::no_files(tried))
}

/// Merge every sample's variant table.
///
/// Unless `full` is set the merged table is projected down to the
/// standard variant columns, renamed to their output names, with
/// `Minority Frequency` rounded to three decimals. Tables whose
/// references carry model positions keep them as `Reference Position`.
fn merge_alleles(run_dir: &Path, full: bool) -> Result<Table> {
    let paths = discover(run_dir, ALLELES_PATTERN)?;
    if paths.is_empty() {
        return Err(IngestError::no_files(pattern_string(
            run_dir,
            ALLELES_PATTERN,
        )));
    }
    let merged = stack(&paths)?;
    if full {
        return Ok(merged);
    }

    let keep: &[&str] = if merged.contains_column("HMM_Position") {
        &ALLELE_COLUMNS_WITH_MODEL
    } else {
        &ALLELE_COLUMNS
    };
    for name in keep {
        if !merged.contains_column(name) {
            return Err(IngestError::parse(
                run_dir,
                format!("variant tables missing column {:?}", name),
            ));
        }
    }
    let mut projected = merged.select(keep)?;
    projected.rename(&ALLELE_RENAMES)?;
    round_minority_frequency(&mut projected, run_dir)?;
    Ok(projected)
}

/// Glob `pattern` under `run_dir`, in lexical path order.
fn discover(run_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let joined = pattern_string(run_dir, pattern);
    let mut paths = Vec::new();
    for entry in glob::glob(&joined)? {
        paths.push(entry?);
    }
    // lexical order keeps merged row order reproducible across platforms
    paths.sort();
    Ok(paths)
}

fn pattern_string(run_dir: &Path, pattern: &str) -> String {
    run_dir.join(pattern).to_string_lossy().into_owned()
}

/// Parse each path and stack the tables in order.
fn stack(paths: &[PathBuf]) -> Result<Table> {
    let mut merged = Table::new();
    for path in paths {
        merged.concat(read_sample_table(path)?);
    }
    Ok(merged)
}

/// Parse one per-sample table and prepend its `Sample` column.
///
/// Insertion tables are whitespace-delimited; everything else under
/// `tables/` is tab-delimited. The sample name is the directory the
/// `tables/` directory sits in.
fn read_sample_table(path: &Path) -> Result<Table> {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let mut table = if file_name.contains("insertions") {
        parse::whitespace_delimited(path)?
    } else {
        parse::delimited(path, b'\t')?
    };

    let sample = sample_name(path)?;
    table.prepend_column(
        "Sample",
        vec![CellValue::from(sample.as_str()); table.num_rows()],
    )?;
    Ok(table)
}

fn sample_name(path: &Path) -> Result<String> {
    path.parent()
        .and_then(Path::parent)
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .map(String::from)
        .ok_or_else(|| IngestError::parse(path, "cannot derive sample name from path"))
}

/// Append a `Stage` column holding the integer prefix of each `Record`
/// value, split on the first `-`.
fn append_stage(table: &mut Table, run_dir: &Path) -> Result<()> {
    let records = table.column("Record").ok_or_else(|| {
        IngestError::parse(run_dir, "read count tables have no Record column")
    })?;

    let mut stages = Vec::with_capacity(records.len());
    for cell in records {
        let text = cell.to_string();
        let prefix = text.split('-').next().unwrap_or_default();
        let stage = prefix.trim().parse::<i64>().map_err(|_| {
            IngestError::parse(run_dir, format!("bad Record value {:?}", text))
        })?;
        stages.push(CellValue::Int(stage));
    }
    table.push_column("Stage", stages)
}

fn round_minority_frequency(table: &mut Table, run_dir: &Path) -> Result<()> {
    table.map_column("Minority Frequency", |cell| {
        Ok(match cell {
            CellValue::Float(f) => CellValue::from(round3(f.into_inner())),
            CellValue::Int(i) => CellValue::from(round3(i as f64)),
            CellValue::Str(s) => match s.trim().parse::<f64>() {
                Ok(v) => CellValue::from(round3(v)),
                Err(_) => {
                    return Err(IngestError::parse(
                        run_dir,
                        format!("bad Minority_Frequency value {:?}", s),
                    ))
                }
            },
            CellValue::Null => CellValue::from(f64::NAN),
            other => {
                return Err(IngestError::parse(
                    run_dir,
                    format!("bad Minority_Frequency value {:?}", other),
                ))
            }
        })
    })
}

fn round3(value: f64) -> f64 {
    format!("{value:.3}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    fn write_sample_table(root: &Path, sample: &str, file_name: &str, contents: &str) {
        let tables = root.join(sample).join("tables");
        fs::create_dir_all(&tables).unwrap();
        let mut file = fs::File::create(tables.join(file_name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    const READ_COUNTS: &str = "Record\tReads\n1-initial\t1200\n2-passQC\t1100\n";

    #[test]
    fn test_merge_reads_across_samples() {
        let dir = tempfile::tempdir().unwrap();
        // created out of lexical order on purpose
        write_sample_table(dir.path(), "s2", "READ_COUNTS.txt", READ_COUNTS);
        write_sample_table(dir.path(), "s1", "READ_COUNTS.txt", READ_COUNTS);
        write_sample_table(dir.path(), "s3", "READ_COUNTS.txt", READ_COUNTS);

        let merged = merge(dir.path(), RecordKind::Reads, false).unwrap();
        assert_eq!(merged.num_rows(), 6);

        let names: Vec<_> = merged.column_names().collect();
        assert_eq!(names, vec!["Sample", "Record", "Reads", "Stage"]);

        let samples: Vec<String> = merged
            .column("Sample")
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(samples, vec!["s1", "s1", "s2", "s2", "s3", "s3"]);

        assert_eq!(
            &merged.column("Stage").unwrap()[..2],
            &[CellValue::Int(1), CellValue::Int(2)]
        );
    }

    #[test]
    fn test_merge_reads_requires_matches() {
        let dir = tempfile::tempdir().unwrap();
        let err = merge(dir.path(), RecordKind::Reads, false).unwrap_err();
        assert!(matches!(err, IngestError::NoFilesFound { .. }));
    }

    #[test]
    fn test_merge_rejects_single_file_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let err = merge(dir.path(), RecordKind::Benchmark, false).unwrap_err();
        assert!(matches!(err, IngestError::Internal(_)));
    }

    #[test]
    fn test_merge_reads_rejects_bad_record() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_table(
            dir.path(),
            "s1",
            "READ_COUNTS.txt",
            "Record\tReads\nnoprefix\t5\n",
        );
        assert!(merge(dir.path(), RecordKind::Reads, false).is_err());
    }

    #[test]
    fn test_coverage_prefers_model_aligned_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_table(
            dir.path(),
            "s1",
            "A_HA-a2m.txt",
            "Position\tCoverage\n1\t100\n",
        );
        write_sample_table(
            dir.path(),
            "s2",
            "A_HA-coverage.txt",
            "Position\tCoverage\n1\t90\n2\t95\n",
        );

        // only the primary pattern's matches are merged
        let merged = merge(dir.path(), RecordKind::Coverage, false).unwrap();
        assert_eq!(merged.num_rows(), 1);
        assert_eq!(
            merged.column("Sample").unwrap(),
            &[CellValue::from("s1")]
        );
    }

    #[test]
    fn test_coverage_falls_back_to_plain_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_table(
            dir.path(),
            "s1",
            "A_HA-coverage.txt",
            "Position\tCoverage\n1\t90\n",
        );

        let merged = merge(dir.path(), RecordKind::Coverage, false).unwrap();
        assert_eq!(merged.num_rows(), 1);
    }

    #[test]
    fn test_coverage_no_matches() {
        let dir = tempfile::tempdir().unwrap();
        let err = merge(dir.path(), RecordKind::Coverage, false).unwrap_err();
        assert!(matches!(err, IngestError::NoFilesFound { .. }));
    }

    #[test]
    fn test_insertion_tables_split_on_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_table(
            dir.path(),
            "s1",
            "A_HA-insertions-coverage.txt",
            "Position   Coverage\n1    90\n",
        );

        let merged = merge(dir.path(), RecordKind::Coverage, false).unwrap();
        assert_eq!(merged.column("Coverage").unwrap(), &[CellValue::Int(90)]);
    }

    const VARIANTS_WITH_MODEL: &str = "Reference_Name\tHMM_Position\tPosition\tTotal\tConsensus_Allele\tMinority_Allele\tConsensus_Count\tMinority_Count\tMinority_Frequency\tPhase\nA_HA\t17\t15\t1000\tA\tG\t950\t50\t0.04999\textra\n";

    #[test]
    fn test_alleles_projection_with_model_positions() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_table(dir.path(), "s1", "A_HA-variants.txt", VARIANTS_WITH_MODEL);

        let merged = merge(dir.path(), RecordKind::Alleles, false).unwrap();
        let names: Vec<_> = merged.column_names().collect();
        assert_eq!(
            names,
            vec![
                "Sample",
                "Reference",
                "Reference Position",
                "Sample Position",
                "Coverage",
                "Consensus Allele",
                "Minority Allele",
                "Consensus Count",
                "Minority Count",
                "Minority Frequency",
            ]
        );
        // the off-plan Phase column is dropped and the frequency rounded
        assert_eq!(
            merged.column("Minority Frequency").unwrap(),
            &[CellValue::from(0.05)]
        );
    }

    #[test]
    fn test_alleles_projection_without_model_positions() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_table(
            dir.path(),
            "s1",
            "A_NA-variants.txt",
            "Reference_Name\tPosition\tTotal\tConsensus_Allele\tMinority_Allele\tConsensus_Count\tMinority_Count\tMinority_Frequency\nA_NA\t3\t800\tC\tT\t790\t10\t0.0125\n",
        );

        let merged = merge(dir.path(), RecordKind::Alleles, false).unwrap();
        let names: Vec<_> = merged.column_names().collect();
        assert_eq!(names.len(), 9);
        assert!(!names.contains(&"Reference Position"));
        assert_eq!(
            merged.column("Minority Frequency").unwrap(),
            &[CellValue::from(0.013)]
        );
    }

    #[test]
    fn test_alleles_full_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_table(dir.path(), "s1", "A_HA-variants.txt", VARIANTS_WITH_MODEL);

        let merged = merge(dir.path(), RecordKind::Alleles, true).unwrap();
        assert!(merged.contains_column("Phase"));
        assert!(merged.contains_column("Reference_Name"));
        assert_eq!(
            merged.column("Minority_Frequency").unwrap(),
            &[CellValue::from(0.04999)]
        );
    }

    #[test]
    fn test_alleles_missing_standard_column() {
        let dir = tempfile::tempdir().unwrap();
        write_sample_table(
            dir.path(),
            "s1",
            "A_HA-variants.txt",
            "Reference_Name\tPosition\n A_HA\t3\n",
        );
        assert!(merge(dir.path(), RecordKind::Alleles, false).is_err());
    }
}
