use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use irmaparq_core::*;

/// Write a file under `dir`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Write one per-sample table under `<root>/IRMA/<sample>/tables/`.
pub fn write_sample_table(root: &Path, sample: &str, file_name: &str, contents: &str) {
    let tables = root.join("IRMA").join(sample).join("tables");
    fs::create_dir_all(&tables).unwrap();
    fs::write(tables.join(file_name), contents).unwrap();
}

/// Read a written artifact back into a table.
pub fn read_artifact(path: &Path) -> Table {
    let bytes = Bytes::from(fs::read(path).unwrap());
    ArtifactReader::new(bytes).read_table().unwrap()
}

/// Total row count recorded in an artifact's footer.
pub fn artifact_rows(path: &Path) -> i64 {
    let bytes = Bytes::from(fs::read(path).unwrap());
    ArtifactReader::new(bytes).metadata().unwrap().num_rows()
}

/// A run configuration rooted at `root` with fixed provenance.
pub fn test_config(root: &Path) -> RunConfig {
    RunConfig {
        root: root.to_path_buf(),
        input: None,
        output: None,
        run_id: "run7".to_string(),
        instrument: "M02345".to_string(),
        full_alleles: false,
    }
}
