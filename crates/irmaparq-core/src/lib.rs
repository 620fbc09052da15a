//! Typed normalization of influenza assembly artifacts into Parquet
//!
//! `irmaparq-core` turns the text outputs of an influenza assembly run
//! into typed, Snappy-compressed Parquet artifacts: per-sample read
//! count, coverage and variant tables merged across a run directory,
//! plus single-file inputs such as workflow benchmark traces, run
//! metadata sheets, amended consensus FASTA, spreadsheets and generic
//! delimited tables.
//!
//! # Key Components
//!
//! - **Classify**: map an input path to its [`classify::RecordKind`]
//!   from file name substrings and extension
//! - **Parse**: one parser per kind, each producing a [`table::Table`]
//!   of lexically typed [`value::CellValue`] cells
//! - **Merge**: glob, stack and normalize the per-sample tables of an
//!   assembly run directory
//! - **Schema**: pinned column types for benchmark and indel records,
//!   inference with numeric promotion for everything else
//! - **Writer / Reader**: chunked Arrow binding into Parquet artifacts
//!   ([`writer::ArtifactWriter`]) and artifact read-back
//!   ([`reader::ArtifactReader`])
//! - **Pipeline**: orchestration driven by an explicit
//!   [`pipeline::RunConfig`], no ambient process state
//!
//! The pipeline is single-threaded and synchronous; artifacts are
//! written sequentially in a stable order, each closed exactly once.

pub mod arrow_conversion;
pub mod classify;
pub mod error;
pub mod merge;
pub mod parse;
pub mod pipeline;
pub mod reader;
pub mod schema;
pub mod table;
pub mod units;
pub mod value;
pub mod writer;

pub use classify::{classify, RecordKind};
pub use error::{IngestError, Result};
pub use merge::merge;
pub use pipeline::{attach_provenance, ingest_file, ingest_run_directory, RunConfig};
pub use reader::ArtifactReader;
pub use schema::{ColumnType, Field, SchemaRegistry, TableSchema};
pub use table::Table;
pub use value::CellValue;
pub use writer::{write_table, ArtifactWriter, CHUNK_ROWS};
