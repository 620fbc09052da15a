//! Streaming columnar artifact writing
//!
//! A table is written as a sequence of bounded chunks. The schema is
//! resolved against the first chunk only and is immutable afterwards;
//! every chunk is bound to it, and the artifact is closed exactly once,
//! also when the table is shorter than a single chunk.

use std::fs::File;
use std::ops::Range;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use arrow_schema::SchemaRef;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::{WriterProperties, WriterVersion};
use tracing::debug;

use crate::arrow_conversion::cells_to_arrow_array;
use crate::classify::RecordKind;
use crate::error::{IngestError, Result};
use crate::schema::{SchemaRegistry, TableSchema};
use crate::table::Table;

/// Rows per chunk appended to an artifact
pub const CHUNK_ROWS: usize = 100_000;

/// Chunk-appending Parquet writer over any `Write` destination.
pub struct ArtifactWriter<W: std::io::Write> {
    arrow_writer: Option<ArrowWriter<W>>,
    schema: TableSchema,
    arrow_schema: SchemaRef,
    rows_written: usize,
}

impl<W> ArtifactWriter<W>
where
    W: std::io::Write + Send,
{
    /// Create a writer producing the artifact layout downstream consumers
    /// expect: Snappy compression, Parquet format version 1.0.
    pub fn new(writer: W, schema: TableSchema) -> Result<Self> {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .set_writer_version(WriterVersion::PARQUET_1_0)
            .build();
        Self::new_with_properties(writer, schema, props)
    }

    /// Create a writer with custom properties
    pub fn new_with_properties(
        writer: W,
        schema: TableSchema,
        props: WriterProperties,
    ) -> Result<Self> {
        let arrow_schema = schema.to_arrow();
        let arrow_writer = ArrowWriter::try_new(writer, arrow_schema.clone(), Some(props))?;
        Ok(Self {
            arrow_writer: Some(arrow_writer),
            schema,
            arrow_schema,
            rows_written: 0,
        })
    }

    /// Bind one chunk of table rows to the resolved schema and append it.
    ///
    /// The schema's column set and order win: table columns are fetched by
    /// field name, and a field with no matching column is a schema
    /// mismatch.
    pub fn write_chunk(&mut self, table: &Table, rows: Range<usize>) -> Result<()> {
        if rows.end > table.num_rows() {
            return Err(IngestError::internal(format!(
                "chunk {:?} out of bounds for {} rows",
                rows,
                table.num_rows()
            )));
        }

        let mut arrow_columns = Vec::with_capacity(self.schema.len());
        for field in self.schema.fields() {
            let cells = table.column(&field.name).ok_or_else(|| {
                IngestError::schema_mismatch(
                    &field.name,
                    field.column_type.type_name(),
                    "absent column",
                )
            })?;
            arrow_columns.push(cells_to_arrow_array(&cells[rows.clone()], field)?);
        }

        let batch = RecordBatch::try_new(self.arrow_schema.clone(), arrow_columns)?;
        match &mut self.arrow_writer {
            Some(writer) => writer.write(&batch)?,
            None => return Err(IngestError::internal("writer has been closed")),
        }
        self.rows_written += rows.len();
        Ok(())
    }

    /// Rows appended so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Close the writer and write the file footer.
    ///
    /// Consumes the writer; an artifact is finalized exactly once.
    pub fn close(mut self) -> Result<()> {
        if let Some(writer) = self.arrow_writer.take() {
            writer.close()?;
        }
        Ok(())
    }
}

/// Write a whole table as one output artifact.
///
/// The schema is resolved from the first chunk (or pinned for the
/// benchmark/indel kinds), the table streams out in [`CHUNK_ROWS`]-row
/// chunks, and the artifact is closed afterwards. An empty table still
/// produces a schema-only artifact. The resolved schema is returned.
///
/// A chunk that fails to bind aborts the write and leaves the artifact in
/// a non-authoritative state the caller must discard.
pub fn write_table(table: &Table, kind: RecordKind, path: &Path) -> Result<TableSchema> {
    let first_chunk = 0..table.num_rows().min(CHUNK_ROWS);
    let schema = SchemaRegistry::resolve(kind, table, first_chunk);

    let file = File::create(path)?;
    let mut writer = ArtifactWriter::new(file, schema.clone())?;
    for (index, range) in table.chunk_ranges(CHUNK_ROWS).enumerate() {
        debug!(chunk = index, rows = range.len(), "appending chunk");
        writer.write_chunk(table, range)?;
    }

    let rows = writer.rows_written();
    writer.close()?;
    debug!(rows, path = %path.display(), "artifact closed");
    Ok(schema)
}
