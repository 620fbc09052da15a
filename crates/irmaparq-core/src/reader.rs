//! Reading artifacts back
//!
//! Used by round-trip verification and by consumers that want to inspect
//! a produced artifact without a full Arrow toolchain on their side.

use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::metadata::FileMetaData;

use crate::arrow_conversion::arrow_to_cell_value;
use crate::error::Result;
use crate::table::Table;
use crate::value::CellValue;

/// Parquet reader over any `ChunkReader` source
#[derive(Clone)]
pub struct ArtifactReader<R> {
    inner: R,
}

impl<R> ArtifactReader<R>
where
    R: parquet::file::reader::ChunkReader + Clone + 'static,
{
    /// Create a new reader
    pub fn new(reader: R) -> Self {
        Self { inner: reader }
    }

    /// Get the Parquet file metadata
    pub fn metadata(&self) -> Result<FileMetaData> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(self.inner.clone())?;
        Ok(builder.metadata().file_metadata().clone())
    }

    /// Materialize the whole artifact as a table.
    ///
    /// Column names and order come from the file schema, so an empty
    /// artifact still yields its column layout with zero rows.
    pub fn read_table(self) -> Result<Table> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(self.inner)?;
        let schema = builder.schema().clone();
        let reader = builder.build()?;

        let mut columns: Vec<(String, Vec<CellValue>)> = schema
            .fields()
            .iter()
            .map(|field| (field.name().clone(), Vec::new()))
            .collect();

        for batch in reader {
            let batch = batch?;
            for (index, array) in batch.columns().iter().enumerate() {
                let column = &mut columns[index].1;
                column.reserve(array.len());
                for row in 0..array.len() {
                    column.push(arrow_to_cell_value(array.as_ref(), row)?);
                }
            }
        }

        Table::from_columns(columns)
    }
}
