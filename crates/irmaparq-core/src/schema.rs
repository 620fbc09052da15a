use std::ops::Range;
use std::sync::Arc;

use arrow_schema::{DataType, Field as ArrowField, Schema as ArrowSchema, SchemaRef, TimeUnit};

use crate::classify::RecordKind;
use crate::table::Table;
use crate::value::CellValue;

/// Semantic column types an output artifact can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Str,
    Int64,
    Float32,
    Float64,
    Bool,
    /// Seconds since the Unix epoch, UTC
    TimestampSecond,
}

impl ColumnType {
    /// Get the logical type name for display
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Str => "Str",
            ColumnType::Int64 => "Int64",
            ColumnType::Float32 => "Float32",
            ColumnType::Float64 => "Float64",
            ColumnType::Bool => "Bool",
            ColumnType::TimestampSecond => "TimestampSecond",
        }
    }

    /// The natural column type of a cell, `None` for nulls
    pub fn of(cell: &CellValue) -> Option<ColumnType> {
        match cell {
            CellValue::Str(_) => Some(ColumnType::Str),
            CellValue::Int(_) => Some(ColumnType::Int64),
            CellValue::Float(_) => Some(ColumnType::Float64),
            CellValue::Bool(_) => Some(ColumnType::Bool),
            CellValue::Timestamp(_) => Some(ColumnType::TimestampSecond),
            CellValue::Null => None,
        }
    }

    /// Join two observed types during inference.
    ///
    /// Integer widens to float; any other disagreement falls back to string.
    pub fn promote(self, other: ColumnType) -> ColumnType {
        use ColumnType::*;
        match (self, other) {
            _ if self == other => self,
            (Int64, Float64) | (Float64, Int64) => Float64,
            (Int64, Float32) | (Float32, Int64) => Float32,
            (Float32, Float64) | (Float64, Float32) => Float64,
            _ => Str,
        }
    }

    /// Arrow data type for this column type
    pub fn to_arrow(&self) -> DataType {
        match self {
            ColumnType::Str => DataType::Utf8,
            ColumnType::Int64 => DataType::Int64,
            ColumnType::Float32 => DataType::Float32,
            ColumnType::Float64 => DataType::Float64,
            ColumnType::Bool => DataType::Boolean,
            ColumnType::TimestampSecond => {
                DataType::Timestamp(TimeUnit::Second, Some(Arc::from("UTC")))
            }
        }
    }
}

/// One resolved output column
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl Field {
    /// Create a new field
    pub fn new<S: Into<String>>(name: S, column_type: ColumnType, nullable: bool) -> Self {
        Field {
            name: name.into(),
            column_type,
            nullable,
        }
    }

    fn to_arrow(&self) -> ArrowField {
        ArrowField::new(&self.name, self.column_type.to_arrow(), self.nullable)
    }
}

/// The immutable column layout bound to one output artifact
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    fields: Vec<Field>,
}

impl TableSchema {
    /// Create a schema from ordered fields
    pub fn new(fields: Vec<Field>) -> Self {
        TableSchema { fields }
    }

    /// Fields in declared order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Convert to an Arrow schema
    pub fn to_arrow(&self) -> SchemaRef {
        Arc::new(ArrowSchema::new(
            self.fields.iter().map(Field::to_arrow).collect::<Vec<_>>(),
        ))
    }
}

/// Benchmark artifact layout: identifiers stay strings, resource metrics
/// are fixed-precision floats, submit is an epoch-seconds instant.
const BENCHMARK_COLUMNS: [(&str, ColumnType); 16] = [
    ("task_id", ColumnType::Str),
    ("hash", ColumnType::Str),
    ("native_id", ColumnType::Str),
    ("name", ColumnType::Str),
    ("status", ColumnType::Str),
    ("exit", ColumnType::Str),
    ("submit", ColumnType::TimestampSecond),
    ("duration", ColumnType::Float32),
    ("realtime", ColumnType::Float32),
    ("%cpu", ColumnType::Float32),
    ("peak_rss", ColumnType::Float32),
    ("peak_vmem", ColumnType::Float32),
    ("rchar", ColumnType::Float32),
    ("wchar", ColumnType::Float32),
    ("runid", ColumnType::Str),
    ("instrument", ColumnType::Str),
];

/// Indel artifact layout
const INDEL_COLUMNS: [(&str, ColumnType); 11] = [
    ("Sample", ColumnType::Str),
    ("Sample - Upstream Position", ColumnType::Int64),
    ("Reference", ColumnType::Str),
    ("Context", ColumnType::Str),
    ("Length", ColumnType::Int64),
    ("Insert", ColumnType::Str),
    ("Count", ColumnType::Int64),
    ("Upstream Base Coverage", ColumnType::Int64),
    ("Frequency", ColumnType::Float64),
    ("runid", ColumnType::Str),
    ("instrument", ColumnType::Str),
];

/// Schema resolution: pinned layouts for the benchmark and indel kinds,
/// first-chunk inference for everything else.
pub struct SchemaRegistry;

impl SchemaRegistry {
    /// Resolve the schema for one output artifact.
    ///
    /// Called exactly once per artifact, on the first chunk; the result is
    /// reused for every later chunk.
    pub fn resolve(kind: RecordKind, table: &Table, first_chunk: Range<usize>) -> TableSchema {
        match kind {
            RecordKind::Benchmark => Self::benchmark(),
            RecordKind::Indel => Self::indel(),
            _ => Self::infer(table, &first_chunk),
        }
    }

    /// The pinned benchmark schema
    pub fn benchmark() -> TableSchema {
        Self::pinned(&BENCHMARK_COLUMNS)
    }

    /// The pinned indel schema
    pub fn indel() -> TableSchema {
        Self::pinned(&INDEL_COLUMNS)
    }

    fn pinned(columns: &[(&str, ColumnType)]) -> TableSchema {
        TableSchema::new(
            columns
                .iter()
                .map(|(name, ty)| Field::new(*name, *ty, true))
                .collect(),
        )
    }

    /// Infer a schema from the cells of the first chunk.
    ///
    /// Nulls are skipped and never demote a column's type; a column with
    /// no non-null cell in the chunk falls back to string.
    fn infer(table: &Table, rows: &Range<usize>) -> TableSchema {
        let fields = table
            .columns()
            .map(|(name, cells)| {
                let mut observed: Option<ColumnType> = None;
                for cell in &cells[rows.start..rows.end.min(cells.len())] {
                    if let Some(ty) = ColumnType::of(cell) {
                        observed = Some(match observed {
                            None => ty,
                            Some(prior) => prior.promote(ty),
                        });
                    }
                }
                Field::new(name, observed.unwrap_or(ColumnType::Str), true)
            })
            .collect();
        TableSchema::new(fields)
    }
}
