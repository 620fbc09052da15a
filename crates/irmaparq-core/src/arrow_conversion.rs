//! Conversion between cell values and Arrow arrays
//!
//! Binding is schema-driven: each chunk is coerced to the artifact's
//! resolved column types. Integers widen to floats, any value renders into
//! a string column, and strings parse into numeric, boolean and timestamp
//! columns. A cell with no coercion to its column's type is a schema
//! mismatch and aborts the write.

use std::sync::Arc;

use arrow_array::builder::{
    BooleanBuilder, Float32Builder, Float64Builder, Int64Builder, StringBuilder,
    TimestampSecondBuilder,
};
use arrow_array::{Array, ArrayRef};
use arrow_schema::{DataType, TimeUnit};

use crate::error::{IngestError, Result};
use crate::schema::{ColumnType, Field};
use crate::units::parse_timestamp;
use crate::value::CellValue;

/// Bind one column of cells to an Arrow array of the field's type.
pub fn cells_to_arrow_array(cells: &[CellValue], field: &Field) -> Result<ArrayRef> {
    match field.column_type {
        ColumnType::Str => build_string_array(cells),
        ColumnType::Int64 => build_int64_array(cells, &field.name),
        ColumnType::Float32 => build_float32_array(cells, &field.name),
        ColumnType::Float64 => build_float64_array(cells, &field.name),
        ColumnType::Bool => build_boolean_array(cells, &field.name),
        ColumnType::TimestampSecond => build_timestamp_array(cells, &field.name),
    }
}

/// Convert a single value from an Arrow array at the given index back to a
/// cell value.
pub fn arrow_to_cell_value(array: &dyn Array, index: usize) -> Result<CellValue> {
    use arrow_array::{
        BooleanArray, Float32Array, Float64Array, Int64Array, StringArray, TimestampSecondArray,
    };

    if array.is_null(index) {
        return Ok(CellValue::Null);
    }

    match array.data_type() {
        DataType::Boolean => {
            let array = downcast_array::<BooleanArray>(array)?;
            Ok(CellValue::Bool(array.value(index)))
        }
        DataType::Int64 => {
            let array = downcast_array::<Int64Array>(array)?;
            Ok(CellValue::Int(array.value(index)))
        }
        DataType::Float32 => {
            let array = downcast_array::<Float32Array>(array)?;
            Ok(CellValue::from(array.value(index) as f64))
        }
        DataType::Float64 => {
            let array = downcast_array::<Float64Array>(array)?;
            Ok(CellValue::from(array.value(index)))
        }
        DataType::Utf8 => {
            let array = downcast_array::<StringArray>(array)?;
            Ok(CellValue::Str(Arc::from(array.value(index))))
        }
        DataType::Timestamp(TimeUnit::Second, _) => {
            let array = downcast_array::<TimestampSecondArray>(array)?;
            Ok(CellValue::Timestamp(array.value(index)))
        }
        dt => Err(IngestError::internal(format!(
            "unsupported arrow data type {:?}",
            dt
        ))),
    }
}

/// Helper function to downcast an array with better error messages
fn downcast_array<T: 'static>(array: &dyn Array) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        IngestError::internal(format!("failed to cast to {}", std::any::type_name::<T>()))
    })
}

fn mismatch(column: &str, expected: ColumnType, cell: &CellValue) -> IngestError {
    IngestError::schema_mismatch(column, expected.type_name(), format!("{:?}", cell))
}

/// Build a string array; every non-null cell has a text rendering
fn build_string_array(cells: &[CellValue]) -> Result<ArrayRef> {
    let mut builder = StringBuilder::with_capacity(cells.len(), 0);
    for cell in cells {
        match cell {
            CellValue::Str(s) => builder.append_value(s.as_ref()),
            CellValue::Null => builder.append_null(),
            other => builder.append_value(other.to_string()),
        }
    }
    Ok(Arc::new(builder.finish()))
}

/// Build an Int64 array, accepting integral floats and integer text
fn build_int64_array(cells: &[CellValue], column: &str) -> Result<ArrayRef> {
    let mut builder = Int64Builder::with_capacity(cells.len());
    for cell in cells {
        match cell {
            CellValue::Int(i) => builder.append_value(*i),
            CellValue::Float(f)
                if f.0.fract() == 0.0 && f.0 >= i64::MIN as f64 && f.0 <= i64::MAX as f64 =>
            {
                builder.append_value(f.0 as i64)
            }
            CellValue::Str(s) => match s.trim().parse::<i64>() {
                Ok(i) => builder.append_value(i),
                Err(_) => return Err(mismatch(column, ColumnType::Int64, cell)),
            },
            CellValue::Null => builder.append_null(),
            other => return Err(mismatch(column, ColumnType::Int64, other)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

/// Build a Float32 array, widening integers and parsing numeric text
fn build_float32_array(cells: &[CellValue], column: &str) -> Result<ArrayRef> {
    let mut builder = Float32Builder::with_capacity(cells.len());
    for cell in cells {
        match cell {
            CellValue::Float(f) => builder.append_value(f.0 as f32),
            CellValue::Int(i) => builder.append_value(*i as f32),
            CellValue::Str(s) => match s.trim().parse::<f32>() {
                Ok(f) => builder.append_value(f),
                Err(_) => return Err(mismatch(column, ColumnType::Float32, cell)),
            },
            CellValue::Null => builder.append_null(),
            other => return Err(mismatch(column, ColumnType::Float32, other)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

/// Build a Float64 array, widening integers and parsing numeric text
fn build_float64_array(cells: &[CellValue], column: &str) -> Result<ArrayRef> {
    let mut builder = Float64Builder::with_capacity(cells.len());
    for cell in cells {
        match cell {
            CellValue::Float(f) => builder.append_value(f.0),
            CellValue::Int(i) => builder.append_value(*i as f64),
            CellValue::Str(s) => match s.trim().parse::<f64>() {
                Ok(f) => builder.append_value(f),
                Err(_) => return Err(mismatch(column, ColumnType::Float64, cell)),
            },
            CellValue::Null => builder.append_null(),
            other => return Err(mismatch(column, ColumnType::Float64, other)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

/// Build a Boolean array, parsing boolean literals from text
fn build_boolean_array(cells: &[CellValue], column: &str) -> Result<ArrayRef> {
    let mut builder = BooleanBuilder::with_capacity(cells.len());
    for cell in cells {
        match cell {
            CellValue::Bool(b) => builder.append_value(*b),
            CellValue::Str(s) => match s.trim() {
                "true" | "True" | "TRUE" => builder.append_value(true),
                "false" | "False" | "FALSE" => builder.append_value(false),
                _ => return Err(mismatch(column, ColumnType::Bool, cell)),
            },
            CellValue::Null => builder.append_null(),
            other => return Err(mismatch(column, ColumnType::Bool, other)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

/// Build a second-resolution UTC timestamp array.
///
/// Integers are taken as epoch seconds; text must be a
/// `YYYY-MM-DD HH:MM:SS[.fraction]` instant.
fn build_timestamp_array(cells: &[CellValue], column: &str) -> Result<ArrayRef> {
    let mut builder = TimestampSecondBuilder::with_capacity(cells.len()).with_timezone("UTC");
    for cell in cells {
        match cell {
            CellValue::Timestamp(ts) => builder.append_value(*ts),
            CellValue::Int(i) => builder.append_value(*i),
            CellValue::Str(s) => match parse_timestamp(s) {
                Ok(ts) => builder.append_value(ts),
                Err(_) => return Err(mismatch(column, ColumnType::TimestampSecond, cell)),
            },
            CellValue::Null => builder.append_null(),
            other => return Err(mismatch(column, ColumnType::TimestampSecond, other)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, ty: ColumnType) -> Field {
        Field::new(name, ty, true)
    }

    #[test]
    fn test_int64_coercions() {
        let cells = vec![
            CellValue::Int(1),
            CellValue::from(2.0),
            CellValue::from("3"),
            CellValue::Null,
        ];
        let array = cells_to_arrow_array(&cells, &field("Count", ColumnType::Int64)).unwrap();
        assert_eq!(array.len(), 4);
        assert!(array.is_null(3));

        assert_eq!(arrow_to_cell_value(array.as_ref(), 1).unwrap(), CellValue::Int(2));
        assert_eq!(arrow_to_cell_value(array.as_ref(), 2).unwrap(), CellValue::Int(3));
    }

    #[test]
    fn test_int64_rejects_fractional_and_text() {
        let err = cells_to_arrow_array(&[CellValue::from(2.5)], &field("Count", ColumnType::Int64))
            .unwrap_err();
        assert!(matches!(err, IngestError::SchemaMismatch { .. }));

        let err =
            cells_to_arrow_array(&[CellValue::from("abc")], &field("Count", ColumnType::Int64))
                .unwrap_err();
        assert!(err.to_string().contains("Count"));
    }

    #[test]
    fn test_float32_from_int_and_text() {
        let cells = vec![CellValue::Int(7), CellValue::from("95.5"), CellValue::Null];
        let array = cells_to_arrow_array(&cells, &field("%cpu", ColumnType::Float32)).unwrap();
        assert_eq!(
            arrow_to_cell_value(array.as_ref(), 0).unwrap(),
            CellValue::from(7.0)
        );
        assert_eq!(
            arrow_to_cell_value(array.as_ref(), 1).unwrap(),
            CellValue::from(95.5)
        );
        assert!(array.is_null(2));
    }

    #[test]
    fn test_string_renders_any_cell() {
        let cells = vec![
            CellValue::from("'0'"),
            CellValue::Int(12),
            CellValue::from(1.5),
            CellValue::Null,
        ];
        let array = cells_to_arrow_array(&cells, &field("exit", ColumnType::Str)).unwrap();
        assert_eq!(
            arrow_to_cell_value(array.as_ref(), 0).unwrap(),
            CellValue::from("'0'")
        );
        assert_eq!(
            arrow_to_cell_value(array.as_ref(), 1).unwrap(),
            CellValue::from("12")
        );
        assert!(array.is_null(3));
    }

    #[test]
    fn test_timestamp_from_text_and_int() {
        let cells = vec![
            CellValue::Timestamp(100),
            CellValue::Int(200),
            CellValue::from("1970-01-01 00:05:00.25"),
        ];
        let array =
            cells_to_arrow_array(&cells, &field("submit", ColumnType::TimestampSecond)).unwrap();
        assert_eq!(
            arrow_to_cell_value(array.as_ref(), 0).unwrap(),
            CellValue::Timestamp(100)
        );
        assert_eq!(
            arrow_to_cell_value(array.as_ref(), 2).unwrap(),
            CellValue::Timestamp(300)
        );

        let err = cells_to_arrow_array(
            &[CellValue::from("not a time")],
            &field("submit", ColumnType::TimestampSecond),
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_boolean_literals() {
        let cells = vec![CellValue::Bool(true), CellValue::from("False")];
        let array = cells_to_arrow_array(&cells, &field("flag", ColumnType::Bool)).unwrap();
        assert_eq!(
            arrow_to_cell_value(array.as_ref(), 1).unwrap(),
            CellValue::Bool(false)
        );
    }
}
