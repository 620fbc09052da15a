use std::sync::Arc;

use ordered_float::OrderedFloat;

/// A single typed cell of an ingested table.
///
/// Timestamps are seconds since the Unix epoch, UTC.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellValue {
    Str(Arc<str>),
    Int(i64),
    Float(OrderedFloat<f64>),
    Bool(bool),
    Timestamp(i64),
    Null,
}

impl CellValue {
    /// Type a raw text cell from a delimited file.
    ///
    /// Tried in order: empty (after trimming) becomes `Null`, then integer,
    /// then float, then boolean literals. Everything else keeps its original
    /// text, untrimmed.
    pub fn lex(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Float(OrderedFloat(f));
        }
        match trimmed {
            "true" | "True" | "TRUE" => CellValue::Bool(true),
            "false" | "False" | "FALSE" => CellValue::Bool(false),
            _ => CellValue::Str(Arc::from(text)),
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Get the type name of the value
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Str(_) => "Str",
            CellValue::Int(_) => "Int",
            CellValue::Float(_) => "Float",
            CellValue::Bool(_) => "Bool",
            CellValue::Timestamp(_) => "Timestamp",
            CellValue::Null => "Null",
        }
    }

    /// Borrow the text of a string cell
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellValue {
    /// Text rendering used when a cell lands in a string column.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Str(s) => write!(f, "{}", s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v.0),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Timestamp(ts) => match jiff::Timestamp::from_second(*ts) {
                Ok(t) => write!(f, "{}", t),
                Err(_) => write!(f, "{}", ts),
            },
            CellValue::Null => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Str(Arc::from(s))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Str(Arc::from(s.as_str()))
    }
}

impl From<Arc<str>> for CellValue {
    fn from(s: Arc<str>) -> Self {
        CellValue::Str(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(OrderedFloat(f))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_integers() {
        assert_eq!(CellValue::lex("42"), CellValue::Int(42));
        assert_eq!(CellValue::lex("-7"), CellValue::Int(-7));
        assert_eq!(CellValue::lex("007"), CellValue::Int(7));
        assert_eq!(CellValue::lex(" 13 "), CellValue::Int(13));
    }

    #[test]
    fn test_lex_floats() {
        assert_eq!(CellValue::lex("2.5"), CellValue::Float(OrderedFloat(2.5)));
        assert_eq!(CellValue::lex("1e3"), CellValue::Float(OrderedFloat(1000.0)));
        assert_eq!(CellValue::lex("-0.25"), CellValue::Float(OrderedFloat(-0.25)));
    }

    #[test]
    fn test_lex_bools_and_null() {
        assert_eq!(CellValue::lex("True"), CellValue::Bool(true));
        assert_eq!(CellValue::lex("false"), CellValue::Bool(false));
        assert_eq!(CellValue::lex(""), CellValue::Null);
        assert_eq!(CellValue::lex("   "), CellValue::Null);
    }

    #[test]
    fn test_lex_strings_keep_original_text() {
        assert_eq!(CellValue::lex("A_MP"), CellValue::from("A_MP"));
        // Only fully numeric text becomes a number.
        assert_eq!(CellValue::lex("12abc"), CellValue::from("12abc"));
        // Whitespace around non-numeric text survives.
        assert_eq!(CellValue::lex(" kept "), CellValue::from(" kept "));
    }

    #[test]
    fn test_display_rendering() {
        assert_eq!(CellValue::from(42i64).to_string(), "42");
        assert_eq!(CellValue::from(2.5).to_string(), "2.5");
        assert_eq!(CellValue::from(true).to_string(), "true");
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(
            CellValue::Timestamp(0).to_string(),
            "1970-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_float_equality_and_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(CellValue::from(3.5));
        assert!(set.contains(&CellValue::Float(OrderedFloat(3.5))));
    }
}
