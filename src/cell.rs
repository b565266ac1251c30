/// Represents a single cell of a record table.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 64-bit floating point number.
    Float(f64),
    /// 64-bit signed integer.
    Int(i64),
    /// Categorical or otherwise non-numeric text.
    Text(String),
    /// Missing value with its origin.
    Missing(MissingValue),
}

impl CellValue {
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }

    /// Parses a raw delimited-text field.
    ///
    /// Empty fields and the `NA`/`NaN` spellings produced by data-frame writers
    /// become [`MissingValue::Source`].
    #[must_use]
    pub fn parse_field(raw: &str) -> Self {
        let field = raw.trim();
        if field.is_empty() || matches!(field, "NA" | "NaN" | "nan") {
            return Self::Missing(MissingValue::Source);
        }
        if let Ok(value) = field.parse::<i64>() {
            return Self::Int(value);
        }
        match field.parse::<f64>() {
            Ok(value) if value.is_nan() => Self::Missing(MissingValue::Source),
            Ok(value) => Self::Float(value),
            Err(_) => Self::Text(field.to_owned()),
        }
    }
}

/// Where a missing cell came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MissingValue {
    /// Missing in the input data.
    Source,
    /// Masked by the missingness injector.
    Injected,
}
