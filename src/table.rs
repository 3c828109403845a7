use crate::error::{Error, Result};

/// Column dtype as exposed by the table collaborator: either
/// `textual` (participates in tokenization) or `numeric` (excluded
/// unless it is the key column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Textual,
    Numeric,
}

impl ColumnType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Numeric)
    }
}

/// Contract a tabular dataset must satisfy to be joined by the core
/// pipeline. DataFrame I/O and schema metadata live
/// entirely on the other side of this trait: the pipeline never knows
/// whether a `Table` is backed by a CSV file, an Arrow batch, or a
/// pandas-style in-memory frame.
pub trait Table {
    fn column_names(&self) -> &[String];
    fn column_type(&self, col: usize) -> ColumnType;
    fn num_records(&self) -> usize;

    /// Raw cell value, `""` standing in for null/missing.
    fn cell(&self, record: usize, col: usize) -> &str;

    fn key_column(&self) -> usize;

    fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names().iter().position(|n| n == name)
    }

    fn key_column_name(&self) -> &str {
        &self.column_names()[self.key_column()]
    }
}

/// Coerces a raw cell into the form used for emptiness/distinctness
/// checks and tokenization: NaN-like and empty values are absent;
/// numeric values are rounded to the nearest integer and rendered in
/// plain decimal form with no fractional part.
pub fn normalize_cell(raw: &str, ty: ColumnType) -> Option<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return None;
    }

    if ty.is_numeric() || is_nan_literal(trimmed) {
        if is_nan_literal(trimmed) {
            return None;
        }

        return match fast_float2::parse::<f64, _>(trimmed) {
            Ok(value) if value.is_nan() => None,
            Ok(value) => Some(format!("{:.0}", value)),
            // Not actually parseable as a number despite the numeric
            // dtype: fall back to the raw text rather than discarding it.
            Err(_) => Some(trimmed.to_owned()),
        };
    }

    Some(trimmed.to_owned())
}

fn is_nan_literal(s: &str) -> bool {
    s.eq_ignore_ascii_case("nan")
}

/// A fully materialized, in-memory table. This is the concrete
/// `Table` the CLI binary builds from a CSV file (`from_csv`), and the
/// one unit/integration tests build by hand.
#[derive(Debug, Clone)]
pub struct VecTable {
    columns: Vec<String>,
    types: Vec<ColumnType>,
    rows: Vec<Vec<String>>,
    key_col: usize,
}

impl VecTable {
    pub fn new(
        columns: Vec<String>,
        types: Vec<ColumnType>,
        rows: Vec<Vec<String>>,
        key_col: usize,
    ) -> Self {
        assert_eq!(columns.len(), types.len());
        Self {
            columns,
            types,
            rows,
            key_col,
        }
    }

    /// Loads a table from a CSV reader, inferring each column's dtype
    /// as `Numeric` when every non-empty cell parses as a float and
    /// `Textual` otherwise — the CSV-side stand-in for the dtype
    /// metadata the external DataFrame collaborator would normally
    /// carry.
    pub fn from_csv<R: std::io::Read>(
        mut reader: csv::Reader<R>,
        key_column: &str,
    ) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let columns: Vec<String> = headers.iter().map(|s| s.to_owned()).collect();

        let key_col = columns
            .iter()
            .position(|c| c == key_column)
            .ok_or_else(|| {
                Error::InvalidInput(format!("key column '{}' not found in schema", key_column))
            })?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|s| s.to_owned()).collect());
        }

        let mut types = vec![ColumnType::Numeric; columns.len()];
        for (c, ty) in types.iter_mut().enumerate() {
            if c == key_col {
                *ty = ColumnType::Textual;
                continue;
            }

            let mut saw_value = false;
            for row in &rows {
                let cell = row.get(c).map(|s| s.as_str()).unwrap_or("");
                let trimmed = cell.trim();

                if trimmed.is_empty() || is_nan_literal(trimmed) {
                    continue;
                }

                saw_value = true;

                if fast_float2::parse::<f64, _>(trimmed).is_err() {
                    *ty = ColumnType::Textual;
                    break;
                }
            }

            if !saw_value {
                *ty = ColumnType::Textual;
            }
        }

        Ok(Self {
            columns,
            types,
            rows,
            key_col,
        })
    }
}

impl Table for VecTable {
    fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn column_type(&self, col: usize) -> ColumnType {
        self.types[col]
    }

    fn num_records(&self) -> usize {
        self.rows.len()
    }

    fn cell(&self, record: usize, col: usize) -> &str {
        self.rows[record].get(col).map(|s| s.as_str()).unwrap_or("")
    }

    fn key_column(&self) -> usize {
        self.key_col
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_textual() {
        assert_eq!(
            normalize_cell("  John  ", ColumnType::Textual),
            Some("John".to_owned())
        );
        assert_eq!(normalize_cell("", ColumnType::Textual), None);
        assert_eq!(normalize_cell("   ", ColumnType::Textual), None);
    }

    #[test]
    fn normalize_numeric() {
        assert_eq!(
            normalize_cell("12.6", ColumnType::Numeric),
            Some("13".to_owned())
        );
        assert_eq!(
            normalize_cell("12.4", ColumnType::Numeric),
            Some("12".to_owned())
        );
        assert_eq!(normalize_cell("nan", ColumnType::Numeric), None);
        assert_eq!(normalize_cell("NaN", ColumnType::Numeric), None);
        assert_eq!(normalize_cell("", ColumnType::Numeric), None);
    }

    #[test]
    fn normalize_numeric_rounds_half_to_even() {
        assert_eq!(
            normalize_cell("2.5", ColumnType::Numeric),
            Some("2".to_owned())
        );
        assert_eq!(
            normalize_cell("0.5", ColumnType::Numeric),
            Some("0".to_owned())
        );
        assert_eq!(
            normalize_cell("1.5", ColumnType::Numeric),
            Some("2".to_owned())
        );
    }

    #[test]
    fn infer_dtype_from_csv() {
        let data = "id,name,age\n1,john,32\n2,jane,\n3,jack,44.5\n";
        let reader = csv::Reader::from_reader(data.as_bytes());
        let table = VecTable::from_csv(reader, "id").unwrap();

        assert_eq!(table.column_type(0), ColumnType::Textual); // key
        assert_eq!(table.column_type(1), ColumnType::Textual);
        assert_eq!(table.column_type(2), ColumnType::Numeric);
        assert_eq!(table.num_records(), 3);
    }
}
