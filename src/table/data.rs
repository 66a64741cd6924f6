//! In-memory tabular data: named, typed columns and rows of nullable cells.

use crate::convert::{Value, ValueKind};
use crate::error::{Error, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ValueKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self { name: name.into(), kind }
    }
}

/// One cell per column; `None` is an explicit null, distinct from a zero value.
pub type Row = Vec<Option<Value>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_columns(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self { name: name.into(), columns, rows: Vec::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a column. Existing rows get a null cell for it.
    pub fn add_column(&mut self, name: impl Into<String>, kind: ValueKind) -> &mut Self {
        self.columns.push(Column::new(name, kind));
        for row in &mut self.rows {
            row.push(None);
        }
        self
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Append a row; it must carry exactly one cell per column.
    pub fn push_row(&mut self, row: Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::Validation {
                context: format!("table '{}'", self.name),
                reason: format!(
                    "row has {} cells but the table has {} columns",
                    row.len(),
                    self.columns.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// The cell at (`row`, `column`), `None` when out of bounds or null.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_ref()
    }

    pub(crate) fn push_row_unchecked(&mut self, row: Row) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn push_row_checks_arity() {
        let mut table = Table::new("orders");
        table.add_column("id", ValueKind::String);
        assert!(table.push_row(vec![Some(Value::from("a"))]).is_ok());
        let err = table.push_row(vec![None, None]).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(
            err.to_string(),
            "table 'orders' -> row has 2 cells but the table has 1 columns"
        );
    }

    #[test]
    fn added_columns_are_null_in_existing_rows() {
        let mut table = Table::new("t");
        table.add_column("a", ValueKind::Bool);
        table.push_row(vec![Some(Value::from(true))]).expect("row");
        table.add_column("b", ValueKind::Char);
        assert_eq!(table.rows()[0], vec![Some(Value::from(true)), None]);
        assert_eq!(table.cell(0, "a"), Some(&Value::from(true)));
        assert_eq!(table.cell(0, "b"), None);
        assert_eq!(table.cell(1, "a"), None);
    }
}
