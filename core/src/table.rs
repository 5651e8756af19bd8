//! In-memory tabular query results.
//!
//! A `ResultTable` is produced once per query per run and never mutated
//! afterwards. Columns are the query's projected fields, one row per record.

use crate::{
    error::{InsightsError, InsightsResult},
    types::Month,
};
use chrono::NaiveDate;
use rusqlite::types::ValueRef;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub(crate) fn from_sql(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            // No catalog query projects blobs; keep them printable.
            ValueRef::Blob(b) => Value::Text(format!("<{} bytes>", b.len())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultTable {
    pub label: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultTable {
    pub fn new(label: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            label: label.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> InsightsResult<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| InsightsError::ColumnNotFound {
                label: self.label.clone(),
                column: column.to_string(),
            })
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, column: &str) -> InsightsResult<Vec<&Value>> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    fn cell(&self, row: usize, column: &str) -> InsightsResult<&Value> {
        let idx = self.column_index(column)?;
        Ok(&self.rows[row][idx])
    }

    fn mismatch(&self, row: usize, column: &str, expected: &'static str, v: &Value) -> InsightsError {
        InsightsError::ColumnType {
            label: self.label.clone(),
            row,
            column: column.to_string(),
            expected,
            actual: v.type_name().to_string(),
        }
    }

    pub fn get_i64(&self, row: usize, column: &str) -> InsightsResult<i64> {
        match self.cell(row, column)? {
            Value::Integer(i) => Ok(*i),
            other => Err(self.mismatch(row, column, "integer", other)),
        }
    }

    /// Numeric cell as f64. Integers widen; NULL is `None`.
    pub fn get_opt_f64(&self, row: usize, column: &str) -> InsightsResult<Option<f64>> {
        match self.cell(row, column)? {
            Value::Null => Ok(None),
            Value::Integer(i) => Ok(Some(*i as f64)),
            Value::Real(f) => Ok(Some(*f)),
            other => Err(self.mismatch(row, column, "number", other)),
        }
    }

    pub fn get_f64(&self, row: usize, column: &str) -> InsightsResult<f64> {
        match self.get_opt_f64(row, column)? {
            Some(f) => Ok(f),
            None => Err(self.mismatch(row, column, "number", &Value::Null)),
        }
    }

    pub fn get_str(&self, row: usize, column: &str) -> InsightsResult<&str> {
        match self.cell(row, column)? {
            Value::Text(s) => Ok(s.as_str()),
            other => Err(self.mismatch(row, column, "text", other)),
        }
    }

    /// A `YYYY-MM-DD` text cell parsed as a month start.
    pub fn get_month(&self, row: usize, column: &str) -> InsightsResult<Month> {
        let text = self.get_str(row, column)?;
        NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| InsightsError::ColumnType {
            label: self.label.clone(),
            row,
            column: column.to_string(),
            expected: "date",
            actual: format!("'{text}'"),
        })
    }
}
