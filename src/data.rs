use anyhow::{anyhow, Result};
use serde_json::Value;
use std::collections::HashMap;

/// Number of rows shown by the default table preview
pub const DEFAULT_PREVIEW_ROWS: usize = 100;

/// One record: column name -> display-formatted cell.
/// A column with no entry is absent, which is distinct from an empty cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Loaded table: ordered column names plus rows in source order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Build rows from a CSV table; missing trailing fields stay absent
    pub fn from_csv(csv: crate::csv_reader::CsvData) -> Self {
        let rows = csv
            .rows
            .into_iter()
            .map(|record| {
                Row::from_pairs(
                    csv.headers
                        .iter()
                        .cloned()
                        .zip(record),
                )
            })
            .collect();

        Self {
            columns: csv.headers,
            rows,
        }
    }

    /// Create a Dataset from a JSON Array of Objects
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value.as_array().ok_or_else(||
            anyhow!("Input data must be a JSON array of objects")
        )?;

        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::with_capacity(array.len());

        for (idx, item) in array.iter().enumerate() {
            let obj = item.as_object().ok_or_else(||
                anyhow!("Item {} in array must be an object", idx)
            )?;

            let mut row = Row::new();
            for (key, val) in obj {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
                let val_str = match val {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Null => continue,
                    _ => return Err(anyhow!("Unsupported value type for field '{}' in item {}", key, idx)),
                };
                row.insert(key.clone(), val_str);
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// True when there is nothing to chart: no columns or no rows
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    pub fn summary(&self) -> String {
        format!("Loaded {} rows, {} columns.", self.rows.len(), self.columns.len())
    }

    /// Plain-text table of the first `limit` rows
    pub fn preview(&self, limit: usize) -> String {
        if self.is_empty() {
            return "No data loaded.".to_string();
        }

        let shown = &self.rows[..self.rows.len().min(limit)];
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in shown {
            for (i, col) in self.columns.iter().enumerate() {
                let len = row.get(col).map(|v| v.chars().count()).unwrap_or(0);
                widths[i] = widths[i].max(len);
            }
        }

        let format_line = |cells: Vec<&str>| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut lines = Vec::with_capacity(shown.len() + 2);
        lines.push(format_line(self.columns.iter().map(String::as_str).collect()));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        for row in shown {
            lines.push(format_line(
                self.columns.iter().map(|c| row.get(c).unwrap_or("")).collect(),
            ));
        }

        lines.join("\n")
    }
}
