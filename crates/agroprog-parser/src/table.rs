//! Schema-free table view shared by the spreadsheet and CSV readers

use crate::ParseError;

/// One data row with its 1-based line number in the source sheet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRow {
    pub line: usize,
    pub cells: Vec<String>,
}

impl RawRow {
    /// Cell text at `index`, empty when the row is short
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map_or("", String::as_str)
    }

    fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }
}

/// A header row plus text cells, as read from a sheet
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Table role used in error messages
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rename the table (builder pattern)
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Append a row; fully blank rows are dropped
    pub fn push_row(&mut self, line: usize, cells: Vec<String>) {
        let row = RawRow {
            line,
            cells: cells.into_iter().map(|c| c.trim().to_string()).collect(),
        };
        if !row.is_blank() {
            self.rows.push(row);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a header, matched exactly after trimming
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Resolve every column in `columns`, failing on the first absent one.
    ///
    /// Returned indices follow the order of `columns`.
    pub fn require_columns(&self, columns: &[&str]) -> Result<Vec<usize>, ParseError> {
        columns
            .iter()
            .map(|column| {
                self.column_index(column)
                    .ok_or_else(|| ParseError::MissingColumn {
                        table: self.name.clone(),
                        column: (*column).to_string(),
                    })
            })
            .collect()
    }
}
