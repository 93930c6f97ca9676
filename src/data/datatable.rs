use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

use crate::error::{TableError, TableResult};

/// Stable identity of a row, used as the selection key across re-renders
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(String);

impl RowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Positional identity for rows whose source carries no key (1-based)
    pub fn positional(position: usize) -> Self {
        Self(format!("row-{}", position))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What a column holds, which decides whether it sorts and exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Plain data
    Data,
    /// Per-row checkbox; the header may carry the select-all control
    Selection,
    /// Sequence number, renumbered on every render
    RowNumber,
    /// Header carries an interactive control (buttons, inputs, selects)
    Control,
}

/// Column metadata and definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataColumn {
    pub name: String,
    pub kind: ColumnKind,
    /// Explicitly marked non-exportable by the caller
    pub no_export: bool,
}

impl DataColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Data,
            no_export: false,
        }
    }

    pub fn selection() -> Self {
        Self::new("").with_kind(ColumnKind::Selection)
    }

    pub fn row_number(name: impl Into<String>) -> Self {
        Self::new(name).with_kind(ColumnKind::RowNumber)
    }

    pub fn with_kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_no_export(mut self, no_export: bool) -> Self {
        self.no_export = no_export;
        self
    }

    /// Columns with interactive controls in the header never trigger a sort
    pub fn is_sortable(&self) -> bool {
        matches!(self.kind, ColumnKind::Data | ColumnKind::RowNumber)
    }

    pub fn is_exported(&self) -> bool {
        if self.no_export {
            return false;
        }
        if matches!(self.kind, ColumnKind::Selection | ColumnKind::RowNumber) {
            return false;
        }
        !self.name.trim().eq_ignore_ascii_case("no")
    }
}

/// A single cell: its text plus the label of any control embedded in it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataCell {
    pub text: String,
    pub control: Option<String>,
}

impl DataCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            control: None,
        }
    }

    pub fn with_control(mut self, label: impl Into<String>) -> Self {
        self.control = Some(label.into());
        self
    }

    /// Everything a reader sees in the cell, control labels included
    pub fn full_text(&self) -> String {
        match &self.control {
            Some(label) if self.text.is_empty() => label.clone(),
            Some(label) => format!("{} {}", self.text, label),
            None => self.text.clone(),
        }
    }

    /// Text content with embedded controls stripped
    pub fn export_text(&self) -> &str {
        self.text.trim()
    }
}

impl From<&str> for DataCell {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DataCell {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A row of cells with a stable identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    pub id: RowId,
    pub cells: Vec<DataCell>,
    /// Initial checkbox state, when the source carried one
    pub selected: Option<bool>,
}

impl DataRow {
    pub fn new(id: impl Into<RowId>, cells: Vec<DataCell>) -> Self {
        Self {
            id: id.into(),
            cells,
            selected: None,
        }
    }

    /// Convenience for plain-text rows
    pub fn from_texts<S: AsRef<str>>(id: impl Into<RowId>, texts: &[S]) -> Self {
        Self::new(
            id,
            texts.iter().map(|t| DataCell::new(t.as_ref())).collect(),
        )
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = Some(selected);
        self
    }

    pub fn cell(&self, index: usize) -> Option<&DataCell> {
        self.cells.get(index)
    }

    /// Concatenated text of every cell, used by search
    pub fn search_text(&self) -> String {
        self.cells
            .iter()
            .map(DataCell::full_text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Header definition plus the full, unfiltered row set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataTable {
    pub name: String,
    pub columns: Vec<DataColumn>,
    pub rows: Vec<DataRow>,
}

impl DataTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn add_column(&mut self, column: DataColumn) {
        self.columns.push(column);
    }

    pub fn add_row(&mut self, row: DataRow) -> TableResult<()> {
        self.check_row_shape(&row)?;
        self.rows.push(row);
        Ok(())
    }

    /// Rejects rows whose cell count does not match the header
    pub fn check_row_shape(&self, row: &DataRow) -> TableResult<()> {
        if row.cells.len() != self.columns.len() {
            return Err(TableError::DataShape(format!(
                "row '{}' has {} cells but the table has {} columns",
                row.id,
                row.cells.len(),
                self.columns.len()
            )));
        }
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.columns
            .iter()
            .position(|c| c.name.trim().eq_ignore_ascii_case(wanted))
    }

    pub fn has_selection_column(&self) -> bool {
        self.columns.iter().any(|c| c.kind == ColumnKind::Selection)
    }

    /// Columns that data payloads supply values for, in order
    pub fn value_column_indices(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !matches!(c.kind, ColumnKind::Selection | ColumnKind::RowNumber))
            .map(|(i, _)| i)
            .collect()
    }

    /// Flags the named columns as non-exportable
    pub fn mark_no_export(&mut self, names: &[String]) {
        for name in names {
            match self.get_column_index(name) {
                Some(idx) => self.columns[idx].no_export = true,
                None => debug!("no-export column '{}' not present in '{}'", name, self.name),
            }
        }
    }

    /// Replaces the row set; every row must match the header and carry a
    /// distinct identity
    pub fn replace_rows(&mut self, rows: Vec<DataRow>) -> TableResult<()> {
        for row in &rows {
            self.check_row_shape(row)?;
        }
        if let Some(id) = find_duplicate_id(&rows) {
            return Err(TableError::DataShape(format!("duplicate row id '{}'", id)));
        }
        self.rows = rows;
        Ok(())
    }
}

/// First identity that occurs more than once
pub fn find_duplicate_id(rows: &[DataRow]) -> Option<&RowId> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.iter().map(|r| &r.id).find(|id| !seen.insert(*id))
}
