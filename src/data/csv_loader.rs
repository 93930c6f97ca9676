//! CSV file to DataTable loader.
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::data::datatable::{DataCell, DataColumn, DataRow, DataTable, RowId};
use crate::error::{TableError, TableResult};

/// Header used for the synthetic sequence-number column
pub const ROW_NUMBER_HEADER: &str = "No";

/// Shape of the table built from a CSV file
#[derive(Debug, Clone, Default)]
pub struct CsvLoadOptions {
    /// Prepend a checkbox column so rows can be selected
    pub selection_column: bool,
    /// Prepend a "No" column renumbered per page
    pub row_numbers: bool,
    /// Column whose values become row identities
    pub id_column: Option<String>,
}

pub struct CsvLoader;

impl CsvLoader {
    pub fn load_csv<P: AsRef<Path>>(
        path: P,
        table_name: &str,
        options: &CsvLoadOptions,
    ) -> TableResult<DataTable> {
        let path = path.as_ref();
        info!("Loading CSV {} into table '{}'", path.display(), table_name);
        let file = File::open(path)?;
        Self::load_from_reader(file, table_name, options)
    }

    pub fn load_from_reader<R: Read>(
        source: R,
        table_name: &str,
        options: &CsvLoadOptions,
    ) -> TableResult<DataTable> {
        let mut reader = csv::Reader::from_reader(source);
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(TableError::Construction(
                "CSV input has no header row".to_string(),
            ));
        }

        let mut table = DataTable::new(table_name);
        if options.selection_column {
            table.add_column(DataColumn::selection());
        }
        if options.row_numbers {
            table.add_column(DataColumn::row_number(ROW_NUMBER_HEADER));
        }
        for header in headers.iter() {
            table.add_column(DataColumn::new(header.trim()));
        }

        let id_index = match &options.id_column {
            Some(name) => {
                let wanted = name.trim();
                let idx = headers
                    .iter()
                    .position(|h| h.trim().eq_ignore_ascii_case(wanted));
                if idx.is_none() {
                    warn!(
                        "id column '{}' not found in {}; using row positions",
                        name, table_name
                    );
                }
                idx
            }
            None => None,
        };

        let mut seen: HashSet<RowId> = HashSet::new();
        for (i, result) in reader.records().enumerate() {
            let record = result?;
            let position = i + 1;

            let mut cells = Vec::with_capacity(table.column_count());
            if options.selection_column {
                cells.push(DataCell::default());
            }
            if options.row_numbers {
                cells.push(DataCell::new(position.to_string()));
            }
            cells.extend(record.iter().map(DataCell::new));

            let id = id_index
                .and_then(|idx| record.get(idx))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(RowId::new)
                .filter(|id| !seen.contains(id))
                .unwrap_or_else(|| RowId::positional(position));
            seen.insert(id.clone());

            table.add_row(DataRow::new(id, cells))?;
        }

        debug!(
            "CSV '{}': {} columns, {} rows",
            table.name,
            table.column_count(),
            table.row_count()
        );
        Ok(table)
    }
}
