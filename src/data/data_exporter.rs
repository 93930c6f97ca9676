use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::data::datatable::{DataColumn, DataRow};
use crate::error::TableResult;

pub const CSV_MIME_TYPE: &str = "text/csv";

/// File-name prefix for "export selected"
pub const SELECTED_EXPORT_KIND: &str = "selected-data";

/// File-name prefix for "export all"
pub const TABLE_EXPORT_KIND: &str = "table-export";

/// The exportable cells of one row, as ordered header/text pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRecord {
    pub fields: Vec<(String, String)>,
}

impl ExportRecord {
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == header)
            .map(|(_, value)| value.as_str())
    }

    fn value_for(&self, position: usize, header: &str) -> &str {
        match self.fields.get(position) {
            Some((name, value)) if name == header => value,
            _ => self.get(header).unwrap_or(""),
        }
    }
}

/// A file written by an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub path: PathBuf,
    pub mime_type: &'static str,
    pub rows: usize,
}

/// Handles turning rows into CSV/TSV text and saving it
pub struct DataExporter;

impl DataExporter {
    /// Names of the exportable columns, in table order
    pub fn export_headers(columns: &[DataColumn]) -> Vec<String> {
        columns
            .iter()
            .filter(|c| c.is_exported())
            .map(|c| c.name.trim().to_string())
            .collect()
    }

    /// Header→text mapping for one row, skipping non-exported columns and
    /// any control markup embedded in a cell
    pub fn build_export_record(columns: &[DataColumn], row: &DataRow) -> ExportRecord {
        let fields = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_exported())
            .filter_map(|(idx, c)| {
                row.cell(idx)
                    .map(|cell| (c.name.trim().to_string(), cell.export_text().to_string()))
            })
            .collect();
        ExportRecord { fields }
    }

    pub fn build_export_records<'a>(
        columns: &[DataColumn],
        rows: impl IntoIterator<Item = &'a DataRow>,
    ) -> Vec<ExportRecord> {
        rows.into_iter()
            .map(|row| Self::build_export_record(columns, row))
            .collect()
    }

    /// Quote a field iff it contains a comma, a quote or a newline
    pub fn escape_csv_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// TSV has no escaping; tabs become single spaces
    pub fn clean_tsv_field(field: &str) -> String {
        field.replace('\t', " ")
    }

    /// Comma-separated text, header row first, `\n` between lines
    pub fn convert_to_csv(headers: &[String], records: &[ExportRecord]) -> String {
        debug!("Converting {} rows to CSV", records.len());
        let mut lines = Vec::with_capacity(records.len() + 1);
        lines.push(
            headers
                .iter()
                .map(|h| Self::escape_csv_field(h))
                .collect::<Vec<_>>()
                .join(","),
        );
        for record in records {
            let values: Vec<String> = headers
                .iter()
                .enumerate()
                .map(|(i, h)| Self::escape_csv_field(record.value_for(i, h)))
                .collect();
            lines.push(values.join(","));
        }
        lines.join("\n")
    }

    /// Tab-separated text for pasting into a spreadsheet
    pub fn convert_to_tsv(headers: &[String], records: &[ExportRecord]) -> String {
        debug!("Converting {} rows to TSV", records.len());
        let mut lines = Vec::with_capacity(records.len() + 1);
        lines.push(
            headers
                .iter()
                .map(|h| Self::clean_tsv_field(h))
                .collect::<Vec<_>>()
                .join("\t"),
        );
        for record in records {
            let values: Vec<String> = headers
                .iter()
                .enumerate()
                .map(|(i, h)| Self::clean_tsv_field(record.value_for(i, h)))
                .collect();
            lines.push(values.join("\t"));
        }
        lines.join("\n")
    }

    /// Compact ISO-8601 stamp safe for file names, e.g. `2025-03-04T05-06-07`
    pub fn export_timestamp(now: DateTime<Utc>) -> String {
        now.format("%Y-%m-%dT%H-%M-%S").to_string()
    }

    pub fn export_filename(kind: &str, timestamp: &str) -> String {
        format!("{}-{}.csv", kind, timestamp)
    }

    /// Write `content` to `<dir>/<kind>-<timestamp>.csv`, adding a counter
    /// suffix if that name is taken
    pub fn write_export(
        dir: &Path,
        kind: &str,
        content: &str,
        rows: usize,
        now: DateTime<Utc>,
    ) -> TableResult<ExportFile> {
        fs::create_dir_all(dir)?;

        let timestamp = Self::export_timestamp(now);
        let mut path = dir.join(Self::export_filename(kind, &timestamp));
        let mut counter = 1;
        while path.exists() {
            path = dir.join(format!("{}-{}-{}.csv", kind, timestamp, counter));
            counter += 1;
        }

        fs::write(&path, content)?;
        info!(
            "Wrote {} ({} rows, {} bytes, {})",
            path.display(),
            rows,
            content.len(),
            CSV_MIME_TYPE
        );

        Ok(ExportFile {
            path,
            mime_type: CSV_MIME_TYPE,
            rows,
        })
    }
}
