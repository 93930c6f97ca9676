//! `TableView`: owner of the filter → sort → paginate pipeline and the
//! selection set.
//!
//! All state changes go through intents. Each intent recomputes the
//! derived row order synchronously and clamps the page, so the view is
//! consistent whenever control returns to the caller. `render` is a pure
//! projection of that state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::clipboard::{ClipboardManager, CopyMethod};
use crate::data::data_exporter::{
    DataExporter, ExportFile, ExportRecord, SELECTED_EXPORT_KIND, TABLE_EXPORT_KIND,
};
use crate::data::datatable::{ColumnKind, DataCell, DataColumn, DataRow, DataTable, RowId};
use crate::data::markup_loader::MarkupLoader;
use crate::data::pagination::{self, PageInfo, PaginationBar};
use crate::data::row_sorter::{RowSorter, SortDirection, SortState};
use crate::data::search_filter::SearchFilter;
use crate::data::selection::{SelectAllState, SelectionSet};
use crate::error::{TableError, TableResult};
use crate::state::{TableEvent, TableEventDispatcher, TableSubscriber};
use crate::utils::app_paths::AppPaths;
use crate::utils::debouncer::Debouncer;

pub const DEFAULT_PER_PAGE: usize = 10;
pub const DEFAULT_PER_PAGE_OPTIONS: [usize; 5] = [5, 10, 20, 50, 100];
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Construction-time options for a `TableView`
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    pub per_page: usize,
    pub per_page_options: Vec<usize>,
    pub search_debounce: Duration,
    /// Header names excluded from export in addition to the built-in rules
    pub no_export_columns: Vec<String>,
    pub export_dir: PathBuf,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            per_page_options: DEFAULT_PER_PAGE_OPTIONS.to_vec(),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            no_export_columns: Vec::new(),
            export_dir: AppPaths::default_export_dir(),
        }
    }
}

impl TableOptions {
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    pub fn with_no_export_columns(mut self, names: Vec<String>) -> Self {
        self.no_export_columns = names;
        self
    }

    pub fn with_search_debounce(mut self, delay: Duration) -> Self {
        self.search_debounce = delay;
        self
    }
}

/// The caller-visible view parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub search_term: String,
    pub sort: SortState,
    pub page: usize,
    pub per_page: usize,
}

/// Replacement row set for `update_data`
#[derive(Debug, Clone)]
pub enum DataPayload {
    Rows(Vec<DataRow>),
    /// A fragment of `<tr>` rows
    Markup(String),
    /// Array of arrays, or array of objects keyed by header
    Json(Value),
}

/// User-facing outcome of an export or copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NothingSelected,
    ExportedSelected(ExportFile),
    Exported(ExportFile),
    Copied { rows: usize, method: CopyMethod },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NothingSelected => {
                f.write_str("No data selected! Check the rows you want to export.")
            }
            Notice::ExportedSelected(file) => write!(
                f,
                "Successfully exported {} selected rows as CSV!",
                file.rows
            ),
            Notice::Exported(file) => {
                write!(f, "Exported {} rows to {}", file.rows, file.path.display())
            }
            Notice::Copied { .. } => {
                f.write_str("Data copied to clipboard (Excel-ready)! Paste directly into Excel.")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub index: usize,
    pub name: String,
    pub kind: ColumnKind,
    pub sortable: bool,
    pub sort: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRow {
    pub id: RowId,
    /// Display text per column; sequence-number cells are renumbered
    pub cells: Vec<String>,
    pub selected: bool,
    /// 1-based position in the filtered order
    pub number: usize,
}

/// "x of y selected", scoped to the current filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionCounter {
    pub selected: usize,
    pub filtered: usize,
}

impl fmt::Display for SelectionCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} selected", self.selected, self.filtered)
    }
}

/// Everything a presentation layer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedView {
    pub name: String,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<RenderedRow>,
    /// No row passes the current filter
    pub empty: bool,
    pub select_all: SelectAllState,
    pub pagination: Option<PaginationBar>,
    pub info: PageInfo,
    /// Present only for tables with a selection column
    pub selection_counter: Option<SelectionCounter>,
    pub search_term: String,
    pub search_pending: bool,
    pub page: usize,
    pub total_pages: usize,
    pub per_page: usize,
    pub per_page_options: Vec<usize>,
}

#[derive(Debug)]
pub struct TableView {
    table: DataTable,
    options: TableOptions,
    state: ViewState,
    /// Indices into `table.rows` after filter and sort
    filtered: Vec<usize>,
    row_index: HashMap<RowId, usize>,
    selection: SelectionSet,
    pending_search: Option<String>,
    search_debouncer: Debouncer,
    dispatcher: TableEventDispatcher,
}

impl TableView {
    pub fn new(mut table: DataTable, options: TableOptions) -> TableResult<Self> {
        if table.columns.is_empty() {
            return Err(TableError::Construction(format!(
                "table '{}' has no columns",
                table.name
            )));
        }
        if options.per_page == 0 {
            return Err(TableError::Construction(
                "rows per page must be at least 1".to_string(),
            ));
        }
        let rows = std::mem::take(&mut table.rows);
        table
            .replace_rows(rows)
            .map_err(|e| TableError::Construction(e.to_string()))?;
        table.mark_no_export(&options.no_export_columns);

        let mut selection = SelectionSet::new();
        selection.seed_from_rows(&table.rows);

        let state = ViewState {
            search_term: String::new(),
            sort: SortState::default(),
            page: 1,
            per_page: options.per_page,
        };

        let mut view = Self {
            search_debouncer: Debouncer::with_delay(options.search_debounce),
            table,
            options,
            state,
            filtered: Vec::new(),
            row_index: HashMap::new(),
            selection,
            pending_search: None,
            dispatcher: TableEventDispatcher::new(),
        };
        view.rebuild_row_index();
        view.recompute();

        info!(
            "Table '{}' initialized with {} rows, {} per page",
            view.table.name,
            view.table.row_count(),
            view.state.per_page
        );
        Ok(view)
    }

    /// Build a view from a complete `<table>` document
    pub fn from_markup(markup: &str, name: &str, options: TableOptions) -> TableResult<Self> {
        let table = MarkupLoader::load_table(markup, name)?;
        Self::new(table, options)
    }

    pub fn name(&self) -> &str {
        &self.table.name
    }

    pub fn table(&self) -> &DataTable {
        &self.table
    }

    pub fn columns(&self) -> &[DataColumn] {
        &self.table.columns
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn page(&self) -> usize {
        self.state.page
    }

    pub fn per_page(&self) -> usize {
        self.state.per_page
    }

    pub fn total_pages(&self) -> usize {
        pagination::total_pages(self.filtered.len(), self.state.per_page)
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn TableSubscriber>) {
        self.dispatcher.subscribe(subscriber);
    }

    pub fn events(&self) -> &TableEventDispatcher {
        &self.dispatcher
    }

    // ---- search ----

    /// Record a keystroke; the search runs once input has been quiet for
    /// the debounce delay
    pub fn queue_search(&mut self, term: impl Into<String>, now: Instant) {
        let term = term.into();
        debug!("Search queued for '{}': {:?}", self.table.name, term);
        self.pending_search = Some(term);
        self.search_debouncer.trigger_at(now);
    }

    /// Run the pending search if its quiet period has elapsed
    pub fn poll_search(&mut self, now: Instant) -> bool {
        if !self.search_debouncer.should_execute_at(now) {
            return false;
        }
        match self.pending_search.take() {
            Some(term) => {
                self.apply_search(term);
                true
            }
            None => false,
        }
    }

    pub fn search_pending(&self) -> bool {
        self.pending_search.is_some()
    }

    /// Time until the pending search fires
    pub fn search_due_in(&self, now: Instant) -> Option<Duration> {
        self.search_debouncer.time_remaining_at(now)
    }

    /// Search immediately, discarding any pending search
    pub fn search(&mut self, term: impl Into<String>) {
        self.cancel_pending_search();
        self.apply_search(term.into());
    }

    fn cancel_pending_search(&mut self) {
        self.pending_search = None;
        self.search_debouncer.reset();
    }

    fn apply_search(&mut self, term: String) {
        self.state.search_term = term;
        self.state.page = 1;
        self.recompute();
        info!(
            "Search '{}' on '{}': {} of {} rows match",
            self.state.search_term,
            self.table.name,
            self.filtered.len(),
            self.table.row_count()
        );
    }

    // ---- sort ----

    /// Header activation: sorts by `column`, toggling direction when it is
    /// already the sort column
    pub fn sort_by_column(&mut self, column: usize) -> TableResult<SortDirection> {
        let col = self
            .table
            .columns
            .get(column)
            .ok_or(TableError::ColumnOutOfRange {
                index: column,
                count: self.table.column_count(),
            })?;
        if !col.is_sortable() {
            return Err(TableError::UnsortableColumn(col.name.clone()));
        }

        let direction = self.state.sort.activate(column);
        self.state.page = 1;
        self.recompute();
        info!(
            "Sorted '{}' by column {} ({})",
            self.table.name,
            column,
            direction.as_str()
        );
        Ok(direction)
    }

    // ---- pagination ----

    pub fn set_page(&mut self, page: usize) -> usize {
        self.state.page = pagination::clamp_page(page, self.filtered.len(), self.state.per_page);
        debug!("Page {} of {}", self.state.page, self.total_pages());
        self.state.page
    }

    pub fn next_page(&mut self) -> usize {
        self.set_page(self.state.page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> usize {
        self.set_page(self.state.page.saturating_sub(1))
    }

    pub fn first_page(&mut self) -> usize {
        self.set_page(1)
    }

    pub fn last_page(&mut self) -> usize {
        self.set_page(self.total_pages())
    }

    pub fn set_per_page(&mut self, per_page: usize) -> TableResult<()> {
        if per_page == 0 {
            return Err(TableError::InvalidPageSize);
        }
        self.state.per_page = per_page;
        self.state.page = 1;
        info!("Per page changed to {} on '{}'", per_page, self.table.name);
        Ok(())
    }

    /// Step through the configured page sizes
    pub fn cycle_per_page(&mut self, forward: bool) -> TableResult<usize> {
        let mut sizes: Vec<usize> = self
            .options
            .per_page_options
            .iter()
            .copied()
            .filter(|&n| n > 0)
            .collect();
        sizes.sort_unstable();
        sizes.dedup();
        if sizes.is_empty() {
            return Ok(self.state.per_page);
        }

        let current = self.state.per_page;
        let next = if forward {
            sizes.iter().copied().find(|&n| n > current).unwrap_or(sizes[0])
        } else {
            sizes
                .iter()
                .rev()
                .copied()
                .find(|&n| n < current)
                .unwrap_or(sizes[sizes.len() - 1])
        };
        self.set_per_page(next)?;
        Ok(next)
    }

    // ---- selection ----

    fn check_selectable(&self, id: &RowId) -> TableResult<()> {
        if !self.table.has_selection_column() {
            return Err(TableError::SelectionUnavailable);
        }
        if !self.row_index.contains_key(id) {
            return Err(TableError::UnknownRow(id.clone()));
        }
        Ok(())
    }

    /// Flip one row's checkbox, returning its new state
    pub fn toggle_row(&mut self, id: &RowId) -> TableResult<bool> {
        self.check_selectable(id)?;
        let selected = self.selection.toggle(id);
        debug!("Row {} {}", id, if selected { "selected" } else { "deselected" });
        self.emit_selection_changed();
        Ok(selected)
    }

    /// Returns whether the stored state changed
    pub fn set_row_selected(&mut self, id: &RowId, selected: bool) -> TableResult<bool> {
        self.check_selectable(id)?;
        let changed = self.selection.set(id, selected);
        if changed {
            self.emit_selection_changed();
        }
        Ok(changed)
    }

    /// Header select-all: applies to the rows on the current page only.
    /// Returns how many rows changed.
    pub fn set_visible_selected(&mut self, selected: bool) -> TableResult<usize> {
        if !self.table.has_selection_column() {
            return Err(TableError::SelectionUnavailable);
        }
        let ids: Vec<RowId> = self.visible_rows().into_iter().map(|r| r.id.clone()).collect();
        let mut changed = 0;
        for id in &ids {
            if self.selection.set(id, selected) {
                changed += 1;
            }
        }
        debug!(
            "Select-all ({}) on page {}: {} rows changed",
            selected, self.state.page, changed
        );
        if changed > 0 {
            self.emit_selection_changed();
        }
        Ok(changed)
    }

    /// Activate the select-all control as a user would: a checked control
    /// clears the page, anything else selects it
    pub fn toggle_select_all(&mut self) -> TableResult<usize> {
        match self.select_all_state() {
            SelectAllState::Absent => Err(TableError::SelectionUnavailable),
            SelectAllState::Disabled => Ok(0),
            SelectAllState::Checked => self.set_visible_selected(false),
            SelectAllState::Unchecked => self.set_visible_selected(true),
        }
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selection.is_selected(id)
    }

    /// Selected rows that pass the current filter, in filtered order
    pub fn selected_ids(&self) -> Vec<RowId> {
        self.filtered_rows()
            .into_iter()
            .filter(|r| self.selection.is_selected(&r.id))
            .map(|r| r.id.clone())
            .collect()
    }

    /// `count(selected ∩ filtered)`
    pub fn selected_count(&self) -> usize {
        self.selection
            .count_in(self.filtered_rows().into_iter().map(|r| &r.id))
    }

    /// Selected rows including those hidden by the filter
    pub fn total_selected(&self) -> usize {
        self.selection.total_selected()
    }

    pub fn select_all_state(&self) -> SelectAllState {
        let visible: Vec<bool> = self
            .visible_rows()
            .into_iter()
            .map(|r| self.selection.is_selected(&r.id))
            .collect();
        SelectAllState::from_visible(self.table.has_selection_column(), &visible)
    }

    fn emit_selection_changed(&mut self) {
        let selected = self.selected_ids();
        let total_selected = self.selection.total_selected();
        self.dispatcher.dispatch(
            &self.table.name,
            TableEvent::SelectionChanged {
                selected,
                total_selected,
            },
        );
    }

    // ---- data replacement ----

    /// Replace the row set. On error the previous rows, view state and
    /// selection are left untouched.
    pub fn update_data(&mut self, payload: DataPayload) -> TableResult<usize> {
        let rows = match self.rows_from_payload(payload) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("update_data on '{}' rejected: {}", self.table.name, e);
                return Err(e);
            }
        };
        if let Err(e) = self.table.replace_rows(rows) {
            warn!("update_data on '{}' rejected: {}", self.table.name, e);
            return Err(e);
        }

        let before = self.selection.selected_ids();
        let previous: HashSet<RowId> = self.row_index.keys().cloned().collect();
        self.rebuild_row_index();
        let known: HashSet<&RowId> = self.row_index.keys().collect();
        let removed = self.selection.retain_known(&known);
        // rows that survive keep their selection; new rows bring their own
        self.selection.seed_from_rows(
            self.table
                .rows
                .iter()
                .filter(|r| !previous.contains(&r.id)),
        );

        self.cancel_pending_search();
        self.state.search_term.clear();
        self.state.page = 1;
        self.recompute();

        let count = self.table.row_count();
        info!(
            "Data updated on '{}': {} rows ({} stale selections dropped)",
            self.table.name, count, removed
        );
        self.dispatcher
            .dispatch(&self.table.name, TableEvent::DataReplaced { rows: count });
        if self.selection.selected_ids() != before {
            self.emit_selection_changed();
        }
        Ok(count)
    }

    fn rows_from_payload(&self, payload: DataPayload) -> TableResult<Vec<DataRow>> {
        match payload {
            DataPayload::Rows(rows) => rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| -> TableResult<DataRow> {
                    let cells = self.widen_cells(row.cells, i + 1)?;
                    Ok(DataRow {
                        id: row.id,
                        cells,
                        selected: row.selected,
                    })
                })
                .collect(),
            DataPayload::Markup(fragment) => MarkupLoader::parse_rows(&fragment, &self.table.columns),
            DataPayload::Json(value) => self.rows_from_json(value),
        }
    }

    /// Accept either a full-width row or one value per data column; the
    /// checkbox and sequence-number cells are filled in for the latter
    fn widen_cells(&self, cells: Vec<DataCell>, position: usize) -> TableResult<Vec<DataCell>> {
        let width = self.table.column_count();
        if cells.len() == width {
            return Ok(cells);
        }
        let value_columns = self.table.value_column_indices();
        if cells.len() != value_columns.len() {
            return Err(TableError::DataShape(format!(
                "row {} has {} values; expected {} or {}",
                position,
                cells.len(),
                value_columns.len(),
                width
            )));
        }

        let mut values = cells.into_iter();
        let widened = self
            .table
            .columns
            .iter()
            .map(|col| match col.kind {
                ColumnKind::Selection => DataCell::default(),
                ColumnKind::RowNumber => DataCell::new(position.to_string()),
                _ => values.next().unwrap_or_default(),
            })
            .collect();
        Ok(widened)
    }

    fn rows_from_json(&self, value: Value) -> TableResult<Vec<DataRow>> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(TableError::DataShape(format!(
                    "expected a JSON array of rows, got {}",
                    json_kind(&other)
                )))
            }
        };

        let mut rows = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let position = i + 1;
            let row = match item {
                Value::Array(values) => {
                    let cells = values.iter().map(|v| DataCell::new(json_text(v))).collect();
                    DataRow::new(RowId::positional(position), self.widen_cells(cells, position)?)
                }
                Value::Object(map) => {
                    let id = map
                        .get("id")
                        .map(json_text)
                        .filter(|id| !id.trim().is_empty())
                        .map(RowId::new)
                        .unwrap_or_else(|| RowId::positional(position));
                    let cells = self
                        .table
                        .columns
                        .iter()
                        .map(|col| match col.kind {
                            ColumnKind::Selection => DataCell::default(),
                            ColumnKind::RowNumber => DataCell::new(position.to_string()),
                            _ => DataCell::new(
                                map.get(col.name.trim()).map(json_text).unwrap_or_default(),
                            ),
                        })
                        .collect();
                    let mut row = DataRow::new(id, cells);
                    row.selected = map.get("selected").and_then(Value::as_bool);
                    row
                }
                other => {
                    return Err(TableError::DataShape(format!(
                        "row {} is {}; expected an array or an object",
                        position,
                        json_kind(&other)
                    )))
                }
            };
            rows.push(row);
        }
        Ok(rows)
    }

    // ---- derived rows ----

    fn rebuild_row_index(&mut self) {
        self.row_index = self
            .table
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
    }

    /// Filter from source order, then sort, then clamp the page
    fn recompute(&mut self) {
        let mut filtered = SearchFilter::apply(&self.table.rows, &self.state.search_term);
        if let Some(column) = self.state.sort.column {
            RowSorter::sort(
                &self.table.rows,
                &mut filtered,
                column,
                self.state.sort.direction,
            );
        }
        self.filtered = filtered;
        self.state.page =
            pagination::clamp_page(self.state.page, self.filtered.len(), self.state.per_page);
    }

    /// Rows passing the filter, in display order
    pub fn filtered_rows(&self) -> Vec<&DataRow> {
        self.filtered.iter().map(|&i| &self.table.rows[i]).collect()
    }

    /// Rows on the current page
    pub fn visible_rows(&self) -> Vec<&DataRow> {
        pagination::paginate(&self.filtered, self.state.page, self.state.per_page)
            .iter()
            .map(|&i| &self.table.rows[i])
            .collect()
    }

    // ---- export ----

    pub fn export_headers(&self) -> Vec<String> {
        DataExporter::export_headers(&self.table.columns)
    }

    fn records_for(&self, rows: Vec<&DataRow>) -> Vec<ExportRecord> {
        DataExporter::build_export_records(&self.table.columns, rows)
    }

    fn selected_rows(&self) -> Vec<&DataRow> {
        self.filtered_rows()
            .into_iter()
            .filter(|r| self.selection.is_selected(&r.id))
            .collect()
    }

    /// CSV of every filtered row, all pages
    pub fn filtered_csv(&self) -> String {
        DataExporter::convert_to_csv(
            &self.export_headers(),
            &self.records_for(self.filtered_rows()),
        )
    }

    /// TSV of every filtered row, all pages
    pub fn filtered_tsv(&self) -> String {
        DataExporter::convert_to_tsv(
            &self.export_headers(),
            &self.records_for(self.filtered_rows()),
        )
    }

    /// Write selected ∩ filtered rows to `selected-data-<stamp>.csv`
    pub fn export_selected(&self, now: DateTime<Utc>) -> TableResult<Notice> {
        let rows = self.selected_rows();
        if rows.is_empty() {
            warn!("No rows selected for export on '{}'", self.table.name);
            return Ok(Notice::NothingSelected);
        }
        info!("Exporting {} selected rows from '{}'", rows.len(), self.table.name);
        let count = rows.len();
        let csv = DataExporter::convert_to_csv(&self.export_headers(), &self.records_for(rows));
        let file = DataExporter::write_export(
            &self.options.export_dir,
            SELECTED_EXPORT_KIND,
            &csv,
            count,
            now,
        )?;
        Ok(Notice::ExportedSelected(file))
    }

    /// Write every filtered row to `table-export-<stamp>.csv`
    pub fn export_all(&self, now: DateTime<Utc>) -> TableResult<Notice> {
        let count = self.filtered.len();
        info!("Exporting {} rows from '{}'", count, self.table.name);
        let csv = self.filtered_csv();
        let file = DataExporter::write_export(
            &self.options.export_dir,
            TABLE_EXPORT_KIND,
            &csv,
            count,
            now,
        )?;
        Ok(Notice::Exported(file))
    }

    /// Copy every filtered row as TSV; the notice is produced once the
    /// clipboard write has settled on either path
    pub fn copy_to_clipboard(&self, clipboard: &mut ClipboardManager) -> TableResult<Notice> {
        let tsv = self.filtered_tsv();
        let method = clipboard.copy(&tsv)?;
        Ok(Notice::Copied {
            rows: self.filtered.len(),
            method,
        })
    }

    // ---- render ----

    /// Project the current state into display data
    pub fn render(&mut self) -> RenderedView {
        self.state.page =
            pagination::clamp_page(self.state.page, self.filtered.len(), self.state.per_page);

        let page = self.state.page;
        let per_page = self.state.per_page;
        let total_pages = self.total_pages();
        let first_number = (page - 1) * per_page + 1;

        let headers = self
            .table
            .columns
            .iter()
            .enumerate()
            .map(|(index, col)| HeaderCell {
                index,
                name: col.name.clone(),
                kind: col.kind,
                sortable: col.is_sortable(),
                sort: self.state.sort.indicator_for(index),
            })
            .collect();

        let rows = self
            .visible_rows()
            .into_iter()
            .enumerate()
            .map(|(pos, row)| {
                let number = first_number + pos;
                let cells = self
                    .table
                    .columns
                    .iter()
                    .zip(&row.cells)
                    .map(|(col, cell)| match col.kind {
                        ColumnKind::RowNumber => number.to_string(),
                        ColumnKind::Selection => String::new(),
                        _ => cell.full_text(),
                    })
                    .collect();
                RenderedRow {
                    id: row.id.clone(),
                    cells,
                    selected: self.selection.is_selected(&row.id),
                    number,
                }
            })
            .collect();

        let filtered = self.filtered.len();
        let selection_counter = self
            .table
            .has_selection_column()
            .then(|| SelectionCounter {
                selected: self.selected_count(),
                filtered,
            });

        RenderedView {
            name: self.table.name.clone(),
            headers,
            rows,
            empty: filtered == 0,
            select_all: self.select_all_state(),
            pagination: PaginationBar::build(page, total_pages),
            info: PageInfo::new(page, per_page, filtered),
            selection_counter,
            search_term: self.state.search_term.clone(),
            search_pending: self.search_pending(),
            page,
            total_pages,
            per_page,
            per_page_options: self.options.per_page_options.clone(),
        }
    }
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
