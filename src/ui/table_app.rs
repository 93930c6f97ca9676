use anyhow::Result;
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::clipboard::ClipboardManager;
use crate::config::config::IconConfig;
use crate::data::data_view::{Notice, TableView};
use crate::error::TableError;
use crate::registry::TableRegistry;
use crate::ui::table_renderer::{
    render_footer, render_log_panel, render_status, render_table, TableRenderContext,
};
use crate::utils::logging::LogRingBuffer;
use crate::widgets::search_input::{SearchInput, SearchInputAction};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const LOG_PANEL_LINES: usize = 50;

/// Interactive viewer over every table in a registry. One table is shown
/// at a time; Tab cycles through them.
pub struct TableApp {
    registry: TableRegistry,
    current: usize,
    search: SearchInput,
    clipboard: ClipboardManager,
    icons: IconConfig,
    /// Row under the cursor, relative to the current page
    cursor_row: usize,
    header_cursor: usize,
    status: Option<String>,
    show_logs: bool,
    log_buffer: Option<LogRingBuffer>,
}

impl TableApp {
    pub fn new(registry: TableRegistry, icons: IconConfig, clipboard: ClipboardManager) -> Self {
        Self {
            registry,
            current: 0,
            search: SearchInput::new(),
            clipboard,
            icons,
            cursor_row: 0,
            header_cursor: 0,
            status: None,
            show_logs: false,
            log_buffer: None,
        }
    }

    pub fn with_log_buffer(mut self, buffer: LogRingBuffer) -> Self {
        self.log_buffer = Some(buffer);
        self
    }

    pub fn current_view(&self) -> Option<&TableView> {
        self.registry.get(self.current)
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn cursor_row(&self) -> usize {
        self.cursor_row
    }

    pub fn header_cursor(&self) -> usize {
        self.header_cursor
    }

    pub fn run(mut self) -> Result<()> {
        if let Err(e) = enable_raw_mode() {
            return Err(anyhow::anyhow!(
                "Failed to enable raw mode: {}. Try running with --print.",
                e
            ));
        }

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(anyhow::anyhow!("Failed to setup terminal: {}", e));
        }

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = match Terminal::new(backend) {
            Ok(t) => t,
            Err(e) => {
                let _ = disable_raw_mode();
                return Err(anyhow::anyhow!("Failed to create terminal: {}", e));
            }
        };

        let res = self.run_app(&mut terminal);

        // Always restore terminal, even on error
        let _ = disable_raw_mode();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        res.map_err(|e| anyhow::anyhow!("TUI error: {}", e))
    }

    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        info!("Viewer started with {} tables", self.registry.len());
        terminal.draw(|f| self.draw(f))?;

        loop {
            let now = Instant::now();
            let mut dirty = self.tick(now);

            if event::poll(self.poll_timeout(now))? {
                match event::read()? {
                    Event::Key(key) => {
                        // Release events would double every toggle on Windows
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_key(key, Instant::now())? {
                            break;
                        }
                        dirty = true;
                    }
                    Event::Resize(_, _) => dirty = true,
                    _ => {}
                }
            }

            if dirty || self.show_logs {
                terminal.draw(|f| self.draw(f))?;
            }
        }

        info!("Viewer closed");
        Ok(())
    }

    /// Fire due searches on every table. Returns whether the shown table
    /// changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut shown_fired = false;
        for (index, view) in self.registry.iter_mut().enumerate() {
            if view.poll_search(now) && index == self.current {
                shown_fired = true;
            }
        }
        if shown_fired {
            self.cursor_row = 0;
        }
        shown_fired
    }

    /// Wait no longer than the next pending search needs
    fn poll_timeout(&self, now: Instant) -> Duration {
        self.registry
            .iter()
            .filter_map(|view| view.search_due_in(now))
            .fold(POLL_INTERVAL, Duration::min)
    }

    /// Apply one key press. Returns `true` when the viewer should exit.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Result<bool> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        if self.search.is_active() {
            self.handle_search_key(key, now);
            return Ok(false);
        }

        if self.registry.is_empty() {
            return Ok(matches!(key.code, KeyCode::Char('q') | KeyCode::Esc));
        }

        self.status = None;
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('/') => {
                let current = self
                    .current_view()
                    .map(|v| v.state().search_term.clone())
                    .unwrap_or_default();
                self.search.activate(&current);
            }
            KeyCode::Left => self.with_view(|v| {
                v.previous_page();
            }),
            KeyCode::Right => self.with_view(|v| {
                v.next_page();
            }),
            KeyCode::Home => self.with_view(|v| {
                v.first_page();
            }),
            KeyCode::End => self.with_view(|v| {
                v.last_page();
            }),
            KeyCode::Up => self.cursor_row = self.cursor_row.saturating_sub(1),
            KeyCode::Down => {
                let last = self.visible_len().saturating_sub(1);
                self.cursor_row = (self.cursor_row + 1).min(last);
            }
            KeyCode::Char(' ') => self.toggle_cursor_row(),
            KeyCode::Char('a') => self.toggle_select_all(),
            KeyCode::Char('h') => self.header_cursor = self.header_cursor.saturating_sub(1),
            KeyCode::Char('l') => {
                let last = self
                    .current_view()
                    .map(|v| v.columns().len())
                    .unwrap_or(0)
                    .saturating_sub(1);
                self.header_cursor = (self.header_cursor + 1).min(last);
            }
            KeyCode::Char('s') | KeyCode::Enter => self.sort_header(),
            KeyCode::Char('+') => self.cycle_per_page(true),
            KeyCode::Char('-') => self.cycle_per_page(false),
            KeyCode::Char('e') => {
                let notice = self.current_view().map(|v| v.export_selected(Utc::now()));
                self.report(notice);
            }
            KeyCode::Char('E') => {
                let notice = self.current_view().map(|v| v.export_all(Utc::now()));
                self.report(notice);
            }
            KeyCode::Char('y') => {
                let notice = match self.registry.get(self.current) {
                    Some(view) => Some(view.copy_to_clipboard(&mut self.clipboard)),
                    None => None,
                };
                self.report(notice);
            }
            KeyCode::Tab => self.switch_table(true),
            KeyCode::BackTab => self.switch_table(false),
            KeyCode::F(5) => self.show_logs = !self.show_logs,
            _ => {}
        }
        Ok(false)
    }

    fn handle_search_key(&mut self, key: KeyEvent, now: Instant) {
        match self.search.handle_key(key) {
            SearchInputAction::Changed(term) => {
                self.with_view(|v| v.queue_search(term, now));
            }
            SearchInputAction::Confirm(term) => {
                self.with_view(|v| v.search(term));
                self.cursor_row = 0;
            }
            SearchInputAction::Cancel
            | SearchInputAction::Continue
            | SearchInputAction::PassThrough => {}
        }
    }

    fn with_view(&mut self, f: impl FnOnce(&mut TableView)) {
        if let Some(view) = self.registry.get_mut(self.current) {
            f(view);
        }
    }

    fn visible_len(&self) -> usize {
        self.current_view()
            .map(|v| v.visible_rows().len())
            .unwrap_or(0)
    }

    fn toggle_cursor_row(&mut self) {
        let cursor = self.cursor_row;
        let Some(view) = self.registry.get_mut(self.current) else {
            return;
        };
        let Some(id) = view.visible_rows().get(cursor).map(|r| r.id.clone()) else {
            return;
        };
        if let Err(e) = view.toggle_row(&id) {
            self.fail(e);
        }
    }

    fn toggle_select_all(&mut self) {
        let result = match self.registry.get_mut(self.current) {
            Some(view) => view.toggle_select_all(),
            None => return,
        };
        match result {
            Ok(changed) => debug!("Select-all changed {} rows", changed),
            Err(e) => self.fail(e),
        }
    }

    fn sort_header(&mut self) {
        let column = self.header_cursor;
        let result = match self.registry.get_mut(self.current) {
            Some(view) => view.sort_by_column(column),
            None => return,
        };
        match result {
            Ok(_) => self.cursor_row = 0,
            Err(e) => self.fail(e),
        }
    }

    fn cycle_per_page(&mut self, forward: bool) {
        let result = match self.registry.get_mut(self.current) {
            Some(view) => view.cycle_per_page(forward),
            None => return,
        };
        match result {
            Ok(size) => {
                self.cursor_row = 0;
                self.status = Some(format!("{} rows per page", size));
            }
            Err(e) => self.fail(e),
        }
    }

    fn switch_table(&mut self, forward: bool) {
        let count = self.registry.len();
        if count < 2 {
            return;
        }
        self.current = if forward {
            (self.current + 1) % count
        } else {
            (self.current + count - 1) % count
        };
        self.cursor_row = 0;
        self.header_cursor = 0;
        let term = self
            .current_view()
            .map(|v| v.state().search_term.clone())
            .unwrap_or_default();
        self.search.set_value(&term);
        info!("Switched to table {}/{}", self.current + 1, count);
    }

    fn report(&mut self, outcome: Option<Result<Notice, TableError>>) {
        match outcome {
            Some(Ok(notice)) => self.status = Some(notice.to_string()),
            Some(Err(e)) => self.fail(e),
            None => {}
        }
    }

    fn fail(&mut self, error: TableError) {
        warn!("{}", error);
        self.status = Some(error.to_string());
    }

    fn draw(&mut self, f: &mut Frame) {
        let log_entries = match (&self.log_buffer, self.show_logs) {
            (Some(buffer), true) => buffer.get_recent(LOG_PANEL_LINES),
            _ => Vec::new(),
        };

        let mut constraints = vec![Constraint::Length(3), Constraint::Min(3)];
        if self.show_logs {
            constraints.push(Constraint::Length(10));
        }
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(1));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(f.area());
        let footer_area = chunks[chunks.len() - 2];
        let status_area = chunks[chunks.len() - 1];

        let count = self.registry.len();
        let position = self.current + 1;
        let Some(view) = self.registry.get_mut(self.current) else {
            self.search.render(f, chunks[0], false);
            render_status(f, status_area, Some("No tables loaded (q to quit)"));
            return;
        };
        let rendered = view.render();

        let last_row = rendered.rows.len().saturating_sub(1);
        self.cursor_row = self.cursor_row.min(last_row);

        self.search.render(f, chunks[0], rendered.search_pending);

        let title = if count > 1 {
            format!(" {} ({}/{}) ", rendered.name, position, count)
        } else {
            format!(" {} ", rendered.name)
        };
        let ctx = TableRenderContext {
            view: &rendered,
            icons: &self.icons,
            cursor_row: self.cursor_row,
            header_cursor: self.header_cursor,
            title,
        };
        render_table(f, chunks[1], &ctx);
        if self.show_logs {
            render_log_panel(f, chunks[2], &log_entries);
        }
        render_footer(f, footer_area, &ctx);
        render_status(f, status_area, self.status.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MockClipboard;
    use crate::data::csv_loader::CsvLoadOptions;
    use crate::data::data_view::TableOptions;
    use crate::data::datatable::RowId;
    use crate::registry::{init_tables, TableSource};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn table_markup(rows: usize) -> String {
        let mut markup = String::from(
            "<table><thead><tr><th><input type=\"checkbox\"></th><th>Name</th><th>Age</th></tr></thead><tbody>",
        );
        for i in 1..=rows {
            markup.push_str(&format!(
                "<tr data-id=\"r{i}\"><td><input type=\"checkbox\"></td><td>name {i:02}</td><td>{}</td></tr>",
                20 + i
            ));
        }
        markup.push_str("</tbody></table>");
        markup
    }

    fn app_with(tables: &[(&str, usize)], export_dir: &std::path::Path) -> (TableApp, MockClipboard) {
        let sources: Vec<TableSource> = tables
            .iter()
            .map(|(name, rows)| TableSource::Markup {
                name: name.to_string(),
                markup: table_markup(*rows),
            })
            .collect();
        let options = TableOptions::default()
            .with_export_dir(export_dir)
            .with_search_debounce(Duration::from_millis(300));
        let registry = init_tables(&sources, &options, &CsvLoadOptions::default());
        let mock = MockClipboard::new();
        let clipboard = ClipboardManager::new(Box::new(mock.clone()), Box::new(MockClipboard::failing()));
        (TableApp::new(registry, IconConfig::simple(), clipboard), mock)
    }

    #[test]
    fn test_space_toggles_cursor_row() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app_with(&[("t", 12)], dir.path());
        let now = Instant::now();
        app.handle_key(key(KeyCode::Down), now).unwrap();
        app.handle_key(key(KeyCode::Char(' ')), now).unwrap();
        let view = app.current_view().unwrap();
        assert_eq!(view.selected_ids(), vec![RowId::new("r2")]);
    }

    #[test]
    fn test_paging_keys() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app_with(&[("t", 25)], dir.path());
        let now = Instant::now();
        app.handle_key(key(KeyCode::Right), now).unwrap();
        assert_eq!(app.current_view().unwrap().page(), 2);
        app.handle_key(key(KeyCode::End), now).unwrap();
        assert_eq!(app.current_view().unwrap().page(), 3);
        app.handle_key(key(KeyCode::Right), now).unwrap();
        assert_eq!(app.current_view().unwrap().page(), 3);
        app.handle_key(key(KeyCode::Home), now).unwrap();
        assert_eq!(app.current_view().unwrap().page(), 1);
    }

    #[test]
    fn test_typed_search_waits_for_debounce() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app_with(&[("t", 12)], dir.path());
        let start = Instant::now();
        app.handle_key(key(KeyCode::Char('/')), start).unwrap();
        app.handle_key(key(KeyCode::Char('0')), start).unwrap();
        app.handle_key(key(KeyCode::Char('3')), start).unwrap();

        assert!(!app.tick(start + Duration::from_millis(100)));
        assert_eq!(app.current_view().unwrap().state().search_term, "");

        assert!(app.tick(start + Duration::from_millis(350)));
        let view = app.current_view().unwrap();
        assert_eq!(view.state().search_term, "03");
        assert_eq!(view.filtered_rows().len(), 1);
    }

    #[test]
    fn test_search_left_pending_on_hidden_table_still_fires() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app_with(&[("first", 12), ("second", 3)], dir.path());
        let start = Instant::now();
        app.handle_key(key(KeyCode::Char('/')), start).unwrap();
        app.handle_key(key(KeyCode::Char('0')), start).unwrap();
        app.handle_key(key(KeyCode::Char('3')), start).unwrap();
        app.handle_key(key(KeyCode::Esc), start).unwrap();
        app.handle_key(key(KeyCode::Tab), start).unwrap();

        assert_eq!(app.poll_timeout(start + Duration::from_millis(280)), Duration::from_millis(20));
        // the shown table did not change
        assert!(!app.tick(start + Duration::from_millis(350)));
        assert_eq!(app.poll_timeout(start + Duration::from_millis(350)), POLL_INTERVAL);

        app.handle_key(key(KeyCode::Tab), start).unwrap();
        let view = app.current_view().unwrap();
        assert_eq!(view.name(), "first");
        assert!(!view.search_pending());
        assert_eq!(view.state().search_term, "03");
    }

    #[test]
    fn test_keys_go_to_search_box_while_active() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app_with(&[("t", 12)], dir.path());
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('/')), now).unwrap();
        assert!(!app.handle_key(key(KeyCode::Char('q')), now).unwrap());
        app.handle_key(key(KeyCode::Esc), now).unwrap();
        assert!(app.handle_key(key(KeyCode::Char('q')), now).unwrap());
    }

    #[test]
    fn test_sort_on_selection_column_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app_with(&[("t", 3)], dir.path());
        let now = Instant::now();
        app.handle_key(key(KeyCode::Char('s')), now).unwrap();
        assert!(app.status().is_some());

        app.handle_key(key(KeyCode::Char('l')), now).unwrap();
        app.handle_key(key(KeyCode::Char('s')), now).unwrap();
        assert!(app.status().is_none());
        assert_eq!(app.current_view().unwrap().state().sort.column, Some(1));
    }

    #[test]
    fn test_export_without_selection_warns() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app_with(&[("t", 3)], dir.path());
        app.handle_key(key(KeyCode::Char('e')), Instant::now()).unwrap();
        assert_eq!(app.status(), Some(Notice::NothingSelected.to_string().as_str()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_copy_uses_clipboard() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, mock) = app_with(&[("t", 2)], dir.path());
        app.handle_key(key(KeyCode::Char('y')), Instant::now()).unwrap();
        assert_eq!(
            mock.content().as_deref(),
            Some("Name\tAge\nname 01\t21\nname 02\t22")
        );
    }

    #[test]
    fn test_tab_switches_tables_and_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, _) = app_with(&[("first", 25), ("second", 3)], dir.path());
        let now = Instant::now();
        app.handle_key(key(KeyCode::Right), now).unwrap();
        app.handle_key(key(KeyCode::Tab), now).unwrap();
        assert_eq!(app.current_view().unwrap().name(), "second");
        app.handle_key(key(KeyCode::Tab), now).unwrap();
        let view = app.current_view().unwrap();
        assert_eq!(view.name(), "first");
        assert_eq!(view.page(), 2);
    }
}
