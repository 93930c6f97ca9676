// Pure drawing functions: everything they show comes from a RenderedView
// plus the viewer's cursor positions.

use ratatui::{
    layout::Constraint,
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::config::config::IconConfig;
use crate::data::data_view::RenderedView;
use crate::data::datatable::ColumnKind;
use crate::data::pagination::PageItem;
use crate::data::row_sorter::SortDirection;
use crate::data::selection::SelectAllState;
use crate::utils::logging::LogEntry;

const MAX_COLUMN_WIDTH: usize = 40;

/// Inputs for one table frame
pub struct TableRenderContext<'a> {
    pub view: &'a RenderedView,
    pub icons: &'a IconConfig,
    /// Highlighted row within the page
    pub cursor_row: usize,
    /// Highlighted header
    pub header_cursor: usize,
    pub title: String,
}

impl<'a> TableRenderContext<'a> {
    fn checkbox(&self, checked: bool) -> &'a str {
        let icons: &'a IconConfig = self.icons;
        if checked {
            &icons.checked
        } else {
            &icons.unchecked
        }
    }

    fn select_all_glyph(&self) -> &'a str {
        let icons: &'a IconConfig = self.icons;
        match self.view.select_all {
            SelectAllState::Checked => &icons.checked,
            SelectAllState::Unchecked => &icons.unchecked,
            SelectAllState::Disabled => &icons.disabled,
            SelectAllState::Absent => "",
        }
    }

    fn sort_glyph(&self, direction: Option<SortDirection>) -> &'a str {
        let icons: &'a IconConfig = self.icons;
        match direction {
            Some(SortDirection::Ascending) => &icons.sort_ascending,
            Some(SortDirection::Descending) => &icons.sort_descending,
            None => "",
        }
    }
}

pub fn render_table(f: &mut Frame, area: Rect, ctx: &TableRenderContext) {
    let block = Block::default().borders(Borders::ALL).title(ctx.title.clone());

    if ctx.view.empty {
        let empty = Paragraph::new("No data found")
            .block(block)
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(empty, area);
        return;
    }

    let table = Table::new(build_data_rows(ctx), calculate_column_widths(ctx))
        .header(build_header_row(ctx))
        .block(block)
        .column_spacing(1);

    f.render_widget(table, area);
}

fn header_label(ctx: &TableRenderContext, index: usize) -> String {
    let header = &ctx.view.headers[index];
    match header.kind {
        ColumnKind::Selection => ctx.select_all_glyph().to_string(),
        _ => {
            let glyph = ctx.sort_glyph(header.sort);
            if glyph.is_empty() {
                header.name.clone()
            } else {
                format!("{} {}", header.name, glyph)
            }
        }
    }
}

fn build_header_row(ctx: &TableRenderContext) -> Row<'static> {
    let cells: Vec<Cell> = ctx
        .view
        .headers
        .iter()
        .map(|header| {
            let mut style = if header.sortable {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            if header.index == ctx.header_cursor {
                style = style.fg(Color::Yellow).add_modifier(Modifier::UNDERLINED);
            }
            Cell::from(header_label(ctx, header.index)).style(style)
        })
        .collect();

    Row::new(cells)
}

fn build_data_rows(ctx: &TableRenderContext) -> Vec<Row<'static>> {
    ctx.view
        .rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let cells: Vec<Cell> = ctx
                .view
                .headers
                .iter()
                .zip(&row.cells)
                .map(|(header, text)| match header.kind {
                    ColumnKind::Selection => Cell::from(ctx.checkbox(row.selected).to_string()),
                    ColumnKind::RowNumber => {
                        Cell::from(text.clone()).style(Style::default().fg(Color::DarkGray))
                    }
                    _ => Cell::from(text.clone()),
                })
                .collect();

            let mut style = Style::default();
            if row.selected {
                style = style.fg(Color::Green);
            }
            if row_idx == ctx.cursor_row {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            Row::new(cells).style(style)
        })
        .collect()
}

fn calculate_column_widths(ctx: &TableRenderContext) -> Vec<Constraint> {
    ctx.view
        .headers
        .iter()
        .map(|header| {
            let header_width = header_label(ctx, header.index).chars().count();
            let data_width = ctx
                .view
                .rows
                .iter()
                .filter_map(|r| r.cells.get(header.index))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0);
            let width = match header.kind {
                ColumnKind::Selection => ctx.icons.checked.chars().count().max(3),
                _ => header_width.max(data_width).clamp(1, MAX_COLUMN_WIDTH),
            };
            Constraint::Length(width as u16)
        })
        .collect()
}

/// Prev / page numbers / next, then the info text and selection counter
pub fn render_footer(f: &mut Frame, area: Rect, ctx: &TableRenderContext) {
    let view = ctx.view;
    let mut spans: Vec<Span> = Vec::new();

    if let Some(bar) = &view.pagination {
        let enabled = Style::default().fg(Color::Cyan);
        let disabled = Style::default().fg(Color::DarkGray);

        spans.push(Span::styled(
            "« Prev",
            if bar.prev_enabled { enabled } else { disabled },
        ));
        for item in &bar.items {
            spans.push(Span::raw(" "));
            match item {
                PageItem::Page(n) if *n == bar.current => spans.push(Span::styled(
                    format!("[{}]", n),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
                PageItem::Page(n) => spans.push(Span::styled(n.to_string(), enabled)),
                PageItem::Ellipsis => spans.push(Span::styled(ctx.icons.ellipsis.clone(), disabled)),
            }
        }
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            "Next »",
            if bar.next_enabled { enabled } else { disabled },
        ));
        spans.push(Span::raw("   "));
    }

    spans.push(Span::raw(view.info.to_string()));
    spans.push(Span::styled(
        format!("   {} per page", view.per_page),
        Style::default().fg(Color::DarkGray),
    ));
    if let Some(counter) = view.selection_counter {
        spans.push(Span::styled(
            format!("   {}", counter),
            Style::default().fg(Color::Green),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_status(f: &mut Frame, area: Rect, message: Option<&str>) {
    let help = "/ search  ←/→ page  ↑/↓ row  space select  a all  h/l s sort  +/- size  e/E export  y copy  tab table  F5 log  q quit";
    let line = match message {
        Some(msg) => Line::from(Span::styled(
            msg.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))),
    };
    f.render_widget(Paragraph::new(line), area);
}

pub fn render_log_panel(f: &mut Frame, area: Rect, entries: &[LogEntry]) {
    let lines: Vec<Line> = entries
        .iter()
        .map(|e| {
            let color = match e.level.as_str() {
                "ERROR" => Color::Red,
                "WARN" => Color::Yellow,
                "DEBUG" | "TRACE" => Color::DarkGray,
                _ => Color::White,
            };
            Line::from(Span::styled(e.format_for_display(), Style::default().fg(color)))
        })
        .collect();

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Log (F5 to close)"),
    );
    f.render_widget(panel, area);
}
