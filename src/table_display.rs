use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crossterm::style::Stylize;

use crate::config::config::IconConfig;
use crate::data::data_view::RenderedView;
use crate::data::datatable::ColumnKind;
use crate::data::pagination::PageItem;
use crate::data::row_sorter::SortDirection;
use crate::data::selection::SelectAllState;

/// Build a comfy-table rendition of one page
pub fn build_table(view: &RenderedView, icons: &IconConfig) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let headers: Vec<Cell> = view
        .headers
        .iter()
        .map(|h| {
            let label = match h.kind {
                ColumnKind::Selection => match view.select_all {
                    SelectAllState::Checked => icons.checked.clone(),
                    SelectAllState::Unchecked => icons.unchecked.clone(),
                    SelectAllState::Disabled => icons.disabled.clone(),
                    SelectAllState::Absent => String::new(),
                },
                _ => match h.sort {
                    Some(SortDirection::Ascending) => {
                        format!("{} {}", h.name, icons.sort_ascending)
                    }
                    Some(SortDirection::Descending) => {
                        format!("{} {}", h.name, icons.sort_descending)
                    }
                    None => h.name.clone(),
                },
            };
            Cell::new(label).add_attribute(Attribute::Bold)
        })
        .collect();
    table.set_header(headers);

    for row in &view.rows {
        let cells: Vec<Cell> = view
            .headers
            .iter()
            .zip(&row.cells)
            .map(|(h, text)| match h.kind {
                ColumnKind::Selection => Cell::new(if row.selected {
                    &icons.checked
                } else {
                    &icons.unchecked
                }),
                ColumnKind::RowNumber => Cell::new(text).fg(Color::DarkGrey),
                _ if row.selected => Cell::new(text).fg(Color::Green),
                _ => Cell::new(text),
            })
            .collect();
        table.add_row(cells);
    }

    table
}

/// Page buttons as one line of text, e.g. `« Prev 1 … 4 [5] 6 … 10 Next »`
pub fn pagination_line(view: &RenderedView, icons: &IconConfig) -> Option<String> {
    let bar = view.pagination.as_ref()?;
    let mut parts = vec!["« Prev".to_string()];
    for item in &bar.items {
        parts.push(match item {
            PageItem::Page(n) if *n == bar.current => format!("[{}]", n),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => icons.ellipsis.clone(),
        });
    }
    parts.push("Next »".to_string());
    Some(parts.join(" "))
}

/// Print one page of a view to stdout
pub fn display_view(view: &RenderedView, icons: &IconConfig) {
    println!("{}", view.name.clone().bold());

    if view.empty {
        println!("{}", "No data found".yellow());
    } else {
        println!("{}", build_table(view, icons));
    }

    if let Some(line) = pagination_line(view, icons) {
        println!("{}", line.cyan());
    }
    println!("{}", view.info.to_string().green());
    if let Some(counter) = view.selection_counter {
        println!("{}", counter.to_string().green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::data_view::{TableOptions, TableView};

    fn view(rows: usize) -> TableView {
        let mut markup = String::from(
            "<table><thead><tr><th><input type=\"checkbox\"></th><th>City</th></tr></thead><tbody>",
        );
        for i in 1..=rows {
            markup.push_str(&format!(
                "<tr data-id=\"c{i}\"><td><input type=\"checkbox\"></td><td>city {i}</td></tr>"
            ));
        }
        markup.push_str("</tbody></table>");
        TableView::from_markup(&markup, "cities", TableOptions::default()).unwrap()
    }

    #[test]
    fn test_table_has_page_rows_only() {
        let mut v = view(12);
        let rendered = v.render();
        let text = build_table(&rendered, &IconConfig::simple()).to_string();
        assert!(text.contains("city 10"));
        assert!(!text.contains("city 11"));
    }

    #[test]
    fn test_pagination_line_marks_current_page() {
        let mut v = view(12);
        v.next_page();
        let rendered = v.render();
        assert_eq!(
            pagination_line(&rendered, &IconConfig::simple()).unwrap(),
            "« Prev 1 [2] Next »"
        );
    }

    #[test]
    fn test_single_page_has_no_pagination_line() {
        let mut v = view(3);
        let rendered = v.render();
        assert!(pagination_line(&rendered, &IconConfig::simple()).is_none());
    }
}
