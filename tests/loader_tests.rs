#[cfg(test)]
mod loader_tests {
    use std::fs;
    use tableview::data::csv_loader::{CsvLoadOptions, CsvLoader};
    use tableview::data::data_view::{TableOptions, TableView};
    use tableview::data::datatable::{ColumnKind, RowId};
    use tableview::data::markup_loader::MarkupLoader;
    use tableview::data::selection::SelectAllState;
    use tableview::registry::{init_tables, init_tables_strict, TableSource};
    use tableview::TableError;

    const CSV: &str = "id,Name,Price\nsku-1,Kopi,12000\nsku-2,\"Teh, manis\",8000\nsku-3,Roti,15000\n";

    fn csv_options() -> CsvLoadOptions {
        CsvLoadOptions {
            selection_column: true,
            row_numbers: true,
            id_column: Some("id".to_string()),
        }
    }

    #[test]
    fn test_csv_with_selection_and_numbers() {
        let table = CsvLoader::load_from_reader(CSV.as_bytes(), "menu", &csv_options()).unwrap();
        let kinds: Vec<ColumnKind> = table.columns.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Selection,
                ColumnKind::RowNumber,
                ColumnKind::Data,
                ColumnKind::Data,
                ColumnKind::Data
            ]
        );
        assert_eq!(table.rows[1].id, RowId::new("sku-2"));
        assert_eq!(table.rows[1].cells[3].text, "Teh, manis");
    }

    #[test]
    fn test_csv_without_id_column_is_positional() {
        let table =
            CsvLoader::load_from_reader(CSV.as_bytes(), "menu", &CsvLoadOptions::default()).unwrap();
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows[0].id, RowId::positional(1));
    }

    #[test]
    fn test_markup_with_controls() {
        let markup = r#"
            <table>
              <thead><tr><th>Name</th><th><select><option>All</option></select></th></tr></thead>
              <tbody>
                <tr><td>A &amp; B</td><td><button>Edit</button></td></tr>
              </tbody>
            </table>"#;
        let table = MarkupLoader::load_table(markup, "t").unwrap();
        assert_eq!(table.columns[1].kind, ColumnKind::Control);
        assert!(!table.columns[1].is_sortable());
        let row = &table.rows[0];
        assert_eq!(row.cells[0].text, "A & B");
        assert_eq!(row.cells[1].export_text(), "");
        assert_eq!(row.cells[1].full_text(), "Edit");
    }

    #[test]
    fn test_markup_without_tbody_fails() {
        let err = MarkupLoader::load_table("<table><tr><td>1</td></tr></table>", "t").unwrap_err();
        assert!(matches!(err, TableError::Construction(_)));
    }

    #[test]
    fn test_markup_rows_sharing_checkbox_value_load() {
        let markup = r#"
            <table>
              <thead><tr><th><input type="checkbox"></th><th>Item</th></tr></thead>
              <tbody>
                <tr><td><input type="checkbox" value="1"></td><td>Kopi</td></tr>
                <tr><td><input type="checkbox" value="1"></td><td>Teh</td></tr>
              </tbody>
            </table>"#;
        let mut view = TableView::from_markup(markup, "drinks", TableOptions::default()).unwrap();
        assert_eq!(view.table().row_count(), 2);

        // each row is selectable on its own
        view.toggle_row(&RowId::positional(2)).unwrap();
        assert!(!view.is_selected(&RowId::new("1")));
        assert_eq!(view.total_selected(), 1);
    }

    #[test]
    fn test_registry_mixes_sources_and_skips_failures() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("menu.csv");
        fs::write(&csv_path, CSV).unwrap();
        let html_path = dir.path().join("cities.html");
        fs::write(
            &html_path,
            "<table><thead><tr><th>City</th></tr></thead><tbody><tr><td>Jakarta</td></tr></tbody></table>",
        )
        .unwrap();

        let sources = vec![
            TableSource::File(csv_path),
            TableSource::File(dir.path().join("missing.csv")),
            TableSource::File(html_path),
        ];
        let options = TableOptions::default().with_per_page(2);
        let mut registry = init_tables(&sources, &options, &csv_options());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.failures().len(), 1);
        assert_eq!(registry.failures()[0].0, "missing");

        let menu = registry.find_mut("menu").unwrap();
        assert_eq!(menu.total_pages(), 2);
        menu.toggle_row(&RowId::new("sku-3")).unwrap();
        assert_eq!(registry.find("menu").unwrap().total_selected(), 1);

        // the markup table has no checkbox column
        assert_eq!(
            registry.find("cities").unwrap().select_all_state(),
            SelectAllState::Absent
        );

        assert!(registry.remove("menu").is_some());
        assert_eq!(registry.len(), 1);
        assert!(registry.find("menu").is_none());
    }

    #[test]
    fn test_strict_init_fails_when_nothing_loads() {
        let sources = vec![TableSource::Markup {
            name: "broken".to_string(),
            markup: "<p>no table</p>".to_string(),
        }];
        let result = init_tables_strict(&sources, &TableOptions::default(), &csv_options());
        assert!(matches!(result, Err(TableError::Construction(_))));
    }
}
