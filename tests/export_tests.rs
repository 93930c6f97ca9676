#[cfg(test)]
mod export_tests {
    use chrono::{TimeZone, Utc};
    use std::fs;
    use std::path::Path;
    use tableview::clipboard::{ClipboardManager, CopyMethod, MockClipboard};
    use tableview::data::data_exporter::DataExporter;
    use tableview::data::data_view::{Notice, TableOptions, TableView};
    use tableview::data::datatable::RowId;

    const MARKUP: &str = r#"
        <table>
          <thead>
            <tr>
              <th><input type="checkbox"></th>
              <th>No</th>
              <th>Product</th>
              <th>Notes</th>
              <th class="no-export">Internal</th>
              <th>Action <button>Sort</button></th>
            </tr>
          </thead>
          <tbody>
            <tr data-id="a"><td><input type="checkbox"></td><td class="row-number">1</td><td>Widget</td><td>a,"b"</td><td>x1</td><td>ok <button>Delete</button></td></tr>
            <tr data-id="b"><td><input type="checkbox"></td><td class="row-number">2</td><td>Gadget</td><td>tab	inside</td><td>x2</td><td>ok <button>Delete</button></td></tr>
            <tr data-id="c"><td><input type="checkbox"></td><td class="row-number">3</td><td>Doohickey</td><td>plain</td><td>x3</td><td>ok <button>Delete</button></td></tr>
          </tbody>
        </table>"#;

    fn view(dir: &Path) -> TableView {
        TableView::from_markup(
            MARKUP,
            "products",
            TableOptions::default().with_export_dir(dir),
        )
        .unwrap()
    }

    fn stamp() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap()
    }

    #[test]
    fn test_export_headers_skip_excluded_columns() {
        let dir = tempfile::tempdir().unwrap();
        let v = view(dir.path());
        assert_eq!(v.export_headers(), vec!["Product", "Notes", "Action"]);
    }

    #[test]
    fn test_configured_no_export_columns() {
        let dir = tempfile::tempdir().unwrap();
        let v = TableView::from_markup(
            MARKUP,
            "products",
            TableOptions::default()
                .with_export_dir(dir.path())
                .with_no_export_columns(vec!["notes".to_string()]),
        )
        .unwrap();
        assert_eq!(v.export_headers(), vec!["Product", "Action"]);
    }

    #[test]
    fn test_quoted_field_round_trips_through_csv_reader() {
        let dir = tempfile::tempdir().unwrap();
        let v = view(dir.path());
        let csv_text = v.filtered_csv();
        assert!(csv_text.contains(r#""a,""b""""#));

        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        let first = reader.records().next().unwrap().unwrap();
        assert_eq!(&first[0], "Widget");
        assert_eq!(&first[1], r#"a,"b""#);
        // control labels stay out of the export
        assert_eq!(&first[2], "ok");
    }

    #[test]
    fn test_export_selected_with_nothing_selected_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let v = view(dir.path());
        let notice = v.export_selected(stamp()).unwrap();
        assert_eq!(notice, Notice::NothingSelected);
        assert_eq!(
            notice.to_string(),
            "No data selected! Check the rows you want to export."
        );
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_selected_only_filtered_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut v = view(dir.path());
        v.toggle_row(&RowId::new("a")).unwrap();
        v.toggle_row(&RowId::new("c")).unwrap();
        v.search("doohickey");

        let Notice::ExportedSelected(file) = v.export_selected(stamp()).unwrap() else {
            panic!("expected a file");
        };
        assert_eq!(file.rows, 1);
        assert_eq!(file.mime_type, "text/csv");
        assert_eq!(
            file.path.file_name().unwrap().to_str().unwrap(),
            "selected-data-2025-03-04T05-06-07.csv"
        );
        let content = fs::read_to_string(&file.path).unwrap();
        assert_eq!(content, "Product,Notes,Action\nDoohickey,plain,ok");
    }

    #[test]
    fn test_export_all_spans_pages_and_avoids_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let mut v = view(dir.path());
        v.set_per_page(1).unwrap();
        v.set_page(2);

        let Notice::Exported(first) = v.export_all(stamp()).unwrap() else {
            panic!("expected a file");
        };
        let Notice::Exported(second) = v.export_all(stamp()).unwrap() else {
            panic!("expected a file");
        };
        assert_eq!(first.rows, 3);
        assert_ne!(first.path, second.path);
        assert!(second
            .path
            .to_string_lossy()
            .ends_with("table-export-2025-03-04T05-06-07-1.csv"));
    }

    #[test]
    fn test_copy_is_tsv_of_filtered_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut v = view(dir.path());
        v.search("gadget");
        let native = MockClipboard::new();
        let mut clipboard =
            ClipboardManager::new(Box::new(native.clone()), Box::new(MockClipboard::new()));

        let notice = v.copy_to_clipboard(&mut clipboard).unwrap();
        assert_eq!(
            notice,
            Notice::Copied {
                rows: 1,
                method: CopyMethod::Native
            }
        );
        assert_eq!(
            native.content().unwrap(),
            "Product\tNotes\tAction\nGadget\ttab inside\tok"
        );
    }

    #[test]
    fn test_copy_fallback_gives_same_notice() {
        let dir = tempfile::tempdir().unwrap();
        let v = view(dir.path());
        let fallback = MockClipboard::new();
        let mut clipboard =
            ClipboardManager::new(Box::new(MockClipboard::failing()), Box::new(fallback.clone()));

        let notice = v.copy_to_clipboard(&mut clipboard).unwrap();
        assert_eq!(
            notice,
            Notice::Copied {
                rows: 3,
                method: CopyMethod::Fallback
            }
        );
        assert_eq!(
            notice.to_string(),
            "Data copied to clipboard (Excel-ready)! Paste directly into Excel."
        );
        assert!(fallback.content().unwrap().starts_with("Product\tNotes"));
    }

    #[test]
    fn test_copy_fails_when_both_paths_fail() {
        let dir = tempfile::tempdir().unwrap();
        let v = view(dir.path());
        let mut clipboard = ClipboardManager::new(
            Box::new(MockClipboard::failing()),
            Box::new(MockClipboard::failing()),
        );
        assert!(v.copy_to_clipboard(&mut clipboard).is_err());
    }

    #[test]
    fn test_csv_quoting_rules() {
        assert_eq!(DataExporter::escape_csv_field("plain"), "plain");
        assert_eq!(DataExporter::escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(DataExporter::escape_csv_field("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(DataExporter::escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
