#[cfg(test)]
mod update_data_tests {
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};
    use tableview::data::data_view::{DataPayload, TableOptions, TableView};
    use tableview::data::datatable::{DataCell, DataRow, RowId};
    use tableview::state::{TableEvent, TableSubscriber};
    use tableview::TableError;

    const MARKUP: &str = r#"
        <table>
          <thead><tr><th><input type="checkbox"></th><th>No</th><th>City</th><th>Pop</th></tr></thead>
          <tbody>
            <tr data-id="jkt"><td><input type="checkbox" checked></td><td class="row-number">1</td><td>Jakarta</td><td>10562088</td></tr>
            <tr data-id="bdg"><td><input type="checkbox"></td><td class="row-number">2</td><td>Bandung</td><td>2444160</td></tr>
            <tr data-id="sby"><td><input type="checkbox"></td><td class="row-number">3</td><td>Surabaya</td><td>2874314</td></tr>
          </tbody>
        </table>"#;

    fn view() -> TableView {
        TableView::from_markup(MARKUP, "cities", TableOptions::default()).unwrap()
    }

    #[derive(Clone, Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<(String, TableEvent)>>>,
    }

    impl TableSubscriber for Recorder {
        fn on_table_event(&mut self, table: &str, event: &TableEvent) {
            self.events
                .borrow_mut()
                .push((table.to_string(), event.clone()));
        }

        fn name(&self) -> &str {
            "Recorder"
        }
    }

    #[test]
    fn test_checked_markup_seeds_selection() {
        let v = view();
        assert!(v.is_selected(&RowId::new("jkt")));
        assert_eq!(v.total_selected(), 1);
    }

    #[test]
    fn test_markup_fragment_replaces_rows() {
        let mut v = view();
        v.search("bandung");
        v.toggle_row(&RowId::new("bdg")).unwrap();

        let fragment = r#"
            <tr data-id="bdg"><td><input type="checkbox"></td><td class="row-number">1</td><td>Bandung</td><td>2444160</td></tr>
            <tr data-id="mdn"><td><input type="checkbox" checked></td><td class="row-number">2</td><td>Medan</td><td>2435252</td></tr>
        "#;
        let count = v
            .update_data(DataPayload::Markup(fragment.to_string()))
            .unwrap();
        assert_eq!(count, 2);

        // search and page reset with the new data
        assert_eq!(v.state().search_term, "");
        assert_eq!(v.page(), 1);
        // jkt is gone, bdg keeps its selection, mdn arrives checked
        assert!(!v.is_selected(&RowId::new("jkt")));
        assert!(v.is_selected(&RowId::new("bdg")));
        assert!(v.is_selected(&RowId::new("mdn")));
        assert_eq!(v.total_selected(), 2);
    }

    #[test]
    fn test_value_rows_are_widened() {
        let mut v = view();
        let rows = vec![
            DataRow::new("a", vec![DataCell::new("Bogor"), DataCell::new("1043070")]),
            DataRow::new("b", vec![DataCell::new("Depok"), DataCell::new("2056335")]),
        ];
        v.update_data(DataPayload::Rows(rows)).unwrap();
        let rendered = v.render();
        assert_eq!(rendered.rows.len(), 2);
        assert_eq!(rendered.rows[1].cells, vec!["", "2", "Depok", "2056335"]);
    }

    #[test]
    fn test_json_objects_and_arrays() {
        let mut v = view();
        v.update_data(DataPayload::Json(json!([
            {"id": "mks", "City": "Makassar", "Pop": 1423877, "selected": true},
            {"City": "Semarang", "Pop": "1653524"}
        ])))
        .unwrap();
        assert!(v.is_selected(&RowId::new("mks")));
        let rows = v.filtered_rows();
        assert_eq!(rows[0].cells[3].text, "1423877");
        assert_eq!(rows[1].id, RowId::positional(2));

        v.update_data(DataPayload::Json(json!([["Palembang", "1668848"]])))
            .unwrap();
        assert_eq!(v.filtered_rows()[0].cells[2].text, "Palembang");
    }

    #[test]
    fn test_bad_payload_leaves_state_unchanged() {
        let mut v = view();
        v.search("a");
        v.sort_by_column(3).unwrap();
        let before_state = v.state().clone();
        let before_rows = v.table().rows.clone();

        let bad = [
            DataPayload::Json(json!({"rows": []})),
            DataPayload::Json(json!([1, 2])),
            DataPayload::Markup("<div>not rows</div>".to_string()),
            DataPayload::Rows(vec![DataRow::from_texts("x", &["only one"; 3])]),
            DataPayload::Rows(vec![
                DataRow::from_texts("dup", &["A", "1"]),
                DataRow::from_texts("dup", &["B", "2"]),
            ]),
        ];
        for payload in bad {
            assert!(matches!(
                v.update_data(payload),
                Err(TableError::DataShape(_))
            ));
        }

        assert_eq!(v.state(), &before_state);
        assert_eq!(v.table().rows, before_rows);
        assert!(v.is_selected(&RowId::new("jkt")));
    }

    #[test]
    fn test_events_for_selection_and_data() {
        let mut v = view();
        let recorder = Recorder::default();
        v.subscribe(Box::new(recorder.clone()));

        v.toggle_row(&RowId::new("sby")).unwrap();
        v.update_data(DataPayload::Json(json!([{"id": "sby", "City": "Surabaya", "Pop": "1"}])))
            .unwrap();

        let events = recorder.events.borrow();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].0, "cities");
        assert_eq!(
            events[0].1,
            TableEvent::SelectionChanged {
                selected: vec![RowId::new("jkt"), RowId::new("sby")],
                total_selected: 2,
            }
        );
        assert_eq!(events[1].1, TableEvent::DataReplaced { rows: 1 });
        assert_eq!(
            events[2].1,
            TableEvent::SelectionChanged {
                selected: vec![RowId::new("sby")],
                total_selected: 1,
            }
        );
        assert_eq!(v.events().last_event(), Some(&events[2].1));
    }

    #[test]
    fn test_debounced_search_uses_latest_term() {
        let mut v = view();
        let start = Instant::now();
        v.queue_search("ja", start);
        v.queue_search("sura", start + Duration::from_millis(200));

        // 300ms after the first keystroke, but only 100ms after the last
        assert!(!v.poll_search(start + Duration::from_millis(300)));
        assert!(v.search_pending());
        assert_eq!(v.filtered_rows().len(), 3);

        assert!(v.poll_search(start + Duration::from_millis(500)));
        assert!(!v.search_pending());
        assert_eq!(v.state().search_term, "sura");
        assert_eq!(v.filtered_rows().len(), 1);

        assert!(!v.poll_search(start + Duration::from_millis(900)));
    }

    #[test]
    fn test_immediate_search_cancels_pending() {
        let mut v = view();
        let start = Instant::now();
        v.queue_search("jakarta", start);
        v.search("bandung");
        assert!(!v.search_pending());
        assert!(!v.poll_search(start + Duration::from_secs(1)));
        assert_eq!(v.state().search_term, "bandung");
    }
}
