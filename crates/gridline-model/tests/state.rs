//! Tests for the grid aggregate: creation, row mutation, selection,
//! derived-result publication, and version accounting.

use std::collections::BTreeMap;

use gridline_model::{
    CellValue, ColumnDefinition, DataType, GridError, GridState, SearchMode, SearchResult,
    UpdateMode,
};

fn schema() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("Id", DataType::Integer),
        ColumnDefinition::new("Name", DataType::Text),
    ]
}

fn record(pairs: Vec<(&str, CellValue)>) -> BTreeMap<String, CellValue> {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

#[test]
fn create_pads_with_typed_defaults() {
    let state = GridState::new(schema(), 3).expect("create");
    assert_eq!(state.row_count(), 3);
    assert_eq!(state.version(), 0);
    for row in state.rows() {
        assert_eq!(row.value("Id"), &CellValue::Int(0));
        assert_eq!(row.value("Name"), &CellValue::Text(String::new()));
    }
}

#[test]
fn create_rejects_bad_schemas() {
    assert!(matches!(
        GridState::new(vec![], 0),
        Err(GridError::EmptySchema)
    ));
    assert!(matches!(
        GridState::new(vec![ColumnDefinition::new("", DataType::Text)], 0),
        Err(GridError::EmptyColumnName)
    ));
    let duplicated = vec![
        ColumnDefinition::new("Name", DataType::Text),
        ColumnDefinition::new("name", DataType::Text),
    ];
    assert!(matches!(
        GridState::new(duplicated, 0),
        Err(GridError::DuplicateColumn { .. })
    ));
}

#[test]
fn add_then_delete_keeps_grid_consistent() {
    // Minimum of 3, add a row, delete row 0: the added row shifts down
    // and the version counts both mutations.
    let mut state = GridState::new(schema(), 3).expect("create");

    let at = state
        .add_row(
            record(vec![("Id", CellValue::Int(1)), ("Name", "A".into())]),
            None,
        )
        .expect("add");
    assert_eq!(at, 3);
    assert_eq!(state.row_count(), 4);

    state.delete_row(0).expect("delete");
    assert_eq!(state.row_count(), 3);
    assert_eq!(state.version(), 2);

    // The added row shifted to index 2 and is still intact.
    let added = state.row(2).expect("added row");
    assert_eq!(added.value("Id"), &CellValue::Int(1));
    assert_eq!(added.value("Name"), &CellValue::Text("A".into()));
}

#[test]
fn add_row_rejects_unknown_columns() {
    let mut state = GridState::new(schema(), 0).expect("create");
    let err = state
        .add_row(record(vec![("Nope", CellValue::Int(1))]), None)
        .unwrap_err();
    assert!(matches!(err, GridError::UnknownColumn { name } if name == "Nope"));
    assert_eq!(state.version(), 0, "failed add must not bump the version");
}

#[test]
fn add_row_coerces_values_to_declared_types() {
    let mut state = GridState::new(schema(), 0).expect("create");
    state
        .add_row(record(vec![("Id", "42".into())]), None)
        .expect("add");
    assert_eq!(state.row(0).unwrap().value("Id"), &CellValue::Int(42));

    let err = state
        .add_row(record(vec![("Id", "not a number".into())]), None)
        .unwrap_err();
    assert!(matches!(err, GridError::Coercion { .. }));
}

#[test]
fn add_row_at_index_shifts_rows() {
    let mut state = GridState::new(schema(), 2).expect("create");
    state
        .add_row(record(vec![("Name", "middle".into())]), Some(1))
        .expect("insert");
    assert_eq!(state.row_count(), 3);
    assert_eq!(
        state.row(1).unwrap().value("Name"),
        &CellValue::Text("middle".into())
    );

    let err = state.add_row(BTreeMap::new(), Some(99)).unwrap_err();
    assert!(matches!(err, GridError::RowOutOfRange { index: 99, .. }));
}

#[test]
fn update_row_merge_and_replace() {
    let mut state = GridState::new(schema(), 1).expect("create");
    state
        .update_row(
            0,
            record(vec![("Id", CellValue::Int(5)), ("Name", "x".into())]),
            UpdateMode::Merge,
        )
        .expect("merge");

    state
        .update_row(
            0,
            record(vec![("Name", "y".into())]),
            UpdateMode::Merge,
        )
        .expect("merge keeps others");
    assert_eq!(state.row(0).unwrap().value("Id"), &CellValue::Int(5));

    state
        .update_row(0, record(vec![("Name", "z".into())]), UpdateMode::Replace)
        .expect("replace resets others");
    assert_eq!(state.row(0).unwrap().value("Id"), &CellValue::Int(0));
    assert_eq!(
        state.row(0).unwrap().value("Name"),
        &CellValue::Text("z".into())
    );

    assert!(matches!(
        state.update_row(7, BTreeMap::new(), UpdateMode::Merge),
        Err(GridError::RowOutOfRange { index: 7, .. })
    ));
}

#[test]
fn set_value_rejects_read_only_columns() {
    let columns = vec![
        ColumnDefinition::new("Id", DataType::Integer).read_only(),
        ColumnDefinition::new("Name", DataType::Text),
    ];
    let mut state = GridState::new(columns, 1).expect("create");

    assert!(matches!(
        state.set_value(0, "Id", CellValue::Int(9)),
        Err(GridError::ReadOnlyColumn { .. })
    ));
    state
        .set_value(0, "Name", "ok".into())
        .expect("writable column");
    assert_eq!(state.version(), 1);
}

#[test]
fn delete_shifts_selection_and_clears_derived() {
    let mut state = GridState::new(schema(), 4).expect("create");
    state.set_selected(2, true).expect("select");
    state
        .set_filtered_indices(Some(vec![0, 2]))
        .expect("publish filter");

    state.delete_row(0).expect("delete");

    // Selected row 2 became row 1; the filter result is gone.
    assert_eq!(state.selected_indices(), vec![1]);
    assert!(state.filtered_indices().is_none());
    assert_eq!(state.visible_row_count(), 3);
}

#[test]
fn pad_to_minimum_restores_floor() {
    let mut state = GridState::new(schema(), 2).expect("create");
    state.delete_row(0).expect("delete");
    state.delete_row(0).expect("delete");
    assert_eq!(state.row_count(), 0);

    assert_eq!(state.pad_to_minimum(), 2);
    assert_eq!(state.row_count(), 2);
    assert_eq!(state.pad_to_minimum(), 0, "already at minimum");
    assert_eq!(state.version(), 3, "no-op padding must not bump");
}

#[test]
fn import_replaces_rows_all_or_nothing() {
    let mut state = GridState::new(schema(), 3).expect("create");
    state.set_selected(0, true).expect("select");

    let err = state
        .import_rows(vec![
            record(vec![("Id", CellValue::Int(1))]),
            record(vec![("Bad", CellValue::Int(2))]),
        ])
        .unwrap_err();
    assert!(matches!(err, GridError::UnknownColumn { .. }));
    assert_eq!(state.row_count(), 3, "failed import must not modify rows");
    assert_eq!(state.version(), 0);

    let imported = state
        .import_rows(vec![record(vec![("Id", CellValue::Int(7))])])
        .expect("import");
    assert_eq!(imported, 3, "padded to minimum");
    assert_eq!(state.row(0).unwrap().value("Id"), &CellValue::Int(7));
    assert!(state.selected_indices().is_empty());
    assert_eq!(state.version(), 1);
}

#[test]
fn filtered_indices_are_validated() {
    let mut state = GridState::new(schema(), 2).expect("create");
    assert!(matches!(
        state.set_filtered_indices(Some(vec![0, 5])),
        Err(GridError::FilteredIndexOutOfRange { index: 5, .. })
    ));
    state
        .set_filtered_indices(Some(vec![1]))
        .expect("valid indices");
    assert_eq!(state.visible_row_count(), 1);
    state.set_filtered_indices(None).expect("clear");
    assert_eq!(state.visible_row_count(), 2);
}

#[test]
fn search_result_survives_until_next_mutation() {
    let mut state = GridState::new(schema(), 2).expect("create");
    state.set_search_result(SearchResult {
        indices: vec![1],
        total_matches: 1,
        term: "x".into(),
        mode: SearchMode::Contains,
        elapsed: std::time::Duration::from_millis(1),
    });
    assert!(state.search_result().is_some());

    state.add_row(BTreeMap::new(), None).expect("add");
    assert!(
        state.search_result().is_none(),
        "structural mutation clears published results"
    );
}

#[test]
fn apply_row_order_moves_rows_and_selection() {
    let mut state = GridState::new(schema(), 3).expect("create");
    for index in 0..3 {
        state
            .set_value(index, "Id", CellValue::Int(index as i64))
            .expect("seed");
    }
    state.set_selected(0, true).expect("select");

    state.apply_row_order(&[2, 0, 1]).expect("reorder");
    assert_eq!(state.row(0).unwrap().value("Id"), &CellValue::Int(2));
    assert_eq!(state.row(1).unwrap().value("Id"), &CellValue::Int(0));
    assert_eq!(state.selected_indices(), vec![1], "selection follows rows");

    assert!(matches!(
        state.apply_row_order(&[0, 0, 1]),
        Err(GridError::InvalidRowOrder { .. })
    ));
    assert!(matches!(
        state.apply_row_order(&[0, 1]),
        Err(GridError::InvalidRowOrder { .. })
    ));
}
