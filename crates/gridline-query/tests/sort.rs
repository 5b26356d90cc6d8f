//! Sort tests: stability, multi-key ordering, missing placement, and
//! the filtered-view/physical-reorder split.

use std::collections::BTreeMap;

use gridline_model::{
    CellValue, ColumnDefinition, DataType, FilterExpression, FilterOperator, GridState,
    LogicalOperator, UpdateMode,
};
use gridline_query::{QueryEngine, QueryError, SortKey};

fn grid(rows: &[(&str, i64)]) -> GridState {
    let columns = vec![
        ColumnDefinition::new("Group", DataType::Text),
        ColumnDefinition::new("Value", DataType::Integer),
    ];
    let mut state = GridState::new(columns, 0).expect("create");
    for &(group, value) in rows {
        let record: BTreeMap<String, CellValue> = [
            ("Group".to_string(), CellValue::from(group)),
            ("Value".to_string(), CellValue::Int(value)),
        ]
        .into();
        state.add_row(record, None).expect("add");
    }
    state
}

fn values(state: &GridState) -> Vec<i64> {
    state
        .rows()
        .iter()
        .map(|row| match row.value("Value") {
            CellValue::Int(n) => *n,
            other => panic!("unexpected cell {other:?}"),
        })
        .collect()
}

#[test]
fn single_key_sort_orders_rows() {
    let mut state = grid(&[("b", 3), ("a", 1), ("c", 2)]);
    let engine = QueryEngine::new();

    engine
        .sort(&mut state, &[SortKey::ascending("Value")])
        .expect("sort");
    assert_eq!(values(&state), vec![1, 2, 3]);

    engine
        .sort(&mut state, &[SortKey::descending("Value")])
        .expect("sort");
    assert_eq!(values(&state), vec![3, 2, 1]);
}

#[test]
fn resorting_by_a_duplicate_key_is_stable() {
    // Sort by Value first, then by Group (many duplicates): equal-Group
    // rows must keep their Value order from the previous sort.
    let mut state = grid(&[("x", 4), ("y", 1), ("x", 2), ("y", 3)]);
    let engine = QueryEngine::new();

    engine
        .sort(&mut state, &[SortKey::ascending("Value")])
        .expect("first sort");
    assert_eq!(values(&state), vec![1, 2, 3, 4]);

    engine
        .sort(&mut state, &[SortKey::ascending("Group")])
        .expect("second sort");
    // Groups: x rows carried values [2, 4], y rows [1, 3] - both in
    // previous relative order.
    assert_eq!(values(&state), vec![2, 4, 1, 3]);
}

#[test]
fn multi_key_sort_breaks_ties_left_to_right() {
    let mut state = grid(&[("b", 1), ("a", 2), ("b", 0), ("a", 1)]);
    let engine = QueryEngine::new();

    engine
        .sort(
            &mut state,
            &[SortKey::ascending("Group"), SortKey::descending("Value")],
        )
        .expect("sort");
    assert_eq!(values(&state), vec![2, 1, 1, 0]);
}

#[test]
fn physical_sort_is_a_structural_mutation() {
    let mut state = grid(&[("a", 2), ("b", 1)]);
    state.set_selected(0, true).expect("select");
    let version_before = state.version();
    let engine = QueryEngine::new();

    engine
        .sort(&mut state, &[SortKey::ascending("Value")])
        .expect("sort");

    assert_eq!(state.version(), version_before + 1);
    assert_eq!(
        state.selected_indices(),
        vec![1],
        "selection follows the moved row"
    );
}

#[test]
fn active_filter_sorts_the_view_only() {
    let mut state = grid(&[("a", 30), ("b", 10), ("c", 20), ("d", 5)]);
    let engine = QueryEngine::new();

    engine
        .apply_filters(
            &mut state,
            &[FilterExpression::new(
                "Value",
                FilterOperator::GreaterThan,
                9i64,
            )],
            LogicalOperator::And,
        )
        .expect("filter");
    assert_eq!(state.filtered_indices(), Some(&[0usize, 1, 2][..]));
    let version_before = state.version();

    engine
        .sort(&mut state, &[SortKey::ascending("Value")])
        .expect("sort");

    assert_eq!(
        state.filtered_indices(),
        Some(&[1usize, 2, 0][..]),
        "view reordered by value"
    );
    assert_eq!(values(&state), vec![30, 10, 20, 5], "rows untouched");
    assert_eq!(state.version(), version_before, "derived-only change");
}

#[test]
fn missing_values_follow_the_placement_flag() {
    let mut state = grid(&[("a", 2), ("b", 0), ("c", 1)]);
    state
        .update_row(
            1,
            [("Value".to_string(), CellValue::Missing)].into(),
            UpdateMode::Merge,
        )
        .expect("blank");
    let engine = QueryEngine::new();

    engine
        .sort(&mut state, &[SortKey::ascending("Value")])
        .expect("sort");
    assert!(state.rows()[0].value("Value").is_missing(), "missing first");

    engine
        .sort(&mut state, &[SortKey::ascending("Value").missing_last()])
        .expect("sort");
    assert!(
        state.rows()[2].value("Value").is_missing(),
        "missing last when requested"
    );
    assert_eq!(state.rows()[0].value("Value"), &CellValue::Int(1));
    assert_eq!(state.rows()[1].value("Value"), &CellValue::Int(2));
}

#[test]
fn unknown_sort_column_is_rejected() {
    let mut state = grid(&[("a", 1)]);
    let engine = QueryEngine::new();
    assert!(matches!(
        engine.sort(&mut state, &[SortKey::ascending("Nope")]),
        Err(QueryError::Grid(_))
    ));
}

#[test]
fn empty_key_list_is_a_no_op() {
    let mut state = grid(&[("a", 2), ("b", 1)]);
    let engine = QueryEngine::new();
    let version = state.version();
    engine.sort(&mut state, &[]).expect("no-op");
    assert_eq!(values(&state), vec![2, 1]);
    assert_eq!(state.version(), version);
}
