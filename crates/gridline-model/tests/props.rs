//! Property tests for the aggregate invariants: version accounting and
//! filtered-index validity.

use std::collections::BTreeMap;

use proptest::prelude::*;

use gridline_model::{CellValue, ColumnDefinition, DataType, GridState};

fn schema() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("Id", DataType::Integer),
        ColumnDefinition::new("Name", DataType::Text),
    ]
}

proptest! {
    /// The version after any mutation sequence equals the number of
    /// successful mutating calls since creation.
    #[test]
    fn version_counts_mutating_calls(ops in proptest::collection::vec(0u8..3u8, 0..40)) {
        let mut state = GridState::new(schema(), 2).expect("create");
        let mut mutations = 0u64;

        for op in ops {
            match op {
                0 => {
                    state.add_row(BTreeMap::new(), None).expect("add");
                    mutations += 1;
                }
                1 => {
                    if state.row_count() > 0 {
                        state.delete_row(0).expect("delete");
                        mutations += 1;
                    }
                }
                _ => {
                    if state.row_count() > 0 {
                        state
                            .set_value(0, "Name", CellValue::from("edited"))
                            .expect("edit");
                        mutations += 1;
                    }
                }
            }
            prop_assert_eq!(state.version(), mutations);
        }
    }

    /// Published filtered indices are always a subset of the row range,
    /// and the visible row count matches whichever source is active.
    #[test]
    fn visible_count_tracks_filter(
        rows in 1usize..30,
        raw in proptest::collection::vec(0usize..40, 0..30),
    ) {
        let mut state = GridState::new(schema(), rows).expect("create");

        let mut indices: Vec<usize> = raw.into_iter().filter(|&i| i < rows).collect();
        indices.sort_unstable();
        indices.dedup();

        state.set_filtered_indices(Some(indices.clone())).expect("subset accepted");
        prop_assert_eq!(state.visible_row_count(), indices.len());
        for &index in state.filtered_indices().unwrap_or(&[]) {
            prop_assert!(index < state.row_count());
        }

        state.set_filtered_indices(None).expect("clear");
        prop_assert_eq!(state.visible_row_count(), rows);
    }

    /// Out-of-range indices are rejected wholesale.
    #[test]
    fn oversized_filter_indices_rejected(rows in 1usize..10, beyond in 0usize..5) {
        let mut state = GridState::new(schema(), rows).expect("create");
        let result = state.set_filtered_indices(Some(vec![rows + beyond]));
        prop_assert!(result.is_err());
        prop_assert!(state.filtered_indices().is_none());
    }
}
