//! Rule layer tests: column rules (stock constructors and
//! short-circuiting), cross-column rules, custom rules, and finding
//! deduplication.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use gridline_model::{
    CellValue, ColumnDefinition, DataType, GridState, Severity, UpdateMode,
};
use gridline_validate::{
    CrossColumnRule, CustomRule, ValidationEngine, max_length, numeric_range, one_of, pattern,
};

fn date(year: i32, month: u32, day: u32) -> CellValue {
    CellValue::Date(NaiveDate::from_ymd_opt(year, month, day).expect("valid date"))
}

fn record(pairs: Vec<(&str, CellValue)>) -> BTreeMap<String, CellValue> {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

#[test]
fn required_column_flags_blank_values() {
    let columns = vec![
        ColumnDefinition::new("Name", DataType::Text).required(),
        ColumnDefinition::new("Note", DataType::Text),
    ];
    // Default padding leaves Name as empty text - blank counts as missing.
    let state = GridState::new(columns, 1).expect("create");
    let engine = ValidationEngine::new();

    let findings = engine.validate_row(&state, 0).expect("validate");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].column.as_deref(), Some("Name"));
    assert_eq!(findings[0].rule, "required");
    assert_eq!(findings[0].severity, Severity::Error);
    assert_eq!(findings[0].row_index, 0);
}

#[test]
fn stock_rules_flag_bad_values_and_pass_missing() {
    let columns = vec![
        ColumnDefinition::new("Code", DataType::Text)
            .rule(pattern("code-format", r"^[A-Z]{2}\d{3}$", "Code must look like AB123").expect("regex")),
        ColumnDefinition::new("Status", DataType::Text)
            .rule(one_of(vec!["open".into(), "closed".into()])),
        ColumnDefinition::new("Age", DataType::Integer).rule(numeric_range(0.0, 150.0)),
        ColumnDefinition::new("Comment", DataType::Text).rule(max_length(5)),
    ];
    let mut state = GridState::new(columns, 1).expect("create");
    state
        .update_row(
            0,
            record(vec![
                ("Code", "AB123".into()),
                ("Status", "OPEN".into()),
                ("Age", CellValue::Int(30)),
                ("Comment", CellValue::Missing),
            ]),
            UpdateMode::Merge,
        )
        .expect("good row");
    let engine = ValidationEngine::new();
    assert!(engine.validate_row(&state, 0).expect("validate").is_empty());

    state
        .update_row(
            0,
            record(vec![
                ("Code", "nope".into()),
                ("Status", "pending".into()),
                ("Age", CellValue::Int(200)),
                ("Comment", "much too long".into()),
            ]),
            UpdateMode::Merge,
        )
        .expect("bad row");
    let findings = engine.validate_row(&state, 0).expect("validate");
    let rules: Vec<&str> = findings.iter().map(|finding| finding.rule.as_str()).collect();
    assert_eq!(
        rules,
        vec!["code-format", "one-of", "numeric-range", "max-length"]
    );
}

#[test]
fn first_failing_rule_wins_per_column() {
    let columns = vec![
        ColumnDefinition::new("Comment", DataType::Text)
            .rule(max_length(3))
            .rule(pattern("digits", r"^\d+$", "Comment must be numeric").expect("regex")),
    ];
    let mut state = GridState::new(columns, 1).expect("create");
    state
        .set_value(0, "Comment", "violates both".into())
        .expect("edit");
    let engine = ValidationEngine::new();

    let findings = engine.validate_row(&state, 0).expect("validate");
    assert_eq!(findings.len(), 1, "one finding per cell at most");
    assert_eq!(findings[0].rule, "max-length");
}

#[test]
fn date_ordering_rule_judges_present_pairs() {
    let columns = vec![
        ColumnDefinition::new("Start", DataType::Date),
        ColumnDefinition::new("End", DataType::Date),
    ];
    let mut state = GridState::new(columns, 1).expect("create");
    let mut engine = ValidationEngine::new();
    engine.add_cross_rule(CrossColumnRule::date_ordering("Start", "End"));

    // Both dates missing: nothing to judge.
    assert!(engine.validate_row(&state, 0).expect("validate").is_empty());

    state
        .update_row(
            0,
            record(vec![("Start", date(2024, 3, 1)), ("End", date(2024, 2, 1))]),
            UpdateMode::Merge,
        )
        .expect("edit");
    let findings = engine.validate_row(&state, 0).expect("validate");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, "date-ordering");
    assert!(findings[0].column.is_none(), "row-level finding");

    state
        .update_row(
            0,
            record(vec![("End", date(2024, 4, 1))]),
            UpdateMode::Merge,
        )
        .expect("fix");
    assert!(engine.validate_row(&state, 0).expect("validate").is_empty());
}

#[test]
fn fields_equal_and_requires_together() {
    let columns = vec![
        ColumnDefinition::new("A", DataType::Text),
        ColumnDefinition::new("B", DataType::Text),
        ColumnDefinition::new("Unit", DataType::Text),
        ColumnDefinition::new("Amount", DataType::Text),
    ];
    let mut state = GridState::new(columns, 1).expect("create");
    let mut engine = ValidationEngine::new();
    engine.add_cross_rule(CrossColumnRule::fields_equal("A", "B"));
    engine.add_cross_rule(CrossColumnRule::requires_together("Amount", "Unit"));

    state
        .update_row(
            0,
            record(vec![
                ("A", "x".into()),
                ("B", "y".into()),
                ("Amount", "5".into()),
                ("Unit", CellValue::Missing),
            ]),
            UpdateMode::Merge,
        )
        .expect("edit");

    let findings = engine.validate_row(&state, 0).expect("validate");
    let rules: Vec<&str> = findings.iter().map(|finding| finding.rule.as_str()).collect();
    assert!(rules.contains(&"fields-equal"));
    assert!(rules.contains(&"requires-together"));
}

#[test]
fn failing_custom_rule_becomes_a_finding_not_an_error() {
    let columns = vec![ColumnDefinition::new("Age", DataType::Integer)];
    let mut state = GridState::new(columns, 1).expect("create");
    state.set_value(0, "Age", CellValue::Int(500)).expect("edit");

    let mut engine = ValidationEngine::new();
    engine.add_custom_rule(CustomRule::new(
        "age-plausible",
        "Age must be below 200",
        |row| Ok(matches!(row.value("Age"), CellValue::Int(age) if *age < 200)),
    ));
    engine.add_custom_rule(CustomRule::new("broken", "never evaluated", |_row| {
        Err(anyhow::anyhow!("backing service unavailable"))
    }));
    engine.add_custom_rule(CustomRule::warning(
        "advisory",
        "Prefer even ages",
        |row| Ok(matches!(row.value("Age"), CellValue::Int(age) if age % 2 == 0)),
    ));

    let findings = engine.validate_row(&state, 0).expect("validation itself succeeds");
    assert_eq!(findings.len(), 3);

    assert_eq!(findings[0].rule, "age-plausible");
    assert_eq!(findings[1].rule, "rule-failed");
    assert!(findings[1].message.contains("broken"));
    assert!(findings[1].message.contains("backing service unavailable"));
    assert_eq!(findings[2].severity, Severity::Warning);
}

#[test]
fn findings_are_deduplicated_by_column_and_message() {
    let columns = vec![ColumnDefinition::new("Age", DataType::Integer)];
    let state = GridState::new(columns, 1).expect("create");

    let mut engine = ValidationEngine::new();
    // Two distinct rules, same row-level message.
    engine.add_custom_rule(CustomRule::new("first", "row is suspicious", |_| Ok(false)));
    engine.add_custom_rule(CustomRule::new("second", "row is suspicious", |_| Ok(false)));

    let findings = engine.validate_row(&state, 0).expect("validate");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, "first", "first occurrence wins");
}
