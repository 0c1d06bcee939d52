//! Integration tests for colwright.

use std::io::Write;
use tempfile::{NamedTempFile, tempdir};

use colwright::output::{self, OutputFormat};
use colwright::{
    Cell, CollapseOptions, ConvertOptions, DateComponent, ExpandOptions, FailureKind, MergeOptions, MissingPolicy,
    OnError, OperationKind, OperationLog, Parser, ParserConfig, SemanticType, Session, SplitOptions,
    TransformEngine, TransformOperation, load_pipeline,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn open(content: &str) -> Session {
    let file = create_test_file(content);
    Session::open(file.path(), ParserConfig::default(), TransformEngine::new()).expect("Open failed")
}

// =============================================================================
// Import and Inference Tests
// =============================================================================

#[test]
fn test_open_csv_and_infer() {
    let session = open(
        "id,name,score,active,visited,tags\n\
         1,Alice,1.5,true,2024-03-15,\"[1, 2]\"\n\
         2,Bob,2,false,2024-03-16,\"[3]\"\n\
         3,Carol,NA,true,2024-03-17,\"[]\"\n",
    );

    let source = session.source().expect("source metadata");
    assert_eq!(source.format, "csv");
    assert_eq!(source.row_count, 3);
    assert_eq!(source.column_count, 6);

    let types = session.engine().infer_dataset(session.dataset());
    let expected = [
        ("id", SemanticType::Integer),
        ("name", SemanticType::String),
        ("score", SemanticType::Float),
        ("active", SemanticType::Boolean),
        ("visited", SemanticType::DateTime),
        ("tags", SemanticType::List),
    ];
    for (column, semantic_type) in expected {
        assert_eq!(types.get(column), Some(&semantic_type), "column {}", column);
    }
}

#[test]
fn test_tsv_auto_detect() {
    let session = open("sample\tvalue\nS1\t10\nS2\t20\n");
    assert_eq!(session.source().unwrap().format, "tsv");
    assert_eq!(session.dataset().get(1, "value"), Some(&Cell::Integer(20)));
}

#[test]
fn test_empty_file_is_error() {
    let file = create_test_file("");
    let result = Parser::new().parse_file(file.path());
    assert!(result.is_err());
}

// =============================================================================
// Transformation Workflow Tests
// =============================================================================

#[test]
fn test_datetime_merge_then_split() {
    let mut session = open(
        "visit_year,visit_month,visit_day,visit_hour\n\
         2024,3,15,9\n\
         2023,2,29,0\n",
    );

    let merge = MergeOptions::new(["visit_year", "visit_month", "visit_day", "visit_hour"], " ", "visit").datetime();
    let result = session.apply(&merge.into());
    assert!(result.success, "{}", result.summary());
    assert_eq!(result.rows_affected, 1);
    assert_eq!(result.null_count, 1);
    assert_eq!(
        session.dataset().get(0, "visit").map(Cell::to_string),
        Some("2024-03-15 09:00:00".to_string())
    );

    let split = SplitOptions::datetime("visit", [DateComponent::Quarter, DateComponent::Weekday]);
    let result = session.apply(&split.into());
    assert!(result.success);
    assert_eq!(session.dataset().get(0, "quarter"), Some(&Cell::Integer(1)));
    assert_eq!(session.dataset().get(0, "weekday"), Some(&Cell::Integer(4)));
    assert_eq!(session.dataset().get(1, "quarter"), Some(&Cell::Null));
    assert_eq!(session.history().len(), 2);
}

#[test]
fn test_missing_value_policies_from_file() {
    let session = open("a,b\nx,\n");
    let engine = session.engine();
    let expected = [
        (MissingPolicy::Skip, Cell::text("x")),
        (MissingPolicy::Empty, Cell::text("x-")),
        (MissingPolicy::NullString, Cell::text("x-NULL")),
        (MissingPolicy::Fail, Cell::Null),
    ];
    for (policy, cell) in expected {
        let mut log = OperationLog::new();
        let options = MergeOptions::new(["a", "b"], "-", "ab").with_missing_policy(policy);
        let (out, result) = engine.merge(session.dataset(), &options, &mut log);
        assert!(result.success);
        assert_eq!(out.get(0, "ab"), Some(&cell), "policy {:?}", policy);
    }
}

#[test]
fn test_json_detect_expand_and_collapse() {
    let mut session = open(
        "order,lines\n\
         1,\"[{'sku': 'A', 'qty': 2}, {'sku': 'B', 'qty': 1}]\"\n\
         2,\"{\"\"sku\"\": \"\"C\"\", \"\"qty\"\": 5}\"\n",
    );

    let detected = session.engine().detect_json(session.dataset());
    assert_eq!(detected.len(), 1);
    assert_eq!(detected[0].keys, vec!["qty", "sku"]);
    assert!(detected[0].is_nested);

    let expand = ExpandOptions::new("lines", ["sku", "qty"]).exploding();
    let result = session.apply(&expand.into());
    assert!(result.success);
    assert_eq!(result.rows_before, 2);
    assert_eq!(result.rows_after, 3);
    assert_eq!(
        session.dataset().column("lines_sku").unwrap().cells,
        vec![Cell::text("A"), Cell::text("B"), Cell::text("C")]
    );

    let collapse = CollapseOptions::new(["lines_sku", "lines_qty"], "packed").grouped_by("order");
    let result = session.apply(&collapse.into());
    assert!(result.success);
    assert_eq!(
        session.dataset().get(1, "packed"),
        Some(&Cell::text(r#"[{"lines_sku":"A","lines_qty":2},{"lines_sku":"B","lines_qty":1}]"#))
    );
}

#[test]
fn test_raise_failure_is_contained() {
    let mut session = open("code\n10\nA7\n12\n");
    let before = session.dataset().clone();

    let options = ConvertOptions::new("code", SemanticType::Integer).on_error(OnError::Raise);
    let result = session.apply(&options.into());

    assert!(!result.success);
    assert_eq!(result.operation, OperationKind::ConvertDtype);
    assert_eq!(result.error_kind, Some(FailureKind::Conversion));
    assert!(result.error.as_deref().unwrap().contains("A7"));
    assert_eq!(session.dataset(), &before);
    assert!(session.history().is_empty());
}

#[test]
fn test_output_name_collision_rejected() {
    let mut session = open("first,last,full\nAda,Lovelace,x\n");
    let result = session.apply(&MergeOptions::new(["first", "last"], " ", "full").into());
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(FailureKind::Validation));
    assert_eq!(session.dataset().get(0, "full"), Some(&Cell::text("x")));
}

// =============================================================================
// Pipeline and Output Tests
// =============================================================================

#[test]
fn test_pipeline_file_round_trip() {
    let dir = tempdir().unwrap();
    let pipeline_path = dir.path().join("pipeline.json");
    let ops: Vec<TransformOperation> = vec![
        SplitOptions::new("name", "").into(),
        ConvertOptions::new("age", SemanticType::Float).into(),
    ];
    std::fs::write(&pipeline_path, serde_json::to_string_pretty(&ops).unwrap()).unwrap();

    let loaded = load_pipeline(&pipeline_path).unwrap();
    assert_eq!(loaded, ops);

    let mut session = open("name,age\nAda Lovelace,36\nAlan Turing,41\n");
    let results = session.apply_all(&loaded);
    assert!(results.iter().all(|r| r.success));
    assert_eq!(session.dataset().get(1, "name_part_2"), Some(&Cell::text("Turing")));
    assert_eq!(session.dataset().get(0, "age"), Some(&Cell::Float(36.0)));

    let log_path = dir.path().join("history.json");
    session.log().save(&log_path).unwrap();
    let log = OperationLog::load(&log_path).unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log.entries()[0].operation, OperationKind::Split);
}

#[test]
fn test_write_and_reload_csv() {
    let mut session = open("a,b\n1,x\n2,\n");
    let result = session.apply(&MergeOptions::new(["a", "b"], ":", "ab").into());
    assert!(result.success);

    let dir = tempdir().unwrap();
    let path = dir.path().join("out.tsv");
    output::write_file(session.dataset(), &path, OutputFormat::from_path(&path)).unwrap();

    let (reloaded, source) = Parser::new().parse_file(&path).unwrap();
    assert_eq!(source.format, "tsv");
    assert_eq!(reloaded.column_names(), vec!["a", "b", "ab"]);
    assert_eq!(reloaded.get(0, "ab"), Some(&Cell::text("1:x")));
    assert_eq!(reloaded.get(1, "ab"), Some(&Cell::text("2")));
}
