//! Integration tests for tally-core
//!
//! These tests drive the engine facade over the embedded rule tables.

use tally_core::{
    AnomalyReason, BudgetState, Engine, EngineConfig, TaskInput, TaskKind, Transaction,
};

fn engine() -> Engine {
    Engine::embedded().expect("embedded config should load")
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn test_unmatched_input_is_fallback_every_time() {
    let engine = engine();

    let first = engine.classify_expense("사무실 화분 구입");
    for _ in 0..5 {
        assert_eq!(engine.classify_expense("사무실 화분 구입"), first);
    }
    assert!(!first.matched);
    assert_eq!(first.label, "미분류");
    assert_eq!(first.code.as_deref(), Some("9999"));
    assert_eq!(first.confidence, 0.5);

    let receipt = engine.classify_receipt("IMG_0042.png");
    assert_eq!(receipt.label, "일반관리비");
    assert_eq!(receipt.confidence, 0.70);
    assert_eq!(receipt.explanation.as_deref(), Some("영수증 내용 (Mock OCR)"));
}

#[test]
fn test_earlier_rule_wins_on_overlap() {
    let engine = engine();

    // "커피" (welfare) comes before "택시" (travel) in the table
    let result = engine.classify_expense("택시 타고 커피 사옴");
    assert_eq!(result.label, "복리후생비");
    assert_eq!(result.confidence, 0.9);

    let receipt = engine.classify_receipt("cafe_near_taxi_stand.jpg");
    assert_eq!(receipt.label, "복리후생비");
}

#[test]
fn test_expense_table_defaults() {
    let engine = engine();

    let cases = [
        ("지하철 정기권", "여비교통비", 0.95),
        ("모니터 구매", "비품비", 0.85),
        ("3월 전기 요금", "공과금", 0.98),
        ("Team MEAL", "복리후생비", 0.9),
    ];
    for (input, label, confidence) in cases {
        let result = engine.classify_expense(input);
        assert_eq!(result.label, label, "input: {}", input);
        assert_eq!(result.confidence, confidence, "input: {}", input);
        assert_eq!(result.code.as_deref(), Some("5000"));
    }
}

#[test]
fn test_business_is_not_bus_fare() {
    let result = engine().classify_expense("business lunch");
    assert_eq!(result.label, "미분류");
}

// =============================================================================
// Anomaly detection
// =============================================================================

#[test]
fn test_large_domestic_amount_flagged_for_amount() {
    let verdict = engine()
        .detect_anomaly(&Transaction::new(1_500_000.0, "domestic", "2024-03-01"))
        .unwrap();

    assert!(verdict.is_anomaly());
    assert_eq!(verdict.confidence(), 0.95);
    assert!(matches!(
        verdict.reason(),
        Some(AnomalyReason::AmountAboveCeiling { .. })
    ));
}

#[test]
fn test_small_overseas_amount_flagged_for_category() {
    let verdict = engine()
        .detect_anomaly(&Transaction::new(5_000.0, "overseas travel", ""))
        .unwrap();

    assert!(verdict.is_anomaly());
    assert_eq!(verdict.confidence(), 0.88);
    assert!(matches!(
        verdict.reason(),
        Some(AnomalyReason::FlaggedCategory { .. })
    ));
}

#[test]
fn test_amount_check_precedes_category_check() {
    let verdict = engine()
        .detect_anomaly(&Transaction::new(2_000_000.0, "해외 출장", ""))
        .unwrap();
    assert!(matches!(
        verdict.reason(),
        Some(AnomalyReason::AmountAboveCeiling { .. })
    ));
}

#[test]
fn test_ceiling_itself_is_normal() {
    let verdict = engine()
        .detect_anomaly(&Transaction::new(1_000_000.0, "식대", ""))
        .unwrap();
    assert!(!verdict.is_anomaly());
    assert_eq!(verdict.confidence(), 0.92);
}

// =============================================================================
// Forecasting
// =============================================================================

#[test]
fn test_reference_forecast() {
    let engine = engine();
    let state = BudgetState::new("개발팀", 500_000.0, 1_000_000.0, 100).with_total_days(365);

    let report = engine.forecast_budget(&state).unwrap();

    assert_eq!(report.forecast.daily_average, 5_000.0);
    assert_eq!(report.forecast.projected_spent, 1_825_000.0);
    assert!(report.forecast.will_exceed);
    assert_eq!(
        report.alert_message,
        "⚠️ 현재 추세로는 예산 1,000,000원을 825,000원 초과할 것으로 예상됩니다."
    );
}

#[test]
fn test_zero_days_elapsed_forecast() {
    let forecast = engine()
        .forecast_budget(&BudgetState::new("영업팀", 900_000.0, 1_000_000.0, 0))
        .unwrap()
        .forecast;

    assert_eq!(forecast.daily_average, 0.0);
    assert_eq!(forecast.projected_spent, 0.0);
    assert!(!forecast.will_exceed);
}

// =============================================================================
// Knowledge and documents
// =============================================================================

#[test]
fn test_knowledge_hit_and_miss() {
    let engine = engine();

    let hit = engine.ask("연차 휴가는 며칠인가요?");
    assert_eq!(hit.confidence, 0.95);
    assert_eq!(hit.sources, vec!["사내규정.pdf"]);

    let miss = engine.ask("점심 메뉴 추천해줘");
    assert_eq!(miss.confidence, 0.0);
    assert!(miss.sources.is_empty());

    let outcome = engine
        .run(&TaskInput::Knowledge {
            question: "점심 메뉴 추천해줘".to_string(),
        })
        .unwrap();
    assert_eq!(outcome.confidence, 0.0);
    assert!(outcome.evidence.is_empty());
}

#[test]
fn test_sequential_uploads_listed_in_order() {
    let engine = engine();
    let names = ["a.pdf", "b.docx", "a.pdf", "c.txt"];

    for (i, name) in names.iter().enumerate() {
        let receipt = engine.register_document(name, &vec![0u8; i * 10]);
        assert_eq!(receipt.record.size, i * 10);
    }

    let listing = engine.list_documents();
    assert_eq!(listing.total, names.len());
    let listed: Vec<&str> = listing.documents.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(listed, names);
}

// =============================================================================
// Facade
// =============================================================================

#[test]
fn test_every_task_has_label_confidence_and_explanation() {
    let engine = engine();
    let inputs = vec![
        TaskInput::Receipt {
            filename: String::new(),
        },
        TaskInput::Expense {
            description: String::new(),
        },
        TaskInput::Anomaly(Transaction::new(0.0, "", "")),
        TaskInput::Forecast(BudgetState::new("", 0.0, 1.0, 0)),
        TaskInput::Knowledge {
            question: String::new(),
        },
    ];

    for input in &inputs {
        let outcome = engine.run(input).unwrap();
        assert_eq!(outcome.task, input.kind());
        assert!(!outcome.label.is_empty(), "task {}", outcome.task);
        assert!(!outcome.explanation.is_empty(), "task {}", outcome.task);
        assert!((0.0..=1.0).contains(&outcome.confidence));
    }
}

#[test]
fn test_override_config_changes_engine() {
    let config = EngineConfig::from_toml(
        r#"
[anomaly]
amount_ceiling = 10000.0
"#,
    )
    .unwrap();
    let engine = Engine::new(config);

    let outcome = engine
        .run(&TaskInput::decode(TaskKind::Anomaly, serde_json::json!({"amount": 20000.0, "category": "식대"})).unwrap())
        .unwrap();
    assert_eq!(outcome.label, "anomaly");
}
