use std::sync::Arc;
use std::thread;

use omnigraph_core::config::ConfidenceConfig;
use omnigraph_core::{
    ConfidenceEngine, ConfidenceError, ConfidenceLevel, EdgeType, RouteMatch, ScoringContext,
};

#[test]
fn test_import_statement_is_definite() {
    let evidence = ConfidenceEngine::default()
        .score(EdgeType::ImportStatement, &ScoringContext::new())
        .unwrap();
    assert_eq!(evidence.final_score(), 1.0);
    assert_eq!(evidence.level(), ConfidenceLevel::Definite);
}

#[test]
fn test_http_call_with_exact_typed_client() {
    let ctx = ScoringContext::new()
        .route_match(RouteMatch::Exact)
        .typed_client(true);
    let evidence = ConfidenceEngine::default().score(EdgeType::HttpCall, &ctx).unwrap();
    assert_eq!(evidence.final_score(), 1.0);
    assert_eq!(evidence.level(), ConfidenceLevel::Definite);
}

#[test]
fn test_default_base_table() {
    let engine = ConfidenceEngine::default();
    let expected = [
        (EdgeType::ImportStatement, 1.0),
        (EdgeType::TypeAnnotation, 1.0),
        (EdgeType::Inheritance, 1.0),
        (EdgeType::DirectCall, 0.95),
        (EdgeType::RouteExactMatch, 0.95),
        (EdgeType::FieldAccess, 0.85),
        (EdgeType::RoutePatternMatch, 0.8),
        (EdgeType::HttpCall, 0.8),
        (EdgeType::StringLiteralMatch, 0.7),
        (EdgeType::TaintFlow, 0.7),
        (EdgeType::IndirectCall, 0.6),
        (EdgeType::DynamicRoute, 0.5),
    ];
    for (edge_type, score) in expected {
        let evidence = engine.score(edge_type, &ScoringContext::new()).unwrap();
        assert_eq!(evidence.final_score(), score, "{edge_type}");
        assert!(evidence.explanation().starts_with(edge_type.as_str()));
    }
}

#[test]
fn test_explanation_lists_every_adjustment() {
    let ctx = ScoringContext::new()
        .match_count(3)
        .string_length(24)
        .url_pattern(true);
    let evidence = ConfidenceEngine::default()
        .score(EdgeType::StringLiteralMatch, &ctx)
        .unwrap();

    assert_eq!(evidence.adjustments().len(), 3);
    let parts: Vec<&str> = evidence.explanation().split("; ").collect();
    assert_eq!(parts.len(), 4);
    assert!(parts[1].contains("ambiguous"));
    assert!(parts[2].contains("24 chars"));
    assert!(parts[3].contains("URL"));
    // 0.7 - 0.2 + 0.1 + 0.1
    assert_eq!(evidence.final_score(), 0.7);
}

#[test]
fn test_clamped_at_zero() {
    let config = ConfidenceConfig::default().with_base_score(EdgeType::DynamicRoute, 0.1);
    let evidence = ConfidenceEngine::new(config)
        .score(EdgeType::DynamicRoute, &ScoringContext::new().match_count(5))
        .unwrap();
    assert_eq!(evidence.final_score(), 0.0);
    assert_eq!(evidence.level(), ConfidenceLevel::Uncertain);
    assert!(evidence.explanation().contains("clamped"));
}

#[test]
fn test_unknown_edge_type_tag() {
    let result = ConfidenceEngine::default().score_tag("maybe_calls", &ScoringContext::new());
    assert_eq!(result, Err(ConfidenceError::UnknownEdgeType("maybe_calls".to_string())));
}

#[test]
fn test_invalid_base_score_is_an_error() {
    for bad in [f64::NAN, 1.5, -0.1] {
        let config = ConfidenceConfig::default().with_base_score(EdgeType::DirectCall, bad);
        assert!(ConfidenceEngine::try_new(config.clone()).is_err());

        let engine = ConfidenceEngine::new(config);
        match engine.score(EdgeType::DirectCall, &ScoringContext::new()) {
            Err(ConfidenceError::InvalidScore { edge_type, .. }) => assert_eq!(edge_type, "direct_call"),
            other => panic!("expected InvalidScore for {bad}, got {other:?}"),
        }
        // Other rows of the table still score
        assert!(engine.score(EdgeType::ImportStatement, &ScoringContext::new()).is_ok());
    }
}

#[test]
fn test_try_new_accepts_default_table() {
    let engine = ConfidenceEngine::try_new(ConfidenceConfig::default()).unwrap();
    let evidence = engine.score(EdgeType::DirectCall, &ScoringContext::new()).unwrap();
    assert_eq!(evidence.final_score(), 0.95);
}

#[test]
fn test_classify() {
    assert_eq!(ConfidenceEngine::classify(1.0), ConfidenceLevel::Definite);
    assert_eq!(ConfidenceEngine::classify(0.95), ConfidenceLevel::High);
    assert_eq!(ConfidenceEngine::classify(0.6), ConfidenceLevel::Medium);
    assert_eq!(ConfidenceEngine::classify(0.4), ConfidenceLevel::Low);
    assert_eq!(ConfidenceEngine::classify(0.1), ConfidenceLevel::Uncertain);
}

#[test]
fn test_threshold_is_caller_defined() {
    assert!(ConfidenceEngine::requires_human_approval(0.79, 0.8));
    assert!(!ConfidenceEngine::requires_human_approval(0.79, 0.7));
    assert!(ConfidenceEngine::requires_human_approval(0.95, 1.0));
}

#[test]
fn test_context_from_json_ignores_unknown_keys() {
    let ctx: ScoringContext =
        serde_json::from_str(r#"{"route_match": "exact", "typed_client": true, "caller": "x"}"#).unwrap();
    assert_eq!(ctx.route_match, Some(RouteMatch::Exact));
    assert_eq!(ctx.typed_client, Some(true));
    assert_eq!(ctx.match_count, None);
}

#[test]
fn test_engine_shared_across_threads() {
    let config = Arc::new(ConfidenceConfig::default());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = ConfidenceEngine::from_shared(Arc::clone(&config));
            thread::spawn(move || {
                engine
                    .score(EdgeType::IndirectCall, &ScoringContext::new().match_count(i))
                    .map(|e| e.final_score())
            })
        })
        .collect();

    let scores: Vec<f64> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    assert_eq!(scores, vec![0.6, 0.6, 0.4, 0.4]);
}
