//! Confidence scoring for graph relationships.
//!
//! The [`ConfidenceEngine`] maps a relationship kind plus situational
//! context to a reliability score in `[0, 1]` and a human-readable
//! explanation of how the score was reached.
//!
//! # Scoring
//!
//! 1. Look up the edge type's base score in the injected [`ConfidenceConfig`].
//! 2. Apply contextual adjustments in a fixed order: exact route match,
//!    typed client, ambiguity, long string literal, URL-shaped literal.
//! 3. Sum, clamp to `[0, 1]`, round to six decimals.
//!
//! The engine is immutable after construction, so one instance (or cheap
//! clones of it) can be shared freely across threads.
//!
//! # Example
//!
//! ```
//! use omnigraph_core::{ConfidenceEngine, ConfidenceLevel, EdgeType, ScoringContext};
//!
//! let engine = ConfidenceEngine::default();
//! let evidence = engine.score(EdgeType::ImportStatement, &ScoringContext::new()).unwrap();
//! assert_eq!(evidence.final_score(), 1.0);
//! assert_eq!(evidence.level(), ConfidenceLevel::Definite);
//! ```

mod context;
mod level;

pub use context::{RouteMatch, ScoringContext};
pub use level::ConfidenceLevel;

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfidenceConfig, ConfigError, SCORE_DECIMALS};
use crate::ontology::EdgeType;

/// Errors raised by the confidence engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfidenceError {
    /// The edge type is outside the vocabulary or has no base score.
    #[error("Unknown edge type: {0}")]
    UnknownEdgeType(String),

    /// The rule table produced a value outside `[0, 1]` or a NaN.
    #[error("Invalid score {value} for {edge_type}: rule table values must lie in [0, 1]")]
    InvalidScore { edge_type: String, value: f64 },
}

/// One contextual contribution to a score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adjustment {
    /// Signed magnitude.
    pub delta: f64,
    /// Why it was applied.
    pub reason: String,
}

/// Result of scoring one relationship.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceEvidence {
    edge_type: EdgeType,
    base_score: f64,
    adjustments: Vec<Adjustment>,
    final_score: f64,
    explanation: String,
}

impl ConfidenceEvidence {
    pub fn edge_type(&self) -> EdgeType {
        self.edge_type
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    /// Applied adjustments, in evaluation order.
    pub fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }

    /// Clamped score in `[0, 1]`.
    pub fn final_score(&self) -> f64 {
        self.final_score
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.final_score)
    }
}

/// Stateless scorer over an injected rule table.
#[derive(Debug, Clone, Default)]
pub struct ConfidenceEngine {
    config: Arc<ConfidenceConfig>,
}

impl ConfidenceEngine {
    /// Create an engine over the given rule table.
    ///
    /// The table is not checked here; a base score outside `[0, 1]` fails
    /// the [`Self::score`] calls that reach it. Use [`Self::try_new`] to
    /// reject the whole table up front.
    pub fn new(config: ConfidenceConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Create an engine over a table that passes [`ConfidenceConfig::validate`].
    pub fn try_new(config: ConfidenceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Create an engine sharing an existing rule table.
    pub fn from_shared(config: Arc<ConfidenceConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConfidenceConfig {
        &self.config
    }

    /// Score a relationship of the given type.
    pub fn score(
        &self,
        edge_type: EdgeType,
        context: &ScoringContext,
    ) -> Result<ConfidenceEvidence, ConfidenceError> {
        let base_score = self
            .config
            .base_score(edge_type)
            .ok_or_else(|| ConfidenceError::UnknownEdgeType(edge_type.to_string()))?;

        let invalid = |value: f64| ConfidenceError::InvalidScore {
            edge_type: edge_type.to_string(),
            value,
        };
        if !(0.0..=1.0).contains(&base_score) {
            return Err(invalid(base_score));
        }

        let adjustments = self.adjustments_for(context);
        let raw: f64 = base_score + adjustments.iter().map(|a| a.delta).sum::<f64>();
        if raw.is_nan() {
            return Err(invalid(raw));
        }
        let final_score = round_score(raw.clamp(0.0, 1.0));

        let mut parts = vec![format!("{} base score {:.2}", edge_type, base_score)];
        parts.extend(adjustments.iter().map(|a| a.reason.clone()));
        if raw > 1.0 || raw < 0.0 {
            parts.push(format!("clamped to {:.2}", final_score));
        }

        tracing::trace!(
            edge_type = %edge_type,
            base = base_score,
            final_score,
            adjustments = adjustments.len(),
            "scored relationship"
        );

        Ok(ConfidenceEvidence {
            edge_type,
            base_score,
            adjustments,
            final_score,
            explanation: parts.join("; "),
        })
    }

    /// Score a relationship named by its edge-type tag.
    pub fn score_tag(
        &self,
        edge_type: &str,
        context: &ScoringContext,
    ) -> Result<ConfidenceEvidence, ConfidenceError> {
        self.score(edge_type.parse()?, context)
    }

    /// Classify a score into a level.
    pub fn classify(score: f64) -> ConfidenceLevel {
        ConfidenceLevel::from_score(score)
    }

    /// True iff `score` is below `threshold`.
    pub fn requires_human_approval(score: f64, threshold: f64) -> bool {
        score < threshold
    }

    /// [`Self::requires_human_approval`] against the configured threshold.
    pub fn needs_review(&self, score: f64) -> bool {
        Self::requires_human_approval(score, self.config.approval_threshold)
    }

    fn adjustments_for(&self, context: &ScoringContext) -> Vec<Adjustment> {
        let rules = &self.config.adjustments;
        let mut adjustments = Vec::new();

        if context.route_match == Some(RouteMatch::Exact) {
            adjustments.push(Adjustment {
                delta: rules.exact_route_bonus,
                reason: format!("exact route match (+{:.2})", rules.exact_route_bonus),
            });
        }

        if context.typed_client == Some(true) {
            adjustments.push(Adjustment {
                delta: rules.typed_client_bonus,
                reason: format!("typed client (+{:.2})", rules.typed_client_bonus),
            });
        }

        if let Some(count) = context.match_count.filter(|&n| n > 1) {
            adjustments.push(Adjustment {
                delta: -rules.ambiguity_penalty,
                reason: format!(
                    "ambiguous: {} candidate targets (-{:.2})",
                    count, rules.ambiguity_penalty
                ),
            });
        }

        if let Some(length) = context
            .string_length
            .filter(|&n| n > rules.long_string_threshold)
        {
            adjustments.push(Adjustment {
                delta: rules.long_string_bonus,
                reason: format!(
                    "specific literal of {} chars (+{:.2})",
                    length, rules.long_string_bonus
                ),
            });
        }

        if context.is_url_pattern == Some(true) {
            adjustments.push(Adjustment {
                delta: rules.url_pattern_bonus,
                reason: format!("URL-shaped literal (+{:.2})", rules.url_pattern_bonus),
            });
        }

        adjustments
    }
}

fn round_score(score: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    (score * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_statement_is_definite() {
        let engine = ConfidenceEngine::default();
        let evidence = engine.score(EdgeType::ImportStatement, &ScoringContext::new()).unwrap();
        assert_eq!(evidence.final_score(), 1.0);
        assert_eq!(evidence.level(), ConfidenceLevel::Definite);
        assert!(evidence.adjustments().is_empty());
    }

    #[test]
    fn test_http_call_clamps_to_one() {
        let engine = ConfidenceEngine::default();
        let ctx = ScoringContext::new()
            .route_match(RouteMatch::Exact)
            .typed_client(true);
        let evidence = engine.score(EdgeType::HttpCall, &ctx).unwrap();
        assert_eq!(evidence.base_score(), 0.8);
        assert_eq!(evidence.adjustments().len(), 2);
        assert_eq!(evidence.final_score(), 1.0);
        assert!(evidence.explanation().contains("exact route match"));
        assert!(evidence.explanation().contains("typed client"));
    }

    #[test]
    fn test_adjustment_order_is_fixed() {
        let engine = ConfidenceEngine::default();
        let ctx = ScoringContext::new()
            .url_pattern(true)
            .string_length(40)
            .match_count(3)
            .typed_client(true)
            .route_match(RouteMatch::Exact);
        let evidence = engine.score(EdgeType::StringLiteralMatch, &ctx).unwrap();
        let deltas: Vec<f64> = evidence.adjustments().iter().map(|a| a.delta).collect();
        assert_eq!(deltas, vec![0.15, 0.05, -0.20, 0.10, 0.10]);
        // 0.7 + 0.15 + 0.05 - 0.2 + 0.1 + 0.1
        assert_eq!(evidence.final_score(), 0.9);
    }

    #[test]
    fn test_ambiguity_lowers_score() {
        let engine = ConfidenceEngine::default();
        let evidence = engine
            .score(EdgeType::IndirectCall, &ScoringContext::new().match_count(2))
            .unwrap();
        assert_eq!(evidence.final_score(), 0.4);
        assert_eq!(evidence.level(), ConfidenceLevel::Low);

        let single = engine
            .score(EdgeType::IndirectCall, &ScoringContext::new().match_count(1))
            .unwrap();
        assert_eq!(single.final_score(), 0.6);
    }

    #[test]
    fn test_short_string_gets_no_bonus() {
        let engine = ConfidenceEngine::default();
        let evidence = engine
            .score(EdgeType::StringLiteralMatch, &ScoringContext::new().string_length(10))
            .unwrap();
        assert_eq!(evidence.final_score(), 0.7);
    }

    #[test]
    fn test_missing_table_entry_is_unknown() {
        let engine = ConfidenceEngine::new(ConfidenceConfig::from_base_scores([(EdgeType::DirectCall, 0.9)]));
        assert!(engine.score(EdgeType::DirectCall, &ScoringContext::new()).is_ok());
        assert_eq!(
            engine.score(EdgeType::HttpCall, &ScoringContext::new()),
            Err(ConfidenceError::UnknownEdgeType("http_call".to_string()))
        );
    }

    #[test]
    fn test_score_tag() {
        let engine = ConfidenceEngine::default();
        assert_eq!(
            engine.score_tag("direct_call", &ScoringContext::new()).unwrap().final_score(),
            0.95
        );
        assert!(matches!(
            engine.score_tag("telepathy", &ScoringContext::new()),
            Err(ConfidenceError::UnknownEdgeType(_))
        ));
    }

    #[test]
    fn test_requires_human_approval() {
        assert!(ConfidenceEngine::requires_human_approval(0.5, 0.8));
        assert!(!ConfidenceEngine::requires_human_approval(0.8, 0.8));
        assert!(!ConfidenceEngine::requires_human_approval(0.5, 0.5));

        let strict = ConfidenceEngine::new(ConfidenceConfig::default().with_approval_threshold(0.96));
        assert!(strict.needs_review(0.95));
        assert!(!ConfidenceEngine::default().needs_review(0.95));
    }
}
