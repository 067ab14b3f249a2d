//! Configuration for the Omnigraph engine.
//!
//! Every tunable number (base scores, adjustment magnitudes, tier scores,
//! review thresholds) lives in an explicit, immutable configuration value that
//! is injected into the components that need it. Nothing is read from global
//! state. Locating and reading config files or environment variables is the
//! job of the front end (see the `omnigraph` CLI); this module only parses,
//! validates and renders TOML text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::MissingNodePolicy;
use crate::ontology::EdgeType;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to render config: {0}")]
    RenderError(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confidence engine tables.
    pub confidence: ConfidenceConfig,

    /// Graph assembly policy.
    pub graph: GraphConfig,

    /// HTTP link detection.
    pub linking: LinkConfig,
}

impl Config {
    /// Parse configuration from TOML text.
    ///
    /// Missing sections and keys fall back to defaults. Base-score entries
    /// override the default table one edge type at a time. Route tier scores
    /// from `[linking]` are mirrored into the confidence table.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content)?;
        config.sync_tier_scores();
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        Config::default().to_toml_string().unwrap_or_default()
    }

    /// Copy the canonical tier scores into the confidence base table.
    pub fn sync_tier_scores(&mut self) {
        for (edge_type, score) in self.linking.tier_scores() {
            if let Some(existing) = self.confidence.base_scores.get(&edge_type) {
                if (existing - score).abs() > f64::EPSILON {
                    tracing::warn!(
                        edge_type = %edge_type,
                        configured = existing,
                        tier = score,
                        "confidence base score overridden by route tier score"
                    );
                }
            }
            self.confidence.base_scores.insert(edge_type, score);
        }
    }

    /// Check every section for out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.confidence.validate()?;
        self.linking.validate()?;

        for (edge_type, score) in self.linking.tier_scores() {
            if self.confidence.base_score(edge_type) != Some(score) {
                return Err(ConfigError::Invalid(format!(
                    "confidence base score for {} does not match its route tier score {}",
                    edge_type, score
                )));
            }
        }

        Ok(())
    }
}

/// Confidence engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Default trust threshold for human-approval decisions.
    pub approval_threshold: f64,

    /// Base score per edge type, before contextual adjustments.
    #[serde(with = "score_table")]
    pub base_scores: BTreeMap<EdgeType, f64>,

    /// Contextual adjustment magnitudes.
    pub adjustments: AdjustmentRules,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            approval_threshold: DEFAULT_APPROVAL_THRESHOLD,
            base_scores: default_base_scores(),
            adjustments: AdjustmentRules::default(),
        }
    }
}

impl ConfidenceConfig {
    /// A config whose base table holds exactly the given entries.
    ///
    /// Edge types left out fail to score with `UnknownEdgeType`.
    pub fn from_base_scores(scores: impl IntoIterator<Item = (EdgeType, f64)>) -> Self {
        Self {
            base_scores: scores.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Replace one base score.
    pub fn with_base_score(mut self, edge_type: EdgeType, score: f64) -> Self {
        self.base_scores.insert(edge_type, score);
        self
    }

    /// Replace the approval threshold.
    pub fn with_approval_threshold(mut self, threshold: f64) -> Self {
        self.approval_threshold = threshold;
        self
    }

    /// Look up the base score for an edge type.
    pub fn base_score(&self, edge_type: EdgeType) -> Option<f64> {
        self.base_scores.get(&edge_type).copied()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (edge_type, score) in &self.base_scores {
            check_unit_range(&format!("confidence.base_scores.{}", edge_type), *score)?;
        }
        check_unit_range("confidence.approval_threshold", self.approval_threshold)?;
        self.adjustments.validate()
    }
}

fn default_base_scores() -> BTreeMap<EdgeType, f64> {
    EdgeType::ALL
        .iter()
        .map(|&edge_type| {
            let score = match edge_type {
                EdgeType::ImportStatement => DEFAULT_IMPORT_STATEMENT_SCORE,
                EdgeType::TypeAnnotation => DEFAULT_TYPE_ANNOTATION_SCORE,
                EdgeType::Inheritance => DEFAULT_INHERITANCE_SCORE,
                EdgeType::DirectCall => DEFAULT_DIRECT_CALL_SCORE,
                EdgeType::IndirectCall => DEFAULT_INDIRECT_CALL_SCORE,
                EdgeType::FieldAccess => DEFAULT_FIELD_ACCESS_SCORE,
                EdgeType::HttpCall => DEFAULT_HTTP_CALL_SCORE,
                EdgeType::RouteExactMatch => DEFAULT_ROUTE_EXACT_SCORE,
                EdgeType::RoutePatternMatch => DEFAULT_ROUTE_PATTERN_SCORE,
                EdgeType::StringLiteralMatch => DEFAULT_STRING_LITERAL_MATCH_SCORE,
                EdgeType::DynamicRoute => DEFAULT_DYNAMIC_ROUTE_SCORE,
                EdgeType::TaintFlow => DEFAULT_TAINT_FLOW_SCORE,
            };
            (edge_type, score)
        })
        .collect()
}

/// Magnitudes of the contextual adjustments, applied in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentRules {
    /// Added when `route_match == "exact"`.
    pub exact_route_bonus: f64,

    /// Added when `typed_client == true`.
    pub typed_client_bonus: f64,

    /// Subtracted when `match_count > 1`.
    pub ambiguity_penalty: f64,

    /// Added when `string_length > long_string_threshold`.
    pub long_string_bonus: f64,

    /// Length (characters) past which a literal counts as specific.
    pub long_string_threshold: usize,

    /// Added when `is_url_pattern == true`.
    pub url_pattern_bonus: f64,
}

impl Default for AdjustmentRules {
    fn default() -> Self {
        Self {
            exact_route_bonus: DEFAULT_EXACT_ROUTE_BONUS,
            typed_client_bonus: DEFAULT_TYPED_CLIENT_BONUS,
            ambiguity_penalty: DEFAULT_AMBIGUITY_PENALTY,
            long_string_bonus: DEFAULT_LONG_STRING_BONUS,
            long_string_threshold: DEFAULT_LONG_STRING_THRESHOLD,
            url_pattern_bonus: DEFAULT_URL_PATTERN_BONUS,
        }
    }
}

impl AdjustmentRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_range("confidence.adjustments.exact_route_bonus", self.exact_route_bonus)?;
        check_unit_range("confidence.adjustments.typed_client_bonus", self.typed_client_bonus)?;
        check_unit_range("confidence.adjustments.ambiguity_penalty", self.ambiguity_penalty)?;
        check_unit_range("confidence.adjustments.long_string_bonus", self.long_string_bonus)?;
        check_unit_range("confidence.adjustments.url_pattern_bonus", self.url_pattern_bonus)
    }
}

/// Graph assembly configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Project name written into exported graphs.
    pub project: String,

    /// What to do when an edge names a node that was never added.
    pub missing_nodes: MissingNodePolicy,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            project: DEFAULT_PROJECT_NAME.to_string(),
            missing_nodes: MissingNodePolicy::default(),
        }
    }
}

/// HTTP link detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Confidence of an exact route match.
    pub exact_score: f64,

    /// Confidence of a placeholder (pattern) match.
    pub pattern_score: f64,

    /// Confidence of a dynamic (partial literal) match.
    pub dynamic_score: f64,

    /// Literal segments a dynamic client route must share with the endpoint.
    pub dynamic_min_segments: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            exact_score: DEFAULT_ROUTE_EXACT_SCORE,
            pattern_score: DEFAULT_ROUTE_PATTERN_SCORE,
            dynamic_score: DEFAULT_DYNAMIC_ROUTE_SCORE,
            dynamic_min_segments: DEFAULT_DYNAMIC_MIN_SEGMENTS,
        }
    }
}

impl LinkConfig {
    /// Tier scores paired with the edge type each tier produces.
    pub fn tier_scores(&self) -> [(EdgeType, f64); 3] {
        [
            (EdgeType::RouteExactMatch, self.exact_score),
            (EdgeType::RoutePatternMatch, self.pattern_score),
            (EdgeType::DynamicRoute, self.dynamic_score),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit_range("linking.exact_score", self.exact_score)?;
        check_unit_range("linking.pattern_score", self.pattern_score)?;
        check_unit_range("linking.dynamic_score", self.dynamic_score)?;

        if !(self.exact_score >= self.pattern_score && self.pattern_score >= self.dynamic_score) {
            return Err(ConfigError::Invalid(format!(
                "route tier scores must satisfy exact >= pattern >= dynamic (got {} / {} / {})",
                self.exact_score, self.pattern_score, self.dynamic_score
            )));
        }
        if self.dynamic_min_segments == 0 {
            return Err(ConfigError::Invalid(
                "linking.dynamic_min_segments must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_unit_range(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{} must be within [0, 1], got {}", key, value)))
    }
}

/// Serde adapter for the base-score table.
///
/// Keys are edge-type tags. On input, entries override the default table and
/// unknown tags are rejected.
mod score_table {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::ontology::EdgeType;

    pub fn serialize<S: Serializer>(
        table: &BTreeMap<EdgeType, f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(table.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<EdgeType, f64>, D::Error> {
        let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
        let mut table = super::default_base_scores();
        for (tag, score) in raw {
            let edge_type = tag.parse::<EdgeType>().map_err(D::Error::custom)?;
            table.insert(edge_type, score);
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.confidence.approval_threshold, DEFAULT_APPROVAL_THRESHOLD);
        assert_eq!(config.graph.missing_nodes, MissingNodePolicy::Reject);
    }

    #[test]
    fn test_default_table_covers_every_edge_type() {
        let config = ConfidenceConfig::default();
        for edge_type in EdgeType::ALL {
            assert!(config.base_score(edge_type).is_some(), "{edge_type}");
        }
    }

    #[test]
    fn test_config_to_toml() {
        let toml_str = Config::default_config_string();
        assert!(toml_str.contains("[confidence]"));
        assert!(toml_str.contains("[confidence.base_scores]"));
        assert!(toml_str.contains("import_statement = 1.0"));
        assert!(toml_str.contains("[linking]"));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
[confidence.base_scores]
indirect_call = 0.4

[graph]
missing_nodes = "create_placeholder"
"#,
        )
        .unwrap();
        assert_eq!(config.confidence.base_score(EdgeType::IndirectCall), Some(0.4));
        assert_eq!(config.confidence.base_score(EdgeType::DirectCall), Some(DEFAULT_DIRECT_CALL_SCORE));
        assert_eq!(config.graph.missing_nodes, MissingNodePolicy::CreatePlaceholder);
    }

    #[test]
    fn test_unknown_edge_type_key_rejected() {
        let result = Config::from_toml_str("[confidence.base_scores]\nmaybe_calls = 0.4\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_tier_scores_are_canonical() {
        let config = Config::from_toml_str(
            r#"
[confidence.base_scores]
route_exact_match = 0.5

[linking]
exact_score = 0.9
"#,
        )
        .unwrap();
        assert_eq!(config.confidence.base_score(EdgeType::RouteExactMatch), Some(0.9));
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(Config::from_toml_str("[confidence]\napproval_threshold = 1.5\n").is_err());
        assert!(Config::from_toml_str("[confidence.base_scores]\ndirect_call = -0.1\n").is_err());
        assert!(Config::from_toml_str("[linking]\npattern_score = 0.99\n").is_err());
    }
}
