//! Situational context supplied with a candidate relationship.

use serde::{Deserialize, Serialize};

/// How the client route text related to the endpoint route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMatch {
    Exact,
    Pattern,
    Dynamic,
}

/// Evidence an extractor attaches to a candidate relationship.
///
/// Deserializes from the loose key/value mapping extractors emit, e.g.
/// `{"route_match": "exact", "typed_client": true}`. Unknown keys are
/// ignored; absent keys contribute nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringContext {
    /// Route comparison outcome for HTTP edges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_match: Option<RouteMatch>,

    /// The call goes through a generated/typed API client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typed_client: Option<bool>,

    /// Number of candidate targets the extractor found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,

    /// Length of the string literal that produced the match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_length: Option<usize>,

    /// The string literal looks like a URL or route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_url_pattern: Option<bool>,
}

impl ScoringContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route_match(mut self, route_match: RouteMatch) -> Self {
        self.route_match = Some(route_match);
        self
    }

    pub fn typed_client(mut self, typed: bool) -> Self {
        self.typed_client = Some(typed);
        self
    }

    pub fn match_count(mut self, count: usize) -> Self {
        self.match_count = Some(count);
        self
    }

    pub fn string_length(mut self, length: usize) -> Self {
        self.string_length = Some(length);
        self
    }

    pub fn url_pattern(mut self, is_url: bool) -> Self {
        self.is_url_pattern = Some(is_url);
        self
    }

    /// True when no key is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_loose_mapping() {
        let ctx: ScoringContext = serde_json::from_str(
            r#"{"route_match": "exact", "typed_client": true, "framework": "axios"}"#,
        )
        .unwrap();
        assert_eq!(ctx.route_match, Some(RouteMatch::Exact));
        assert_eq!(ctx.typed_client, Some(true));
        assert!(ctx.match_count.is_none());
    }

    #[test]
    fn test_empty() {
        assert!(ScoringContext::new().is_empty());
        assert!(!ScoringContext::new().match_count(2).is_empty());
    }
}
