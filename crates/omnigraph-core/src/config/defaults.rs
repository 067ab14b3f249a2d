//! Default values for Omnigraph configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Route Match Tiers
// ============================================================================
//
// Tier scores are the canonical source: the HTTP link detector uses them
// directly and the confidence engine's base table mirrors them.

/// Normalized client and endpoint routes are identical.
pub const DEFAULT_ROUTE_EXACT_SCORE: f64 = 0.95;

/// Client route fills the endpoint's parameter placeholders.
pub const DEFAULT_ROUTE_PATTERN_SCORE: f64 = 0.8;

/// Client route is assembled at runtime and shares a literal prefix/suffix.
pub const DEFAULT_DYNAMIC_ROUTE_SCORE: f64 = 0.5;

/// Minimum literal segments a dynamic client route must share with an endpoint.
pub const DEFAULT_DYNAMIC_MIN_SEGMENTS: usize = 1;

// ============================================================================
// Base Scores
// ============================================================================

/// Import statements are syntactic facts.
pub const DEFAULT_IMPORT_STATEMENT_SCORE: f64 = 1.0;

/// Type annotations are syntactic facts.
pub const DEFAULT_TYPE_ANNOTATION_SCORE: f64 = 1.0;

/// Declared inheritance is a syntactic fact.
pub const DEFAULT_INHERITANCE_SCORE: f64 = 1.0;

/// Calls resolved by name.
pub const DEFAULT_DIRECT_CALL_SCORE: f64 = 0.95;

/// Field reads and writes.
pub const DEFAULT_FIELD_ACCESS_SCORE: f64 = 0.85;

/// HTTP calls before any route evidence is applied.
pub const DEFAULT_HTTP_CALL_SCORE: f64 = 0.8;

/// A string literal that happens to name another element.
pub const DEFAULT_STRING_LITERAL_MATCH_SCORE: f64 = 0.7;

/// Data flow reported by taint analysis.
pub const DEFAULT_TAINT_FLOW_SCORE: f64 = 0.7;

/// Calls through variables, callbacks or dynamic dispatch.
pub const DEFAULT_INDIRECT_CALL_SCORE: f64 = 0.6;

// ============================================================================
// Contextual Adjustments
// ============================================================================

/// `route_match == "exact"`.
pub const DEFAULT_EXACT_ROUTE_BONUS: f64 = 0.15;

/// `typed_client == true`.
pub const DEFAULT_TYPED_CLIENT_BONUS: f64 = 0.05;

/// `match_count > 1` (subtracted).
pub const DEFAULT_AMBIGUITY_PENALTY: f64 = 0.20;

/// `string_length` above [`DEFAULT_LONG_STRING_THRESHOLD`].
pub const DEFAULT_LONG_STRING_BONUS: f64 = 0.10;

/// Literal length (in characters) past which a string match is considered specific.
pub const DEFAULT_LONG_STRING_THRESHOLD: usize = 10;

/// `is_url_pattern == true`.
pub const DEFAULT_URL_PATTERN_BONUS: f64 = 0.10;

// ============================================================================
// Review Thresholds
// ============================================================================

/// Scores below this need a human before being acted on.
pub const DEFAULT_APPROVAL_THRESHOLD: f64 = 0.8;

/// Lower bound of the HIGH confidence level.
pub const HIGH_CONFIDENCE_FLOOR: f64 = 0.8;

/// Lower bound of the MEDIUM confidence level.
pub const MEDIUM_CONFIDENCE_FLOOR: f64 = 0.5;

/// Lower bound of the LOW confidence level.
pub const LOW_CONFIDENCE_FLOOR: f64 = 0.3;

/// Final scores are rounded to this many decimal places.
pub const SCORE_DECIMALS: i32 = 6;

// ============================================================================
// Graph Defaults
// ============================================================================

/// Project name written into exported graphs when none is configured.
pub const DEFAULT_PROJECT_NAME: &str = "unnamed";

/// Metadata key marking nodes created to satisfy a dangling edge.
pub const PLACEHOLDER_METADATA_KEY: &str = "placeholder";
