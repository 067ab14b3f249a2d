//! Route text handling: normalization, endpoint patterns, client shapes.

use once_cell::sync::Lazy;
use regex::Regex;

use super::LinkError;

/// `scheme://host[:port]` at the start of an absolute URL.
static SCHEME_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^/]*").expect("Invalid scheme regex")
});

/// Placeholders that may appear anywhere inside a segment:
/// `{id}`, `{id:int}`, `<id>`, `<int:id>`, `[id]`.
static INLINE_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[^{}/]+\}|<[^<>/]+>|\[[^\[\]/]+\]").expect("Invalid placeholder regex")
});

/// Express-style placeholder occupying a whole segment: `:id`.
static COLON_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid colon placeholder regex"));

/// One side of a `+` concatenation written as a quoted literal.
static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*(?:"([^"]*)"|'([^']*)')\s*$"#).expect("Invalid quoted literal regex"));

/// Text that marks a client route as assembled at runtime.
const DYNAMIC_MARKERS: &[&str] = &["${", "{", "%s", "%d", "+", "`"];

/// Normalize route text for comparison.
///
/// Strips surrounding quotes, a leading `scheme://host`, the query string and
/// the fragment; collapses repeated `/`; forces a leading `/` and drops a
/// trailing one (the root stays `/`).
pub fn normalize_route(raw: &str) -> Result<String, LinkError> {
    let trimmed = raw
        .trim()
        .trim_matches(|c| c == '`' || c == '"' || c == '\'')
        .trim();
    if trimmed.is_empty() {
        return Err(LinkError::EmptyRoute);
    }

    let without_host = SCHEME_HOST.replace(trimmed, "");
    let path = without_host
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    Ok(format!("/{}", segments.join("/")))
}

fn split_segments(normalized: &str) -> Vec<String> {
    normalized
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Param(String),
}

/// One endpoint path segment, split into literal text and placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    text: String,
    pieces: Vec<Piece>,
}

impl Segment {
    fn parse(text: &str) -> Self {
        let mut pieces = Vec::new();

        if COLON_PARAM.is_match(text) {
            pieces.push(Piece::Param(text[1..].to_string()));
        } else {
            let mut last = 0;
            for m in INLINE_PARAM.find_iter(text) {
                if m.start() > last {
                    pieces.push(Piece::Literal(text[last..m.start()].to_string()));
                }
                pieces.push(Piece::Param(param_name(m.as_str())));
                last = m.end();
            }
            if last < text.len() {
                pieces.push(Piece::Literal(text[last..].to_string()));
            }
        }

        Self {
            text: text.to_string(),
            pieces,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_param(&self) -> bool {
        self.pieces.iter().any(|p| matches!(p, Piece::Param(_)))
    }

    /// Parameter names in this segment, in order.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Param(name) => Some(name.as_str()),
            Piece::Literal(_) => None,
        })
    }

    /// Whether a concrete client segment can stand in for this one.
    /// A placeholder consumes one or more characters.
    pub fn accepts(&self, concrete: &str) -> bool {
        match_pieces(&self.pieces, concrete)
    }
}

/// Strip the delimiters and any converter/type annotation from a placeholder.
fn param_name(placeholder: &str) -> String {
    let inner = &placeholder[1..placeholder.len() - 1];
    match placeholder.chars().next() {
        // Flask/Werkzeug: <converter:name>
        Some('<') => inner.rsplit(':').next().unwrap_or(inner).to_string(),
        // FastAPI/Starlette: {name:converter}
        Some('{') => inner.split(':').next().unwrap_or(inner).to_string(),
        _ => inner.to_string(),
    }
}

fn match_pieces(pieces: &[Piece], s: &str) -> bool {
    match pieces.split_first() {
        None => s.is_empty(),
        Some((Piece::Literal(lit), rest)) => s
            .strip_prefix(lit.as_str())
            .map_or(false, |tail| match_pieces(rest, tail)),
        Some((Piece::Param(_), rest)) => (1..=s.len())
            .filter(|&i| s.is_char_boundary(i))
            .any(|i| match_pieces(rest, &s[i..])),
    }
}

/// A server-side route, compiled for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    normalized: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Result<Self, LinkError> {
        let normalized = normalize_route(raw)?;
        let segments = split_segments(&normalized)
            .iter()
            .map(|s| Segment::parse(s))
            .collect();
        Ok(Self {
            normalized,
            segments,
        })
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True if any segment holds a placeholder.
    pub fn has_params(&self) -> bool {
        self.segments.iter().any(Segment::is_param)
    }

    /// Whether substituting concrete segments for the placeholders can
    /// produce `client` (a normalized route).
    pub fn matches(&self, client: &str) -> bool {
        let concrete = split_segments(client);
        concrete.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(&concrete)
                .all(|(segment, value)| segment.accepts(value))
    }

    /// Whether `literals` line up with this route's first segments.
    pub fn starts_with(&self, literals: &[String]) -> bool {
        literals.len() <= self.segments.len()
            && self
                .segments
                .iter()
                .zip(literals)
                .all(|(segment, value)| segment.accepts(value))
    }

    /// Whether `literals` line up with this route's last segments.
    pub fn ends_with(&self, literals: &[String]) -> bool {
        literals.len() <= self.segments.len()
            && self
                .segments
                .iter()
                .rev()
                .zip(literals.iter().rev())
                .all(|(segment, value)| segment.accepts(value))
    }
}

/// A client call-site route, with the literal parts a dynamic route keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRoute {
    normalized: String,
    dynamic: bool,
    literal_prefix: Vec<String>,
    literal_suffix: Vec<String>,
}

impl ClientRoute {
    /// Parse a client route. `dynamic_hint` marks the route as runtime
    /// assembled even without textual markers.
    pub fn parse(raw: &str, dynamic_hint: bool) -> Result<Self, LinkError> {
        let expanded = expand_concatenation(raw);
        let normalized = normalize_route(&expanded)?;
        let dynamic = dynamic_hint || DYNAMIC_MARKERS.iter().any(|m| raw.contains(m));

        let segments = split_segments(&normalized);
        let first = segments.iter().position(|s| is_interpolated(s));
        let last = segments.iter().rposition(|s| is_interpolated(s));
        let (literal_prefix, literal_suffix) = match (first, last) {
            (Some(first), Some(last)) => (
                segments[..first].to_vec(),
                segments[last + 1..].to_vec(),
            ),
            _ => (segments.clone(), segments),
        };

        Ok(Self {
            normalized,
            dynamic,
            literal_prefix,
            literal_suffix,
        })
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Literal segments before the first interpolated one.
    pub fn literal_prefix(&self) -> &[String] {
        &self.literal_prefix
    }

    /// Literal segments after the last interpolated one.
    pub fn literal_suffix(&self) -> &[String] {
        &self.literal_suffix
    }
}

fn is_interpolated(segment: &str) -> bool {
    DYNAMIC_MARKERS.iter().any(|m| segment.contains(m))
}

/// Rewrite `"/api/users/" + userId` as `/api/users/{userId}`.
///
/// Only applies when the route mixes `+` with quoted literals; anything else
/// is returned unchanged.
fn expand_concatenation(raw: &str) -> String {
    if !raw.contains('+') || !(raw.contains('"') || raw.contains('\'')) {
        return raw.to_string();
    }

    raw.split('+')
        .map(|part| match QUOTED.captures(part) {
            Some(caps) => caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            None => format!("{{{}}}", part.trim()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_route("/api/users/").unwrap(), "/api/users");
        assert_eq!(normalize_route("api//users").unwrap(), "/api/users");
        assert_eq!(normalize_route("https://example.com:8080/api/users?page=2#top").unwrap(), "/api/users");
        assert_eq!(normalize_route("  `/api/users`  ").unwrap(), "/api/users");
        assert_eq!(normalize_route("/").unwrap(), "/");
        assert_eq!(normalize_route("http://localhost").unwrap(), "/");
    }

    #[test]
    fn test_empty_route_rejected() {
        assert_eq!(normalize_route(""), Err(LinkError::EmptyRoute));
        assert_eq!(normalize_route("   "), Err(LinkError::EmptyRoute));
        assert_eq!(normalize_route("\"\""), Err(LinkError::EmptyRoute));
    }

    #[test]
    fn test_placeholder_syntaxes() {
        for route in [
            "/api/users/{id}",
            "/api/users/{id:int}",
            "/api/users/:id",
            "/api/users/<id>",
            "/api/users/<int:id>",
            "/api/users/[id]",
        ] {
            let pattern = RoutePattern::parse(route).unwrap();
            assert!(pattern.has_params(), "{route}");
            assert!(pattern.matches("/api/users/123"), "{route}");
            assert!(!pattern.matches("/api/users"), "{route}");
            assert!(!pattern.matches("/api/users/123/orders"), "{route}");
            assert_eq!(pattern.segments()[2].params().collect::<Vec<_>>(), vec!["id"], "{route}");
        }
    }

    #[test]
    fn test_inline_placeholder() {
        let pattern = RoutePattern::parse("/files/{name}.json").unwrap();
        assert!(pattern.matches("/files/report.json"));
        assert!(!pattern.matches("/files/.json"));
        assert!(!pattern.matches("/files/report.xml"));
    }

    #[test]
    fn test_literal_route_has_no_params() {
        let pattern = RoutePattern::parse("/health").unwrap();
        assert!(!pattern.has_params());
        assert!(pattern.matches("/health"));
    }

    #[test]
    fn test_template_client() {
        let client = ClientRoute::parse("`/api/users/${userId}/orders`", false).unwrap();
        assert!(client.is_dynamic());
        assert_eq!(client.literal_prefix(), ["api", "users"]);
        assert_eq!(client.literal_suffix(), ["orders"]);
    }

    #[test]
    fn test_concatenated_client() {
        let client = ClientRoute::parse(r#""/api/users/" + userId"#, false).unwrap();
        assert!(client.is_dynamic());
        assert_eq!(client.normalized(), "/api/users/{userId}");
        assert_eq!(client.literal_prefix(), ["api", "users"]);
        assert!(client.literal_suffix().is_empty());
    }

    #[test]
    fn test_static_client() {
        let client = ClientRoute::parse("/api/users/123", false).unwrap();
        assert!(!client.is_dynamic());
        assert_eq!(client.literal_prefix(), ["api", "users", "123"]);

        let hinted = ClientRoute::parse("/api/users", true).unwrap();
        assert!(hinted.is_dynamic());
    }

    #[test]
    fn test_prefix_and_suffix_alignment() {
        let pattern = RoutePattern::parse("/api/users/{id}/orders").unwrap();
        let prefix = vec!["api".to_string(), "users".to_string()];
        let suffix = vec!["orders".to_string()];
        assert!(pattern.starts_with(&prefix));
        assert!(pattern.ends_with(&suffix));
        assert!(!pattern.starts_with(&suffix));
    }
}
