//! Canonical node identity.
//!
//! A [`UniversalNodeId`] addresses one code element regardless of the
//! language it was written in. Its canonical string form is
//!
//! ```text
//! language::module::node_type::name[:method]
//! ```
//!
//! e.g. `java::com.example.api::controller::UserController:getUser`.
//! Source location (`line`, `file`) travels with the id but is not part of
//! the canonical string, so two sightings of the same element at different
//! locations share one graph key.
//!
//! Only ids whose canonical string decodes back to the same fields are
//! well-formed: no segment may be empty, `language`, `module` and `name`
//! may not contain `:`, and a method may not start with `:` or contain `::`.
//! Module paths that use `::` (Rust, C++) are spelled with `.` instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{NodeIdError, NodeType};

/// Separator between the four canonical segments.
pub const SEGMENT_SEPARATOR: &str = "::";

/// Separator between the name and the optional method suffix.
pub const METHOD_SEPARATOR: char = ':';

/// Canonical address of one code element.
///
/// Immutable once constructed; the `with_*` methods consume and return a new
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniversalNodeId {
    language: String,
    module: String,
    node_type: NodeType,
    name: String,
    method: Option<String>,
    line: Option<u32>,
    file: Option<String>,
}

impl UniversalNodeId {
    /// Create an id from typed parts without checking them.
    ///
    /// Use [`Self::try_new`] for text that did not come from a trusted
    /// source; the graph builder rejects ids that fail [`Self::validate`].
    pub fn new(
        language: impl Into<String>,
        module: impl Into<String>,
        node_type: NodeType,
        name: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            module: module.into(),
            node_type,
            name: name.into(),
            method: None,
            line: None,
            file: None,
        }
    }

    /// Create an id from typed parts, rejecting fields that would not
    /// survive an encode/decode round trip.
    pub fn try_new(
        language: impl Into<String>,
        module: impl Into<String>,
        node_type: NodeType,
        name: impl Into<String>,
    ) -> Result<Self, NodeIdError> {
        let id = Self::new(language, module, node_type, name);
        id.validate()?;
        Ok(id)
    }

    /// Create an id from a node-type tag such as `"class"`.
    pub fn create(
        language: impl Into<String>,
        module: impl Into<String>,
        node_type: &str,
        name: impl Into<String>,
    ) -> Result<Self, NodeIdError> {
        Self::try_new(language, module, node_type.parse()?, name)
    }

    /// Check that the canonical string decodes back to these fields.
    pub fn validate(&self) -> Result<(), NodeIdError> {
        let input = || self.to_string();
        for (segment, value) in [
            ("language", self.language.as_str()),
            ("module", self.module.as_str()),
            ("name", self.name.as_str()),
        ] {
            if value.is_empty() {
                return Err(NodeIdError::EmptySegment { input: input(), segment });
            }
            if value.contains(METHOD_SEPARATOR) {
                return Err(NodeIdError::ReservedSeparator { input: input(), segment });
            }
        }

        if let Some(method) = &self.method {
            if method.is_empty() {
                return Err(NodeIdError::EmptySegment {
                    input: input(),
                    segment: "method",
                });
            }
            if method.starts_with(METHOD_SEPARATOR) || method.contains(SEGMENT_SEPARATOR) {
                return Err(NodeIdError::ReservedSeparator {
                    input: input(),
                    segment: "method",
                });
            }
        }
        Ok(())
    }

    /// Decode a canonical id string.
    pub fn parse(s: &str) -> Result<Self, NodeIdError> {
        let segments: Vec<&str> = s.split(SEGMENT_SEPARATOR).collect();
        if segments.len() != 4 {
            return Err(NodeIdError::SegmentCount {
                input: s.to_string(),
                found: segments.len(),
            });
        }

        let empty = |segment: &'static str| NodeIdError::EmptySegment {
            input: s.to_string(),
            segment,
        };

        let (language, module, node_type, last) = (segments[0], segments[1], segments[2], segments[3]);
        if language.is_empty() {
            return Err(empty("language"));
        }
        if module.is_empty() {
            return Err(empty("module"));
        }
        if node_type.is_empty() {
            return Err(empty("node_type"));
        }
        if last.is_empty() {
            return Err(empty("name"));
        }

        let (name, method) = match last.split_once(METHOD_SEPARATOR) {
            Some((name, method)) => (name, Some(method)),
            None => (last, None),
        };
        if name.is_empty() {
            return Err(empty("name"));
        }
        if method.is_some_and(str::is_empty) {
            return Err(empty("method"));
        }

        let id = Self {
            language: language.to_string(),
            module: module.to_string(),
            node_type: node_type.parse()?,
            name: name.to_string(),
            method: method.map(str::to_string),
            line: None,
            file: None,
        };
        id.validate()?;
        Ok(id)
    }

    /// Attach a method (sub-member) qualifier. Unchecked, like [`Self::new`].
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Attach the source line.
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach the source file.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// The canonical string, used as the graph key.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// True when both ids address the same element, ignoring location.
    pub fn same_element(&self, other: &UniversalNodeId) -> bool {
        self.language == other.language
            && self.module == other.module
            && self.node_type == other.node_type
            && self.name == other.name
            && self.method == other.method
    }

    pub(crate) fn set_line(&mut self, line: Option<u32>) {
        self.line = line;
    }

    pub(crate) fn set_file(&mut self, file: Option<String>) {
        self.file = file;
    }
}

impl fmt::Display for UniversalNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}",
            self.language,
            self.module,
            self.node_type,
            self.name,
            sep = SEGMENT_SEPARATOR
        )?;
        if let Some(method) = &self.method {
            write!(f, "{}{}", METHOD_SEPARATOR, method)?;
        }
        Ok(())
    }
}

impl FromStr for UniversalNodeId {
    type Err = NodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for UniversalNodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UniversalNodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_class_id() {
        let id = UniversalNodeId::create("python", "app.handlers", "class", "RequestHandler").unwrap();
        assert_eq!(id.to_string(), "python::app.handlers::class::RequestHandler");
    }

    #[test]
    fn test_parse_with_method() {
        let id = UniversalNodeId::parse("java::com.example.api::controller::UserController:getUser").unwrap();
        assert_eq!(id.language(), "java");
        assert_eq!(id.module(), "com.example.api");
        assert_eq!(id.node_type(), NodeType::Controller);
        assert_eq!(id.name(), "UserController");
        assert_eq!(id.method(), Some("getUser"));
    }

    #[test]
    fn test_method_splits_on_first_colon() {
        let id = UniversalNodeId::parse("ts::src/api::client::Api:get:v2").unwrap();
        assert_eq!(id.name(), "Api");
        assert_eq!(id.method(), Some("get:v2"));
        assert_eq!(id.to_string(), "ts::src/api::client::Api:get:v2");
    }

    #[test]
    fn test_wrong_segment_count() {
        let err = UniversalNodeId::parse("python::app::RequestHandler").unwrap_err();
        assert!(matches!(err, NodeIdError::SegmentCount { found: 3, .. }));

        let err = UniversalNodeId::parse("a::b::class::C::D").unwrap_err();
        assert!(matches!(err, NodeIdError::SegmentCount { found: 5, .. }));
    }

    #[test]
    fn test_empty_segments() {
        for (input, segment) in [
            ("::app::class::A", "language"),
            ("python::::class::A", "module"),
            ("python::app::::A", "node_type"),
            ("python::app::class::", "name"),
            ("python::app::class:::run", "name"),
            ("python::app::class::A:", "method"),
        ] {
            match UniversalNodeId::parse(input) {
                Err(NodeIdError::EmptySegment { segment: s, .. }) => assert_eq!(s, segment, "{input}"),
                other => panic!("expected empty {segment} for {input}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_constructor_rejects_undecodable_fields() {
        for (language, module, name, segment) in [
            ("", "app", "A", "language"),
            ("python", "", "A", "module"),
            ("python", "app", "", "name"),
            ("rust", "crate::api", "handler", "module"),
            ("cpp", "ns", "operator:", "name"),
            ("c:pp", "ns", "A", "language"),
        ] {
            match UniversalNodeId::try_new(language, module, NodeType::Function, name) {
                Err(NodeIdError::EmptySegment { segment: s, .. })
                | Err(NodeIdError::ReservedSeparator { segment: s, .. }) => {
                    assert_eq!(s, segment, "{language}/{module}/{name}")
                }
                other => panic!("expected {segment} rejection, got {other:?}"),
            }
        }

        assert!(matches!(
            UniversalNodeId::create("cpp", "ns", "function", "operator:"),
            Err(NodeIdError::ReservedSeparator { segment: "name", .. })
        ));
    }

    #[test]
    fn test_method_validation() {
        let base = UniversalNodeId::new("java", "com.acme", NodeType::Class, "Order");
        for (method, expected) in [("", "method"), (":total", "method"), ("a::b", "method")] {
            let err = base.clone().with_method(method).validate().unwrap_err();
            assert!(
                matches!(err, NodeIdError::EmptySegment { segment, .. } | NodeIdError::ReservedSeparator { segment, .. } if segment == expected),
                "{method}: {err:?}"
            );
        }
        // A single colon inside the method decodes unchanged
        let id = base.with_method("get:v2");
        assert!(id.validate().is_ok());
        assert_eq!(UniversalNodeId::parse(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_colon_in_language() {
        assert!(matches!(
            UniversalNodeId::parse("c:pp::ns::function::A"),
            Err(NodeIdError::ReservedSeparator { segment: "language", .. })
        ));
    }

    #[test]
    fn test_location_not_in_canonical_form() {
        let id = UniversalNodeId::new("go", "pkg/users", NodeType::Function, "List")
            .with_file("pkg/users/list.go")
            .with_line(42);
        assert_eq!(id.to_string(), "go::pkg/users::function::List");
        assert!(id.same_element(&UniversalNodeId::parse("go::pkg/users::function::List").unwrap()));
        assert_ne!(id, UniversalNodeId::parse("go::pkg/users::function::List").unwrap());
    }

    #[test]
    fn test_serde_as_string() {
        let id = UniversalNodeId::new("rust", "crate::api", NodeType::Function, "handler");
        // Rust paths use '::' and must be expressed with '.' or '/' in the module
        assert!(id.validate().is_err());
        assert!(UniversalNodeId::parse(&id.to_string()).is_err());

        let id = UniversalNodeId::new("rust", "crate.api", NodeType::Function, "handler");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"rust::crate.api::function::handler\"");
        let back: UniversalNodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
