//! Node identity error types.

use thiserror::Error;

/// Errors raised while building or decoding a canonical node id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeIdError {
    /// The string did not split into exactly four `::` segments.
    #[error("Malformed node id '{input}': expected 4 '::'-delimited segments, found {found}")]
    SegmentCount { input: String, found: usize },

    /// One of the segments (or the method suffix) was empty.
    #[error("Malformed node id '{input}': empty {segment} segment")]
    EmptySegment { input: String, segment: &'static str },

    /// A field contains a separator that would change how the id decodes.
    #[error("Malformed node id '{input}': {segment} segment contains a reserved ':' separator")]
    ReservedSeparator { input: String, segment: &'static str },

    /// The node-type segment is outside the fixed vocabulary.
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),
}
