//! Cross-boundary HTTP linking.
//!
//! Connects client-side call sites (fetch/axios/requests/RestTemplate, ...)
//! to server-side endpoints by comparing route text under the same HTTP
//! method. Registration is separate from matching: everything is collected
//! first and [`HttpLinkDetector::detect`] pairs it up in one batch.
//!
//! ## Match tiers
//!
//! | Tier    | When                                                    | Score |
//! |---------|---------------------------------------------------------|-------|
//! | exact   | normalized routes are identical                         | 0.95  |
//! | pattern | endpoint placeholders can be filled to give the client  | 0.80  |
//! | dynamic | runtime-assembled client shares a literal prefix/suffix | 0.50  |
//!
//! Scores come from [`LinkConfig`](crate::config::LinkConfig), which is also
//! the source for the route-match rows of the confidence table.

mod detector;
mod route;

pub use detector::{HttpLink, HttpLinkDetector, LinkReport, MatchType, RegisteredRoute};
pub use route::{normalize_route, ClientRoute, RoutePattern, Segment};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ontology::NodeIdError;

/// Validation errors raised while registering clients and endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("Route is empty")]
    EmptyRoute,

    #[error("HTTP method is missing")]
    MissingMethod,

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error(transparent)]
    NodeId(#[from] NodeIdError),
}

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = LinkError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LinkError::MissingMethod);
        }
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| LinkError::UnsupportedMethod(s.to_string()))
    }
}
