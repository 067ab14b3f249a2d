//! Discrete confidence levels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{HIGH_CONFIDENCE_FLOOR, LOW_CONFIDENCE_FLOOR, MEDIUM_CONFIDENCE_FLOOR};

/// Coarse bucket for a confidence score.
///
/// Ordered from least to most trustworthy, so levels compare naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    /// score < 0.3
    Uncertain,
    /// 0.3 <= score < 0.5
    Low,
    /// 0.5 <= score < 0.8
    Medium,
    /// 0.8 <= score < 1.0
    High,
    /// score == 1.0
    Definite,
}

impl ConfidenceLevel {
    /// Every level, least trustworthy first.
    pub const ALL: [ConfidenceLevel; 5] = [
        ConfidenceLevel::Uncertain,
        ConfidenceLevel::Low,
        ConfidenceLevel::Medium,
        ConfidenceLevel::High,
        ConfidenceLevel::Definite,
    ];

    /// Classify a score.
    pub fn from_score(score: f64) -> Self {
        if score >= 1.0 {
            Self::Definite
        } else if score >= HIGH_CONFIDENCE_FLOOR {
            Self::High
        } else if score >= MEDIUM_CONFIDENCE_FLOOR {
            Self::Medium
        } else if score >= LOW_CONFIDENCE_FLOOR {
            Self::Low
        } else {
            Self::Uncertain
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Definite => "DEFINITE",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Uncertain => "UNCERTAIN",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
