//! Visibility score report: tiers, pillars and the fixed fallback.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Highest possible overall score.
pub const MAX_OVERALL_SCORE: u8 = 100;

/// Highest possible score of a single pillar.
pub const MAX_PILLAR_SCORE: u8 = 25;

/// Lowest overall score classified as [`VisibilityStatus::Clear`].
pub const CLEAR_THRESHOLD: u8 = 75;

/// Lowest overall score classified as [`VisibilityStatus::Partial`].
pub const PARTIAL_THRESHOLD: u8 = 40;

/// Fixed pillar names, in report order.
pub const PILLAR_NAMES: [&str; 4] = [
    "Business Clarity",
    "Audience Clarity",
    "Location Clarity",
    "Trust & Authority",
];

/// Sentinel for text fields the analysis could not determine.
pub const UNDETERMINED: &str = "Could not determine";

const FALLBACK_PILLAR_DESCRIPTION: &str = "Unable to analyze";
const PLACEHOLDER_PILLAR_DESCRIPTION: &str = "Unable to assess";
const PLACEHOLDER_GAP: &str = "No specific gaps could be identified";
const PLACEHOLDER_OPPORTUNITY: &str = "Improve structured data and business information on your website";

/// Three ordered visibility tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum VisibilityStatus {
    /// Overall score below 40.
    #[serde(rename = "NOT CLEAR")]
    NotClear,
    /// Overall score in 40..=74.
    #[serde(rename = "PARTIAL")]
    Partial,
    /// Overall score in 75..=100.
    #[serde(rename = "CLEAR")]
    Clear,
}

impl VisibilityStatus {
    /// Classifies an overall score into its tier.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        if score >= CLEAR_THRESHOLD {
            Self::Clear
        } else if score >= PARTIAL_THRESHOLD {
            Self::Partial
        } else {
            Self::NotClear
        }
    }

    /// Parses the exact wire label (`CLEAR`, `PARTIAL`, `NOT CLEAR`).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "CLEAR" => Some(Self::Clear),
            "PARTIAL" => Some(Self::Partial),
            "NOT CLEAR" => Some(Self::NotClear),
            _ => None,
        }
    }

    /// The wire label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clear => "CLEAR",
            Self::Partial => "PARTIAL",
            Self::NotClear => "NOT CLEAR",
        }
    }
}

impl fmt::Display for VisibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the four sub-scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pillar {
    /// Pillar name.
    pub name: String,
    /// Score in `0..=25`.
    pub score: u8,
    /// Short explanation of the score.
    pub description: String,
}

impl Pillar {
    fn zero(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            score: 0,
            description: description.to_string(),
        }
    }
}

/// A complete, bounded visibility analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityReport {
    /// Tier classification.
    pub status: VisibilityStatus,
    /// Overall score in `0..=100`.
    pub overall_score: u8,
    /// Exactly four pillar sub-scores.
    #[schema(value_type = Vec<Pillar>)]
    pub pillars: [Pillar; 4],
    /// What the business does.
    pub business_description: String,
    /// Who the business serves.
    pub target_audience: String,
    /// Where the business operates.
    pub location: String,
    /// Identified visibility gaps, never empty.
    pub gaps: Vec<String>,
    /// Identified opportunities, never empty.
    pub opportunities: Vec<String>,
}

impl VisibilityReport {
    /// The report returned whenever the reasoning service cannot produce a
    /// usable answer. Identical on every call.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            status: VisibilityStatus::NotClear,
            overall_score: 0,
            pillars: PILLAR_NAMES.map(|name| Pillar::zero(name, FALLBACK_PILLAR_DESCRIPTION)),
            business_description: UNDETERMINED.to_string(),
            target_audience: UNDETERMINED.to_string(),
            location: UNDETERMINED.to_string(),
            gaps: vec![
                "Unable to analyze the website automatically".to_string(),
                "Business information may not be easily accessible to AI tools".to_string(),
            ],
            opportunities: vec![
                "Improve your online presence and structured data".to_string(),
                "Describe your services, audience and location explicitly".to_string(),
            ],
        }
    }
}

/// Four zero-score pillars used when the upstream pillar list is unusable.
#[must_use]
pub fn placeholder_pillars() -> [Pillar; 4] {
    PILLAR_NAMES.map(|name| Pillar::zero(name, PLACEHOLDER_PILLAR_DESCRIPTION))
}

/// Single-entry gap list used when the upstream list is unusable.
#[must_use]
pub fn placeholder_gaps() -> Vec<String> {
    vec![PLACEHOLDER_GAP.to_string()]
}

/// Single-entry opportunity list used when the upstream list is unusable.
#[must_use]
pub fn placeholder_opportunities() -> Vec<String> {
    vec![PLACEHOLDER_OPPORTUNITY.to_string()]
}
