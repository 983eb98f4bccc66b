//! Turning reasoning-service output into a bounded report.
//!
//! Three independent stages:
//!
//! 1. [`parse`]: text to a loosely typed [`RawReport`]. Failure means the
//!    fixed fallback report.
//! 2. [`validate`]: every field checked; either a complete report or the
//!    list of offending fields.
//! 3. [`repair`]: per-field replacement of whatever failed validation.
//!
//! None of the stages can fail the caller; [`normalize`] always returns a
//! report.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::visibility::{
    MAX_OVERALL_SCORE, MAX_PILLAR_SCORE, UNDETERMINED, placeholder_gaps, placeholder_opportunities,
    placeholder_pillars,
};
use crate::domain::{Pillar, VisibilityReport, VisibilityStatus};

/// The reasoning service's answer with every field left untyped.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReport {
    /// Claimed tier label.
    #[serde(default)]
    pub status: Option<Value>,
    /// Claimed overall score.
    #[serde(default, alias = "overall_score")]
    pub overall_score: Option<Value>,
    /// Claimed pillar list.
    #[serde(default)]
    pub pillars: Option<Value>,
    /// Business description.
    #[serde(default, alias = "business_description")]
    pub business_description: Option<Value>,
    /// Target audience description.
    #[serde(default, alias = "target_audience")]
    pub target_audience: Option<Value>,
    /// Location description.
    #[serde(default)]
    pub location: Option<Value>,
    /// Gap list.
    #[serde(default)]
    pub gaps: Option<Value>,
    /// Opportunity list.
    #[serde(default)]
    pub opportunities: Option<Value>,
}

/// The answer was not a JSON object.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The text is not JSON.
    #[error("unparseable analysis: {0}")]
    Json(#[from] serde_json::Error),

    /// The text is JSON, but not an object.
    #[error("analysis is a JSON {0}, not an object")]
    NotAnObject(&'static str),
}

/// A report field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIssue {
    /// Status is not one of the three tier labels.
    Status,
    /// Overall score missing, non-numeric or outside `0..=100`.
    OverallScore,
    /// Pillars are not exactly four well-formed entries.
    Pillars,
    /// Business description missing or not text.
    BusinessDescription,
    /// Target audience missing or not text.
    TargetAudience,
    /// Location missing or not text.
    Location,
    /// Gaps not a non-empty list of strings.
    Gaps,
    /// Opportunities not a non-empty list of strings.
    Opportunities,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Status => "status",
            Self::OverallScore => "overallScore",
            Self::Pillars => "pillars",
            Self::BusinessDescription => "businessDescription",
            Self::TargetAudience => "targetAudience",
            Self::Location => "location",
            Self::Gaps => "gaps",
            Self::Opportunities => "opportunities",
        })
    }
}

/// Every field of a [`RawReport`] that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid report fields: {}", join_issues(.issues))]
pub struct ValidationError {
    /// Offending fields in report order.
    pub issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parses the reasoning service's text. Markdown code fences around the
/// object are tolerated.
///
/// # Errors
///
/// Returns a [`ParseError`] if the text is not a JSON object.
pub fn parse(text: &str) -> Result<RawReport, ParseError> {
    let value: Value = serde_json::from_str(strip_json_fences(text))?;
    if !value.is_object() {
        return Err(ParseError::NotAnObject(json_kind(&value)));
    }
    Ok(serde_json::from_value(value)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Checks every field, succeeding only if no repair is needed.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming every offending field.
pub fn validate(raw: &RawReport) -> Result<VisibilityReport, ValidationError> {
    let overall_score = check_score(raw.overall_score.as_ref(), MAX_OVERALL_SCORE);
    let pillars = check_pillars(raw.pillars.as_ref());
    let status = check_status(raw.status.as_ref()).filter(|status| {
        match (overall_score, &pillars) {
            (Some(score), Some(_)) => *status == VisibilityStatus::from_score(score),
            _ => true,
        }
    });
    let business_description = check_text(raw.business_description.as_ref());
    let target_audience = check_text(raw.target_audience.as_ref());
    let location = check_text(raw.location.as_ref());
    let gaps = check_list(raw.gaps.as_ref());
    let opportunities = check_list(raw.opportunities.as_ref());

    match (
        status,
        overall_score,
        pillars,
        business_description,
        target_audience,
        location,
        gaps,
        opportunities,
    ) {
        (
            Some(status),
            Some(overall_score),
            Some(pillars),
            Some(business_description),
            Some(target_audience),
            Some(location),
            Some(gaps),
            Some(opportunities),
        ) => Ok(VisibilityReport {
            status,
            overall_score,
            pillars,
            business_description,
            target_audience,
            location,
            gaps,
            opportunities,
        }),
        (status, overall_score, pillars, business, audience, location, gaps, opportunities) => {
            let checks = [
                (status.is_some(), FieldIssue::Status),
                (overall_score.is_some(), FieldIssue::OverallScore),
                (pillars.is_some(), FieldIssue::Pillars),
                (business.is_some(), FieldIssue::BusinessDescription),
                (audience.is_some(), FieldIssue::TargetAudience),
                (location.is_some(), FieldIssue::Location),
                (gaps.is_some(), FieldIssue::Gaps),
                (opportunities.is_some(), FieldIssue::Opportunities),
            ];
            Err(ValidationError {
                issues: checks
                    .into_iter()
                    .filter_map(|(ok, issue)| (!ok).then_some(issue))
                    .collect(),
            })
        }
    }
}

/// Builds a report from `raw`, replacing each invalid field:
///
/// - invalid pillars become four zero placeholders;
/// - an invalid overall score becomes the pillar sum (0 with placeholder
///   pillars), and the status is then derived from that score;
/// - with valid pillars the status is always the tier of the overall
///   score, whatever label was returned;
/// - otherwise an invalid status becomes `NOT CLEAR`;
/// - invalid lists become fixed single-entry lists, invalid text the
///   "could not determine" sentinel.
#[must_use]
pub fn repair(raw: &RawReport) -> VisibilityReport {
    let pillars = check_pillars(raw.pillars.as_ref());

    let (overall_score, status) = match check_score(raw.overall_score.as_ref(), MAX_OVERALL_SCORE) {
        Some(score) if pillars.is_some() => (score, VisibilityStatus::from_score(score)),
        Some(score) => (
            score,
            check_status(raw.status.as_ref()).unwrap_or(VisibilityStatus::NotClear),
        ),
        None => {
            let score = pillars.as_ref().map_or(0, pillar_sum);
            (score, VisibilityStatus::from_score(score))
        }
    };

    VisibilityReport {
        status,
        overall_score,
        pillars: pillars.unwrap_or_else(placeholder_pillars),
        business_description: text_or_undetermined(raw.business_description.as_ref()),
        target_audience: text_or_undetermined(raw.target_audience.as_ref()),
        location: text_or_undetermined(raw.location.as_ref()),
        gaps: check_list(raw.gaps.as_ref()).unwrap_or_else(placeholder_gaps),
        opportunities: check_list(raw.opportunities.as_ref())
            .unwrap_or_else(placeholder_opportunities),
    }
}

/// Runs all three stages on the reasoning service's text.
#[must_use]
pub fn normalize(text: &str) -> VisibilityReport {
    let raw = match parse(text) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "analysis unparseable, using fallback report");
            return VisibilityReport::fallback();
        }
    };

    match validate(&raw) {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(error = %e, "analysis repaired");
            repair(&raw)
        }
    }
}

fn check_status(value: Option<&Value>) -> Option<VisibilityStatus> {
    value.and_then(Value::as_str).and_then(VisibilityStatus::from_label)
}

/// Accepts integers, and floats with no fractional part, within `0..=max`.
fn check_score(value: Option<&Value>, max: u8) -> Option<u8> {
    let number = value?.as_f64()?;
    if !number.is_finite() || number.fract() != 0.0 || number < 0.0 || number > f64::from(max) {
        return None;
    }
    (0..=max).find(|candidate| f64::from(*candidate) == number)
}

fn check_pillars(value: Option<&Value>) -> Option<[Pillar; 4]> {
    let entries = value?.as_array()?;
    let pillars = entries
        .iter()
        .map(check_pillar)
        .collect::<Option<Vec<Pillar>>>()?;
    <[Pillar; 4]>::try_from(pillars).ok()
}

fn check_pillar(value: &Value) -> Option<Pillar> {
    let entry = value.as_object()?;
    Some(Pillar {
        name: check_text(entry.get("name"))?,
        score: check_score(entry.get("score"), MAX_PILLAR_SCORE)?,
        description: check_text(entry.get("description"))?,
    })
}

fn check_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn check_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    if items.is_empty() {
        return None;
    }
    items.iter().map(|item| check_text(Some(item))).collect()
}

fn text_or_undetermined(value: Option<&Value>) -> String {
    check_text(value).unwrap_or_else(|| UNDETERMINED.to_string())
}

fn pillar_sum(pillars: &[Pillar; 4]) -> u8 {
    pillars
        .iter()
        .fold(0_u8, |total, pillar| total.saturating_add(pillar.score))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let inner = inner.trim_start();
    inner.strip_suffix("```").map_or(inner, str::trim)
}
