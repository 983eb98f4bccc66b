//! Visibility test DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::non_blank;
use crate::domain::{Lang, VisibilityReport};
use crate::error::ApiError;

/// Request body for `POST /visibility-test`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct VisibilityTestRequest {
    /// Website to analyze.
    #[serde(default)]
    pub website: Option<String>,
    /// Where to send the result.
    #[serde(default)]
    pub email: Option<String>,
    /// Page language (`en` or `pt`), defaults to `en`.
    #[serde(default)]
    pub lang: Option<String>,
}

/// A validated visibility test request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityTest {
    /// Website to analyze.
    pub website: String,
    /// Visitor email.
    pub email: String,
    /// Visitor language.
    pub lang: Lang,
}

impl VisibilityTestRequest {
    /// Validates presence of website and email, and the email shape.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if either field is missing and
    /// [`ApiError::InvalidEmail`] if the email is malformed.
    pub fn validate(&self) -> Result<VisibilityTest, ApiError> {
        let (Some(website), Some(email)) = (
            non_blank(self.website.as_deref()),
            non_blank(self.email.as_deref()),
        ) else {
            return Err(ApiError::InvalidRequest(
                "Website and email are required".to_string(),
            ));
        };
        if !is_valid_email(email) {
            return Err(ApiError::InvalidEmail);
        }
        Ok(VisibilityTest {
            website: website.to_string(),
            email: email.to_string(),
            lang: Lang::from_code(self.lang.as_deref()),
        })
    }
}

/// `local@domain.tld`: no whitespace, exactly one `@`, a non-empty local
/// part, and a dot in the domain with text on both sides of some dot.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .filter(|(_, c)| *c == '.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

/// Response body for `POST /visibility-test`.
#[derive(Debug, Serialize, ToSchema)]
pub struct VisibilityTestResponse {
    /// Always `true` on a 2xx response.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
    /// The analyzed website.
    pub website: String,
    /// The normalized report.
    pub report: VisibilityReport,
}
