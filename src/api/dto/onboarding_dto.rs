//! Onboarding DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::non_blank;
use crate::error::ApiError;
use crate::service::OnboardingSubmission;

/// Request body for `POST /onboarding`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OnboardingRequest {
    /// Email used at checkout.
    #[serde(default)]
    pub email: Option<String>,
    /// Website to optimize.
    #[serde(default)]
    pub website: Option<String>,
    /// What the business sells.
    #[serde(default)]
    pub primary_services: Option<String>,
    /// Main city served.
    #[serde(default)]
    pub target_city: Option<String>,
    /// Known competitors, free text.
    #[serde(default)]
    pub competitors: Option<String>,
}

impl OnboardingRequest {
    /// Checks that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if a required field is missing
    /// or blank.
    pub fn into_submission(self) -> Result<OnboardingSubmission, ApiError> {
        let required = |value: &Option<String>| non_blank(value.as_deref()).map(str::to_string);
        match (
            required(&self.email),
            required(&self.website),
            required(&self.primary_services),
            required(&self.target_city),
        ) {
            (Some(email), Some(website), Some(primary_services), Some(target_city)) => {
                Ok(OnboardingSubmission {
                    email,
                    website,
                    primary_services,
                    target_city,
                    competitors: required(&self.competitors),
                })
            }
            _ => Err(ApiError::InvalidRequest("Missing required fields".to_string())),
        }
    }
}

/// Response body for `POST /onboarding`.
#[derive(Debug, Serialize, ToSchema)]
pub struct OnboardingResponse {
    /// Always `true` on a 2xx response.
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
}
