//! Data Transfer Objects for REST request/response serialization.
//!
//! Request fields are optional at the serde level so that a missing field
//! is reported as a validation error with the service's own error body.

pub mod checkout_dto;
pub mod onboarding_dto;
pub mod visibility_dto;
pub mod webhook_dto;

pub use checkout_dto::*;
pub use onboarding_dto::*;
pub use visibility_dto::*;
pub use webhook_dto::*;

/// Trims `value` and treats an empty result as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
