//! REST endpoint handlers organized by resource.

pub mod checkout;
pub mod onboarding;
pub mod system;
pub mod visibility;
pub mod webhook;

use axum::Router;

use crate::api::origin::OriginPolicy;
use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
///
/// The browser-facing checkout and onboarding routes get a CORS layer for
/// `origins`; the visibility test answers its own preflight, and the
/// webhook is server-to-server.
pub fn routes(origins: &OriginPolicy) -> Router<AppState> {
    Router::new()
        .merge(webhook::routes())
        .merge(visibility::routes())
        .merge(
            checkout::routes()
                .merge(onboarding::routes())
                .layer(origins.cors_layer()),
        )
}
