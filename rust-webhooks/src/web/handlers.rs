//! Webhook endpoint handlers.
//!
//! By the time a request reaches [`receive`] the authentication middleware
//! has already accepted it, so the handler only hands the raw body to the
//! [`Synchronizer`] and turns the result into a status code.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::sync::{SyncError, Synchronizer};
use crate::topic::Topic;
use crate::web::validate::{
    header_str, WebhookAuthenticator, HEADER_REQUEST_ID, HEADER_SHOP_DOMAIN, HEADER_TOPIC,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub synchronizer: Synchronizer,
    pub authenticator: WebhookAuthenticator,
}

impl AppState {
    pub fn new(
        config: Config,
        synchronizer: Synchronizer,
        authenticator: WebhookAuthenticator,
    ) -> Self {
        Self {
            config: Arc::new(config),
            synchronizer,
            authenticator,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Shopify Webhooks
// =============================================================================

/// Handle one authenticated notification for `topic`.
///
/// The route decides the topic; a disagreeing `X-Shopify-Topic` header is
/// only logged.
pub async fn receive(
    State(state): State<AppState>,
    topic: Topic,
    Path(site_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let shop_domain = header_str(&headers, HEADER_SHOP_DOMAIN);
    let request_id = header_str(&headers, HEADER_REQUEST_ID);
    let header_topic = header_str(&headers, HEADER_TOPIC);

    if header_topic != topic.header_value() {
        warn!(
            route_topic = %topic,
            header_topic,
            shop_domain,
            request_id,
            "shopify_topic_mismatch"
        );
    }

    info!(
        topic = %topic,
        site_id = %site_id,
        shop_domain,
        request_id,
        body_length = body.len(),
        "shopify_webhook_received"
    );

    match state.synchronizer.apply(topic, &body).await {
        Ok(outcome) => {
            info!(
                topic = %topic,
                outcome = outcome.as_str(),
                request_id,
                "shopify_webhook_acknowledged"
            );
            StatusCode::OK.into_response()
        }
        Err(e) => {
            if e.is_payload_error() {
                warn!(topic = %topic, request_id, error = %e, "shopify_payload_rejected");
            } else {
                error!(topic = %topic, request_id, error = %e, "shopify_sync_failed");
            }
            e.into_response()
        }
    }
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        if self.is_payload_error() {
            (StatusCode::BAD_REQUEST, self.to_string()).into_response()
        } else {
            // Database details stay in the log.
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}
