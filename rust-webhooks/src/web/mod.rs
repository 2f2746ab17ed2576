//! HTTP surface for Shopify webhooks.
//!
//! Every topic gets its own route under
//! `/webhooks/shopify/:site_id/<segment>`. The routes accept any method so
//! that [`validate::validate_webhook`] can answer non-POST requests with 405
//! itself; unknown paths fall through to axum's 404.

pub mod handlers;
pub mod signature;
pub mod validate;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::HeaderMap,
    middleware,
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::topic::Topic;

pub use handlers::{health, receive, AppState, HealthResponse};
pub use signature::{sign, verify};
pub use validate::{validate_webhook, Rejection, WebhookAuthenticator};

/// Build the complete application router.
pub fn router(state: AppState) -> Router {
    let mut webhooks = Router::new();
    for topic in Topic::ALL {
        let path = format!("/webhooks/shopify/:site_id/{}", topic.route_segment());
        webhooks = webhooks.route(
            &path,
            any(
                move |state: State<AppState>,
                      site_id: Path<String>,
                      headers: HeaderMap,
                      body: Bytes| receive(state, topic, site_id, headers, body),
            ),
        );
    }

    let webhooks = webhooks.route_layer(middleware::from_fn_with_state(
        state.authenticator.clone(),
        validate_webhook,
    ));

    Router::new()
        .route("/health", get(health))
        .merge(webhooks)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
