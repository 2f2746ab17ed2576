//! Webhook request authentication.
//!
//! [`validate_webhook`] is an axum middleware placed in front of every
//! webhook route. It runs the checks below in order and stops at the first
//! failure:
//!
//! 1. method is `POST` (405 otherwise)
//! 2. the Shopify headers are present (400)
//! 3. `Content-Type` is exactly `application/json` (400)
//! 4. the HMAC over the raw body matches `X-Shopify-Hmac-Sha256` (403)
//!
//! Only then is the untouched request forwarded to the route handler.

use std::sync::Arc;

use axum::{
    body::{self, Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;

use crate::config::SharedSecret;
use crate::web::signature;

pub const HEADER_SHOP_DOMAIN: &str = "X-Shopify-Shop-Domain";
pub const HEADER_REQUEST_ID: &str = "X-Request-Id";
pub const HEADER_TOPIC: &str = "X-Shopify-Topic";
pub const HEADER_HMAC: &str = "X-Shopify-Hmac-Sha256";

const REQUIRED_HEADERS: [&str; 4] = [
    HEADER_SHOP_DOMAIN,
    HEADER_REQUEST_ID,
    HEADER_TOPIC,
    HEADER_HMAC,
];

const JSON_CONTENT_TYPE: &str = "application/json";

/// Why a webhook request was turned away.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("missing {0}")]
    MissingHeader(&'static str),
    #[error("missing Content-Type")]
    MissingContentType,
    #[error("bad Content-Type")]
    BadContentType,
    #[error("unreadable request body")]
    UnreadableBody,
    #[error("Invalid HMAC")]
    InvalidHmac,
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Rejection::MissingHeader(_)
            | Rejection::MissingContentType
            | Rejection::BadContentType
            | Rejection::UnreadableBody => StatusCode::BAD_REQUEST,
            Rejection::InvalidHmac => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.to_string();
        match self {
            Rejection::MethodNotAllowed => {
                (status, [(header::ALLOW, "POST")], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

/// Decides whether a request is an authentic Shopify webhook.
#[derive(Clone)]
pub struct WebhookAuthenticator {
    secret: Arc<SharedSecret>,
    max_body_bytes: usize,
}

impl WebhookAuthenticator {
    pub fn new(secret: SharedSecret, max_body_bytes: usize) -> Self {
        Self {
            secret: Arc::new(secret),
            max_body_bytes,
        }
    }

    /// Checks that need only the request head (steps 1 to 3).
    pub fn check_head(&self, method: &Method, headers: &HeaderMap) -> Result<(), Rejection> {
        if *method != Method::POST {
            return Err(Rejection::MethodNotAllowed);
        }

        if let Some(missing) = REQUIRED_HEADERS
            .iter()
            .find(|name| !headers.contains_key(**name))
        {
            return Err(Rejection::MissingHeader(*missing));
        }

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .ok_or(Rejection::MissingContentType)?;
        if content_type.as_bytes() != JSON_CONTENT_TYPE.as_bytes() {
            return Err(Rejection::BadContentType);
        }

        Ok(())
    }

    /// Check the HMAC header against the raw body (step 4).
    pub fn check_signature(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), Rejection> {
        let provided = headers
            .get(HEADER_HMAC)
            .ok_or(Rejection::MissingHeader(HEADER_HMAC))?
            .to_str()
            .map_err(|_| Rejection::InvalidHmac)?;

        if signature::verify(self.secret.as_bytes(), body, provided) {
            Ok(())
        } else {
            Err(Rejection::InvalidHmac)
        }
    }

    /// Run every check in order against a fully buffered request.
    pub fn authenticate(
        &self,
        method: &Method,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<(), Rejection> {
        self.check_head(method, headers)?;
        self.check_signature(headers, body)
    }
}

/// Middleware that forwards only authentic webhook requests.
pub async fn validate_webhook(
    State(authenticator): State<WebhookAuthenticator>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(rejection) = authenticator.check_head(request.method(), request.headers()) {
        return reject(request.headers(), rejection);
    }

    let (parts, body) = request.into_parts();
    let bytes: Bytes = match body::to_bytes(body, authenticator.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "webhook_body_read_failed");
            return reject(&parts.headers, Rejection::UnreadableBody);
        }
    };

    if let Err(rejection) = authenticator.check_signature(&parts.headers, &bytes) {
        return reject(&parts.headers, rejection);
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn reject(headers: &HeaderMap, rejection: Rejection) -> Response {
    warn!(
        reason = %rejection,
        status = rejection.status().as_u16(),
        shop_domain = header_str(headers, HEADER_SHOP_DOMAIN),
        request_id = header_str(headers, HEADER_REQUEST_ID),
        "webhook_rejected"
    );
    rejection.into_response()
}

pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-shared-secret";
    const BODY: &[u8] = br#"{"id":553412611}"#;

    fn authenticator() -> WebhookAuthenticator {
        WebhookAuthenticator::new(SharedSecret::new(SECRET), 1024)
    }

    fn valid_headers(body: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_SHOP_DOMAIN, HeaderValue::from_static("example.myshopify.com"));
        headers.insert(HEADER_REQUEST_ID, HeaderValue::from_static("5f1e2d3c"));
        headers.insert(HEADER_TOPIC, HeaderValue::from_static("customers/create"));
        headers.insert(
            HEADER_HMAC,
            HeaderValue::from_str(&signature::sign(SECRET.as_bytes(), body).unwrap()).unwrap(),
        );
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    #[test]
    fn test_valid_request_is_accepted() {
        let result = authenticator().authenticate(&Method::POST, &valid_headers(BODY), BODY);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_non_post_methods_are_rejected() {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD] {
            let result = authenticator().authenticate(&method, &valid_headers(BODY), BODY);
            assert_eq!(result, Err(Rejection::MethodNotAllowed));
        }
    }

    #[test]
    fn test_method_is_checked_before_headers() {
        let result = authenticator().authenticate(&Method::GET, &HeaderMap::new(), b"");
        assert_eq!(result, Err(Rejection::MethodNotAllowed));
    }

    #[test]
    fn test_each_missing_header_is_named() {
        for name in REQUIRED_HEADERS {
            let mut headers = valid_headers(BODY);
            headers.remove(name);
            let result = authenticator().authenticate(&Method::POST, &headers, BODY);
            assert_eq!(result, Err(Rejection::MissingHeader(name)));
        }
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let mut headers = valid_headers(BODY);
        let domain = headers.remove(HEADER_SHOP_DOMAIN).unwrap();
        headers.insert("x-shopify-shop-domain", domain);
        assert_eq!(authenticator().authenticate(&Method::POST, &headers, BODY), Ok(()));
    }

    #[test]
    fn test_content_type_must_be_exact() {
        let mut headers = valid_headers(BODY);
        headers.remove(header::CONTENT_TYPE);
        assert_eq!(
            authenticator().authenticate(&Method::POST, &headers, BODY),
            Err(Rejection::MissingContentType)
        );

        for value in ["application/json; charset=utf-8", "Application/JSON", "text/plain"] {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
            assert_eq!(
                authenticator().authenticate(&Method::POST, &headers, BODY),
                Err(Rejection::BadContentType)
            );
        }
    }

    #[test]
    fn test_headers_are_checked_before_signature() {
        let mut headers = valid_headers(b"something else");
        headers.remove(HEADER_TOPIC);
        assert_eq!(
            authenticator().authenticate(&Method::POST, &headers, BODY),
            Err(Rejection::MissingHeader(HEADER_TOPIC))
        );
    }

    #[test]
    fn test_wrong_signature_is_forbidden() {
        let headers = valid_headers(b"tampered");
        let result = authenticator().authenticate(&Method::POST, &headers, BODY);
        assert_eq!(result, Err(Rejection::InvalidHmac));
        assert_eq!(Rejection::InvalidHmac.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_signature_under_other_secret_is_forbidden() {
        let mut headers = valid_headers(BODY);
        let forged = signature::sign(b"not-the-secret", BODY).unwrap();
        headers.insert(HEADER_HMAC, HeaderValue::from_str(&forged).unwrap());
        assert_eq!(
            authenticator().authenticate(&Method::POST, &headers, BODY),
            Err(Rejection::InvalidHmac)
        );
    }

    #[test]
    fn test_rejection_statuses() {
        assert_eq!(Rejection::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(Rejection::MissingHeader(HEADER_TOPIC).status(), StatusCode::BAD_REQUEST);
        assert_eq!(Rejection::BadContentType.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Rejection::MissingHeader(HEADER_REQUEST_ID).to_string(),
            "missing X-Request-Id"
        );
    }

    #[test]
    fn test_method_not_allowed_advertises_post() {
        let response = Rejection::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
    }
}
