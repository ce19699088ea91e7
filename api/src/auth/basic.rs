//! HTTP Basic authentication middleware for TI webhooks

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;

/// Credentials TI must present when pushing webhooks.
///
/// When either half is missing every request is refused.
#[derive(Debug, Clone, Default)]
pub struct WebhookCredentials {
    username: Option<String>,
    password: Option<String>,
}

impl WebhookCredentials {
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        Self { username, password }
    }

    fn verify(&self, username: &str, password: &str) -> bool {
        match (&self.username, &self.password) {
            (Some(expected_user), Some(expected_pass)) => {
                // evaluate both so timing does not reveal which half matched
                let user_ok = secret_matches(expected_user, username);
                let pass_ok = secret_matches(expected_pass, password);
                user_ok & pass_ok
            }
            _ => false,
        }
    }
}

type HmacSha256 = Hmac<Sha256>;

fn tag(key: &str, value: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).ok()?;
    mac.update(value.as_bytes());
    Some(mac)
}

/// Compare a presented secret against the configured one.
///
/// Both sides are reduced to fixed-size MACs first, so the comparison time
/// depends on neither the content nor the length of the presented value.
fn secret_matches(expected: &str, presented: &str) -> bool {
    let (Some(expected_mac), Some(presented_mac)) =
        (tag(expected, expected), tag(expected, presented))
    else {
        return false;
    };
    let presented_bytes = presented_mac.finalize().into_bytes();
    expected_mac.verify_slice(&presented_bytes).is_ok()
}

/// Decode the `Authorization: Basic ...` header into (username, password)
fn extract_basic_credentials(request: &Request<Body>) -> Option<(String, String)> {
    let header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())?;
    let encoded = header
        .strip_prefix("Basic ")
        .or_else(|| header.strip_prefix("basic "))?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Authentication middleware
///
/// Rejects the request with 401 and a `WWW-Authenticate` challenge unless it
/// carries the configured webhook credentials.
pub async fn basic_auth_middleware(
    State(credentials): State<WebhookCredentials>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let (username, password) = extract_basic_credentials(&request).ok_or(AppError::Unauthorized)?;

    if !credentials.verify(&username, &password) {
        tracing::warn!(username = %username, "Rejected webhook with invalid credentials");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::post, Router};
    use tower::ServiceExt;

    fn app(credentials: WebhookCredentials) -> Router {
        Router::new()
            .route("/hook", post(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(
                credentials,
                basic_auth_middleware,
            ))
    }

    fn configured() -> WebhookCredentials {
        WebhookCredentials::new(Some("ti".to_string()), Some("s3cret:with-colon".to_string()))
    }

    fn request(authorization: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/hook");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn basic(user: &str, pass: &str) -> Option<String> {
        Some(format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass))))
    }

    #[tokio::test]
    async fn valid_credentials_pass_through() {
        let response = app(configured())
            .oneshot(request(basic("ti", "s3cret:with-colon")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_header_is_challenged() {
        let response = app(configured()).oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let challenge = response
            .headers()
            .get("www-authenticate")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(challenge.starts_with("Basic"));
    }

    #[tokio::test]
    async fn wrong_password_and_garbage_are_rejected() {
        for header in [
            basic("ti", "wrong"),
            basic("other", "s3cret:with-colon"),
            Some("Basic not-base64!!".to_string()),
            Some("Bearer abc".to_string()),
        ] {
            let response = app(configured()).oneshot(request(header)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn secrets_of_any_length_compare_safely() {
        assert!(secret_matches("s3cret", "s3cret"));
        assert!(!secret_matches("s3cret", "s3cre"));
        assert!(!secret_matches("s3cret", "s3cret-and-more"));
        assert!(!secret_matches("s3cret", ""));
        assert!(!secret_matches("", "s3cret"));
        assert!(secret_matches("", ""));
    }

    #[tokio::test]
    async fn length_mismatched_credentials_are_rejected() {
        for header in [
            basic("t", "s3cret:with-colon"),
            basic("ti", "s3cret"),
            basic("ti", "s3cret:with-colon-and-a-much-longer-tail"),
        ] {
            let response = app(configured()).oneshot(request(header)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn unconfigured_credentials_refuse_everything() {
        let response = app(WebhookCredentials::default())
            .oneshot(request(basic("", "")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
