//! OAuth client-credentials token cache

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::TiError;

/// Tokens are replaced this long before TI says they expire
pub const EXPIRY_SKEW: Duration = Duration::from_secs(60);

const DEFAULT_LIFETIME_SECS: u64 = 3600;

#[derive(Debug, Clone)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: Instant,
}

impl CachedToken {
    pub fn new(access_token: String, expires_in: Duration, issued_at: Instant) -> Self {
        Self {
            access_token,
            expires_at: issued_at + expires_in,
        }
    }

    /// Whether the token can still be sent at `now`
    pub fn is_fresh(&self, now: Instant) -> bool {
        now + EXPIRY_SKEW < self.expires_at
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Fetches and caches bearer tokens for the TI API.
///
/// The cache lock is held while a token is fetched, so concurrent callers
/// wait for a single refresh instead of each requesting their own token.
pub struct TokenProvider {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cache: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(http: Client, token_url: String, client_id: String, client_secret: String) -> Self {
        Self {
            http,
            token_url,
            client_id,
            client_secret,
            cache: Mutex::new(None),
        }
    }

    /// Current bearer token, fetching a new one when needed
    pub async fn token(&self) -> Result<String, TiError> {
        let mut cached = self.cache.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Instant::now()) {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.fetch().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    /// Drop the cached token so the next call fetches a new one
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    async fn fetch(&self) -> Result<CachedToken, TiError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(TiError::Token("TI client credentials are not configured".to_string()));
        }

        let issued_at = Instant::now();
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TiError::Token(format!("{}: {}", status.as_u16(), message)));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| TiError::Token(format!("invalid token response: {}", e)))?;

        let lifetime = Duration::from_secs(body.expires_in.unwrap_or(DEFAULT_LIFETIME_SECS));
        tracing::debug!(expires_in_secs = lifetime.as_secs(), "Fetched TI access token");
        Ok(CachedToken::new(body.access_token, lifetime, issued_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Form, Json, Router};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn token_goes_stale_inside_the_skew_window() {
        let issued = Instant::now();
        let token = CachedToken::new("t".to_string(), Duration::from_secs(3600), issued);

        assert!(token.is_fresh(issued));
        assert!(token.is_fresh(issued + Duration::from_secs(3539)));
        assert!(!token.is_fresh(issued + Duration::from_secs(3540)));
        assert!(!token.is_fresh(issued + Duration::from_secs(4000)));
    }

    #[test]
    fn short_lived_token_is_never_fresh() {
        let issued = Instant::now();
        let token = CachedToken::new("t".to_string(), Duration::from_secs(30), issued);
        assert!(!token.is_fresh(issued));
    }

    async fn token_server(expires_in: u64) -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/token",
            post(move |Form(form): Form<HashMap<String, String>>| {
                let counter = counter.clone();
                async move {
                    assert_eq!(form["grant_type"], "client_credentials");
                    assert_eq!(form["client_id"], "id");
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    Json(serde_json::json!({
                        "access_token": format!("token-{}", n),
                        "token_type": "Bearer",
                        "expires_in": expires_in,
                    }))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve") });
        (format!("http://{}/token", addr), calls)
    }

    fn provider(url: String) -> TokenProvider {
        TokenProvider::new(Client::new(), url, "id".to_string(), "secret".to_string())
    }

    #[tokio::test]
    async fn token_is_reused_until_invalidated() {
        let (url, calls) = token_server(3600).await;
        let tokens = provider(url);

        assert_eq!(tokens.token().await.unwrap(), "token-1");
        assert_eq!(tokens.token().await.unwrap(), "token-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokens.invalidate().await;
        assert_eq!(tokens.token().await.unwrap(), "token-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let (url, calls) = token_server(3600).await;
        let tokens = Arc::new(provider(url));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tokens = tokens.clone();
                tokio::spawn(async move { tokens.token().await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "token-1");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn nearly_expired_token_is_refetched() {
        let (url, calls) = token_server(45).await;
        let tokens = provider(url);

        tokens.token().await.unwrap();
        tokens.token().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_credentials_fail_without_a_request() {
        let tokens = TokenProvider::new(
            Client::new(),
            "http://127.0.0.1:9/token".to_string(),
            String::new(),
            String::new(),
        );
        assert!(matches!(tokens.token().await, Err(TiError::Token(_))));
    }
}
