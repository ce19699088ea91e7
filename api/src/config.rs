use std::env;

use anyhow::Context;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Base URL of the TI API (without the `/v2/backlog` suffix)
    pub ti_base_url: String,
    /// OAuth client-credentials token endpoint
    pub ti_token_url: String,
    pub ti_client_id: String,
    pub ti_client_secret: String,
    /// Checkout profile sent with order submissions, if the account requires one
    pub ti_checkout_profile_id: Option<String>,
    /// Basic-auth credentials TI uses when pushing webhooks
    pub webhook_username: Option<String>,
    pub webhook_password: Option<String>,
    pub default_currency: String,
    /// Max concurrent upstream calls during a bulk logistics refresh
    pub logistics_refresh_concurrency: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let ti_base_url = env::var("TI_BASE_URL")
            .unwrap_or_else(|_| "https://transact.ti.com".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            ti_token_url: env::var("TI_TOKEN_URL")
                .unwrap_or_else(|_| format!("{}/v1/oauth/accesstoken", ti_base_url)),
            ti_base_url,
            ti_client_id: env::var("TI_CLIENT_ID").unwrap_or_default(),
            ti_client_secret: env::var("TI_CLIENT_SECRET").unwrap_or_default(),
            ti_checkout_profile_id: env::var("TI_CHECKOUT_PROFILE_ID").ok(),
            webhook_username: env::var("WEBHOOK_USERNAME").ok(),
            webhook_password: env::var("WEBHOOK_PASSWORD").ok(),
            default_currency: env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "USD".to_string()),
            logistics_refresh_concurrency: env::var("LOGISTICS_REFRESH_CONCURRENCY")
                .ok()
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(8),
        })
    }

    /// Check if inbound webhooks can be authenticated
    pub fn webhooks_enabled(&self) -> bool {
        self.webhook_username.is_some() && self.webhook_password.is_some()
    }

    /// Check if TI credentials are configured
    pub fn ti_enabled(&self) -> bool {
        !self.ti_client_id.is_empty() && !self.ti_client_secret.is_empty()
    }
}
