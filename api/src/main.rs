//! Procure API Server
//!
//! Procurement backend for TI component purchasing: quotations, orders,
//! shipment tracking, invoices and remittances, kept in sync with the TI
//! backlog API. Uses hexagonal (ports & adapters) architecture for clean
//! separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use sea_orm::Database;
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{
    ensure_schema, PostgresOrderRepository, PostgresQuotationRepository,
    PostgresRemittanceRepository, TiClientImpl,
};
use app::{OrderService, QuotationService, RemittanceService};
use auth::{basic_auth_middleware, WebhookCredentials};
use config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub order_service: Arc<OrderService<PostgresOrderRepository, TiClientImpl>>,
    pub quotation_service: Arc<
        QuotationService<PostgresQuotationRepository, PostgresOrderRepository, TiClientImpl>,
    >,
    pub remittance_service: Arc<
        RemittanceService<PostgresRemittanceRepository, PostgresOrderRepository, TiClientImpl>,
    >,
    pub config: Config,
}

impl AppState {
    /// Wire repositories, the TI client and services from a database connection
    pub fn new(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let order_repo = Arc::new(PostgresOrderRepository::new(db.clone()));
        let quotation_repo = Arc::new(PostgresQuotationRepository::new(db.clone()));
        let remittance_repo = Arc::new(PostgresRemittanceRepository::new(db));

        let ti_client = Arc::new(TiClientImpl::new(
            config.ti_base_url.clone(),
            config.ti_token_url.clone(),
            config.ti_client_id.clone(),
            config.ti_client_secret.clone(),
        ));

        let order_service = Arc::new(
            OrderService::new(
                order_repo.clone(),
                ti_client.clone(),
                config.default_currency.clone(),
            )
            .with_checkout_profile(config.ti_checkout_profile_id.clone())
            .with_refresh_concurrency(config.logistics_refresh_concurrency),
        );

        let quotation_service = Arc::new(QuotationService::new(
            quotation_repo,
            order_repo.clone(),
            ti_client.clone(),
            config.default_currency.clone(),
        ));

        let remittance_service = Arc::new(RemittanceService::new(
            remittance_repo,
            order_repo,
            ti_client,
            config.default_currency.clone(),
        ));

        Self {
            order_service,
            quotation_service,
            remittance_service,
            config,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the HTTP router for the given state
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // Webhook rate limit: 2 req/sec sustained, burst of 5, keyed by peer IP
    // (SmartIpKeyExtractor would require X-Forwarded-For from a reverse proxy)
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(2)
            .burst_size(5)
            .finish()
            .context("invalid webhook rate limit configuration")?,
    );

    let credentials = WebhookCredentials::new(
        state.config.webhook_username.clone(),
        state.config.webhook_password.clone(),
    );

    // TI pushes; Basic auth behind the rate limiter
    let webhook_routes = Router::new()
        .route("/webhooks/ti/orders", post(handlers::ti_order_webhook))
        .route("/webhooks/ti/asn", post(handlers::ti_asn_webhook))
        .route("/webhooks/ti/quotes", post(handlers::ti_quote_webhook))
        .layer(middleware::from_fn_with_state(
            credentials,
            basic_auth_middleware,
        ))
        .layer(GovernorLayer {
            config: governor_config,
        });

    let app = Router::new()
        .route("/health", get(health))
        // Orders
        .route(
            "/orders",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route(
            "/orders/logistics/refresh",
            post(handlers::refresh_all_logistics),
        )
        .route(
            "/orders/:id",
            get(handlers::get_order)
                .patch(handlers::update_order)
                .delete(handlers::delete_order),
        )
        .route(
            "/orders/:id/components",
            post(handlers::add_order_component),
        )
        .route(
            "/orders/:id/components/:part_number",
            patch(handlers::update_order_component).delete(handlers::remove_order_component),
        )
        .route("/orders/:id/submit", post(handlers::submit_order))
        .route("/orders/:id/sync", post(handlers::sync_order))
        .route(
            "/orders/:id/logistics/refresh",
            post(handlers::refresh_order_logistics),
        )
        .route(
            "/orders/:id/invoices/refresh",
            post(handlers::refresh_order_invoices),
        )
        // Quotations
        .route(
            "/quotations",
            get(handlers::list_quotations).post(handlers::create_quotation),
        )
        .route(
            "/quotations/:id",
            get(handlers::get_quotation)
                .patch(handlers::update_quotation)
                .delete(handlers::delete_quotation),
        )
        .route(
            "/quotations/:id/components",
            post(handlers::add_quotation_component),
        )
        .route(
            "/quotations/:id/components/:part_number",
            patch(handlers::update_quotation_component)
                .delete(handlers::remove_quotation_component),
        )
        .route("/quotations/:id/submit", post(handlers::submit_quotation))
        .route("/quotations/:id/sync", post(handlers::sync_quotation))
        .route("/quotations/:id/order", post(handlers::convert_quotation))
        // Remittances
        .route(
            "/remittances",
            get(handlers::list_remittances).post(handlers::create_remittance),
        )
        .route(
            "/remittances/:id",
            get(handlers::get_remittance)
                .patch(handlers::update_remittance)
                .delete(handlers::delete_remittance),
        )
        .route(
            "/remittances/:id/items",
            post(handlers::add_remittance_item),
        )
        .route(
            "/remittances/:id/items/:invoice_number",
            patch(handlers::update_remittance_item).delete(handlers::remove_remittance_item),
        )
        .route(
            "/remittances/:id/submit",
            post(handlers::submit_remittance),
        )
        .merge(webhook_routes)
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,procure_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Procure API...");

    let config = Config::from_env()?;
    if !config.ti_enabled() {
        tracing::warn!("TI_CLIENT_ID/TI_CLIENT_SECRET not set; upstream calls will fail");
    }
    if !config.webhooks_enabled() {
        tracing::warn!("WEBHOOK_USERNAME/WEBHOOK_PASSWORD not set; all webhooks will be refused");
    }

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    ensure_schema(&db)
        .await
        .context("failed to create database schema")?;
    tracing::info!("Database connected");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = build_router(AppState::new(db, config))?;

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
