//! Payment service entry point.
//!
//! Loads configuration, connects to PostgreSQL, wires adapters into the
//! HTTP router and serves until Ctrl-C or SIGTERM.

use std::sync::Arc;

use axum::http::HeaderValue;
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use payment_service::adapters::http::{payment_router, PaymentAppState};
use payment_service::adapters::postgres::{
    PostgresPaymentReader, PostgresPaymentRepository, PostgresWebhookEventRepository,
};
use payment_service::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use payment_service::adapters::{WebhookLedgerPruner, WebhookLedgerPrunerConfig};
use payment_service::config::{AppConfig, ServerConfig};
use payment_service::ports::WebhookEventRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.server);

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations applied");
    }

    let payment_repository = Arc::new(PostgresPaymentRepository::new(pool.clone()));
    let payment_reader = Arc::new(PostgresPaymentReader::new(pool.clone()));
    let webhook_events: Arc<dyn WebhookEventRepository> =
        Arc::new(PostgresWebhookEventRepository::new(pool));
    let payment_processor = Arc::new(StripePaymentAdapter::new(
        StripeConfig::from_payment_config(&config.payment),
    ));

    let state = PaymentAppState {
        payment_repository,
        payment_reader,
        payment_processor,
        webhook_events: webhook_events.clone(),
        default_currency: config.payment.currency.to_ascii_lowercase(),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let pruner = WebhookLedgerPruner::new(
        webhook_events,
        WebhookLedgerPrunerConfig::default()
            .with_retention_days(config.payment.webhook_retention_days),
    );
    let pruner_handle = tokio::spawn(async move { pruner.run(shutdown_rx).await });

    let app = payment_router()
        .with_state(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server)?)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        environment = ?config.server.environment,
        live_mode = config.payment.is_live_mode(),
        "Payment service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tx.send(true).ok();
    pruner_handle.await?;
    info!("Payment service stopped");

    Ok(())
}

/// Initialise tracing. `RUST_LOG` takes precedence over the configured level.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if server.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .compact()
            .with_env_filter(filter)
            .init();
    }
}

fn cors_layer(server: &ServerConfig) -> Result<CorsLayer, axum::http::header::InvalidHeaderValue> {
    let origins = server.cors_origins_list();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
