use std::sync::Arc;

use rust_decimal::Decimal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scylla_orders::config::{AppConfig, StoreBackend};
use scylla_orders::db;
use scylla_orders::domain::order::{CreateOrderRequest, OrderRepository};
use scylla_orders::metrics;
use scylla_orders::store::{InMemoryOrderStore, OrderStore, ScyllaOrderStore};
use scylla_orders::utils::{retry_on_transient, RetryConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,scylla_orders=debug")),
        )
        .init();

    tracing::info!("🚀 Starting order service");

    // === 1. Configuration ===
    let config = AppConfig::from_env()?;
    tracing::info!(
        table = %config.table_name,
        backend = ?config.backend,
        page_size = config.page_size,
        "Loaded configuration"
    );

    // === 2. Order store ===
    let store: Arc<dyn OrderStore> = match config.backend {
        StoreBackend::Scylla => {
            let session = db::connect(&config).await?;
            db::ensure_schema(&session, &config).await?;
            Arc::new(ScyllaOrderStore::new(
                session,
                &config.keyspace,
                &config.table_name,
            ))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory order store; data is lost on exit");
            Arc::new(InMemoryOrderStore::new())
        }
    };

    // === 3. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    let metrics_registry = Arc::new(metrics.registry().clone());
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let system = actix_web::rt::System::new();
        let server = metrics::start_metrics_server(metrics_registry, metrics_port);
        if let Err(e) = system.block_on(server) {
            tracing::error!("Metrics server error: {}", e);
        }
    });

    // === 4. Repository ===
    let repository = Arc::new(OrderRepository::new(store, config.page_size, metrics)?);

    // === 5. Create a few orders ===
    for (customer, pre_tax, post_tax) in [
        ("customer-a", Decimal::new(1000, 2), Decimal::new(1080, 2)),
        ("customer-b", Decimal::new(2599, 2), Decimal::new(2807, 2)),
        ("customer-c", Decimal::new(499, 2), Decimal::new(539, 2)),
    ] {
        let request = CreateOrderRequest::new(customer, pre_tax, post_tax);
        let order = retry_on_transient(RetryConfig::default(), |_attempt| {
            let repository = repository.clone();
            let request = request.clone();
            async move { repository.create_order(request).await }
        })
        .await
        .into_result()?;

        tracing::info!(order = %serde_json::to_string(&order)?, "✅ Order created");
    }

    // === 6. Walk every page ===
    let mut cursor: Option<String> = None;
    let mut total = 0usize;
    loop {
        let page = repository.get_orders(cursor.as_deref()).await?;
        total += page.orders.len();

        tracing::info!(
            count = page.orders.len(),
            last_evaluated_key = ?page.last_evaluated_key,
            "📄 Fetched order page"
        );

        if let Some(first) = page.orders.first() {
            let found = repository.get_order(&first.order_id).await?;
            tracing::debug!(order_id = %found.order_id, "Looked up order by id");
        }

        match page.last_evaluated_key {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    tracing::info!(total, "🎉 Listed all orders");

    Ok(())
}
