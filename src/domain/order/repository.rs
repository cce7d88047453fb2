use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::{SubsecRound, Utc};
use uuid::Uuid;

use crate::metrics::Metrics;
use crate::pagination::cursor;
use crate::store::{OrderRecord, OrderStore, StoreError};

use super::errors::{OrderError, ValidationReason};
use super::value_objects::{CreateOrderRequest, Order, OrderPage};

pub const DEFAULT_PAGE_SIZE: usize = 10;

// ============================================================================
// Order Repository
// ============================================================================
//
// Orchestrates: request -> validation -> Order -> OrderStore
//
// Every failure is returned to the caller exactly once. Retrying is the
// caller's decision (see utils::retry).
//
// ============================================================================

pub struct OrderRepository {
    store: Arc<dyn OrderStore>,
    page_size: usize,
    metrics: Arc<Metrics>,
}

impl OrderRepository {
    pub fn new(
        store: Arc<dyn OrderStore>,
        page_size: usize,
        metrics: Arc<Metrics>,
    ) -> anyhow::Result<Self> {
        if page_size == 0 {
            anyhow::bail!("page size must be at least 1");
        }

        Ok(Self {
            store,
            page_size,
            metrics,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Validate, assign an id and timestamp, and persist with a single write.
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, OrderError> {
        let validated = request.validate().inspect_err(|reason| {
            self.metrics.record_rejection(reason.field());
        })?;

        // CQL timestamps hold milliseconds; truncate so the returned order matches what is stored.
        let created_at = Utc::now().trunc_subsecs(3);

        let order = Order {
            order_id: Uuid::new_v4().to_string(),
            customer_id: validated.customer_id,
            pre_tax_amount: validated.pre_tax_amount,
            post_tax_amount: validated.post_tax_amount,
            created_at,
        };

        tracing::info!(
            order_id = %order.order_id,
            customer_id = %order.customer_id,
            backend = self.store.backend_name(),
            "Creating order"
        );

        let record = OrderRecord::from(&order);
        self.timed("put", self.store.put(&record)).await?;

        self.metrics.orders_created.inc();
        tracing::info!(order_id = %order.order_id, "✅ Order persisted");

        Ok(order)
    }

    /// One page of orders in store-native order. `None` or `""` starts from the beginning.
    pub async fn get_orders(
        &self,
        exclusive_start_key: Option<&str>,
    ) -> Result<OrderPage, OrderError> {
        let start_after = match exclusive_start_key.filter(|c| !c.is_empty()) {
            Some(token) => Some(cursor::decode(token).map_err(|e| {
                self.metrics.record_rejection("cursor");
                tracing::warn!(error = %e, "Rejected pagination cursor");
                OrderError::from(e)
            })?),
            None => None,
        };

        let page = self
            .timed("scan", self.store.scan_page(start_after.as_deref(), self.page_size))
            .await?;

        let orders: Vec<Order> = page.records.into_iter().map(Order::from).collect();
        let last_evaluated_key = page.last_key.as_deref().map(cursor::encode);

        self.metrics.record_page(orders.len());
        tracing::debug!(
            count = orders.len(),
            has_more = last_evaluated_key.is_some(),
            "Listed orders"
        );

        Ok(OrderPage {
            orders,
            last_evaluated_key,
        })
    }

    /// Point lookup by order id.
    pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderError> {
        if order_id.trim().is_empty() {
            self.metrics.record_rejection(ValidationReason::MissingOrderId.field());
            return Err(ValidationReason::MissingOrderId.into());
        }

        self.timed("get", self.store.get(order_id))
            .await?
            .map(Order::from)
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))
    }

    async fn timed<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, OrderError> {
        let started = Instant::now();
        let result = call.await;
        self.metrics
            .record_store_call(operation, started.elapsed().as_secs_f64());

        result.map_err(|e| {
            self.metrics.record_store_error(operation, e.as_label());
            tracing::error!(operation, error = %e, "❌ Order store call failed");
            OrderError::from(e)
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
