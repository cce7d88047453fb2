// ============================================================================
// Storage Gateway
// ============================================================================
//
// The only layer that talks to the key-value store. Records are keyed by
// order_id; scans walk the store in its native order and resume strictly
// after a given key.
//
// ============================================================================

mod memory_store;
mod scylla_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::order::Order;

pub use memory_store::InMemoryOrderStore;
pub use scylla_store::ScyllaOrderStore;

/// Storage shape of an order row.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_id: String,
    pub pre_tax_amount: Decimal,
    pub post_tax_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderRecord {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id.clone(),
            customer_id: order.customer_id.clone(),
            pre_tax_amount: order.pre_tax_amount,
            post_tax_amount: order.post_tax_amount,
            created_at: order.created_at,
        }
    }
}

impl From<OrderRecord> for Order {
    fn from(record: OrderRecord) -> Self {
        Self {
            order_id: record.order_id,
            customer_id: record.customer_id,
            pre_tax_amount: record.pre_tax_amount,
            post_tax_amount: record.post_tax_amount,
            created_at: record.created_at,
        }
    }
}

/// Result of one bounded scan. `last_key` is set only while more records remain.
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    pub records: Vec<OrderRecord>,
    pub last_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Unavailable,
    Throttled,
    NotFound,
    Unknown,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store throttled the request: {0}")]
    Throttled(String),

    #[error("store resource not found: {0}")]
    NotFound(String),

    #[error("store failure: {0}")]
    Unknown(String),
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Unavailable(_) => StoreErrorKind::Unavailable,
            StoreError::Throttled(_) => StoreErrorKind::Throttled,
            StoreError::NotFound(_) => StoreErrorKind::NotFound,
            StoreError::Unknown(_) => StoreErrorKind::Unknown,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self.kind() {
            StoreErrorKind::Unavailable => "unavailable",
            StoreErrorKind::Throttled => "throttled",
            StoreErrorKind::NotFound => "not_found",
            StoreErrorKind::Unknown => "unknown",
        }
    }
}

/// Key-value access used by the order repository.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Write a record keyed by `order_id`. Overwrites on key collision.
    async fn put(&self, record: &OrderRecord) -> Result<(), StoreError>;

    /// Point read by key.
    async fn get(&self, order_id: &str) -> Result<Option<OrderRecord>, StoreError>;

    /// Up to `limit` records strictly after `start_after` (or from the start).
    async fn scan_page(
        &self,
        start_after: Option<&str>,
        limit: usize,
    ) -> Result<ScanPage, StoreError>;

    fn backend_name(&self) -> &'static str;
}
