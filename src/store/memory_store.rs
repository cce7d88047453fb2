use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{OrderRecord, OrderStore, ScanPage, StoreError};

// ============================================================================
// In-Memory Order Store
// ============================================================================
//
// Ordered map backend. Native scan order is lexicographic key order.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrderStore {
    records: RwLock<BTreeMap<String, OrderRecord>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn put(&self, record: &OrderRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(record.order_id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self.records.read().await.get(order_id).cloned())
    }

    async fn scan_page(
        &self,
        start_after: Option<&str>,
        limit: usize,
    ) -> Result<ScanPage, StoreError> {
        let records = self.records.read().await;

        let lower = match start_after {
            Some(key) => Bound::Excluded(key.to_string()),
            None => Bound::Unbounded,
        };

        // One extra record tells us whether another page exists.
        let mut window: Vec<OrderRecord> = records
            .range((lower, Bound::Unbounded))
            .take(limit.saturating_add(1))
            .map(|(_, record)| record.clone())
            .collect();

        let last_key = if window.len() > limit {
            window.truncate(limit);
            window.last().map(|record| record.order_id.clone())
        } else {
            None
        };

        Ok(ScanPage {
            records: window,
            last_key,
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn record(order_id: &str) -> OrderRecord {
        OrderRecord {
            order_id: order_id.to_string(),
            customer_id: "customer".to_string(),
            pre_tax_amount: Decimal::new(500, 2),
            post_tax_amount: Decimal::new(540, 2),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_scan_walks_key_order() {
        let store = InMemoryOrderStore::new();
        for key in ["c", "a", "e", "b", "d"] {
            store.put(&record(key)).await.unwrap();
        }

        let first = store.scan_page(None, 2).await.unwrap();
        let keys: Vec<_> = first.records.iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(first.last_key.as_deref(), Some("b"));

        let second = store.scan_page(Some("b"), 2).await.unwrap();
        let keys: Vec<_> = second.records.iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(keys, vec!["c", "d"]);

        let third = store.scan_page(Some("d"), 2).await.unwrap();
        assert_eq!(third.records.len(), 1);
        assert!(third.last_key.is_none());
    }

    #[tokio::test]
    async fn test_exact_fit_ends_scan() {
        let store = InMemoryOrderStore::new();
        store.put(&record("a")).await.unwrap();
        store.put(&record("b")).await.unwrap();

        let page = store.scan_page(None, 2).await.unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(page.last_key.is_none());
    }

    #[tokio::test]
    async fn test_unbounded_limit_returns_everything() {
        let store = InMemoryOrderStore::new();
        for key in ["a", "b", "c"] {
            store.put(&record(key)).await.unwrap();
        }

        let page = store.scan_page(None, usize::MAX).await.unwrap();
        assert_eq!(page.records.len(), 3);
        assert!(page.last_key.is_none());

        let page = store.scan_page(Some("a"), usize::MAX).await.unwrap();
        assert_eq!(page.records.len(), 2);
    }

    #[tokio::test]
    async fn test_start_key_need_not_exist() {
        let store = InMemoryOrderStore::new();
        store.put(&record("a")).await.unwrap();
        store.put(&record("c")).await.unwrap();

        let page = store.scan_page(Some("b"), 10).await.unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].order_id, "c");
    }

    #[tokio::test]
    async fn test_put_overwrites_same_key() {
        let store = InMemoryOrderStore::new();
        store.put(&record("a")).await.unwrap();

        let mut updated = record("a");
        updated.customer_id = "someone-else".to_string();
        store.put(&updated).await.unwrap();

        assert_eq!(store.len().await, 1);
        let stored = store.get("a").await.unwrap().unwrap();
        assert_eq!(stored.customer_id, "someone-else");
        assert!(store.get("missing").await.unwrap().is_none());
    }
}
