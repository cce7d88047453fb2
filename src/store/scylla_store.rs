use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use scylla::client::session::Session;
use scylla::errors::{DbError, ExecutionError, RequestAttemptError};
use scylla::value::CqlDecimal;

use super::{OrderRecord, OrderStore, ScanPage, StoreError};

// ============================================================================
// Scylla Order Store
// ============================================================================
//
// Orders live in a single table keyed by order_id:
//
//   order_id text PRIMARY KEY, customer_id text,
//   pre_tax_amount decimal, post_tax_amount decimal, created_at timestamp
//
// A full-table scan iterates partitions in token order, so paging resumes
// with `token(order_id) > token(?)`.
//
// ============================================================================

type OrderRow = (String, String, CqlDecimal, CqlDecimal, DateTime<Utc>);

const SELECT_COLUMNS: &str =
    "order_id, customer_id, pre_tax_amount, post_tax_amount, created_at";

pub struct ScyllaOrderStore {
    session: Arc<Session>,
    insert_query: String,
    get_query: String,
    first_page_query: String,
    next_page_query: String,
}

impl ScyllaOrderStore {
    /// `keyspace` and `table` must already be validated CQL identifiers.
    pub fn new(session: Arc<Session>, keyspace: &str, table: &str) -> Self {
        let qualified = format!("{keyspace}.{table}");

        Self {
            session,
            insert_query: format!(
                "INSERT INTO {qualified} ({SELECT_COLUMNS}) VALUES (?, ?, ?, ?, ?)"
            ),
            get_query: format!("SELECT {SELECT_COLUMNS} FROM {qualified} WHERE order_id = ?"),
            first_page_query: format!("SELECT {SELECT_COLUMNS} FROM {qualified} LIMIT ?"),
            next_page_query: format!(
                "SELECT {SELECT_COLUMNS} FROM {qualified} WHERE token(order_id) > token(?) LIMIT ?"
            ),
        }
    }

    async fn select(
        &self,
        query: &str,
        values: impl scylla::serialize::row::SerializeRow,
    ) -> Result<Vec<OrderRecord>, StoreError> {
        let result = self
            .session
            .query_unpaged(query.to_string(), values)
            .await
            .map_err(|e| classify_execution_error(&e))?;

        let rows_result = result
            .into_rows_result()
            .map_err(|e| StoreError::Unknown(format!("expected rows: {e}")))?;

        let mut records = Vec::new();
        for row in rows_result
            .rows::<OrderRow>()
            .map_err(|e| StoreError::Unknown(e.to_string()))?
        {
            let (order_id, customer_id, pre_tax, post_tax, created_at) =
                row.map_err(|e| StoreError::Unknown(e.to_string()))?;

            records.push(OrderRecord {
                order_id,
                customer_id,
                pre_tax_amount: cql_to_decimal(&pre_tax)?,
                post_tax_amount: cql_to_decimal(&post_tax)?,
                created_at,
            });
        }

        Ok(records)
    }
}

#[async_trait]
impl OrderStore for ScyllaOrderStore {
    async fn put(&self, record: &OrderRecord) -> Result<(), StoreError> {
        self.session
            .query_unpaged(
                self.insert_query.clone(),
                (
                    record.order_id.as_str(),
                    record.customer_id.as_str(),
                    decimal_to_cql(record.pre_tax_amount),
                    decimal_to_cql(record.post_tax_amount),
                    record.created_at,
                ),
            )
            .await
            .map_err(|e| classify_execution_error(&e))?;

        tracing::debug!(order_id = %record.order_id, "Wrote order row");
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<OrderRecord>, StoreError> {
        let mut records = self.select(&self.get_query, (order_id,)).await?;
        Ok(records.pop())
    }

    async fn scan_page(
        &self,
        start_after: Option<&str>,
        limit: usize,
    ) -> Result<ScanPage, StoreError> {
        // One extra row tells us whether another page exists.
        let fetch = i32::try_from(limit.saturating_add(1)).unwrap_or(i32::MAX);

        let mut records = match start_after {
            Some(key) => self.select(&self.next_page_query, (key, fetch)).await?,
            None => self.select(&self.first_page_query, (fetch,)).await?,
        };

        let last_key = if records.len() > limit {
            records.truncate(limit);
            records.last().map(|record| record.order_id.clone())
        } else {
            None
        };

        tracing::debug!(
            start_after = ?start_after,
            returned = records.len(),
            exhausted = last_key.is_none(),
            "Scanned order rows"
        );

        Ok(ScanPage { records, last_key })
    }

    fn backend_name(&self) -> &'static str {
        "scylla"
    }
}

// ============================================================================
// Driver error classification
// ============================================================================

pub(crate) fn classify_execution_error(err: &ExecutionError) -> StoreError {
    let message = err.to_string();

    match err {
        ExecutionError::RequestTimeout(_)
        | ExecutionError::EmptyPlan
        | ExecutionError::ConnectionPoolError(_) => StoreError::Unavailable(message),
        ExecutionError::LastAttemptError(RequestAttemptError::DbError(db_error, reason)) => {
            classify_db_error(db_error, reason, message)
        }
        _ => StoreError::Unknown(message),
    }
}

fn classify_db_error(db_error: &DbError, reason: &str, message: String) -> StoreError {
    match db_error {
        DbError::Unavailable { .. } | DbError::IsBootstrapping => StoreError::Unavailable(message),
        DbError::Overloaded
        | DbError::RateLimitReached { .. }
        | DbError::ReadTimeout { .. }
        | DbError::WriteTimeout { .. } => StoreError::Throttled(message),
        DbError::Invalid if is_missing_schema(reason) => StoreError::NotFound(message),
        _ => StoreError::Unknown(message),
    }
}

fn is_missing_schema(reason: &str) -> bool {
    let reason = reason.to_ascii_lowercase();
    reason.contains("unconfigured table") || reason.contains("does not exist")
}

// ============================================================================
// Decimal <-> CQL decimal
// ============================================================================

pub(crate) fn decimal_to_cql(value: Decimal) -> CqlDecimal {
    let bytes = value.mantissa().to_be_bytes();

    // Drop redundant sign-extension bytes; keep at least one.
    let mut start = 0;
    while start < bytes.len() - 1 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }

    CqlDecimal::from_signed_be_bytes_slice_and_exponent(&bytes[start..], value.scale() as i32)
}

pub(crate) fn cql_to_decimal(value: &CqlDecimal) -> Result<Decimal, StoreError> {
    let (bytes, scale) = value.as_signed_be_bytes_slice_and_exponent();

    if bytes.len() > 16 {
        return Err(StoreError::Unknown(format!(
            "decimal mantissa of {} bytes does not fit",
            bytes.len()
        )));
    }
    let scale = u32::try_from(scale)
        .map_err(|_| StoreError::Unknown(format!("negative decimal scale {scale}")))?;

    let fill = match bytes.first() {
        Some(b) if b & 0x80 != 0 => 0xFF,
        _ => 0x00,
    };
    let mut buf = [fill; 16];
    buf[16 - bytes.len()..].copy_from_slice(bytes);

    Decimal::try_from_i128_with_scale(i128::from_be_bytes(buf), scale)
        .map_err(|e| StoreError::Unknown(format!("decimal out of range: {e}")))
}
