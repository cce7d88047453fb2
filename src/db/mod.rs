use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;

use crate::config::AppConfig;

// ============================================================================
// Database bootstrap - session and schema
// ============================================================================

/// Connect with driver-level timeouts so a stalled node fails the request
/// instead of hanging it.
pub async fn connect(config: &AppConfig) -> Result<Arc<Session>> {
    tracing::info!(endpoint = %config.endpoint(), "Connecting to ScyllaDB...");

    let profile = ExecutionProfile::builder()
        .request_timeout(Some(config.request_timeout))
        .build();

    let session: Session = SessionBuilder::new()
        .known_node(config.endpoint())
        .connection_timeout(Duration::from_secs(5))
        .default_execution_profile_handle(profile.into_handle())
        .build()
        .await
        .with_context(|| format!("failed to connect to {}", config.endpoint()))?;

    Ok(Arc::new(session))
}

pub fn keyspace_ddl(keyspace: &str) -> String {
    format!(
        "CREATE KEYSPACE IF NOT EXISTS {keyspace} WITH REPLICATION = \
         {{'class': 'SimpleStrategy', 'replication_factor': 1}}"
    )
}

pub fn table_ddl(keyspace: &str, table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {keyspace}.{table} (
            order_id text PRIMARY KEY,
            customer_id text,
            pre_tax_amount decimal,
            post_tax_amount decimal,
            created_at timestamp
        )"
    )
}

/// Create the keyspace and orders table when missing.
pub async fn ensure_schema(session: &Session, config: &AppConfig) -> Result<()> {
    session
        .query_unpaged(keyspace_ddl(&config.keyspace), &[])
        .await
        .context("failed to create keyspace")?;

    session
        .query_unpaged(table_ddl(&config.keyspace, &config.table_name), &[])
        .await
        .context("failed to create orders table")?;

    tracing::info!(
        keyspace = %config.keyspace,
        table = %config.table_name,
        "Order schema ready"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_ddl_uses_configured_names() {
        let ddl = table_ddl("orders_ks", "orders_table");

        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS orders_ks.orders_table"));
        assert!(ddl.contains("order_id text PRIMARY KEY"));
        assert!(ddl.contains("pre_tax_amount decimal"));
        assert!(ddl.contains("created_at timestamp"));
    }

    #[test]
    fn test_keyspace_ddl() {
        let ddl = keyspace_ddl("orders_ks");
        assert!(ddl.contains("IF NOT EXISTS orders_ks"));
        assert!(ddl.contains("'replication_factor': 1"));
    }
}
