// ============================================================================
// Order persistence and pagination
// ============================================================================
//
// - domain     - Order value objects, errors and the OrderRepository
// - store      - OrderStore gateway (ScyllaDB and in-memory backends)
// - pagination - opaque continuation cursors
// - config     - start-up configuration
// - db         - Scylla session and schema bootstrap
// - metrics    - Prometheus registry and exporter
// - utils      - caller-side retry
//
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod metrics;
pub mod pagination;
pub mod store;
pub mod utils;
