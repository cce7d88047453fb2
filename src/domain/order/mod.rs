// ============================================================================
// Order Domain
// ============================================================================
//
// - Value objects (Order, CreateOrderRequest, OrderPage)
// - Errors (OrderError, ValidationReason)
// - Repository (OrderRepository: create, list, lookup)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod repository;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
pub use repository::*;
