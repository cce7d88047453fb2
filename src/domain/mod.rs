// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Order records and the repository that persists and pages them.
// Storage details live in crate::store.
//
// ============================================================================

pub mod order;
