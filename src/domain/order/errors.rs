use crate::pagination::CursorError;
use crate::store::{StoreError, StoreErrorKind};
use crate::utils::IsTransient;

// ============================================================================
// Order Errors
// ============================================================================

/// Field-identifying reason for a rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    MissingCustomerId,
    MissingPreTaxAmount,
    MissingPostTaxAmount,
    MissingOrderId,
}

impl ValidationReason {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationReason::MissingCustomerId => "customerId",
            ValidationReason::MissingPreTaxAmount => "preTaxAmount",
            ValidationReason::MissingPostTaxAmount => "postTaxAmount",
            ValidationReason::MissingOrderId => "orderId",
        }
    }
}

impl std::fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "missing required field `{}`", self.field())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Validation failed: {0}")]
    Validation(ValidationReason),

    #[error("Invalid pagination cursor: {0}")]
    InvalidCursor(String),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Persistence failure ({kind:?}): {message}")]
    Persistence {
        kind: StoreErrorKind,
        message: String,
    },
}

impl OrderError {
    /// True when the caller sent something unusable, false for server-side failures.
    pub fn is_client_fault(&self) -> bool {
        !matches!(self, OrderError::Persistence { .. })
    }
}

impl IsTransient for OrderError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            OrderError::Persistence {
                kind: StoreErrorKind::Unavailable | StoreErrorKind::Throttled,
                ..
            }
        )
    }
}

impl From<ValidationReason> for OrderError {
    fn from(reason: ValidationReason) -> Self {
        OrderError::Validation(reason)
    }
}

impl From<CursorError> for OrderError {
    fn from(err: CursorError) -> Self {
        OrderError::InvalidCursor(err.to_string())
    }
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        OrderError::Persistence {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
