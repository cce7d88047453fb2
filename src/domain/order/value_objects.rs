use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::ValidationReason;

// ============================================================================
// Order Value Objects
// ============================================================================

/// A persisted customer order. Immutable once created.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub customer_id: String,
    pub pre_tax_amount: Decimal,
    pub post_tax_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Inbound create request. Every field is optional so that an absent value
/// can be told apart from a present one and rejected with a precise reason.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub pre_tax_amount: Option<Decimal>,
    #[serde(default)]
    pub post_tax_amount: Option<Decimal>,
}

/// Fields of a create request that passed validation.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedOrder {
    pub customer_id: String,
    pub pre_tax_amount: Decimal,
    pub post_tax_amount: Decimal,
}

impl CreateOrderRequest {
    pub fn new(
        customer_id: impl Into<String>,
        pre_tax_amount: Decimal,
        post_tax_amount: Decimal,
    ) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            pre_tax_amount: Some(pre_tax_amount),
            post_tax_amount: Some(post_tax_amount),
        }
    }

    /// Checks required fields in wire order: customerId, preTaxAmount, postTaxAmount.
    pub fn validate(&self) -> Result<ValidatedOrder, ValidationReason> {
        let customer_id = match self.customer_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(ValidationReason::MissingCustomerId),
        };
        let pre_tax_amount = self
            .pre_tax_amount
            .ok_or(ValidationReason::MissingPreTaxAmount)?;
        let post_tax_amount = self
            .post_tax_amount
            .ok_or(ValidationReason::MissingPostTaxAmount)?;

        Ok(ValidatedOrder {
            customer_id,
            pre_tax_amount,
            post_tax_amount,
        })
    }
}

/// One page of a list scan. `last_evaluated_key` is `None` once the scan is exhausted.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub last_evaluated_key: Option<String>,
}

impl OrderPage {
    pub fn has_more(&self) -> bool {
        self.last_evaluated_key.is_some()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_validate_accepts_complete_request() {
        let request = CreateOrderRequest::new("customer-1", amount(1000), amount(1080));
        let validated = request.validate().unwrap();

        assert_eq!(validated.customer_id, "customer-1");
        assert_eq!(validated.pre_tax_amount, amount(1000));
        assert_eq!(validated.post_tax_amount, amount(1080));
    }

    #[test]
    fn test_validate_rejects_empty_customer_id() {
        let mut request = CreateOrderRequest::new("", amount(1000), amount(1080));
        assert_eq!(request.validate(), Err(ValidationReason::MissingCustomerId));

        request.customer_id = None;
        assert_eq!(request.validate(), Err(ValidationReason::MissingCustomerId));
    }

    #[test]
    fn test_validate_keeps_whitespace_customer_id() {
        let request = CreateOrderRequest::new("   ", amount(1000), amount(1080));
        let validated = request.validate().unwrap();

        assert_eq!(validated.customer_id, "   ");
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let request = CreateOrderRequest {
            customer_id: Some("customer-1".to_string()),
            pre_tax_amount: None,
            post_tax_amount: None,
        };
        assert_eq!(request.validate(), Err(ValidationReason::MissingPreTaxAmount));
    }

    #[test]
    fn test_create_request_from_camel_case_json() {
        let json = r#"{"customerId":"c-42","preTaxAmount":"12.50","postTaxAmount":"13.75"}"#;
        let request: CreateOrderRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.customer_id.as_deref(), Some("c-42"));
        assert_eq!(request.pre_tax_amount, Some(amount(1250)));
        assert_eq!(request.post_tax_amount, Some(amount(1375)));
    }

    #[test]
    fn test_create_request_missing_fields_deserialize_as_none() {
        let request: CreateOrderRequest = serde_json::from_str(r#"{"customerId":"c-42"}"#).unwrap();

        assert!(request.pre_tax_amount.is_none());
        assert!(request.post_tax_amount.is_none());
        assert_eq!(request.validate(), Err(ValidationReason::MissingPreTaxAmount));
    }

    #[test]
    fn test_order_page_serializes_null_cursor() {
        let page = OrderPage::default();
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["orders"], serde_json::json!([]));
        assert!(json["lastEvaluatedKey"].is_null());
        assert!(!page.has_more());
    }

    #[test]
    fn test_order_serializes_camel_case_fields() {
        let order = Order {
            order_id: "o-1".to_string(),
            customer_id: "c-1".to_string(),
            pre_tax_amount: amount(100),
            post_tax_amount: amount(108),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["orderId"], "o-1");
        assert_eq!(json["customerId"], "c-1");
        assert!(json.get("preTaxAmount").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
