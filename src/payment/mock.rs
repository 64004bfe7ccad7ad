//! Gateway stand-in for tests and wiring

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{PaymentError, PaymentProvider, PaymentType, PaymentVariant};
use crate::domain::aggregates::order::Order;

/// Provider with one payment type, an optional flat fee and a scripted
/// confirmation failure.
pub struct MockPaymentProvider {
    typ: String,
    name: String,
    fee: Decimal,
    fail_with: Option<String>,
}

impl MockPaymentProvider {
    pub fn new(typ: impl Into<String>, name: impl Into<String>) -> Self {
        Self { typ: typ.into(), name: name.into(), fee: Decimal::ZERO, fail_with: None }
    }

    /// Flat handling fee carried into the variant's price.
    pub fn with_fee(mut self, fee: Decimal) -> Self {
        self.fee = fee;
        self
    }

    /// Makes every `confirm` fail with the given processor message.
    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    fn enumerate_types(
        &self,
        _order: Option<&Order>,
        _customer: Option<Uuid>,
    ) -> Result<Vec<PaymentType>, PaymentError> {
        Ok(vec![PaymentType::new(&self.typ, &self.name)])
    }

    async fn create_variant(
        &self,
        _order: &Order,
        configuration: &serde_json::Value,
        typ: Option<&str>,
    ) -> Result<PaymentVariant, PaymentError> {
        if let Some(typ) = typ {
            if typ != self.typ {
                return Err(PaymentError::UnknownType(typ.to_string()));
            }
        }
        if !configuration.is_null() && !configuration.is_object() {
            return Err(PaymentError::InvalidConfiguration(
                "expected an object or nothing".to_string(),
            ));
        }
        Ok(PaymentVariant::new(&self.typ, self.fee))
    }

    async fn confirm(
        &self,
        _order: &Order,
        _typ: Option<&str>,
        _variant: Option<&PaymentVariant>,
    ) -> Result<(), PaymentError> {
        match &self.fail_with {
            Some(message) => Err(PaymentError::Failure(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order() -> Order {
        Order::new(Uuid::new_v4(), None, "USD")
    }

    #[tokio::test]
    async fn test_variant_carries_fee() {
        let provider = MockPaymentProvider::new("card", "Credit card").with_fee(Decimal::new(150, 2));
        let variant = provider
            .create_variant(&order(), &json!({ "card_number": "4111" }), Some("card"))
            .await
            .unwrap();
        assert_eq!(variant.payment_type(), "card");
        assert_eq!(variant.price(), Decimal::new(150, 2));
    }

    #[tokio::test]
    async fn test_invalid_configuration_is_rejected() {
        let provider = MockPaymentProvider::new("card", "Credit card");
        let err = provider
            .create_variant(&order(), &json!("just a string"), Some("card"))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidConfiguration(_)));
    }

    #[tokio::test]
    async fn test_confirm_failure_carries_message() {
        let provider = MockPaymentProvider::new("card", "Credit card").failing_with("card declined");
        let err = provider.confirm(&order(), Some("card"), None).await.unwrap_err();
        assert!(matches!(err, PaymentError::Failure(m) if m == "card declined"));
    }

    #[tokio::test]
    async fn test_confirm_succeeds_by_default() {
        let provider = MockPaymentProvider::new("card", "Credit card");
        provider.confirm(&order(), Some("card"), None).await.unwrap();
    }
}
