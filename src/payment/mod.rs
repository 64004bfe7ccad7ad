//! Payment provider contract and dispatch

pub mod mock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::domain::aggregates::order::Order;

#[derive(Debug, Error)]
pub enum PaymentError {
    /// Processor-level rejection; the message is meant for the buyer.
    ///
    /// The only expected failure of `confirm`; business-logic failures must
    /// not surface through any other variant there.
    #[error("payment failed: {0}")]
    Failure(String),

    #[error("invalid payment configuration: {0}")]
    InvalidConfiguration(String),

    #[error("no provider services payment type {0:?}")]
    UnknownType(String),

    #[error("{0} is not implemented by this provider")]
    NotImplemented(&'static str),
}

/// A payment method a provider can service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentType {
    pub typ: String,
    pub name: String,
}

impl PaymentType {
    pub fn new(typ: impl Into<String>, name: impl Into<String>) -> Self {
        Self { typ: typ.into(), name: name.into() }
    }
}

/// Provider-created payment instance attached to an order.
///
/// An order may accumulate several over its history; the first by creation
/// is the authoritative one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentVariant {
    id: Uuid,
    payment_type: String,
    price: Decimal,
    created: DateTime<Utc>,
}

impl PaymentVariant {
    pub fn new(payment_type: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            payment_type: payment_type.into(),
            price,
            created: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn payment_type(&self) -> &str { &self.payment_type }
    pub fn price(&self) -> Decimal { self.price }
    pub fn created(&self) -> DateTime<Utc> { self.created }
}

/// Field a provider wants filled before a variant can be created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigField {
    pub name: String,
    pub label: String,
    pub required: bool,
}

/// Declarative description of the extra input a payment type needs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationForm {
    pub fields: Vec<ConfigField>,
}

/// Pluggable gateway integration.
///
/// Default method bodies mirror an abstract base: anything a concrete
/// provider leaves out answers `NotImplemented`, which is distinct from the
/// `Failure` signal of an actual processor rejection.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Payment types this provider services, narrowed to the given
    /// order/customer combination when one is supplied.
    fn enumerate_types(
        &self,
        order: Option<&Order>,
        customer: Option<Uuid>,
    ) -> Result<Vec<PaymentType>, PaymentError> {
        let _ = (order, customer);
        Err(PaymentError::NotImplemented("enumerate_types"))
    }

    /// `(type id, display name)` pairs for a selection widget; a pure
    /// projection of `enumerate_types`.
    fn as_choices(
        &self,
        order: Option<&Order>,
        customer: Option<Uuid>,
    ) -> Result<Vec<(String, String)>, PaymentError> {
        Ok(self
            .enumerate_types(order, customer)?
            .into_iter()
            .map(|t| (t.typ, t.name))
            .collect())
    }

    /// Extra input needed before a variant can be created; `None` when the
    /// payment type needs nothing beyond the order itself.
    fn configuration_form(
        &self,
        order: &Order,
        data: &serde_json::Value,
        typ: Option<&str>,
    ) -> Result<Option<ConfigurationForm>, PaymentError> {
        let _ = (order, data, typ);
        Ok(None)
    }

    /// Turn a valid configuration into a payment variant for the order.
    async fn create_variant(
        &self,
        order: &Order,
        configuration: &serde_json::Value,
        typ: Option<&str>,
    ) -> Result<PaymentVariant, PaymentError> {
        let _ = (order, configuration, typ);
        Err(PaymentError::NotImplemented("create_variant"))
    }

    /// Confirm/capture the payment against the external processor.
    ///
    /// May block on gateway I/O; retry and timeout policy belong to the
    /// caller. Rejections surface as [`PaymentError::Failure`] and nothing
    /// else. Moving the order to `payment-failed` afterwards is the
    /// caller's explicit step, never this method's.
    async fn confirm(
        &self,
        order: &Order,
        typ: Option<&str>,
        variant: Option<&PaymentVariant>,
    ) -> Result<(), PaymentError> {
        let _ = (order, typ, variant);
        Err(PaymentError::NotImplemented("confirm"))
    }
}

/// Registered providers with payment-type dispatch.
#[derive(Default)]
pub struct PaymentRegistry {
    providers: Vec<Arc<dyn PaymentProvider>>,
}

impl PaymentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn PaymentProvider>) {
        self.providers.push(provider);
    }

    /// Every `(provider, type)` pair across registered providers, in
    /// registration order.
    pub fn enumerate_types(
        &self,
        order: Option<&Order>,
        customer: Option<Uuid>,
    ) -> Result<Vec<(Arc<dyn PaymentProvider>, PaymentType)>, PaymentError> {
        let mut pairs = Vec::new();
        for provider in &self.providers {
            for typ in provider.enumerate_types(order, customer)? {
                pairs.push((Arc::clone(provider), typ));
            }
        }
        Ok(pairs)
    }

    pub fn as_choices(
        &self,
        order: Option<&Order>,
        customer: Option<Uuid>,
    ) -> Result<Vec<(String, String)>, PaymentError> {
        Ok(self
            .enumerate_types(order, customer)?
            .into_iter()
            .map(|(_, t)| (t.typ, t.name))
            .collect())
    }

    /// The provider servicing `typ` for the given order/customer.
    pub fn provider_for(
        &self,
        order: Option<&Order>,
        customer: Option<Uuid>,
        typ: &str,
    ) -> Result<Arc<dyn PaymentProvider>, PaymentError> {
        for (provider, t) in self.enumerate_types(order, customer)? {
            if t.typ == typ {
                return Ok(provider);
            }
        }
        Err(PaymentError::UnknownType(typ.to_string()))
    }

    pub async fn create_variant(
        &self,
        order: &Order,
        configuration: &serde_json::Value,
        typ: &str,
    ) -> Result<PaymentVariant, PaymentError> {
        debug!(order_id = %order.id(), typ, "creating payment variant");
        self.provider_for(Some(order), None, typ)?
            .create_variant(order, configuration, Some(typ))
            .await
    }

    pub async fn confirm(
        &self,
        order: &Order,
        typ: &str,
        variant: Option<&PaymentVariant>,
    ) -> Result<(), PaymentError> {
        debug!(order_id = %order.id(), typ, "confirming payment");
        self.provider_for(Some(order), None, typ)?
            .confirm(order, Some(typ), variant)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockPaymentProvider;
    use super::*;

    struct BareProvider;
    impl PaymentProvider for BareProvider {}

    fn order() -> Order {
        Order::new(Uuid::new_v4(), None, "USD")
    }

    #[tokio::test]
    async fn test_defaults_signal_not_implemented() {
        let provider = BareProvider;
        assert!(matches!(
            provider.enumerate_types(None, None),
            Err(PaymentError::NotImplemented("enumerate_types"))
        ));
        assert!(matches!(
            provider.create_variant(&order(), &serde_json::Value::Null, None).await,
            Err(PaymentError::NotImplemented("create_variant"))
        ));
        assert!(matches!(
            provider.confirm(&order(), None, None).await,
            Err(PaymentError::NotImplemented("confirm"))
        ));
        assert!(provider
            .configuration_form(&order(), &serde_json::Value::Null, None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_as_choices_projects_types() {
        let provider = MockPaymentProvider::new("card", "Credit card");
        let choices = provider.as_choices(None, None).unwrap();
        assert_eq!(choices, vec![("card".to_string(), "Credit card".to_string())]);
    }

    #[test]
    fn test_registry_enumerates_across_providers() {
        let mut registry = PaymentRegistry::new();
        registry.register(Arc::new(MockPaymentProvider::new("card", "Credit card")));
        registry.register(Arc::new(MockPaymentProvider::new("cod", "Cash on delivery")));

        let pairs = registry.enumerate_types(None, None).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].1.typ, "card");
        assert_eq!(pairs[1].1.typ, "cod");

        let choices = registry.as_choices(None, None).unwrap();
        assert_eq!(choices[1], ("cod".to_string(), "Cash on delivery".to_string()));
    }

    #[tokio::test]
    async fn test_registry_rejects_unknown_type() {
        let mut registry = PaymentRegistry::new();
        registry.register(Arc::new(MockPaymentProvider::new("card", "Credit card")));

        let err = registry
            .confirm(&order(), "wire", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::UnknownType(t) if t == "wire"));
    }

    #[test]
    fn test_failure_message_is_displayable() {
        let err = PaymentError::Failure("card declined".into());
        assert_eq!(err.to_string(), "payment failed: card declined");
    }
}
