//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::cart::CartLine;
use crate::domain::value_objects::{OrderToken, Price};
use crate::payment::PaymentVariant;

/// Order lifecycle status. Wire codes are kebab-case (`payment-pending`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Checkout,
    PaymentPending,
    PaymentComplete,
    PaymentFailed,
    Delivery,
    Cancelled,
}

impl OrderStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::PaymentPending => "payment-pending",
            Self::PaymentComplete => "payment-complete",
            Self::PaymentFailed => "payment-failed",
            Self::Delivery => "delivery",
            Self::Cancelled => "cancelled",
        }
    }

    /// Human label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Checkout => "undergoing checkout",
            Self::PaymentPending => "waiting for payment",
            Self::PaymentComplete => "paid",
            Self::PaymentFailed => "payment failed",
            Self::Delivery => "shipped",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.code()) }
}

/// Billing address captured on the order. All fields may be blank.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(length(max = 256))]
    pub first_name: String,
    #[validate(length(max = 256))]
    pub last_name: String,
    #[validate(length(max = 256))]
    pub company_name: String,
    #[validate(length(max = 256))]
    pub street_address_1: String,
    #[validate(length(max = 256))]
    pub street_address_2: String,
    #[validate(length(max = 256))]
    pub city: String,
    #[validate(length(max = 20))]
    pub postal_code: String,
    #[validate(length(max = 2))]
    pub country: String,
    #[validate(length(max = 128))]
    pub country_area: String,
    #[validate(length(max = 40))]
    pub tax_id: String,
    #[validate(length(max = 30))]
    pub phone: String,
}

impl Address {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Fields covered by the repository's partial-write contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderField {
    Status,
    LastStatusChange,
    PaymentType,
    BillingAddress,
}

/// Frozen pricing snapshot of one cart line at order-creation time.
///
/// The unit prices never change, even if the referenced catalog variant's
/// price changes later; the variant reference is weak and may be gone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderedItem {
    id: Uuid,
    product_variant: Option<Uuid>,
    product_name: String,
    quantity: u32,
    unit_price_net: Decimal,
    unit_price_gross: Decimal,
}

impl OrderedItem {
    fn from_line(line: &dyn CartLine) -> Self {
        let price = line.unit_price();
        let variant = line.variant();
        Self {
            id: Uuid::new_v4(),
            product_variant: Some(variant.id()),
            product_name: variant.display_name(),
            quantity: line.quantity(),
            unit_price_net: price.net(),
            unit_price_gross: price.gross(),
        }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn product_variant(&self) -> Option<Uuid> { self.product_variant }
    pub fn product_name(&self) -> &str { &self.product_name }
    pub fn quantity(&self) -> u32 { self.quantity }
    pub fn unit_price_net(&self) -> Decimal { self.unit_price_net }
    pub fn unit_price_gross(&self) -> Decimal { self.unit_price_gross }

    /// The unrounded unit price, minted in `currency`.
    pub fn unit_price(&self, currency: &str) -> Price {
        Price::new(self.unit_price_net, self.unit_price_gross, currency)
    }

    /// Line total: unit price times quantity, quantized to 2 decimal places
    /// (banker's rounding). The only place line math rounds.
    pub fn price(&self, currency: &str) -> Price {
        self.unit_price(currency).times(self.quantity).rounded()
    }
}

/// Subset of an order's items sharing a delivery method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeliveryGroup {
    id: Uuid,
    delivery_type: String,
    items: Vec<OrderedItem>,
}

impl DeliveryGroup {
    pub fn new(delivery_type: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), delivery_type: delivery_type.into(), items: vec![] }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn delivery_type(&self) -> &str { &self.delivery_type }
    pub fn items(&self) -> &[OrderedItem] { &self.items }

    /// Snapshots the line's current price, name and quantity into the group.
    pub fn snapshot_line(&mut self, line: &dyn CartLine) {
        self.items.push(OrderedItem::from_line(line));
    }

    /// Sum of the contained items' prices; empty groups yield zero.
    pub fn subtotal(&self, currency: &str) -> Price {
        Price::sum(currency, self.items.iter().map(|i| i.price(currency)))
    }

    pub fn total(&self, currency: &str) -> Price {
        self.subtotal(currency)
    }
}

/// Order aggregate root.
///
/// Owns its delivery groups, items and payment variants; dropping the order
/// drops everything it owns. The status field has exactly one writer, the
/// checkout service's `set_status`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    id: Uuid,
    cart_id: Uuid,
    status: OrderStatus,
    created: DateTime<Utc>,
    last_status_change: DateTime<Utc>,
    user: Option<Uuid>,
    currency: String,
    billing: Address,
    payment_type: String,
    token: Option<OrderToken>,
    groups: Vec<DeliveryGroup>,
    payment_variants: Vec<PaymentVariant>,
}

impl Order {
    pub(crate) fn new(cart_id: Uuid, user: Option<Uuid>, currency: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            cart_id,
            status: OrderStatus::Checkout,
            created: now,
            last_status_change: now,
            user,
            currency: currency.to_string(),
            billing: Address::default(),
            payment_type: String::new(),
            token: None,
            groups: vec![],
            payment_variants: vec![],
        }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn cart_id(&self) -> Uuid { self.cart_id }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn created(&self) -> DateTime<Utc> { self.created }
    pub fn last_status_change(&self) -> DateTime<Utc> { self.last_status_change }
    pub fn user(&self) -> Option<Uuid> { self.user }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn billing(&self) -> &Address { &self.billing }
    pub fn payment_type(&self) -> &str { &self.payment_type }
    pub fn token(&self) -> Option<&OrderToken> { self.token.as_ref() }
    pub fn groups(&self) -> &[DeliveryGroup] { &self.groups }
    pub fn payment_variants(&self) -> &[PaymentVariant] { &self.payment_variants }

    pub fn billing_full_name(&self) -> String { self.billing.full_name() }

    /// Validates and stores the billing address.
    pub fn set_billing_address(&mut self, address: Address) -> crate::Result<()> {
        address.validate()?;
        self.billing = address;
        Ok(())
    }

    pub fn set_payment_type(&mut self, payment_type: impl Into<String>) {
        self.payment_type = payment_type.into();
    }

    pub fn add_payment_variant(&mut self, variant: PaymentVariant) {
        self.payment_variants.push(variant);
    }

    /// The authoritative payment variant: first by creation, if any.
    pub fn payment_variant(&self) -> Option<&PaymentVariant> {
        self.payment_variants.first()
    }

    /// Sum of all group subtotals in the order's currency.
    pub fn subtotal(&self) -> Price {
        Price::sum(&self.currency, self.groups.iter().map(|g| g.subtotal(&self.currency)))
    }

    /// Sum of all payment variant prices, net equal to gross.
    pub fn payment_price(&self) -> Price {
        let amount: Decimal = self.payment_variants.iter().map(|v| v.price()).sum();
        Price::new(amount, amount, &self.currency)
    }

    pub fn total(&self) -> Price {
        let groups = Price::sum(&self.currency, self.groups.iter().map(|g| g.total(&self.currency)));
        Price::sum(&self.currency, [self.payment_price(), groups])
    }

    pub(crate) fn add_delivery_group(&mut self, group: DeliveryGroup) {
        self.groups.push(group);
    }

    /// Drops every delivery group, item and payment variant ahead of a rebuild.
    pub(crate) fn purge_for_rebuild(&mut self) {
        self.groups.clear();
        self.payment_variants.clear();
    }

    /// Writes the status and stamps the change time, returning the old status.
    pub(crate) fn apply_status(&mut self, new_status: OrderStatus) -> OrderStatus {
        let old_status = self.status;
        self.status = new_status;
        self.last_status_change = Utc::now();
        old_status
    }

    pub(crate) fn assign_token(&mut self, token: OrderToken) {
        debug_assert!(self.token.is_none());
        self.token = Some(token);
    }

    /// Merges the listed fields from `other`, the partial-write counterpart.
    pub(crate) fn copy_fields_from(&mut self, other: &Order, fields: &[OrderField]) {
        for field in fields {
            match field {
                OrderField::Status => self.status = other.status,
                OrderField::LastStatusChange => self.last_status_change = other.last_status_change,
                OrderField::PaymentType => self.payment_type = other.payment_type.clone(),
                OrderField::BillingAddress => self.billing = other.billing.clone(),
            }
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Order #{}", self.id)
    }
}
