//! Cart collaborator interface and a basic in-memory cart

use uuid::Uuid;

use crate::domain::value_objects::Price;

/// Catalog-side view of a purchasable variant.
pub trait CatalogVariant {
    fn id(&self) -> Uuid;
    /// Display name of the concrete subtype backing this variant.
    fn display_name(&self) -> String;
}

/// One cart line: a variant reference with quantity and current unit price.
pub trait CartLine {
    fn quantity(&self) -> u32;
    /// Current catalog unit price; order construction snapshots it.
    fn unit_price(&self) -> Price;
    fn variant(&self) -> &dyn CatalogVariant;
}

/// Pre-checkout contents as seen by order construction.
pub trait Cart {
    fn id(&self) -> Uuid;
    fn owner(&self) -> Option<Uuid>;
    fn currency(&self) -> &str;
    fn is_empty(&self) -> bool;
    fn lines(&self) -> Vec<&dyn CartLine>;
}

/// Weak handle to a catalog variant plus its resolved display name.
#[derive(Clone, Debug)]
pub struct CatalogRef {
    id: Uuid,
    name: String,
}

impl CatalogRef {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

impl CatalogVariant for CatalogRef {
    fn id(&self) -> Uuid { self.id }
    fn display_name(&self) -> String { self.name.clone() }
}

#[derive(Clone, Debug)]
pub struct CartItem {
    pub variant: CatalogRef,
    pub quantity: u32,
    pub unit_price: Price,
}

impl CartItem {
    pub fn new(variant: CatalogRef, quantity: u32, unit_price: Price) -> Self {
        Self { variant, quantity, unit_price }
    }

    pub fn line_total(&self) -> Price { self.unit_price.times(self.quantity) }
}

impl CartLine for CartItem {
    fn quantity(&self) -> u32 { self.quantity }
    fn unit_price(&self) -> Price { self.unit_price.clone() }
    fn variant(&self) -> &dyn CatalogVariant { &self.variant }
}

/// Map-free cart for callers without their own cart subsystem, and for tests.
#[derive(Clone, Debug)]
pub struct InMemoryCart {
    id: Uuid,
    owner: Option<Uuid>,
    currency: String,
    items: Vec<CartItem>,
}

impl InMemoryCart {
    pub fn new(currency: &str) -> Self {
        Self { id: Uuid::new_v4(), owner: None, currency: currency.to_string(), items: vec![] }
    }

    pub fn for_owner(owner: Uuid, currency: &str) -> Self {
        let mut cart = Self::new(currency);
        cart.owner = Some(owner);
        cart
    }

    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn item_count(&self) -> usize { self.items.len() }

    /// Adds a line, merging quantities when the variant is already present.
    pub fn add_item(&mut self, item: CartItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.variant.id == item.variant.id) {
            existing.quantity += item.quantity;
        } else {
            self.items.push(item);
        }
    }

    pub fn update_quantity(&mut self, variant_id: Uuid, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_item(variant_id);
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| i.variant.id == variant_id)
            .ok_or(CartError::ItemNotFound)?;
        item.quantity = quantity;
        Ok(())
    }

    pub fn remove_item(&mut self, variant_id: Uuid) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.variant.id != variant_id);
        if self.items.len() == before {
            return Err(CartError::ItemNotFound);
        }
        Ok(())
    }

    pub fn clear(&mut self) { self.items.clear(); }

    pub fn subtotal(&self) -> Price {
        Price::sum(&self.currency, self.items.iter().map(|i| i.line_total()))
    }
}

impl Cart for InMemoryCart {
    fn id(&self) -> Uuid { self.id }
    fn owner(&self) -> Option<Uuid> { self.owner }
    fn currency(&self) -> &str { &self.currency }
    fn is_empty(&self) -> bool { self.items.is_empty() }
    fn lines(&self) -> Vec<&dyn CartLine> {
        self.items.iter().map(|i| i as &dyn CartLine).collect()
    }
}

#[derive(Debug, Clone)] pub enum CartError { ItemNotFound }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "Item not found") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn widget(price_cents: i64) -> CartItem {
        CartItem::new(
            CatalogRef::new(Uuid::new_v4(), "Widget"),
            1,
            Price::new(Decimal::new(price_cents, 2), Decimal::new(price_cents, 2), "USD"),
        )
    }

    #[test]
    fn test_add_merges_same_variant() {
        let mut cart = InMemoryCart::new("USD");
        let item = widget(1000);
        let again = item.clone();
        cart.add_item(item);
        cart.add_item(again);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.subtotal().net(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = InMemoryCart::new("USD");
        let item = widget(500);
        let id = item.variant.id;
        cart.add_item(item);
        cart.update_quantity(id, 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_missing_item() {
        let mut cart = InMemoryCart::new("USD");
        assert!(cart.remove_item(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_lines_view() {
        let mut cart = InMemoryCart::for_owner(Uuid::new_v4(), "USD");
        cart.add_item(widget(1500));
        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity(), 1);
        assert_eq!(lines[0].unit_price().net(), Decimal::new(1500, 2));
    }
}
