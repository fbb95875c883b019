//! Cart Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::catalog::Product;
use crate::{MarketplaceError, Result};

/// A product snapshot in the cart. Line identity is (product id, color).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub selected_color: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    pub fn matches(&self, product_id: &str, color: Option<&str>) -> bool {
        self.product.id == product_id && self.selected_color.as_deref() == color
    }

    /// Effective price x quantity, before tax.
    pub fn line_total(&self) -> Decimal {
        self.product.effective_price() * Decimal::from(self.quantity)
    }
}

/// Ephemeral, owned by the active session. Quantity never reaches zero while
/// a line is present; a decrement landing at or below zero removes the line.
#[derive(Clone, Debug, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Adds one unit, merging into an existing line with the same key.
    pub fn add(&mut self, product: &Product, color: Option<String>) -> Result<()> {
        if product.out_of_stock {
            return Err(MarketplaceError::OutOfStock);
        }
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.matches(&product.id, color.as_deref()))
        {
            existing.quantity += 1;
        } else {
            self.items.push(CartItem {
                product: product.clone(),
                selected_color: color,
                quantity: 1,
            });
        }
        Ok(())
    }

    pub fn remove(&mut self, product_id: &str, color: Option<&str>) -> Result<()> {
        let before = self.items.len();
        self.items.retain(|i| !i.matches(product_id, color));
        if self.items.len() == before {
            return Err(MarketplaceError::CartItemNotFound);
        }
        Ok(())
    }

    /// Applies a signed quantity delta. A result of zero (or less) removes
    /// the line instead of keeping a zero-quantity row.
    pub fn change_quantity(&mut self, product_id: &str, color: Option<&str>, delta: i32) -> Result<()> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.matches(product_id, color))
            .ok_or(MarketplaceError::CartItemNotFound)?;
        let new_quantity = i64::from(item.quantity) + i64::from(delta);
        if new_quantity > 0 {
            item.quantity = new_quantity as u32;
        } else {
            self.items.retain(|i| !i.matches(product_id, color));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(id: &str) -> Product {
        Product {
            id: id.into(),
            name: "Widget".into(),
            price: dec!(1000),
            category: "Phones".into(),
            image: String::new(),
            images: vec![],
            description: String::new(),
            colors: vec!["Black".into(), "Blue".into()],
            out_of_stock: false,
            discount: Default::default(),
            reviews: vec![],
        }
    }

    #[test]
    fn test_same_key_accumulates() {
        let mut cart = Cart::default();
        let p = product("p1");
        cart.add(&p, Some("Black".into())).unwrap();
        cart.add(&p, Some("Black".into())).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_different_color_is_distinct_line() {
        let mut cart = Cart::default();
        let p = product("p1");
        cart.add(&p, Some("Black".into())).unwrap();
        cart.add(&p, Some("Blue".into())).unwrap();
        cart.add(&p, None).unwrap();
        assert_eq!(cart.items().len(), 3);
    }

    #[test]
    fn test_decrement_to_zero_removes_line() {
        let mut cart = Cart::default();
        let p = product("p1");
        cart.add(&p, None).unwrap();
        cart.change_quantity("p1", None, 2).unwrap();
        assert_eq!(cart.items()[0].quantity, 3);
        cart.change_quantity("p1", None, -3).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_past_zero_never_goes_negative() {
        let mut cart = Cart::default();
        let p = product("p1");
        cart.add(&p, None).unwrap();
        cart.change_quantity("p1", None, -5).unwrap();
        assert!(cart.is_empty());
        assert!(cart.change_quantity("p1", None, 1).is_err());
    }

    #[test]
    fn test_out_of_stock_rejected() {
        let mut cart = Cart::default();
        let mut p = product("p1");
        p.out_of_stock = true;
        assert!(matches!(cart.add(&p, None), Err(MarketplaceError::OutOfStock)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_line_total_uses_discount() {
        let mut p = product("p1");
        p.discount = crate::domain::value_objects::Discount::clamped(50);
        let mut cart = Cart::default();
        cart.add(&p, None).unwrap();
        cart.change_quantity("p1", None, 1).unwrap();
        assert_eq!(cart.items()[0].line_total(), dec!(1000));
    }
}
