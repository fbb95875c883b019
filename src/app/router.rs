//! View Router
//!
//! Tracks the current screen plus the contextual selections that travel with
//! it (selected product, staged checkout items, searched order). Sidebar
//! navigation goes through [`Router::navigate`], which also clears stale
//! selections; programmatic view switches use [`Router::show`] and leave the
//! context untouched.

use serde::{Deserialize, Serialize};

use crate::domain::aggregates::cart::CartItem;
use crate::domain::aggregates::order::Order;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewMode {
    #[default]
    Home,
    Marketplace,
    ProductDetail,
    SupportDm,
    Cart,
    Admin,
    CheckoutForm,
    OrderTracking,
}

#[derive(Clone, Debug)]
pub struct Router {
    current: ViewMode,
    selected_product_id: Option<String>,
    selected_color: Option<String>,
    selected_category: String,
    searched_order: Option<Order>,
    pending_checkout: Vec<CartItem>,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            current: ViewMode::Home,
            selected_product_id: None,
            selected_color: None,
            selected_category: "All".to_string(),
            searched_order: None,
            pending_checkout: vec![],
        }
    }
}

impl Router {
    pub fn current(&self) -> ViewMode {
        self.current
    }

    pub fn selected_product_id(&self) -> Option<&str> {
        self.selected_product_id.as_deref()
    }

    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    pub fn searched_order(&self) -> Option<&Order> {
        self.searched_order.as_ref()
    }

    pub fn pending_checkout(&self) -> &[CartItem] {
        &self.pending_checkout
    }

    /// User-driven navigation. Entering the support chat drops any staged
    /// checkout items; leaving order tracking drops the searched order.
    pub fn navigate(&mut self, view: ViewMode) {
        if view == ViewMode::SupportDm {
            self.pending_checkout.clear();
        }
        if self.current == ViewMode::OrderTracking && view != ViewMode::OrderTracking {
            self.searched_order = None;
        }
        self.current = view;
    }

    /// Raw view switch with no context cleanup.
    pub fn show(&mut self, view: ViewMode) {
        self.current = view;
    }

    pub fn select_product(&mut self, product_id: impl Into<String>) {
        self.selected_product_id = Some(product_id.into());
        self.show(ViewMode::ProductDetail);
    }

    pub fn browse_category(&mut self, category: impl Into<String>) {
        self.selected_category = category.into();
        self.show(ViewMode::Marketplace);
    }

    /// Single-item "buy now": the product/color selection is kept so a
    /// cancelled checkout can return to the detail view.
    pub fn stage_buy_now(&mut self, item: CartItem) {
        self.selected_product_id = Some(item.product.id.clone());
        self.selected_color = item.selected_color.clone();
        self.pending_checkout = vec![item];
        self.show(ViewMode::CheckoutForm);
    }

    /// Whole-cart checkout: clearing the selection marks this as a bulk order.
    pub fn stage_cart(&mut self, items: Vec<CartItem>) {
        self.selected_product_id = None;
        self.selected_color = None;
        self.pending_checkout = items;
        self.show(ViewMode::CheckoutForm);
    }

    pub fn set_searched_order(&mut self, order: Option<Order>) {
        self.searched_order = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::catalog::Product;
    use crate::domain::aggregates::order::{CustomerDetails, OrderStatus};
    use crate::domain::value_objects::TrackingId;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn item(id: &str) -> CartItem {
        CartItem {
            product: Product {
                id: id.into(),
                name: "Widget".into(),
                price: dec!(100),
                category: "Phones".into(),
                image: String::new(),
                images: vec![],
                description: String::new(),
                colors: vec![],
                out_of_stock: false,
                discount: Default::default(),
                reviews: vec![],
            },
            selected_color: None,
            quantity: 1,
        }
    }

    fn order() -> Order {
        Order {
            id: TrackingId::from_raw("TRK-9J2M4"),
            customer: CustomerDetails {
                name: "Guest".into(),
                email: "guest@example.com".into(),
                phone: "0".into(),
                address: "x".into(),
            },
            items: vec![item("p1")],
            total_amount: dec!(110),
            status: OrderStatus::Pending,
            timestamp: Utc::now(),
            payment_method: "Transfer".into(),
        }
    }

    #[test]
    fn test_navigating_to_support_clears_staged_checkout() {
        let mut router = Router::default();
        router.stage_buy_now(item("p1"));
        assert_eq!(router.pending_checkout().len(), 1);
        router.navigate(ViewMode::SupportDm);
        assert!(router.pending_checkout().is_empty());
    }

    #[test]
    fn test_leaving_tracking_clears_searched_order() {
        let mut router = Router::default();
        router.navigate(ViewMode::OrderTracking);
        router.set_searched_order(Some(order()));
        router.navigate(ViewMode::Home);
        assert!(router.searched_order().is_none());
    }

    #[test]
    fn test_programmatic_show_keeps_context() {
        let mut router = Router::default();
        router.navigate(ViewMode::OrderTracking);
        router.set_searched_order(Some(order()));
        router.show(ViewMode::SupportDm);
        assert!(router.searched_order().is_some());
    }

    #[test]
    fn test_cart_checkout_marks_bulk_order() {
        let mut router = Router::default();
        router.select_product("p1");
        router.stage_cart(vec![item("p1"), item("p2")]);
        assert!(router.selected_product_id().is_none());
        assert_eq!(router.current(), ViewMode::CheckoutForm);
    }
}
