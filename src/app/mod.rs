//! Application root
//!
//! One `App` owns every store for the lifetime of the process and is shared
//! by reference with the HTTP layer. All mutations go through named commands
//! so the ledger and support session stay testable in isolation from any
//! rendering concern. Domain events raised by the aggregates are drained
//! after each command and logged.

pub mod router;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::assistant::{ChatTurn, MarketplaceAssistant};
use crate::domain::aggregates::cart::{Cart, CartItem};
use crate::domain::aggregates::catalog::{Catalog, NewProduct, NewReview, Product};
use crate::domain::aggregates::order::{CustomerDetails, Order, OrderLedger, OrderStatus};
use crate::domain::aggregates::support::{Message, SupportAction, SupportSession};
use crate::prefs::PrefsStore;
use crate::{MarketplaceError, Result};

use router::{Router, ViewMode};

/// Shared static password; a cosmetic gate, not an auth boundary.
const ADMIN_PASSWORD: &str = "admin";

/// Simulated typing time before the handover notice appears.
pub const HANDOVER_DELAY: Duration = Duration::from_secs(1);

pub type SharedApp = Arc<RwLock<App>>;

pub struct App {
    catalog: Catalog,
    cart: Cart,
    ledger: OrderLedger,
    support: SupportSession,
    router: Router,
    prefs: PrefsStore,
    current_customer: Option<CustomerDetails>,
    is_admin: bool,
}

impl App {
    pub fn new(catalog: Catalog, ledger: OrderLedger, prefs: PrefsStore) -> Self {
        Self {
            catalog,
            cart: Cart::default(),
            ledger,
            support: SupportSession::default(),
            router: Router::default(),
            prefs,
            current_customer: None,
            is_admin: false,
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn support(&self) -> &SupportSession {
        &self.support
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn dark_mode(&self) -> bool {
        self.prefs.dark_mode()
    }

    pub fn current_customer(&self) -> Option<&CustomerDetails> {
        self.current_customer.as_ref()
    }

    // ------------------------------------------------------------------
    // Browsing
    // ------------------------------------------------------------------

    pub fn navigate(&mut self, view: ViewMode) {
        self.router.navigate(view);
    }

    pub fn browse_category(&mut self, category: impl Into<String>) {
        self.router.browse_category(category);
    }

    pub fn select_product(&mut self, product_id: &str) -> Result<Product> {
        let product = self
            .catalog
            .find(product_id)
            .cloned()
            .ok_or(MarketplaceError::ProductNotFound)?;
        self.router.select_product(&product.id);
        Ok(product)
    }

    // ------------------------------------------------------------------
    // Cart
    // ------------------------------------------------------------------

    pub fn add_to_cart(&mut self, product_id: &str, color: Option<String>) -> Result<u32> {
        let product = self
            .catalog
            .find(product_id)
            .cloned()
            .ok_or(MarketplaceError::ProductNotFound)?;
        self.cart.add(&product, color)?;
        Ok(self.cart.total_quantity())
    }

    pub fn remove_from_cart(&mut self, product_id: &str, color: Option<&str>) -> Result<()> {
        self.cart.remove(product_id, color)
    }

    pub fn change_cart_quantity(
        &mut self,
        product_id: &str,
        color: Option<&str>,
        delta: i32,
    ) -> Result<()> {
        self.cart.change_quantity(product_id, color, delta)
    }

    // ------------------------------------------------------------------
    // Checkout
    // ------------------------------------------------------------------

    /// Stages a single line with quantity forced to 1, keeping the
    /// product/color selection for the detail view.
    pub fn buy_now(&mut self, product_id: &str, color: Option<String>) -> Result<()> {
        let product = self
            .catalog
            .find(product_id)
            .cloned()
            .ok_or(MarketplaceError::ProductNotFound)?;
        if product.out_of_stock {
            return Err(MarketplaceError::OutOfStock);
        }
        self.router.stage_buy_now(CartItem { product, selected_color: color, quantity: 1 });
        Ok(())
    }

    /// Stages the whole cart as a bulk order.
    pub fn checkout_cart(&mut self) -> Result<()> {
        if self.cart.is_empty() {
            return Err(MarketplaceError::EmptyCheckout);
        }
        self.router.stage_cart(self.cart.items().to_vec());
        Ok(())
    }

    /// Turns the staged items into exactly one order and routes to the
    /// support chat for payment instructions. The cart is cleared only when
    /// the staged set looks like it came from the live cart (same length,
    /// same first item) -- an approximation kept from the original flow.
    pub fn finalize_order(&mut self, details: CustomerDetails) -> Result<Order> {
        let staged = self.router.pending_checkout().to_vec();
        if staged.is_empty() {
            return Err(MarketplaceError::EmptyCheckout);
        }

        self.current_customer = Some(details.clone());
        let order = self.ledger.create(details, staged.clone());
        self.router.set_searched_order(Some(order.clone()));

        let cart_items = self.cart.items();
        if !cart_items.is_empty()
            && staged.len() == cart_items.len()
            && staged[0].product.id == cart_items[0].product.id
        {
            self.cart.clear();
        }

        self.router.show(ViewMode::SupportDm);
        self.publish_events();
        Ok(order)
    }

    // ------------------------------------------------------------------
    // Order tracking
    // ------------------------------------------------------------------

    /// Generic not-found: the error does not reveal whether a similar id was
    /// ever issued.
    pub fn track_order(&mut self, input: &str) -> Result<Order> {
        match self.ledger.find_by_id(input).cloned() {
            Some(order) => {
                self.router.set_searched_order(Some(order.clone()));
                Ok(order)
            }
            None => {
                self.router.set_searched_order(None);
                Err(MarketplaceError::OrderNotFound)
            }
        }
    }

    pub fn visible_orders(&self) -> Vec<Order> {
        self.ledger.visible_for(
            self.current_customer.as_ref().map(|c| c.email.as_str()),
            self.router.searched_order(),
        )
    }

    // ------------------------------------------------------------------
    // Support chat
    // ------------------------------------------------------------------

    /// Synchronous phase of a customer message; the returned action tells the
    /// async driver what follow-up to perform.
    pub fn begin_customer_message(&mut self, text: impl Into<String>) -> SupportAction {
        let action = self.support.record_customer_message(text);
        self.publish_events();
        action
    }

    pub fn complete_handover(&mut self) {
        self.support.append_handover();
    }

    pub fn record_assistant_reply(&mut self, result: anyhow::Result<String>) {
        match result {
            Ok(text) => self.support.append_assistant_reply(text),
            Err(err) => {
                tracing::warn!(%err, "assistant query failed");
                self.support.append_failure_notice();
            }
        }
    }

    pub fn admin_support_reply(&mut self, text: impl Into<String>) -> Result<()> {
        self.ensure_admin()?;
        self.support.admin_reply(text);
        Ok(())
    }

    pub fn resolve_support(&mut self) -> Result<bool> {
        self.ensure_admin()?;
        let archived = self.support.resolve();
        self.publish_events();
        Ok(archived)
    }

    pub fn support_archive(&self) -> Result<&[Vec<Message>]> {
        self.ensure_admin()?;
        Ok(self.support.archive())
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    pub fn admin_login(&mut self, password: &str) -> Result<()> {
        if password != ADMIN_PASSWORD {
            return Err(MarketplaceError::InvalidCredentials);
        }
        self.is_admin = true;
        Ok(())
    }

    pub fn admin_logout(&mut self) {
        self.is_admin = false;
        self.router.show(ViewMode::Home);
    }

    pub fn admin_orders(&self) -> Result<&[Order]> {
        self.ensure_admin()?;
        Ok(self.ledger.orders())
    }

    pub fn set_order_status(&mut self, order_id: &str, status: OrderStatus) -> Result<()> {
        self.ensure_admin()?;
        self.ledger.set_status(order_id, status)?;
        self.publish_events();
        Ok(())
    }

    pub fn set_order_status_bulk(&mut self, order_ids: &[String], status: OrderStatus) -> Result<()> {
        self.ensure_admin()?;
        self.ledger.set_status_bulk(order_ids, status);
        self.publish_events();
        Ok(())
    }

    pub fn add_product(&mut self, new: NewProduct) -> Result<Product> {
        self.ensure_admin()?;
        Ok(self.catalog.add_product(new).clone())
    }

    /// Destructive: requires the caller to have confirmed explicitly.
    pub fn delete_product(&mut self, product_id: &str, confirmed: bool) -> Result<()> {
        self.ensure_admin()?;
        if !confirmed {
            return Err(MarketplaceError::DeleteNotConfirmed);
        }
        self.catalog.remove_product(product_id)
    }

    pub fn toggle_stock(&mut self, product_id: &str) -> Result<bool> {
        self.ensure_admin()?;
        self.catalog.toggle_stock(product_id)
    }

    pub fn set_discount(&mut self, product_id: &str, percent: i64) -> Result<u8> {
        self.ensure_admin()?;
        Ok(self.catalog.set_discount(product_id, percent)?.percent())
    }

    pub fn set_product_image(&mut self, product_id: &str, image_url: &str) -> Result<()> {
        self.ensure_admin()?;
        self.catalog.set_image(product_id, image_url)
    }

    pub fn add_category(&mut self, name: &str) -> Result<()> {
        self.ensure_admin()?;
        self.catalog.add_category(name);
        Ok(())
    }

    /// Reviews come from customers, not admins.
    pub fn add_review(&mut self, product_id: &str, review: NewReview) -> Result<()> {
        self.catalog.add_review(product_id, review)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Preferences
    // ------------------------------------------------------------------

    pub fn toggle_dark_mode(&mut self) -> Result<bool> {
        self.prefs.toggle_dark_mode()
    }

    // ------------------------------------------------------------------

    fn ensure_admin(&self) -> Result<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(MarketplaceError::AdminRequired)
        }
    }

    fn publish_events(&mut self) {
        for event in self
            .ledger
            .take_events()
            .into_iter()
            .chain(self.support.take_events())
        {
            tracing::info!(?event, "domain event");
        }
    }
}

/// Drives one customer message end to end. The lock is released while the
/// handover delay runs or the collaborator query is in flight; the typing
/// flag stays up until the follow-up message lands.
pub async fn send_customer_message(
    app: &SharedApp,
    assistant: &dyn MarketplaceAssistant,
    text: String,
) {
    let (action, catalog) = {
        let mut guard = app.write().await;
        let action = guard.begin_customer_message(text.clone());
        (action, guard.catalog().products().to_vec())
    };

    match action {
        SupportAction::AwaitAgent => {}
        SupportAction::Escalate => {
            tokio::time::sleep(HANDOVER_DELAY).await;
            app.write().await.complete_handover();
        }
        SupportAction::QueryAssistant { history } => {
            let turns = ChatTurn::from_transcript(&history);
            let result = assistant.process_query(&text, &turns, &catalog).await;
            app.write().await.record_assistant_reply(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::support::{Role, FALLBACK_MESSAGE, HANDOVER_MESSAGE};
    use crate::seed;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    struct CannedAssistant(&'static str);

    #[async_trait]
    impl MarketplaceAssistant for CannedAssistant {
        async fn process_query(
            &self,
            _text: &str,
            _history: &[ChatTurn],
            _catalog: &[Product],
        ) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingAssistant;

    #[async_trait]
    impl MarketplaceAssistant for FailingAssistant {
        async fn process_query(
            &self,
            _text: &str,
            _history: &[ChatTurn],
            _catalog: &[Product],
        ) -> anyhow::Result<String> {
            anyhow::bail!("transport error")
        }
    }

    fn test_app() -> App {
        let dir = tempfile::tempdir().unwrap();
        let prefs = PrefsStore::load(dir.path().join("prefs.json"), false);
        App::new(seed::catalog(), seed::ledger(), prefs)
    }

    fn shared(app: App) -> SharedApp {
        Arc::new(RwLock::new(app))
    }

    fn guest() -> CustomerDetails {
        CustomerDetails {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: "0800".into(),
            address: "Ikeja".into(),
        }
    }

    #[test]
    fn test_cart_checkout_clears_cart_and_routes_to_support() {
        let mut app = test_app();
        app.add_to_cart("p1", Some("Natural Titanium".into())).unwrap();
        app.add_to_cart("p4", Some("Red".into())).unwrap();
        app.checkout_cart().unwrap();

        let order = app.finalize_order(guest()).unwrap();
        assert_eq!(order.items.len(), 2);
        assert!(app.cart().is_empty());
        assert_eq!(app.router().current(), ViewMode::SupportDm);
        assert_eq!(app.router().searched_order().map(|o| o.id.clone()), Some(order.id.clone()));
        assert_eq!(app.visible_orders()[0].id, order.id);
    }

    #[test]
    fn test_buy_now_keeps_cart_when_heuristic_mismatches() {
        let mut app = test_app();
        app.add_to_cart("p4", None).unwrap();
        app.buy_now("p1", Some("Blue Titanium".into())).unwrap();

        let order = app.finalize_order(guest()).unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 1);
        // Staged set did not come from the cart, so the cart survives.
        assert_eq!(app.cart().items().len(), 1);
    }

    #[test]
    fn test_buy_now_with_same_product_in_cart_stages_single_unit() {
        let mut app = test_app();
        app.add_to_cart("p1", None).unwrap();
        app.add_to_cart("p1", None).unwrap();
        app.buy_now("p1", None).unwrap();

        let order = app.finalize_order(guest()).unwrap();
        // Quantity is forced to 1 regardless of what the cart holds.
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 1);
        // One staged line, one cart line, same first product: the
        // looks-like-the-cart approximation fires and empties the cart.
        assert!(app.cart().is_empty());
    }

    #[test]
    fn test_buy_now_total_includes_tax() {
        let mut app = test_app();
        app.buy_now("p1", None).unwrap();
        let order = app.finalize_order(guest()).unwrap();
        assert_eq!(order.total_amount, dec!(2475000.00));
    }

    #[test]
    fn test_finalize_without_staging_is_rejected() {
        let mut app = test_app();
        assert!(matches!(
            app.finalize_order(guest()),
            Err(MarketplaceError::EmptyCheckout)
        ));
    }

    #[test]
    fn test_track_order_not_found_clears_search() {
        let mut app = test_app();
        app.track_order("trk-9j2m4").unwrap();
        assert!(app.router().searched_order().is_some());
        assert!(app.track_order("TRK-00000").is_err());
        assert!(app.router().searched_order().is_none());
    }

    #[test]
    fn test_admin_gate() {
        let mut app = test_app();
        assert!(matches!(app.set_discount("p1", 20), Err(MarketplaceError::AdminRequired)));
        assert!(matches!(app.admin_login("letmein"), Err(MarketplaceError::InvalidCredentials)));

        app.admin_login("admin").unwrap();
        assert_eq!(app.set_discount("p1", 150).unwrap(), 100);
        app.admin_logout();
        assert!(!app.is_admin());
        assert_eq!(app.router().current(), ViewMode::Home);
    }

    #[test]
    fn test_delete_product_requires_confirmation() {
        let mut app = test_app();
        app.admin_login("admin").unwrap();
        assert!(matches!(
            app.delete_product("p6", false),
            Err(MarketplaceError::DeleteNotConfirmed)
        ));
        app.delete_product("p6", true).unwrap();
        assert!(app.catalog().find("p6").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_escalation_appends_single_handover_and_silences_ai() {
        let app = shared(test_app());
        let assistant = CannedAssistant("should never appear");

        send_customer_message(&app, &assistant, "get me an agent".into()).await;
        {
            let guard = app.read().await;
            let system: Vec<_> = guard
                .support()
                .messages()
                .iter()
                .filter(|m| m.role == Role::System)
                .collect();
            assert_eq!(system.len(), 1);
            assert_eq!(system[0].content, HANDOVER_MESSAGE);
            assert!(guard.support().is_live());
        }

        let before = app.read().await.support().messages().len();
        send_customer_message(&app, &assistant, "anyone there?".into()).await;
        let guard = app.read().await;
        assert_eq!(guard.support().messages().len(), before + 1);
        assert!(guard.support().has_unread_for_admin());
    }

    #[tokio::test]
    async fn test_ai_reply_appended_after_query() {
        let app = shared(test_app());
        send_customer_message(&app, &CannedAssistant("Your Total is 50"), "price?".into()).await;
        let guard = app.read().await;
        let last = guard.support().messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(last.is_invoice);
        assert!(!guard.support().is_typing());
    }

    #[tokio::test]
    async fn test_assistant_failure_degrades_to_fallback() {
        let app = shared(test_app());
        send_customer_message(&app, &FailingAssistant, "price?".into()).await;
        let guard = app.read().await;
        let last = guard.support().messages().last().unwrap();
        assert_eq!(last.content, FALLBACK_MESSAGE);
        assert!(!guard.support().is_typing());
    }

    #[test]
    fn test_resolve_support_is_admin_gated() {
        let mut app = test_app();
        assert!(app.resolve_support().is_err());
        app.admin_login("admin").unwrap();
        // Welcome-only transcript: archiving is a no-op.
        assert!(!app.resolve_support().unwrap());
    }

    #[test]
    fn test_dark_mode_toggle_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let mut app = App::new(
            seed::catalog(),
            seed::ledger(),
            PrefsStore::load(path.clone(), false),
        );
        assert!(app.toggle_dark_mode().unwrap());
        let reloaded = PrefsStore::load(path, false);
        assert!(reloaded.dark_mode());
    }
}
