//! HTTP surface
//!
//! Thin axum layer over the application commands. Handlers hold the app lock
//! only for the synchronous command; the support-message handler drives the
//! async follow-up (handover delay or collaborator query) after the lock is
//! released.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use validator::Validate;

use crate::app::router::ViewMode;
use crate::app::{send_customer_message, SharedApp};
use crate::assistant::MarketplaceAssistant;
use crate::domain::aggregates::catalog::{Category, NewProduct, NewReview, Product};
use crate::domain::aggregates::order::{CustomerDetails, Order, OrderStatus};
use crate::domain::aggregates::support::{Message, SupportMode};
use crate::MarketplaceError;

#[derive(Clone)]
pub struct ApiState {
    pub app: SharedApp,
    pub assistant: Arc<dyn MarketplaceAssistant>,
}

type ApiError = (StatusCode, String);

fn api_err(e: MarketplaceError) -> ApiError {
    let status = match e {
        MarketplaceError::ProductNotFound
        | MarketplaceError::OrderNotFound
        | MarketplaceError::CartItemNotFound => StatusCode::NOT_FOUND,
        MarketplaceError::OutOfStock => StatusCode::CONFLICT,
        MarketplaceError::EmptyCheckout | MarketplaceError::DeleteNotConfirmed => {
            StatusCode::BAD_REQUEST
        }
        MarketplaceError::InvalidCredentials | MarketplaceError::AdminRequired => {
            StatusCode::UNAUTHORIZED
        }
        MarketplaceError::Prefs(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "h8-marketplace"})) }))
        .route("/api/v1/products", get(list_products).post(create_product))
        .route("/api/v1/products/:id", get(get_product).delete(delete_product))
        .route("/api/v1/products/:id/select", post(select_product))
        .route("/api/v1/products/:id/image", post(set_product_image))
        .route("/api/v1/products/:id/stock", post(toggle_stock))
        .route("/api/v1/products/:id/discount", post(set_discount))
        .route("/api/v1/products/:id/reviews", post(add_review))
        .route("/api/v1/categories", get(list_categories).post(add_category))
        .route("/api/v1/cart", get(get_cart))
        .route("/api/v1/cart/items", post(add_to_cart))
        .route("/api/v1/cart/items/quantity", post(change_quantity))
        .route("/api/v1/cart/items/remove", post(remove_from_cart))
        .route("/api/v1/checkout/buy-now", post(buy_now))
        .route("/api/v1/checkout/cart", post(checkout_cart))
        .route("/api/v1/checkout", post(finalize_order))
        .route("/api/v1/orders", get(visible_orders))
        .route("/api/v1/orders/track/:id", get(track_order))
        .route("/api/v1/support", get(get_support))
        .route("/api/v1/support/messages", post(send_support_message))
        .route("/api/v1/session", get(get_session))
        .route("/api/v1/navigate", post(navigate))
        .route("/api/v1/preferences", get(get_preferences))
        .route("/api/v1/preferences/dark-mode/toggle", post(toggle_dark_mode))
        .route("/api/v1/admin/login", post(admin_login))
        .route("/api/v1/admin/logout", post(admin_logout))
        .route("/api/v1/admin/orders", get(admin_orders))
        .route("/api/v1/admin/orders/:id/status", post(set_order_status))
        .route("/api/v1/admin/orders/status", post(set_order_status_bulk))
        .route("/api/v1/admin/support/reply", post(admin_support_reply))
        .route("/api/v1/admin/support/resolve", post(resolve_support))
        .route("/api/v1/admin/support/archive", get(support_archive))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

async fn list_products(State(s): State<ApiState>) -> Json<Vec<Product>> {
    Json(s.app.read().await.catalog().products().to_vec())
}

async fn get_product(State(s): State<ApiState>, Path(id): Path<String>) -> Result<Json<Product>, ApiError> {
    s.app.read().await.catalog().find(&id).cloned().map(Json).ok_or_else(|| api_err(MarketplaceError::ProductNotFound))
}

async fn select_product(State(s): State<ApiState>, Path(id): Path<String>) -> Result<Json<Product>, ApiError> {
    s.app.write().await.select_product(&id).map(Json).map_err(api_err)
}

async fn create_product(State(s): State<ApiState>, Json(r): Json<NewProduct>) -> Result<(StatusCode, Json<Product>), ApiError> {
    s.app.write().await.add_product(r).map(|p| (StatusCode::CREATED, Json(p))).map_err(api_err)
}

#[derive(Debug, Deserialize)]
struct DeleteParams {
    #[serde(default)]
    confirm: bool,
}

async fn delete_product(State(s): State<ApiState>, Path(id): Path<String>, Query(p): Query<DeleteParams>) -> Result<StatusCode, ApiError> {
    s.app.write().await.delete_product(&id, p.confirm).map(|_| StatusCode::NO_CONTENT).map_err(api_err)
}

#[derive(Debug, Deserialize)]
struct ImageRequest {
    image_url: String,
}

async fn set_product_image(State(s): State<ApiState>, Path(id): Path<String>, Json(r): Json<ImageRequest>) -> Result<StatusCode, ApiError> {
    s.app.write().await.set_product_image(&id, &r.image_url).map(|_| StatusCode::NO_CONTENT).map_err(api_err)
}

async fn toggle_stock(State(s): State<ApiState>, Path(id): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    let out_of_stock = s.app.write().await.toggle_stock(&id).map_err(api_err)?;
    Ok(Json(serde_json::json!({"out_of_stock": out_of_stock})))
}

#[derive(Debug, Deserialize)]
struct DiscountRequest {
    percent: i64,
}

async fn set_discount(State(s): State<ApiState>, Path(id): Path<String>, Json(r): Json<DiscountRequest>) -> Result<Json<serde_json::Value>, ApiError> {
    let percent = s.app.write().await.set_discount(&id, r.percent).map_err(api_err)?;
    Ok(Json(serde_json::json!({"discount": percent})))
}

async fn add_review(State(s): State<ApiState>, Path(id): Path<String>, Json(r): Json<NewReview>) -> Result<StatusCode, ApiError> {
    s.app.write().await.add_review(&id, r).map(|_| StatusCode::CREATED).map_err(api_err)
}

async fn list_categories(State(s): State<ApiState>) -> Json<Vec<Category>> {
    Json(s.app.read().await.catalog().categories().to_vec())
}

#[derive(Debug, Deserialize)]
struct CategoryRequest {
    name: String,
}

async fn add_category(State(s): State<ApiState>, Json(r): Json<CategoryRequest>) -> Result<StatusCode, ApiError> {
    s.app.write().await.add_category(&r.name).map(|_| StatusCode::CREATED).map_err(api_err)
}

// ---------------------------------------------------------------------------
// Cart & checkout
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CartKeyRequest {
    product_id: String,
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuantityRequest {
    product_id: String,
    color: Option<String>,
    delta: i32,
}

#[derive(Debug, Serialize)]
struct CartResponse {
    items: Vec<crate::domain::aggregates::cart::CartItem>,
    total_quantity: u32,
}

async fn get_cart(State(s): State<ApiState>) -> Json<CartResponse> {
    let app = s.app.read().await;
    Json(CartResponse { items: app.cart().items().to_vec(), total_quantity: app.cart().total_quantity() })
}

async fn add_to_cart(State(s): State<ApiState>, Json(r): Json<CartKeyRequest>) -> Result<Json<serde_json::Value>, ApiError> {
    let total = s.app.write().await.add_to_cart(&r.product_id, r.color).map_err(api_err)?;
    Ok(Json(serde_json::json!({"total_quantity": total})))
}

async fn change_quantity(State(s): State<ApiState>, Json(r): Json<QuantityRequest>) -> Result<StatusCode, ApiError> {
    s.app.write().await.change_cart_quantity(&r.product_id, r.color.as_deref(), r.delta).map(|_| StatusCode::NO_CONTENT).map_err(api_err)
}

async fn remove_from_cart(State(s): State<ApiState>, Json(r): Json<CartKeyRequest>) -> Result<StatusCode, ApiError> {
    s.app.write().await.remove_from_cart(&r.product_id, r.color.as_deref()).map(|_| StatusCode::NO_CONTENT).map_err(api_err)
}

async fn buy_now(State(s): State<ApiState>, Json(r): Json<CartKeyRequest>) -> Result<StatusCode, ApiError> {
    s.app.write().await.buy_now(&r.product_id, r.color).map(|_| StatusCode::NO_CONTENT).map_err(api_err)
}

async fn checkout_cart(State(s): State<ApiState>) -> Result<StatusCode, ApiError> {
    s.app.write().await.checkout_cart().map(|_| StatusCode::NO_CONTENT).map_err(api_err)
}

async fn finalize_order(State(s): State<ApiState>, Json(details): Json<CustomerDetails>) -> Result<(StatusCode, Json<Order>), ApiError> {
    details.validate().map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    s.app.write().await.finalize_order(details).map(|o| (StatusCode::CREATED, Json(o))).map_err(api_err)
}

// ---------------------------------------------------------------------------
// Order tracking
// ---------------------------------------------------------------------------

async fn visible_orders(State(s): State<ApiState>) -> Json<Vec<Order>> {
    Json(s.app.read().await.visible_orders())
}

async fn track_order(State(s): State<ApiState>, Path(id): Path<String>) -> Result<Json<Order>, ApiError> {
    // Deliberately generic: the message never confirms whether a similar id
    // was ever issued.
    s.app.write().await.track_order(&id).map(Json).map_err(|_| {
        (StatusCode::NOT_FOUND, "Order not found. Please verify your Tracking ID.".to_string())
    })
}

// ---------------------------------------------------------------------------
// Support chat
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SupportResponse {
    messages: Vec<Message>,
    mode: SupportMode,
    typing: bool,
    unread_for_admin: bool,
}

async fn support_response(app: &SharedApp) -> SupportResponse {
    let guard = app.read().await;
    SupportResponse {
        messages: guard.support().messages().to_vec(),
        mode: guard.support().mode(),
        typing: guard.support().is_typing(),
        unread_for_admin: guard.support().has_unread_for_admin(),
    }
}

async fn get_support(State(s): State<ApiState>) -> Json<SupportResponse> {
    Json(support_response(&s.app).await)
}

#[derive(Debug, Deserialize)]
struct SupportMessageRequest {
    text: String,
}

async fn send_support_message(State(s): State<ApiState>, Json(r): Json<SupportMessageRequest>) -> Json<SupportResponse> {
    send_customer_message(&s.app, s.assistant.as_ref(), r.text).await;
    Json(support_response(&s.app).await)
}

async fn admin_support_reply(State(s): State<ApiState>, Json(r): Json<SupportMessageRequest>) -> Result<StatusCode, ApiError> {
    s.app.write().await.admin_support_reply(r.text).map(|_| StatusCode::NO_CONTENT).map_err(api_err)
}

async fn resolve_support(State(s): State<ApiState>) -> Result<Json<serde_json::Value>, ApiError> {
    let archived = s.app.write().await.resolve_support().map_err(api_err)?;
    Ok(Json(serde_json::json!({"archived": archived})))
}

async fn support_archive(State(s): State<ApiState>) -> Result<Json<Vec<Vec<Message>>>, ApiError> {
    let guard = s.app.read().await;
    guard.support_archive().map(|a| Json(a.to_vec())).map_err(api_err)
}

// ---------------------------------------------------------------------------
// Session, navigation, preferences, admin
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SessionResponse {
    view: ViewMode,
    selected_product_id: Option<String>,
    selected_category: String,
    cart_quantity: u32,
    dark_mode: bool,
    is_admin: bool,
    live_support: bool,
    unread_support: bool,
}

async fn get_session(State(s): State<ApiState>) -> Json<SessionResponse> {
    let app = s.app.read().await;
    Json(SessionResponse {
        view: app.router().current(),
        selected_product_id: app.router().selected_product_id().map(String::from),
        selected_category: app.router().selected_category().to_string(),
        cart_quantity: app.cart().total_quantity(),
        dark_mode: app.dark_mode(),
        is_admin: app.is_admin(),
        live_support: app.support().is_live(),
        unread_support: app.support().has_unread_for_admin(),
    })
}

#[derive(Debug, Deserialize)]
struct NavigateRequest {
    view: ViewMode,
    category: Option<String>,
}

async fn navigate(State(s): State<ApiState>, Json(r): Json<NavigateRequest>) -> StatusCode {
    let mut app = s.app.write().await;
    match r.category {
        Some(category) => app.browse_category(category),
        None => app.navigate(r.view),
    }
    StatusCode::NO_CONTENT
}

async fn get_preferences(State(s): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({"dark_mode": s.app.read().await.dark_mode()}))
}

async fn toggle_dark_mode(State(s): State<ApiState>) -> Result<Json<serde_json::Value>, ApiError> {
    let dark_mode = s.app.write().await.toggle_dark_mode().map_err(api_err)?;
    Ok(Json(serde_json::json!({"dark_mode": dark_mode})))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    password: String,
}

async fn admin_login(State(s): State<ApiState>, Json(r): Json<LoginRequest>) -> Result<StatusCode, ApiError> {
    s.app.write().await.admin_login(&r.password).map(|_| StatusCode::NO_CONTENT).map_err(api_err)
}

async fn admin_logout(State(s): State<ApiState>) -> StatusCode {
    s.app.write().await.admin_logout();
    StatusCode::NO_CONTENT
}

async fn admin_orders(State(s): State<ApiState>) -> Result<Json<Vec<Order>>, ApiError> {
    let guard = s.app.read().await;
    guard.admin_orders().map(|o| Json(o.to_vec())).map_err(api_err)
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: OrderStatus,
}

#[derive(Debug, Deserialize)]
struct BulkStatusRequest {
    order_ids: Vec<String>,
    status: OrderStatus,
}

async fn set_order_status(State(s): State<ApiState>, Path(id): Path<String>, Json(r): Json<StatusRequest>) -> Result<StatusCode, ApiError> {
    s.app.write().await.set_order_status(&id, r.status).map(|_| StatusCode::NO_CONTENT).map_err(api_err)
}

async fn set_order_status_bulk(State(s): State<ApiState>, Json(r): Json<BulkStatusRequest>) -> Result<StatusCode, ApiError> {
    s.app.write().await.set_order_status_bulk(&r.order_ids, r.status).map(|_| StatusCode::NO_CONTENT).map_err(api_err)
}
