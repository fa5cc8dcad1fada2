//! # menuqr-axum
//!
//! Axum HTTP adapter for the MenuQR backend. Wraps an
//! [`AppContext`](menuqr::AppContext) and exposes the subscription,
//! billing, cafe, menu, and offer endpoints plus the public menu route.
//!
//! Authentication is out of scope here: an upstream gateway verifies the
//! session and forwards the caller's id in the `X-User-Id` header.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use menuqr::billing::VerifyPaymentRequest;
use menuqr::cafes::CreateCafeRequest;
use menuqr::AppContext;
use menuqr_core::error::{ApiError, ErrorCode, HttpStatus, MenuQrError};
use menuqr_core::storage::{
    CafeUpdate, CategoryUpdate, MenuItemUpdate, NewCategory, NewMenuItem, NewOffer, NewTag,
    OfferUpdate,
};
use menuqr_razorpay::WEBHOOK_SIGNATURE_HEADER;

/// Header the upstream gateway uses to forward the authenticated user.
pub const USER_ID_HEADER: &str = "x-user-id";

// ─── Error Handling ──────────────────────────────────────────────

/// HTTP-shaped error for the adapter; rendered as
/// `{"error": {"code", "message"}}`.
struct HttpError {
    status: StatusCode,
    code: String,
    message: String,
}

impl HttpError {
    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHORIZED".to_string(),
            message: "Missing user identity".to_string(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        });
        (self.status, Json(body)).into_response()
    }
}

fn status_from(status: HttpStatus) -> StatusCode {
    StatusCode::from_u16(status.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Wire name of an `ErrorCode` (its SCREAMING_SNAKE_CASE serde form).
fn code_str(code: ErrorCode) -> String {
    serde_json::to_value(code)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "INTERNAL_SERVER_ERROR".to_string())
}

impl From<ApiError> for HttpError {
    fn from(e: ApiError) -> Self {
        Self {
            status: status_from(e.status),
            code: code_str(e.code),
            message: e.message,
        }
    }
}

impl From<MenuQrError> for HttpError {
    fn from(e: MenuQrError) -> Self {
        match e {
            MenuQrError::Api(api) => api.into(),
            MenuQrError::NotFound(msg) => Self {
                status: StatusCode::NOT_FOUND,
                code: "NOT_FOUND".to_string(),
                message: msg,
            },
            MenuQrError::Duplicate(msg) => Self {
                status: StatusCode::CONFLICT,
                code: "DUPLICATE".to_string(),
                message: msg,
            },
            MenuQrError::Config(msg) => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                code: "SERVICE_UNAVAILABLE".to_string(),
                message: msg,
            },
            MenuQrError::Gateway(msg) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: code_str(ErrorCode::PaymentGatewayError),
                message: msg,
            },
            MenuQrError::Storage(msg) | MenuQrError::Other(msg) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "INTERNAL_SERVER_ERROR".to_string(),
                message: msg,
            },
            MenuQrError::Anyhow(err) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "INTERNAL_SERVER_ERROR".to_string(),
                message: err.to_string(),
            },
        }
    }
}

// ─── Identity Extraction ─────────────────────────────────────────

/// Pull the authenticated user id forwarded by the upstream gateway.
fn require_user(headers: &HeaderMap) -> Result<String, HttpError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(HttpError::unauthorized)
}

// ─── MenuQr Builder ──────────────────────────────────────────────

/// The entry point for serving MenuQR over Axum.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use menuqr::AppContext;
/// use menuqr_axum::MenuQr;
/// use menuqr_memory::MemoryStorage;
///
/// let ctx = AppContext::new(Arc::new(MemoryStorage::new()));
/// let app = MenuQr::new(ctx).router_with_cors();
/// ```
pub struct MenuQr {
    ctx: Arc<AppContext>,
}

impl MenuQr {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    pub fn from_context(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    /// Build the Axum `Router` with all MenuQR endpoints.
    pub fn router(&self) -> Router {
        Router::new()
            // Health
            .route("/api/health", get(handle_health))
            // Subscription & billing
            .route("/api/subscription/status", get(handle_status))
            .route("/api/subscription/create-order", post(handle_create_order))
            .route("/api/subscription/verify", post(handle_verify))
            .route("/api/webhooks/razorpay", post(handle_webhook))
            // Cafes
            .route("/api/cafes", get(handle_list_cafes).post(handle_create_cafe))
            .route("/api/cafes/slug/{slug}", get(handle_cafe_by_slug))
            .route(
                "/api/cafes/{id}",
                axum::routing::patch(handle_update_cafe).delete(handle_delete_cafe),
            )
            // Categories
            .route(
                "/api/cafes/{id}/categories",
                get(handle_list_categories).post(handle_create_category),
            )
            .route(
                "/api/categories/{id}",
                axum::routing::patch(handle_update_category).delete(handle_delete_category),
            )
            // Menu items
            .route(
                "/api/cafes/{id}/items",
                get(handle_list_items).post(handle_create_item),
            )
            .route(
                "/api/items/{id}",
                axum::routing::patch(handle_update_item).delete(handle_delete_item),
            )
            // Offers
            .route(
                "/api/cafes/{id}/offers",
                get(handle_list_offers).post(handle_create_offer),
            )
            .route(
                "/api/offers/{id}",
                axum::routing::patch(handle_update_offer).delete(handle_delete_offer),
            )
            // Tags
            .route("/api/tags", get(handle_list_tags).post(handle_create_tag))
            // Public menu
            .route("/menu/{slug}", get(handle_public_menu))
            .with_state(self.ctx.clone())
    }

    /// Build the router with permissive CORS. For production, configure
    /// CORS manually.
    pub fn router_with_cors(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        self.router().layer(cors)
    }
}

// ─── Route Handlers ─────────────────────────────────────────────

async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

async fn handle_status(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let status = ctx.billing().status(&user_id).await?;
    Ok(Json(status))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderBody {
    plan_type: String,
}

async fn handle_create_order(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(body): Json<CreateOrderBody>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let order = ctx.billing().create_order(&user_id, &body.plan_type).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn handle_verify(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(body): Json<VerifyPaymentRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let sub = ctx.billing().verify_payment(&user_id, &body).await?;
    Ok(Json(sub))
}

/// Webhook delivery from the payment gateway. Authenticated by the
/// signature over the raw body, not by `X-User-Id`.
async fn handle_webhook(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HttpError> {
    let signature = headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    ctx.billing().handle_webhook(&body, signature).await?;
    Ok(Json(serde_json::json!({ "received": true })))
}

async fn handle_list_cafes(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let cafes = ctx.cafes().list(&user_id).await?;
    Ok(Json(cafes))
}

async fn handle_create_cafe(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(body): Json<CreateCafeRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let cafe = ctx.cafes().create(&user_id, body).await?;
    Ok((StatusCode::CREATED, Json(cafe)))
}

/// Public lookup used by the menu page to resolve a scanned slug.
async fn handle_cafe_by_slug(
    State(ctx): State<Arc<AppContext>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let cafe = ctx.cafes().get_by_slug(&slug).await?;
    Ok(Json(cafe))
}

async fn handle_update_cafe(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<CafeUpdate>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let cafe = ctx.cafes().update(&user_id, &id, body).await?;
    Ok(Json(cafe))
}

async fn handle_delete_cafe(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    ctx.cafes().delete(&user_id, &id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

async fn handle_list_categories(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(cafe_id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let categories = ctx.menu().categories(&user_id, &cafe_id).await?;
    Ok(Json(categories))
}

/// Category creation body; the cafe id comes from the path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCategoryBody {
    name: String,
    #[serde(default)]
    sort_order: i32,
    #[serde(default = "default_true")]
    is_visible: bool,
}

fn default_true() -> bool {
    true
}

async fn handle_create_category(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(cafe_id): Path<String>,
    Json(body): Json<CreateCategoryBody>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let category = ctx
        .menu()
        .create_category(
            &user_id,
            NewCategory {
                cafe_id,
                name: body.name,
                sort_order: body.sort_order,
                is_visible: body.is_visible,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn handle_update_category(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<CategoryUpdate>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let category = ctx.menu().update_category(&user_id, &id, body).await?;
    Ok(Json(category))
}

async fn handle_delete_category(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    ctx.menu().delete_category(&user_id, &id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemsQuery {
    category_id: Option<String>,
}

async fn handle_list_items(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(cafe_id): Path<String>,
    Query(query): Query<ItemsQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let items = ctx
        .menu()
        .items(&user_id, &cafe_id, query.category_id.as_deref())
        .await?;
    Ok(Json(items))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateItemBody {
    category_id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    price: i64,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default = "default_true")]
    is_available: bool,
    #[serde(default)]
    sort_order: i32,
    #[serde(default)]
    badges: Vec<String>,
}

async fn handle_create_item(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(cafe_id): Path<String>,
    Json(body): Json<CreateItemBody>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let item = ctx
        .menu()
        .create_item(
            &user_id,
            NewMenuItem {
                cafe_id,
                category_id: body.category_id,
                name: body.name,
                description: body.description,
                price: body.price,
                image_url: body.image_url,
                is_available: body.is_available,
                sort_order: body.sort_order,
                badges: body.badges,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn handle_update_item(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<MenuItemUpdate>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let item = ctx.menu().update_item(&user_id, &id, body).await?;
    Ok(Json(item))
}

async fn handle_delete_item(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    ctx.menu().delete_item(&user_id, &id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

async fn handle_list_offers(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(cafe_id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let offers = ctx.offers().list(&user_id, &cafe_id).await?;
    Ok(Json(offers))
}

async fn handle_create_offer(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(cafe_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    // Inject the path cafe id, then let serde enforce the payload shape.
    let mut body = body;
    if let Some(obj) = body.as_object_mut() {
        obj.insert("cafeId".to_string(), serde_json::Value::String(cafe_id));
    }
    let offer: NewOffer = serde_json::from_value(body).map_err(|e| HttpError {
        status: StatusCode::BAD_REQUEST,
        code: "COULD_NOT_PARSE_BODY".to_string(),
        message: e.to_string(),
    })?;
    let offer = ctx.offers().create(&user_id, offer).await?;
    Ok((StatusCode::CREATED, Json(offer)))
}

async fn handle_update_offer(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<OfferUpdate>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let offer = ctx.offers().update(&user_id, &id, body).await?;
    Ok(Json(offer))
}

async fn handle_delete_offer(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    ctx.offers().delete(&user_id, &id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Tag catalog is global and public; only creation needs a user.
async fn handle_list_tags(
    State(ctx): State<Arc<AppContext>>,
) -> Result<impl IntoResponse, HttpError> {
    let tags = ctx.menu().tags().await?;
    Ok(Json(tags))
}

async fn handle_create_tag(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(body): Json<NewTag>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = require_user(&headers)?;
    let tag = ctx.menu().create_tag(&user_id, body).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

async fn handle_public_menu(
    State(ctx): State<Arc<AppContext>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let menu = ctx.menu().public_menu(&slug).await?;
    Ok(Json(menu))
}
