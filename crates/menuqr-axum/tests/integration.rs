// Integration tests for menuqr-axum
//
// HTTP-level tests using tower::ServiceExt::oneshot to exercise the full
// Axum router without starting a real TCP server.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use menuqr::AppContext;
use menuqr_core::storage::Storage;
use menuqr_axum::MenuQr;
use menuqr_memory::MemoryStorage;
use menuqr_razorpay::{
    payment_signature, webhook_signature, CreateOrderRequest, GatewayOrder, PaymentGateway,
    RazorpayError, RazorpayOptions,
};

const KEY_SECRET: &str = "test_key_secret";
const WEBHOOK_SECRET: &str = "test_webhook_secret";

// ─── Test Gateway ─────────────────────────────────────────────────

/// Gateway fake: returns a deterministic order without touching the
/// network.
#[derive(Debug)]
struct TestGateway;

#[async_trait::async_trait]
impl PaymentGateway for TestGateway {
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<GatewayOrder, RazorpayError> {
        Ok(GatewayOrder {
            id: "order_test_1".to_string(),
            amount: request.amount,
            currency: request.currency,
        })
    }
}

// ─── Helpers ──────────────────────────────────────────────────────

fn app(storage: &MemoryStorage) -> Router {
    let ctx = AppContext::new(Arc::new(storage.clone()))
        .with_razorpay(RazorpayOptions::new("rzp_test_key", KEY_SECRET, WEBHOOK_SECRET))
        .with_gateway(Arc::new(TestGateway))
        .with_base_url("http://localhost:3000");
    MenuQr::new(ctx).router()
}

/// Router with no payment gateway configured at all.
fn unconfigured_app(storage: &MemoryStorage) -> Router {
    let ctx = AppContext::new(Arc::new(storage.clone())).with_base_url("http://localhost:3000");
    MenuQr::new(ctx).router()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn get(path: &str, user: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .header("x-user-id", user)
        .body(Body::empty())
        .unwrap()
}

fn post_json(path: &str, user: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("x-user-id", user)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn patch_json(path: &str, user: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(path)
        .header("x-user-id", user)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create_cafe(app: &Router, user: &str, name: &str) -> serde_json::Value {
    let (status, body) = send(
        app,
        post_json("/api/cafes", user, serde_json::json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

// ─── Health & Identity ────────────────────────────────────────────

#[tokio::test]
async fn health_is_open() {
    let storage = MemoryStorage::new();
    let app = app(&storage);
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn missing_user_header_is_401() {
    let storage = MemoryStorage::new();
    let app = app(&storage);
    let request = Request::builder()
        .uri("/api/subscription/status")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

// ─── Subscription Status ──────────────────────────────────────────

#[tokio::test]
async fn status_auto_creates_trial() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    let (status, body) = send(&app, get("/api/subscription/status", "u1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "trial");
    assert_eq!(body["planType"], "trial");
    assert_eq!(body["daysRemaining"], 7);
    assert_eq!(body["canPerformActions"], true);
    assert_eq!(body["canChangePlan"], true);
}

// ─── Cafes ────────────────────────────────────────────────────────

#[tokio::test]
async fn cafe_creation_builds_slug_and_qr() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    let cafe = create_cafe(&app, "u1", "Chai Point").await;
    assert!(cafe["slug"].as_str().unwrap().starts_with("chai-point-"));
    assert!(cafe["qrCodeUrl"]
        .as_str()
        .unwrap()
        .starts_with("data:image/svg+xml;base64,"));
}

#[tokio::test]
async fn third_cafe_hits_plan_limit() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    create_cafe(&app, "u1", "One").await;
    create_cafe(&app, "u1", "Two").await;
    let (status, body) = send(
        &app,
        post_json("/api/cafes", "u1", serde_json::json!({ "name": "Three" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("limit of 2"));
    assert!(message.contains("Upgrade to Pro"));
}

#[tokio::test]
async fn premium_theme_blocked_without_premium_access() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    // Move the user onto an active basic plan.
    storage.create_subscription("u1").await.unwrap();
    storage
        .update_subscription(
            "u1",
            menuqr_core::storage::SubscriptionUpdate {
                status: Some(menuqr_core::models::SubscriptionStatus::Active),
                plan_type: Some(menuqr_core::models::PlanType::BasicMonthly),
                end_date: Some(chrono::Utc::now() + chrono::Duration::days(20)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        post_json(
            "/api/cafes",
            "u1",
            serde_json::json!({ "name": "Fancy", "theme": "premium" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "PREMIUM_THEME_REQUIRES_PRO");
}

#[tokio::test]
async fn foreign_cafe_update_is_403() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    let cafe = create_cafe(&app, "owner", "Mine").await;
    send(&app, get("/api/subscription/status", "intruder")).await;

    let (status, _) = send(
        &app,
        patch_json(
            &format!("/api/cafes/{}", cafe["id"].as_str().unwrap()),
            "intruder",
            serde_json::json!({ "name": "Stolen" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ─── Billing ──────────────────────────────────────────────────────

#[tokio::test]
async fn create_order_returns_checkout_fields() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    let (status, body) = send(
        &app,
        post_json(
            "/api/subscription/create-order",
            "u1",
            serde_json::json!({ "planType": "pro-monthly" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["orderId"], "order_test_1");
    assert_eq!(body["amount"], 19_900);
    assert_eq!(body["currency"], "INR");
    assert_eq!(body["keyId"], "rzp_test_key");
}

#[tokio::test]
async fn create_order_rejects_unknown_plan() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    let (status, body) = send(
        &app,
        post_json(
            "/api/subscription/create-order",
            "u1",
            serde_json::json!({ "planType": "enterprise" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PLAN_TYPE");
}

#[tokio::test]
async fn create_order_blocked_mid_cycle() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    storage.create_subscription("u1").await.unwrap();
    storage
        .update_subscription(
            "u1",
            menuqr_core::storage::SubscriptionUpdate {
                status: Some(menuqr_core::models::SubscriptionStatus::Active),
                plan_type: Some(menuqr_core::models::PlanType::BasicMonthly),
                end_date: Some(chrono::Utc::now() + chrono::Duration::days(10)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        post_json(
            "/api/subscription/create-order",
            "u1",
            serde_json::json!({ "planType": "pro-yearly" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("mid-cycle"));
}

#[tokio::test]
async fn create_order_without_gateway_is_503() {
    let storage = MemoryStorage::new();
    let app = unconfigured_app(&storage);

    let (status, _) = send(
        &app,
        post_json(
            "/api/subscription/create-order",
            "u1",
            serde_json::json!({ "planType": "basic-monthly" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn verify_activates_subscription() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    let signature = payment_signature("order_test_1", "pay_test_1", KEY_SECRET);
    let (status, body) = send(
        &app,
        post_json(
            "/api/subscription/verify",
            "u1",
            serde_json::json!({
                "razorpayOrderId": "order_test_1",
                "razorpayPaymentId": "pay_test_1",
                "razorpaySignature": signature,
                "planType": "pro-yearly",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
    assert_eq!(body["planType"], "pro-yearly");
    assert_eq!(body["amount"], 100_000);

    // The status read reflects the new plan.
    let (_, status_body) = send(&app, get("/api/subscription/status", "u1")).await;
    assert_eq!(status_body["status"], "active");
    assert_eq!(status_body["canChangePlan"], false);
}

#[tokio::test]
async fn verify_rejects_tampered_signature() {
    let storage = MemoryStorage::new();
    let app = app(&storage);
    storage.create_subscription("u1").await.unwrap();

    let signature = payment_signature("order_test_1", "pay_test_1", KEY_SECRET);
    let (status, body) = send(
        &app,
        post_json(
            "/api/subscription/verify",
            "u1",
            serde_json::json!({
                "razorpayOrderId": "order_test_1",
                "razorpayPaymentId": "pay_OTHER",
                "razorpaySignature": signature,
                "planType": "pro-yearly",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PAYMENT_SIGNATURE");

    // Record untouched.
    let sub = storage.get_subscription("u1").await.unwrap().unwrap();
    assert_eq!(sub.status, menuqr_core::models::SubscriptionStatus::Trial);
}

// ─── Webhook ──────────────────────────────────────────────────────

fn webhook_request(body: &str, signature: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/webhooks/razorpay")
        .header("content-type", "application/json")
        .header("x-razorpay-signature", signature)
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn webhook_activates_subscription() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    let body = serde_json::json!({
        "event": "payment.captured",
        "payload": {
            "payment": {
                "entity": {
                    "id": "pay_wh_1",
                    "order_id": "order_wh_1",
                    "amount": 19900,
                    "notes": { "userId": "u1", "planType": "pro-monthly" }
                }
            }
        }
    })
    .to_string();
    let signature = webhook_signature(body.as_bytes(), WEBHOOK_SECRET);

    let (status, response) = send(&app, webhook_request(&body, &signature)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["received"], true);

    let sub = storage.get_subscription("u1").await.unwrap().unwrap();
    assert_eq!(sub.status, menuqr_core::models::SubscriptionStatus::Active);
    assert_eq!(sub.plan_type, menuqr_core::models::PlanType::ProMonthly);
}

#[tokio::test]
async fn webhook_rejects_bad_signature() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    let body = serde_json::json!({ "event": "payment.captured", "payload": {} }).to_string();
    let (status, response) = send(&app, webhook_request(&body, "deadbeef")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"]["code"], "INVALID_WEBHOOK_SIGNATURE");
}

#[tokio::test]
async fn webhook_ignores_unrelated_events() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    let body = serde_json::json!({ "event": "payment.failed", "payload": {} }).to_string();
    let signature = webhook_signature(body.as_bytes(), WEBHOOK_SECRET);
    let (status, _) = send(&app, webhook_request(&body, &signature)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(storage.get_subscription("u1").await.unwrap().is_none());
}

// ─── Menu & Public Routes ─────────────────────────────────────────

#[tokio::test]
async fn menu_flow_and_public_read() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    let cafe = create_cafe(&app, "u1", "Chai Point").await;
    let cafe_id = cafe["id"].as_str().unwrap();
    let slug = cafe["slug"].as_str().unwrap();

    let (status, category) = send(
        &app,
        post_json(
            &format!("/api/cafes/{cafe_id}/categories"),
            "u1",
            serde_json::json!({ "name": "Drinks" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        post_json(
            &format!("/api/cafes/{cafe_id}/items"),
            "u1",
            serde_json::json!({
                "categoryId": category_id,
                "name": "Masala Chai",
                "price": 4000,
                "badges": ["bestseller"],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Diners read the menu with no auth header.
    let request = Request::builder()
        .uri(format!("/menu/{slug}"))
        .body(Body::empty())
        .unwrap();
    let (status, menu) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(menu["cafe"]["slug"], slug);
    assert_eq!(menu["categories"][0]["name"], "Drinks");
    assert_eq!(menu["categories"][0]["items"][0]["name"], "Masala Chai");
    assert_eq!(menu["categories"][0]["items"][0]["price"], 4000);
}

#[tokio::test]
async fn expired_user_blocked_from_menu_mutations() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    let cafe = create_cafe(&app, "u1", "Soon Stale").await;
    let cafe_id = cafe["id"].as_str().unwrap();

    storage
        .update_subscription(
            "u1",
            menuqr_core::storage::SubscriptionUpdate {
                status: Some(menuqr_core::models::SubscriptionStatus::Expired),
                end_date: Some(chrono::Utc::now() - chrono::Duration::days(1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (status, body) = send(
        &app,
        post_json(
            &format!("/api/cafes/{cafe_id}/categories"),
            "u1",
            serde_json::json!({ "name": "Drinks" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Subscription expired"));

    // Reads still work for the expired owner.
    let (status, _) = send(&app, get("/api/cafes", "u1")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_public_slug_is_404() {
    let storage = MemoryStorage::new();
    let app = app(&storage);
    let request = Request::builder()
        .uri("/menu/ghost")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cafe_lookup_by_slug_is_public() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    let cafe = create_cafe(&app, "owner", "Corner Cafe").await;
    let slug = cafe["slug"].as_str().unwrap();

    let request = Request::builder()
        .uri(format!("/api/cafes/slug/{slug}"))
        .body(Body::empty())
        .unwrap();
    let (status, found) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["id"], cafe["id"]);

    let request = Request::builder()
        .uri("/api/cafes/slug/no-such-cafe")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tag_catalog_is_public_but_creation_needs_subscription() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    let (status, _) = send(
        &app,
        post_json(
            "/api/tags",
            "stranger",
            serde_json::json!({ "label": "Vegan", "group": "Dietary", "key": "vegan" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    send(&app, get("/api/subscription/status", "u1")).await;
    let (status, tag) = send(
        &app,
        post_json(
            "/api/tags",
            "u1",
            serde_json::json!({ "label": "Vegan", "group": "Dietary", "key": "vegan" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(tag["key"], "vegan");

    let request = Request::builder()
        .uri("/api/tags")
        .body(Body::empty())
        .unwrap();
    let (status, tags) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tags.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn offer_routes_enforce_ownership() {
    let storage = MemoryStorage::new();
    let app = app(&storage);

    let cafe = create_cafe(&app, "owner", "Deals").await;
    let cafe_id = cafe["id"].as_str().unwrap();

    let (status, offer) = send(
        &app,
        post_json(
            &format!("/api/cafes/{cafe_id}/offers"),
            "owner",
            serde_json::json!({ "title": "Happy Hour", "discountValue": 20 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let offer_id = offer["id"].as_str().unwrap();

    send(&app, get("/api/subscription/status", "intruder")).await;
    let (status, _) = send(
        &app,
        patch_json(
            &format!("/api/offers/{offer_id}"),
            "intruder",
            serde_json::json!({ "title": "Hijacked" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(
        &app,
        patch_json(
            &format!("/api/offers/{offer_id}"),
            "owner",
            serde_json::json!({ "discountValue": 30 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["discountValue"], 30);
}
