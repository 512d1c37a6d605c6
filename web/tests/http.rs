//! HTTP-level tests over the in-memory environment.

#![allow(clippy::unwrap_used)]

use axum_test::TestServer;
use http::StatusCode;
use serde_json::{json, Value};
use trailbound_core::domain::{Role, User};
use trailbound_core::providers::UserRepository;
use trailbound_core::Actor;
use trailbound_testing::TestWorld;
use trailbound_web::{router, AppState};

struct Harness {
    server: TestServer,
    world: TestWorld,
}

fn harness() -> Harness {
    let world = TestWorld::new();
    let state = AppState::new(world.env.clone(), "http://localhost:3000".to_string());
    let server = TestServer::new(router(state)).unwrap();
    Harness { server, world }
}

impl Harness {
    /// Seed a user with the given role and register a bearer token for it.
    async fn actor_with_token(&self, role: Role, token: &str) -> Actor {
        let mut user = User::new(
            format!("{} tester", role.as_str()),
            format!("{token}@example.com"),
            String::new(),
        );
        user.role = role;
        UserRepository::create(&*self.world.users, &user)
            .await
            .unwrap();
        let actor = Actor::new(user.id, role);
        self.world.auth.register(token, actor);
        actor
    }

    async fn create_tour(&self, token: &str, name: &str) -> Value {
        let response = self
            .server
            .post("/api/v1/tours")
            .authorization_bearer(token)
            .json(&json!({
                "name": name,
                "duration": 4,
                "maxGroupSize": 12,
                "difficulty": "easy",
                "price": 45_000,
                "summary": "Rolling hills and quiet villages",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }
}

#[tokio::test]
async fn health_is_public() {
    let h = harness();
    let response = h.server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn tour_mutations_require_auth_and_role() {
    let h = harness();
    h.actor_with_token(Role::User, "customer-token").await;
    h.actor_with_token(Role::Admin, "admin-token").await;

    let body = json!({
        "name": "The Slow Meander Walk",
        "duration": 2,
        "maxGroupSize": 6,
        "difficulty": "easy",
        "price": 12_000,
        "summary": "A gentle weekend stroll",
    });

    let response = h.server.post("/api/v1/tours").json(&body).await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = h
        .server
        .post("/api/v1/tours")
        .authorization_bearer("customer-token")
        .json(&body)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = h
        .server
        .post("/api/v1/tours")
        .authorization_bearer("admin-token")
        .json(&body)
        .await;
    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn unknown_bearer_token_is_unauthorized() {
    let h = harness();
    let response = h
        .server
        .get("/api/v1/bookings/my-bookings")
        .authorization_bearer("nobody")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listing_applies_filters_and_projection() {
    let h = harness();
    h.actor_with_token(Role::Admin, "admin-token").await;
    h.create_tour("admin-token", "The Forest Hiker Tour").await;
    h.create_tour("admin-token", "The Mountain Walker").await;

    let response = h
        .server
        .get("/api/v1/tours")
        .add_query_param("price[lte]", "50000")
        .add_query_param("fields", "name,price")
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["results"], json!(2));
    let first = body["data"][0].as_object().unwrap();
    assert!(first.contains_key("id"));
    assert!(first.contains_key("name"));
    assert!(!first.contains_key("summary"));
}

#[tokio::test]
async fn unknown_tour_is_not_found() {
    let h = harness();
    let response = h
        .server
        .get(&format!("/api/v1/tours/{}", uuid::Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body = response.json::<Value>();
    assert_eq!(body["status"], json!("fail"));
}

#[tokio::test]
async fn webhook_creates_booking_and_duplicate_review_conflicts() {
    let h = harness();
    h.actor_with_token(Role::Admin, "admin-token").await;
    let tour = h.create_tour("admin-token", "The Glacier Loop Trek").await;
    let tour_id = tour["id"].as_str().unwrap();

    h.actor_with_token(Role::User, "customer-token").await;

    let response = h
        .server
        .post("/api/v1/bookings/webhook")
        .add_header(
            http::HeaderName::from_static("x-webhook-signature"),
            http::HeaderValue::from_static("mock"),
        )
        .json(&json!({
            "type": "checkout.completed",
            "tourId": tour_id,
            "payerEmail": "customer-token@example.com",
            "amountCents": 45_000,
        }))
        .await;
    response.assert_status_ok();

    let response = h
        .server
        .get("/api/v1/bookings/my-bookings")
        .authorization_bearer("customer-token")
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["results"], json!(1));

    let review = json!({ "review": "Ice as far as the eye can see", "rating": 5 });
    let response = h
        .server
        .post(&format!("/api/v1/tours/{tour_id}/reviews"))
        .authorization_bearer("customer-token")
        .json(&review)
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = h
        .server
        .post(&format!("/api/v1/tours/{tour_id}/reviews"))
        .authorization_bearer("customer-token")
        .json(&review)
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // The derived rating moved with the committed review.
    let response = h.server.get(&format!("/api/v1/tours/{tour_id}")).await;
    let body = response.json::<Value>();
    assert_eq!(body["data"]["ratingsQuantity"], json!(1));
    assert_eq!(body["data"]["ratingsAverage"], json!(5.0));
}

#[tokio::test]
async fn signup_and_login_round_trip() {
    let h = harness();
    let response = h
        .server
        .post("/api/v1/users/signup")
        .json(&json!({
            "name": "Lena",
            "email": "Lena@Example.com",
            "password": "correcthorse",
            "passwordConfirm": "correcthorse",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert!(body["token"].is_string());
    // Hashes and reset fields never serialize.
    assert!(body["data"].get("passwordHash").is_none());

    let response = h
        .server
        .post("/api/v1/users/login")
        .json(&json!({ "email": "lena@example.com", "password": "wrong" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = h
        .server
        .post("/api/v1/users/login")
        .json(&json!({ "email": "lena@example.com", "password": "correcthorse" }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn correlation_id_echoes_on_responses() {
    let h = harness();
    let response = h
        .server
        .get("/health")
        .add_header(
            http::HeaderName::from_static("x-correlation-id"),
            http::HeaderValue::from_static("trace-me-123"),
        )
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.headers().get("x-correlation-id").unwrap(),
        "trace-me-123"
    );
}
