//! Handler tests for the payments domain

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::{Router, middleware};
use axum_helpers::{SessionAuth, SessionConfig, SessionSubject, session_middleware};
use domain_payments::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "test-secret-with-at-least-32-characters!";

struct TestApp {
    router: Router,
    auth: SessionAuth,
    repository: InMemoryPaymentRepository,
}

fn test_app() -> TestApp {
    let auth = SessionAuth::new(&SessionConfig::new(SECRET).unwrap());
    let repository = InMemoryPaymentRepository::new();

    let router = Router::new()
        .nest("/payment", handlers::router(PaymentService::new(repository.clone())))
        .layer(middleware::from_fn_with_state(
            auth.clone(),
            session_middleware,
        ));

    TestApp {
        router,
        auth,
        repository,
    }
}

impl TestApp {
    fn cookie(&self, user_id: Uuid, is_admin: bool) -> String {
        let (token, _) = self
            .auth
            .issue(SessionSubject {
                user_id,
                email: "someone@example.com",
                name: "Some One",
                is_admin,
            })
            .unwrap();
        format!("access_token={}", token)
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        cookie: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn bank_transfer(user_id: Uuid) -> Value {
    json!({
        "paymentOption": "bank transfer",
        "iban": "DE89370400440532013000",
        "paypalEmail": "ignored@example.com",
        "user": user_id
    })
}

#[tokio::test]
async fn test_create_and_list_own_payments() {
    let app = test_app();
    let user_id = Uuid::now_v7();
    let cookie = app.cookie(user_id, false);

    let response = app
        .send("POST", "/payment/create", &cookie, Some(bank_transfer(user_id)))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let payment: Value = json_body(response.into_body()).await;
    assert_eq!(payment["paymentOption"], "bank transfer");
    assert_eq!(payment["paypalEmail"], Value::Null);
    assert_eq!(payment["isForOrder"], false);

    let response = app
        .send("GET", &format!("/payment/{}", user_id), &cookie, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payments: Vec<Payment> = json_body(response.into_body()).await;
    assert_eq!(payments.len(), 1);
}

#[tokio::test]
async fn test_create_for_someone_else_is_forbidden() {
    let app = test_app();
    let cookie = app.cookie(Uuid::now_v7(), false);

    let response = app
        .send(
            "POST",
            "/payment/create",
            &cookie,
            Some(bank_transfer(Uuid::now_v7())),
        )
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "Not allowed to add payment for this user.");
}

#[tokio::test]
async fn test_create_requires_session() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/payment/create")
        .header("content-type", "application/json")
        .body(Body::from(bank_transfer(Uuid::now_v7()).to_string()))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_credit_card_requires_all_details() {
    let app = test_app();
    let user_id = Uuid::now_v7();

    let response = app
        .send(
            "POST",
            "/payment/create",
            &app.cookie(user_id, false),
            Some(json!({
                "paymentOption": "credit card",
                "creditCardNumber": "4111111111111111",
                "user": user_id
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(
        body["error"],
        "Credit card details (number, expiry date, and CVC) are required."
    );
}

#[tokio::test]
async fn test_update_and_delete_checks_owner() {
    let app = test_app();
    let owner = Uuid::now_v7();
    let owner_cookie = app.cookie(owner, false);
    let stranger = app.cookie(Uuid::now_v7(), false);

    let response = app
        .send("POST", "/payment/create", &owner_cookie, Some(bank_transfer(owner)))
        .await;
    let payment: Payment = json_body(response.into_body()).await;
    let uri = format!("/payment/{}", payment.id);
    let update = json!({ "paymentOption": "paypal", "paypalEmail": "anna@example.com" });

    let response = app.send("PATCH", &uri, &stranger, Some(update.clone())).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "Not allowed to update this payment.");

    let response = app.send("PATCH", &uri, &owner_cookie, Some(update)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Payment = json_body(response.into_body()).await;
    assert_eq!(updated.payment_option, PaymentOption::Paypal);
    assert_eq!(updated.iban, payment.iban);

    let response = app.send("DELETE", &uri, &stranger, None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send("DELETE", &uri, &owner_cookie, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send("DELETE", &uri, &owner_cookie, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "Payment not found.");
}

#[tokio::test]
async fn test_order_snapshots_are_hidden() {
    let app = test_app();
    let owner = Uuid::now_v7();
    let admin = app.cookie(Uuid::now_v7(), true);

    let details = PaymentDetails::for_option(
        PaymentOption::Paypal,
        models::PaymentFields {
            paypal_email: Some("anna@example.com".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    let snapshot = app
        .repository
        .insert_snapshot(details, owner, Uuid::now_v7())
        .await;

    let response = app
        .send("GET", &format!("/payment/{}", owner), &admin, None)
        .await;
    let payments: Vec<Payment> = json_body(response.into_body()).await;
    assert!(payments.is_empty());

    let response = app
        .send("DELETE", &format!("/payment/{}", snapshot.id), &admin, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
