//! Handler tests for the orders domain

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::{Router, middleware};
use axum_helpers::{SessionAuth, SessionConfig, SessionSubject, session_middleware};
use chrono::Utc;
use domain_catalog::Product;
use domain_orders::*;
use domain_payments::{Payment, PaymentOption};
use domain_users::{Address, User};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "test-secret-with-at-least-32-characters!";

struct TestApp {
    router: Router,
    auth: SessionAuth,
    repository: InMemoryOrderRepository,
}

fn test_app() -> TestApp {
    let auth = SessionAuth::new(&SessionConfig::new(SECRET).unwrap());
    let repository = InMemoryOrderRepository::new();

    let router = Router::new()
        .nest("/order", handlers::router(OrderService::new(repository.clone())))
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
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// A customer with an address on file, a stored PayPal method and one
    /// product priced 8.50
    async fn seed(&self, first_name: &str) -> (Uuid, Uuid, Uuid) {
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email_address: format!("{}@example.com", first_name.to_lowercase()),
            password_hash: "hash".to_string(),
            first_name: first_name.to_string(),
            last_name: "Schmidt".to_string(),
            is_admin: false,
            address_id: None,
            created_at: now,
            updated_at: now,
        };
        let address = Address {
            id: Uuid::now_v7(),
            country: "Germany".to_string(),
            state: String::new(),
            city: "Berlin".to_string(),
            postal_code: "10115".to_string(),
            street: "Chausseestraße".to_string(),
            house_number: "12".to_string(),
            address_addition: String::new(),
        };
        let payment = Payment {
            id: Uuid::now_v7(),
            payment_option: PaymentOption::Paypal,
            iban: None,
            credit_card_number: None,
            expiry_date: None,
            cvc: None,
            paypal_email: Some("anna@example.com".to_string()),
            is_for_order: false,
            user_id: user.id,
            order_id: None,
            created_at: now,
            updated_at: now,
        };
        let product = Product {
            id: Uuid::now_v7(),
            name: "Sencha".to_string(),
            description: String::new(),
            price: 8.5,
            image: None,
            quantity: 10,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };

        let ids = (user.id, payment.id, product.id);
        self.repository.add_customer(user, Some(address)).await;
        self.repository.add_payment(payment).await;
        self.repository.add_product(product).await;
        ids
    }

    async fn place(&self, user_id: Uuid, payment_id: Uuid, product_id: Uuid) -> Uuid {
        let response = self
            .send(
                "POST",
                "/order",
                Some(&self.cookie(user_id, false)),
                Some(cart(payment_id, product_id, 2, 17.0)),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = json_body(response.into_body()).await;
        body["id"].as_str().unwrap().parse().unwrap()
    }
}

fn cart(payment_id: Uuid, product_id: Uuid, quantity: i32, total: f64) -> Value {
    json!({
        "totalAmount": total,
        "payment": payment_id,
        "orderProducts": [{ "product": product_id, "quantity": quantity }]
    })
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_place_order_and_read_it_back() {
    let app = test_app();
    let (user_id, payment_id, product_id) = app.seed("Anna").await;
    let order_id = app.place(user_id, payment_id, product_id).await;

    let response = app
        .send(
            "GET",
            &format!("/order/{}", order_id),
            Some(&app.cookie(user_id, false)),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["orderStatus"], "open");
    assert_eq!(body["totalAmount"], 17.0);
    assert_eq!(body["user"]["emailAddress"], "anna@example.com");
    assert_eq!(body["shipping"]["carrier"], "Default Carrier");
    assert_eq!(body["shipping"]["deliveryStatus"], "not shipped");
    assert_eq!(body["shipping"]["address"]["city"], "Berlin");
    assert_eq!(body["payment"]["paymentOption"], "paypal");
    assert_eq!(body["orderProducts"][0]["quantity"], 2);
    assert_eq!(body["orderProducts"][0]["product"]["name"], "Sencha");
}

#[tokio::test]
async fn test_place_order_requires_session() {
    let app = test_app();
    let response = app
        .send(
            "POST",
            "/order",
            None,
            Some(cart(Uuid::now_v7(), Uuid::now_v7(), 1, 8.5)),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_place_order_rejects_wrong_total() {
    let app = test_app();
    let (user_id, payment_id, product_id) = app.seed("Anna").await;

    let response = app
        .send(
            "POST",
            "/order",
            Some(&app.cookie(user_id, false)),
            Some(cart(payment_id, product_id, 2, 16.0)),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(
        body["error"],
        "The total amount does not match the sum of the products and quantities."
    );
}

#[tokio::test]
async fn test_other_customers_cannot_read_or_cancel() {
    let app = test_app();
    let (anna, payment_id, product_id) = app.seed("Anna").await;
    let (ben, _, _) = app.seed("Ben").await;
    let order_id = app.place(anna, payment_id, product_id).await;
    let ben_cookie = app.cookie(ben, false);

    let response = app
        .send("GET", &format!("/order/{}", order_id), Some(&ben_cookie), None)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(
            "PATCH",
            &format!("/order/{}/cancel", order_id),
            Some(&ben_cookie),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "You can only cancel your own orders.");

    let response = app
        .send(
            "GET",
            &format!("/order/{}", order_id),
            Some(&app.cookie(Uuid::now_v7(), true)),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cancel_only_once() {
    let app = test_app();
    let (user_id, payment_id, product_id) = app.seed("Anna").await;
    let order_id = app.place(user_id, payment_id, product_id).await;
    let cookie = app.cookie(user_id, false);
    let uri = format!("/order/{}/cancel", order_id);

    let response = app.send("PATCH", &uri, Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["orderStatus"], "canceled");

    let response = app.send("PATCH", &uri, Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_own_orders_and_admin_views() {
    let app = test_app();
    let (anna, payment_id, product_id) = app.seed("Anna").await;
    app.place(anna, payment_id, product_id).await;
    app.place(anna, payment_id, product_id).await;

    let response = app
        .send("GET", "/order/detail", Some(&app.cookie(anna, false)), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let own: Vec<Value> = json_body(response.into_body()).await;
    assert_eq!(own.len(), 2);
    assert!(own[0].get("user").is_none());

    let response = app
        .send("GET", "/order", Some(&app.cookie(anna, false)), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let admin = app.cookie(Uuid::now_v7(), true);
    let response = app
        .send("GET", "/order?userName=anna&size=1", Some(&admin), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);
    assert_eq!(body["orders"][0]["user"]["firstName"], "Anna");

    let response = app.send("GET", "/order/count", Some(&admin), None).await;
    let counts: Value = json_body(response.into_body()).await;
    assert_eq!(counts, json!({ "total": 2, "finished": 0, "active": 2 }));
}

#[tokio::test]
async fn test_admin_edits() {
    let app = test_app();
    let (anna, payment_id, product_id) = app.seed("Anna").await;
    let order_id = app.place(anna, payment_id, product_id).await;
    let admin = app.cookie(Uuid::now_v7(), true);

    let response = app
        .send(
            "PATCH",
            &format!("/order/{}/status", order_id),
            Some(&admin),
            Some(json!({})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "OrderStatus is required.");

    let response = app
        .send(
            "PATCH",
            &format!("/order/{}/status", order_id),
            Some(&admin),
            Some(json!({ "orderStatus": "processing" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(
            "PATCH",
            &format!("/order/{}/shipping", order_id),
            Some(&admin),
            Some(json!({ "carrier": "DHL", "deliveryStatus": "shipped" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["carrier"], "DHL");
    assert_eq!(body["deliveryStatus"], "shipped");

    let response = app
        .send(
            "PATCH",
            &format!("/order/{}/address", order_id),
            Some(&admin),
            Some(json!({ "street": "Unter den Linden" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["street"], "Unter den Linden");
    assert_eq!(body["city"], "Berlin");

    let response = app
        .send(
            "PATCH",
            &format!("/order/{}/payment", order_id),
            Some(&admin),
            Some(json!({ "paymentOption": "cash" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "Invalid payment option provided.");

    let response = app
        .send(
            "PATCH",
            &format!("/order/{}/payment", order_id),
            Some(&admin),
            Some(json!({
                "paymentOption": "bank transfer",
                "iban": "DE89370400440532013000",
                "paypalEmail": "anna@example.com"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["paymentOption"], "bank transfer");
    assert!(body["paypalEmail"].is_null());

    let response = app
        .send(
            "PATCH",
            &format!("/order/{}/shipping", Uuid::now_v7()),
            Some(&admin),
            Some(json!({ "carrier": "DHL" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "Order or shipping not found.");
}
