//! Handler tests for the users domain
//!
//! The session and user routers run against the in-memory repository with
//! the session middleware in front, the way the API binary mounts them.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::{Router, middleware};
use axum_helpers::{SessionAuth, SessionConfig, SessionSubject, session_middleware};
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

const SECRET: &str = "test-secret-with-at-least-32-characters!";

struct TestApp {
    router: Router,
    auth: SessionAuth,
    service: UserService<InMemoryUserRepository>,
}

fn test_app() -> TestApp {
    let auth = SessionAuth::new(&SessionConfig::new(SECRET).unwrap());
    let service = UserService::new(InMemoryUserRepository::new());

    let router = Router::new()
        .merge(domain_users::auth_handlers::router(
            service.clone(),
            auth.clone(),
        ))
        .nest("/user", handlers::router(service.clone()))
        .layer(middleware::from_fn_with_state(
            auth.clone(),
            session_middleware,
        ));

    TestApp {
        router,
        auth,
        service,
    }
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `name=value` part of the response's `Set-Cookie` header
fn cookie_pair(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

fn cookie_for(auth: &SessionAuth, user_id: uuid::Uuid, is_admin: bool) -> String {
    let (token, _) = auth
        .issue(SessionSubject {
            user_id,
            email: "someone@example.com",
            name: "Some One",
            is_admin,
        })
        .unwrap();
    format!("access_token={}", token)
}

fn registration(email: &str) -> Value {
    json!({
        "emailAddress": email,
        "password": "green-tea-lover",
        "firstName": "Anna",
        "lastName": "Schmidt",
        "address": {
            "country": "Germany",
            "city": "Berlin",
            "postalCode": "10115",
            "street": "Chausseestraße",
            "houseNumber": "12"
        }
    })
}

#[tokio::test]
async fn test_register_returns_201_with_session_cookie() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/register", registration("Anna@Example.com")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = cookie_pair(&response);
    assert!(cookie.starts_with("access_token="));

    let user: UserResponse = json_body(response.into_body()).await;
    assert_eq!(user.email_address, "anna@example.com");
    assert!(!user.is_admin);
    assert!(user.address_id.is_some());

    let response = app
        .router
        .oneshot(get_with_cookie("/sessionUser", Some(&cookie)))
        .await
        .unwrap();
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["id"], json!(user.id));
}

#[tokio::test]
async fn test_register_without_address_returns_400() {
    let app = test_app();
    let mut body = registration("anna@example.com");
    body.as_object_mut().unwrap().remove("address");

    let response = app
        .router
        .oneshot(json_request("POST", "/register", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "Missing address object");
}

#[tokio::test]
async fn test_register_duplicate_email_returns_400() {
    let app = test_app();

    let first = app
        .router
        .clone()
        .oneshot(json_request("POST", "/register", registration("anna@example.com")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .router
        .oneshot(json_request("POST", "/register", registration("ANNA@example.com")))
        .await
        .unwrap();

    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(second.into_body()).await;
    assert_eq!(body["error"], "Email already in use");
}

#[tokio::test]
async fn test_login_errors() {
    let app = test_app();
    app.router
        .clone()
        .oneshot(json_request("POST", "/register", registration("anna@example.com")))
        .await
        .unwrap();

    let wrong_password = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            json!({ "emailAddress": "anna@example.com", "password": "coffee-lover" }),
        ))
        .await
        .unwrap();
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let body: Value = json_body(wrong_password.into_body()).await;
    assert_eq!(body["error"], "Incorrect password or username");

    let unknown = app
        .router
        .oneshot(json_request(
            "POST",
            "/login",
            json!({ "emailAddress": "nobody@example.com", "password": "green-tea-lover" }),
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(unknown.into_body()).await;
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_session_user_is_false_without_session() {
    let app = test_app();

    let response = app
        .router
        .oneshot(get_with_cookie("/sessionUser", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!(false));
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let app = test_app();

    let login = app
        .router
        .clone()
        .oneshot(json_request("POST", "/register", registration("anna@example.com")))
        .await
        .unwrap();
    let cookie = cookie_pair(&login);

    let logout = app
        .router
        .clone()
        .oneshot(get_with_cookie("/logout", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::OK);
    assert_eq!(cookie_pair(&logout), "access_token=");
    let body: Value = json_body(logout.into_body()).await;
    assert_eq!(body["message"], "Logged out");

    let after = app
        .router
        .oneshot(get_with_cookie("/sessionUser", Some(&cookie)))
        .await
        .unwrap();
    let body: Value = json_body(after.into_body()).await;
    assert_eq!(body, json!(false));
}

#[tokio::test]
async fn test_user_list_requires_admin() {
    let app = test_app();
    let customer = cookie_for(&app.auth, uuid::Uuid::now_v7(), false);
    let admin = cookie_for(&app.auth, uuid::Uuid::now_v7(), true);

    let anonymous = app
        .router
        .clone()
        .oneshot(get_with_cookie("/user", None))
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let as_customer = app
        .router
        .clone()
        .oneshot(get_with_cookie("/user", Some(&customer)))
        .await
        .unwrap();
    assert_eq!(as_customer.status(), StatusCode::UNAUTHORIZED);

    let as_admin = app
        .router
        .oneshot(get_with_cookie("/user?page=1&size=10", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(as_admin.status(), StatusCode::OK);
    let body: Value = json_body(as_admin.into_body()).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["currentPage"], 1);
}

#[tokio::test]
async fn test_get_user_owner_or_admin() {
    let app = test_app();
    let created = app
        .service
        .register(serde_json::from_value(registration("anna@example.com")).unwrap())
        .await
        .unwrap();

    let owner = cookie_for(&app.auth, created.id, false);
    let stranger = cookie_for(&app.auth, uuid::Uuid::now_v7(), false);
    let uri = format!("/user/{}", created.id);

    let as_owner = app
        .router
        .clone()
        .oneshot(get_with_cookie(&uri, Some(&owner)))
        .await
        .unwrap();
    assert_eq!(as_owner.status(), StatusCode::OK);
    let detail: UserDetail = json_body(as_owner.into_body()).await;
    assert_eq!(detail.address.unwrap().city, "Berlin");

    let as_stranger = app
        .router
        .oneshot(get_with_cookie(&uri, Some(&stranger)))
        .await
        .unwrap();
    assert_eq!(as_stranger.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_user_keeps_unspecified_fields() {
    let app = test_app();
    let created = app
        .service
        .register(serde_json::from_value(registration("anna@example.com")).unwrap())
        .await
        .unwrap();
    let owner = cookie_for(&app.auth, created.id, false);

    let mut request = json_request(
        "PATCH",
        &format!("/user/{}", created.id),
        json!({ "lastName": "Weber", "isAdmin": true }),
    );
    request
        .headers_mut()
        .insert(header::COOKIE, owner.parse().unwrap());

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let user: UserResponse = json_body(response.into_body()).await;
    assert_eq!(user.first_name, "Anna");
    assert_eq!(user.last_name, "Weber");
    assert!(!user.is_admin);
}

#[tokio::test]
async fn test_delete_user_as_admin() {
    let app = test_app();
    let created = app
        .service
        .register(serde_json::from_value(registration("anna@example.com")).unwrap())
        .await
        .unwrap();
    let admin = cookie_for(&app.auth, uuid::Uuid::now_v7(), true);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/user/{}", created.id))
        .header(header::COOKIE, &admin)
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .router
        .oneshot(get_with_cookie(&format!("/user/{}", created.id), Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(
        body["error"],
        format!("User with ID {} not found.", created.id)
    );
}
