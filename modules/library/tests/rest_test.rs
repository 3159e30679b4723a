mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tracing_test::traced_test;

use api_ingress::{ApiIngress, ApiIngressConfig};
use common::{create_book, in_days, setup, TestEnv, PASSWORD};

fn app(env: &TestEnv) -> Router {
    let api = env.library.router().expect("library router");
    ApiIngress::new(ApiIngressConfig::default())
        .build_router(api)
        .expect("ingress router")
}

async fn token_for(env: &TestEnv, email: &str) -> String {
    let (_, pair) = env.service.login(email, PASSWORD).await.unwrap();
    pair.access_token
}

async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

#[tokio::test]
async fn health_is_public() -> Result<()> {
    let env = setup().await;
    let router = app(&env);

    let (status, _) = call(&router, Method::GET, "/health", None, None).await?;

    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let env = setup().await;
    let router = app(&env);

    let (status, body) = call(&router, Method::GET, "/api/profile/me", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "Unauthorized");

    let (status, body) = call(
        &router,
        Method::GET,
        "/api/profile/me",
        Some("not-a-jwt"),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "Unauthorized");
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn login_then_read_profile() -> Result<()> {
    // Arrange
    let env = setup().await;
    let router = app(&env);

    // Act
    let (status, body) = call(
        &router,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "lib@example.com", "password": PASSWORD })),
    )
    .await?;

    // Assert
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["access_token"].as_str().unwrap().to_string();
    assert!(body["data"]["refresh_token"].is_string());

    let (status, body) = call(&router, Method::GET, "/api/profile/me", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "lib@example.com");
    assert_eq!(body["data"]["role"]["name"], "Librarian");
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("refreshToken").is_none());
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let env = setup().await;
    let router = app(&env);

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "lib@example.com", "password": "nope-nope" })),
    )
    .await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "InvalidCredentials");
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() -> Result<()> {
    let env = setup().await;
    let router = app(&env);
    let token = token_for(&env, "lib@example.com").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/author")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))?;
    let response = router.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["error_code"], "BadRequest");
    Ok(())
}

#[tokio::test]
#[traced_test]
async fn catalog_and_lending_over_http() -> Result<()> {
    // Arrange
    let env = setup().await;
    let router = app(&env);
    let staff = token_for(&env, "lib@example.com").await;

    // Act: build a one-copy book
    let (status, author) = call(
        &router,
        Method::POST,
        "/api/author",
        Some(&staff),
        Some(json!({ "name": "Italo Calvino" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, category) = call(
        &router,
        Method::POST,
        "/api/categories",
        Some(&staff),
        Some(json!({ "name": "Novels" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(category["data"]["status"], "ACTIVE");

    let (status, book) = call(
        &router,
        Method::POST,
        "/api/books",
        Some(&staff),
        Some(json!({
            "title": "Invisible Cities",
            "authorId": author["data"]["id"],
            "categoryId": category["data"]["id"],
            "quantity": 1,
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["data"]["issuedBook"], 0);
    assert_eq!(book["data"]["author"]["name"], "Italo Calvino");
    let book_id = book["data"]["id"].as_str().unwrap().to_string();

    // Act: lend it, then try again
    let assign_uri = format!("/api/books/{book_id}/assign-book");
    let loan = json!({
        "userId": env.member.id,
        "returnDate": in_days(10).to_string(),
    });
    let (status, record) = call(
        &router,
        Method::POST,
        &assign_uri,
        Some(&staff),
        Some(loan.clone()),
    )
    .await?;
    let (again_status, again) =
        call(&router, Method::POST, &assign_uri, Some(&staff), Some(loan)).await?;

    // Assert
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["message"], "Book assigned");
    assert_eq!(record["data"]["status"], "ISSUED");
    assert_eq!(record["data"]["issuedBy"], env.member.id.to_string());
    assert_eq!(record["data"]["assignedBy"], env.librarian.id.to_string());

    assert_eq!(again_status, StatusCode::CONFLICT);
    assert_eq!(again["error_code"], "BookIsOutOfStock");
    assert_eq!(again["data"]["bookId"], book_id);

    let book_uri = format!("/api/books/{book_id}");
    let (status, book) = call(&router, Method::GET, &book_uri, Some(&staff), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["data"]["issuedBook"], 1);
    assert_eq!(book["data"]["available"], 0);

    // Returning frees the unit.
    let record_id = record["data"]["id"].as_str().unwrap();
    let (status, closed) = call(
        &router,
        Method::POST,
        &format!("/api/borrow-records/{record_id}/return"),
        Some(&staff),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["data"]["status"], "RETURNED");
    Ok(())
}

#[tokio::test]
async fn member_gets_not_able_assign_book() -> Result<()> {
    let env = setup().await;
    let router = app(&env);
    let book_id = create_book(&env, "Siddhartha", 1).await;
    let member = token_for(&env, "member@example.com").await;

    let (status, body) = call(
        &router,
        Method::POST,
        &format!("/api/books/{book_id}/assign-book"),
        Some(&member),
        Some(json!({ "userId": env.member.id, "returnDate": in_days(5).to_string() })),
    )
    .await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "NotAbleAssignBook");
    Ok(())
}

#[tokio::test]
async fn search_returns_count_and_rows() -> Result<()> {
    let env = setup().await;
    let router = app(&env);
    let member = token_for(&env, "member@example.com").await;
    for title in ["Gamma", "Alpha", "Beta"] {
        create_book(&env, title, 2).await;
    }

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/books/search",
        Some(&member),
        Some(json!({ "order": [["title", "ASC"]], "offset": 0, "limit": 2 })),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 3);
    let titles: Vec<_> = body["data"]["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["Alpha", "Beta"]);

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/books/search",
        Some(&member),
        Some(json!({ "order": [["secret", "ASC"]] })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "InvalidSortField");
    Ok(())
}

#[tokio::test]
async fn missing_book_is_not_found() -> Result<()> {
    let env = setup().await;
    let router = app(&env);
    let token = token_for(&env, "member@example.com").await;
    let id = uuid::Uuid::new_v4();

    let uri = format!("/api/books/{id}");
    let (status, body) = call(&router, Method::GET, &uri, Some(&token), None).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "BookNotFound");
    Ok(())
}

#[tokio::test]
async fn unparsable_id_is_a_bad_request_envelope() -> Result<()> {
    let env = setup().await;
    let router = app(&env);
    let token = token_for(&env, "member@example.com").await;

    let (status, body) =
        call(&router, Method::GET, "/api/books/not-a-uuid", Some(&token), None).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "BadRequest");
    Ok(())
}

#[tokio::test]
async fn responses_carry_a_request_id() -> Result<()> {
    let env = setup().await;
    let router = app(&env);

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert!(response.headers().contains_key("x-request-id"));
    Ok(())
}
