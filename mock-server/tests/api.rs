use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Mock, PASSWORD, USERNAME};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn token_body(username: &str, password: &str) -> String {
    json!({
        "grant_type": "password",
        "client_id": "ngAuthApp",
        "username": username,
        "password": password,
    })
    .to_string()
}

async fn fetch_token(router: axum::Router) -> String {
    let resp = router
        .oneshot(json_request("POST", "/api/token", &token_body(USERNAME, PASSWORD)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    body["access_token"].as_str().unwrap().to_string()
}

fn authed_get(uri: &str, token: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(String::new())
        .unwrap()
}

// --- token ---

#[tokio::test]
async fn token_issued_for_valid_credentials() {
    let db = Mock::new(3600);
    let resp = app_with(db.clone())
        .oneshot(json_request("POST", "/api/token", &token_body(USERNAME, PASSWORD)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 3600);
    assert_eq!(body["access_token"].as_str().unwrap().split('.').count(), 3);
    assert_eq!(db.token_requests(), 1);
}

#[tokio::test]
async fn token_rejected_for_wrong_password() {
    let resp = app()
        .oneshot(json_request("POST", "/api/token", &token_body(USERNAME, "nope")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "invalid_grant");
    assert!(body.get("access_token").is_none());
}

#[tokio::test]
async fn token_rejected_for_unknown_client() {
    let body = json!({
        "grant_type": "password",
        "client_id": "someone-else",
        "username": USERNAME,
        "password": PASSWORD,
    })
    .to_string();
    let resp = app().oneshot(json_request("POST", "/api/token", &body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "invalid_client");
}

#[tokio::test]
async fn token_malformed_json_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/api/token", "not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- InsuredList ---

#[tokio::test]
async fn insured_list_requires_bearer() {
    let resp = app()
        .oneshot(Request::builder().uri("/api/InsuredList()").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["message"], "Authorization has been denied for this request.");
}

#[tokio::test]
async fn insured_list_rejects_forged_token() {
    let resp = app()
        .oneshot(authed_get("/api/InsuredList()", "a.b.c"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn insured_list_returns_all() {
    let db = Mock::new(3600);
    let token = fetch_token(app_with(db.clone())).await;
    let resp = app_with(db).oneshot(authed_get("/api/InsuredList()", &token)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let rows: Vec<Value> = body_json(resp).await;
    assert_eq!(rows.len(), 3);
}

#[tokio::test]
async fn insured_list_by_id_with_select_and_filter() {
    let db = Mock::new(3600);
    let token = fetch_token(app_with(db.clone())).await;
    let resp = app_with(db.clone())
        .oneshot(authed_get(
            "/api/InsuredList(123)?$select=id,state$filter=state%20eq%20CA,",
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let rows: Vec<Value> = body_json(resp).await;
    assert_eq!(rows, vec![json!({"id": "123", "state": "CA"})]);
    assert_eq!(db.queries().await, vec!["$select=id,state$filter=state%20eq%20CA,"]);
}

#[tokio::test]
async fn insured_list_orders_results() {
    let db = Mock::new(3600);
    let token = fetch_token(app_with(db.clone())).await;
    let resp = app_with(db)
        .oneshot(authed_get("/api/InsuredList()?$select=city$orderby=city", &token))
        .await
        .unwrap();

    let rows: Vec<Value> = body_json(resp).await;
    let cities: Vec<&str> = rows.iter().map(|r| r["city"].as_str().unwrap()).collect();
    assert_eq!(cities, vec!["Austin", "Fresno", "Oakland"]);
}

#[tokio::test]
async fn unknown_resource_returns_404() {
    let db = Mock::new(3600);
    let token = fetch_token(app_with(db.clone())).await;
    let resp = app_with(db).oneshot(authed_get("/api/PolicyList()", &token)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- Insert ---

#[tokio::test]
async fn insert_assigns_id_and_lists_it() {
    let db = Mock::new(3600);
    let token = fetch_token(app_with(db.clone())).await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/Insured/Insert")
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(json!({"firstName": "Cy", "state": "NV"}).to_string())
        .unwrap();
    let resp = app_with(db.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();

    let resp = app_with(db)
        .oneshot(authed_get(&format!("/api/InsuredList({id})"), &token))
        .await
        .unwrap();
    let rows: Vec<Value> = body_json(resp).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["firstName"], "Cy");
}

#[tokio::test]
async fn insert_without_token_is_denied() {
    let resp = app()
        .oneshot(json_request("POST", "/api/Insured/Insert", r#"{"firstName":"Cy"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- unknown route ---

#[tokio::test]
async fn unknown_route_returns_404() {
    let resp = app()
        .oneshot(Request::builder().uri("/nonexistent").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let bytes = body_bytes(resp).await;
    assert!(bytes.is_empty());
}
