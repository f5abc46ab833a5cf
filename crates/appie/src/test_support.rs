// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: a fake retailer API and assertion helpers.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Assert that an expression evaluates to `Err` whose Display output
/// contains the given substring.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = format!("{err:#}");
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}

/// One request seen by [`FakeApi`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub client_name: Option<String>,
}

/// In-process stand-in for the retailer API.
///
/// Token grants are deterministic: code `C` yields `access-C`/`refresh-C`,
/// refresh token `R` yields `refreshed-R`, and the anonymous grant yields
/// `anon-token`. Code `bad` and refresh token `revoked` are rejected.
#[derive(Debug, Default)]
pub struct FakeApi {
    requests: Mutex<Vec<RecordedRequest>>,
    exchanged_codes: Mutex<Vec<String>>,
    refreshed_tokens: Mutex<Vec<String>>,
    list_patches: Mutex<Vec<Value>>,
    order_puts: Mutex<Vec<Value>>,
    anonymous_grants: AtomicU32,
    fail_anonymous: AtomicBool,
    list_cleared: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        lock(&self.requests).iter().filter(|r| r.path == path).cloned().collect()
    }

    pub fn exchanged_codes(&self) -> Vec<String> {
        lock(&self.exchanged_codes).clone()
    }

    pub fn refreshed_tokens(&self) -> Vec<String> {
        lock(&self.refreshed_tokens).clone()
    }

    pub fn list_patches(&self) -> Vec<Value> {
        lock(&self.list_patches).clone()
    }

    pub fn order_puts(&self) -> Vec<Value> {
        lock(&self.order_puts).clone()
    }

    pub fn anonymous_grants(&self) -> u32 {
        self.anonymous_grants.load(Ordering::SeqCst)
    }

    pub fn list_cleared(&self) -> bool {
        self.list_cleared.load(Ordering::SeqCst)
    }

    /// Make the anonymous grant answer 503.
    pub fn fail_anonymous(&self, fail: bool) {
        self.fail_anonymous.store(fail, Ordering::SeqCst);
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned)
}

async fn record(State(api): State<Arc<FakeApi>>, req: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: req.method().to_string(),
        path: req.uri().path().to_owned(),
        query: req.uri().query().map(str::to_owned),
        authorization: header(req.headers(), "authorization"),
        client_name: header(req.headers(), "x-client-name"),
    };
    lock(&api.requests).push(recorded);
    next.run(req).await
}

async fn token(State(api): State<Arc<FakeApi>>, Json(body): Json<Value>) -> Response {
    let code = body["code"].as_str().unwrap_or_default().to_owned();
    if body["clientId"] != "appie" || code.is_empty() || code == "bad" {
        return (StatusCode::BAD_REQUEST, r#"{"error":"invalid_grant"}"#).into_response();
    }
    lock(&api.exchanged_codes).push(code.clone());
    Json(json!({
        "access_token": format!("access-{code}"),
        "refresh_token": format!("refresh-{code}"),
        "expires_in": 3600,
    }))
    .into_response()
}

async fn refresh(State(api): State<Arc<FakeApi>>, Json(body): Json<Value>) -> Response {
    let rt = body["refreshToken"].as_str().unwrap_or_default().to_owned();
    if rt.is_empty() || rt == "revoked" {
        return (StatusCode::UNAUTHORIZED, r#"{"error":"invalid_grant"}"#).into_response();
    }
    lock(&api.refreshed_tokens).push(rt.clone());
    // Tokens prefixed with "rotate" get a new refresh token; others keep theirs.
    let mut resp = json!({ "access_token": format!("refreshed-{rt}"), "expires_in": 3600 });
    if rt.starts_with("rotate") {
        resp["refresh_token"] = json!(format!("{rt}-next"));
    }
    Json(resp).into_response()
}

async fn anonymous(State(api): State<Arc<FakeApi>>) -> Response {
    api.anonymous_grants.fetch_add(1, Ordering::SeqCst);
    if api.fail_anonymous.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "unavailable").into_response();
    }
    Json(json!({ "access_token": "anon-token", "expires_in": 3600 })).into_response()
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let title = params.get("query").cloned().unwrap_or_else(|| "Bonus".to_owned());
    Json(json!({
        "products": [{ "webshopId": 1, "title": title, "isBonus": params.contains_key("bonus") }],
        "page": { "size": params.get("size"), "totalElements": 1 },
    }))
}

async fn product(Path(id): Path<u64>) -> Response {
    if id == 0 {
        return (StatusCode::NOT_FOUND, "product not found").into_response();
    }
    Json(json!({ "productId": id, "productCard": { "title": "Halfvolle melk" } })).into_response()
}

async fn receipt(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "transactionId": id, "total": { "amount": 12.5 } }))
}

async fn list_items(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "id": id, "items": [{ "description": "brood", "quantity": 1 }] }))
}

async fn patch_list(State(api): State<Arc<FakeApi>>, Json(body): Json<Value>) -> StatusCode {
    lock(&api.list_patches).push(body);
    StatusCode::OK
}

async fn clear_list(State(api): State<Arc<FakeApi>>) -> StatusCode {
    api.list_cleared.store(true, Ordering::SeqCst);
    StatusCode::NO_CONTENT
}

async fn put_order(State(api): State<Arc<FakeApi>>, Json(body): Json<Value>) -> Json<Value> {
    lock(&api.order_puts).push(body);
    Json(json!({ "id": 42 }))
}

async fn graphql(Json(body): Json<Value>) -> Json<Value> {
    let query = body["query"].as_str().unwrap_or_default();
    let resp = if query.contains("member") {
        json!({ "data": { "member": {
            "id": 7, "emailAddress": "jan@example.com", "name": { "first": "Jan", "last": "Jansen" }
        } } })
    } else if query.contains("productSearch") {
        json!({ "data": { "productSearch": {
            "products": [{ "id": 1, "title": "Halfvolle melk", "brand": "AH", "category": "Zuivel" }],
            "page": { "totalElements": 1, "totalPages": 1 }
        } } })
    } else if query.contains("recipeSearch") {
        json!({ "data": { "recipeSearch": {
            "result": [{ "id": 5, "title": "Pasta pesto", "slug": "pasta-pesto", "cookTime": 20, "images": [] }],
            "page": { "totalElements": 1, "totalPages": 1 }
        } } })
    } else if query.contains("recipe(id: 0)") {
        json!({ "data": null, "errors": [{ "message": "Recipe not found" }] })
    } else if query.contains("recipe(") {
        json!({ "data": { "recipe": {
            "id": 5, "title": "Pasta pesto", "servings": 4, "tags": ["vegetarisch"],
            "ingredients": [{ "text": "200 g pasta", "quantity": 200.0 }],
            "steps": [{ "text": "Kook de pasta.", "index": 1 }]
        } } })
    } else {
        json!({ "errors": [{ "message": "unknown query" }] })
    };
    Json(resp)
}

/// Build the fake API router.
pub fn fake_api_router(api: Arc<FakeApi>) -> Router {
    Router::new()
        .route("/mobile-auth/v1/auth/token", post(token))
        .route("/mobile-auth/v1/auth/token/refresh", post(refresh))
        .route("/mobile-auth/v1/auth/token/anonymous", post(anonymous))
        .route("/mobile-services/product/search/v2", get(search))
        .route("/mobile-services/product/detail/v4/fir/{id}", get(product))
        .route(
            "/mobile-services/bonuspage/v2/section/spotlight",
            get(|| async { Json(json!({ "sections": [] })) }),
        )
        .route(
            "/mobile-services/v1/receipts",
            get(|| async { Json(json!([{ "transactionId": "t-1" }])) }),
        )
        .route("/mobile-services/v2/receipts/{id}", get(receipt))
        .route(
            "/mobile-services/shoppinglist/v2/items",
            get(|| async { Json(json!({ "items": [] })) }).patch(patch_list).delete(clear_list),
        )
        .route(
            "/mobile-services/lists/v3/lists",
            get(|| async { Json(json!([{ "id": "l-1", "description": "Boodschappen" }])) }),
        )
        .route("/mobile-services/lists/v3/lists/{id}/items", get(list_items))
        .route(
            "/mobile-services/order/v1/summaries/active",
            get(|| async { Json(json!({ "id": 42, "state": "OPEN" })) }),
        )
        .route("/mobile-services/order/v1/items", put(put_order))
        .route("/graphql", post(graphql))
        .layer(middleware::from_fn_with_state(Arc::clone(&api), record))
        .with_state(api)
}

/// Spawn the fake API on a random port.
///
/// Returns the bound address and a join handle for the server task.
pub async fn spawn_fake_api(
    api: Arc<FakeApi>,
) -> anyhow::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let router = fake_api_router(api);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok((addr, handle))
}
