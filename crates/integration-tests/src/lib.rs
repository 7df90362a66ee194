//! Integration tests for Tote.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tote-integration-tests
//! ```
//!
//! No external services are needed: [`FakeBackend`] serves the backend API
//! from an in-process `axum` router on an ephemeral port, and tests drive
//! `tote-client` and `CartStore` against it over real HTTP.
//!
//! # Test Categories
//!
//! - `cart_sync` - hydrate, push and re-fetch through the remote cart
//! - `checkout` - order placement and order history
//! - `catalog_auth` - catalog caching, login and request headers

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tote_client::{ApiClient, ApiConfig, REQUEST_ID_HEADER};
use url::Url;

/// Token the fake backend accepts.
pub const VALID_TOKEN: &str = "test-token-7f3a";

/// Password the fake backend accepts for every account.
pub const VALID_PASSWORD: &str = "correct horse battery staple";

/// A request as seen by the fake backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

/// A line in the fake backend's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRow {
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: u32,
}

/// Mutable state behind the fake backend.
#[derive(Debug)]
pub struct BackendState {
    /// Catalog as raw JSON (prices as text, the way the backend sends them).
    pub products: Vec<Value>,
    pub cart: Vec<CartRow>,
    pub next_cart_id: i32,
    pub orders: Vec<Value>,
    pub requests: Vec<RecordedRequest>,
    /// Answer cart writes with HTTP 500.
    pub fail_cart_writes: bool,
    pub registered_emails: Vec<String>,
    pub order_reply: OrderReply,
}

/// Body shape of a successful `POST /orders`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderReply {
    /// `{"orderId": N}`
    #[default]
    Flat,
    /// `{"order": {"id": N, ...}}`
    Nested,
    /// `{"message": "Order placed"}`
    MessageOnly,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            products: vec![
                json!({"id": 4, "name": "Classic White T-Shirt", "price": "499.00", "description": "Soft cotton tee", "image": "👕"}),
                json!({"id": 5, "name": "Denim Jacket", "price": "1299.50", "description": "Stonewashed", "image": "🧥"}),
                json!({"id": 6, "name": "Canvas Tote", "price": 250, "description": "", "image": "👜"}),
            ],
            cart: Vec::new(),
            next_cart_id: 100,
            orders: Vec::new(),
            requests: Vec::new(),
            fail_cart_writes: false,
            registered_emails: vec!["asha@example.com".to_string()],
            order_reply: OrderReply::default(),
        }
    }
}

impl BackendState {
    fn product(&self, id: i32) -> Option<&Value> {
        self.products
            .iter()
            .find(|p| p.get("id").and_then(Value::as_i64) == Some(i64::from(id)))
    }

    /// Number of recorded requests matching a method and path.
    #[must_use]
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

type Shared = Arc<Mutex<BackendState>>;

/// An in-process backend serving the storefront API under `/api`.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Start a backend with the default catalog and an empty cart.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        Self::start_with(BackendState::default()).await
    }

    /// Start a backend with the given initial state.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::expect_used)]
    pub async fn start_with(initial: BackendState) -> Self {
        let state: Shared = Arc::new(Mutex::new(initial));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL of the API.
    ///
    /// # Panics
    ///
    /// Panics if the bound address does not form a URL.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/api", self.addr)).expect("valid URL")
    }

    /// A client for this backend, optionally signed in with [`VALID_TOKEN`].
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn client(&self, signed_in: bool) -> ApiClient {
        let mut config = ApiConfig::new(self.base_url());
        if signed_in {
            config.token = Some(VALID_TOKEN.to_string().into());
        }
        ApiClient::new(&config).expect("Failed to build client")
    }

    /// Lock the backend state for inspection or setup.
    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        lock(&self.state)
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
        .route("/cart", get(get_cart))
        .route("/cart/add", post(add_to_cart))
        .route("/cart/update/{id}", put(update_cart_line))
        .route("/cart/remove/{id}", delete(remove_cart_line))
        .route("/orders", get(list_orders).post(create_order))
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let recorded = {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            authorization: header(AUTHORIZATION.as_str()),
            request_id: header(REQUEST_ID_HEADER),
        }
    };
    lock(&state).requests.push(recorded);
    next.run(request).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {VALID_TOKEN}"))
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_products(State(state): State<Shared>) -> Response {
    Json(Value::Array(lock(&state).products.clone())).into_response()
}

async fn get_product(State(state): State<Shared>, Path(id): Path<i32>) -> Response {
    lock(&state).product(id).cloned().map_or_else(
        || error(StatusCode::NOT_FOUND, "Product not found"),
        |p| Json(p).into_response(),
    )
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBody {
    product_id: i32,
    quantity: u32,
}

#[derive(Deserialize)]
struct QuantityBody {
    quantity: u32,
}

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let state = lock(&state);
    // Newest line first; clients sort by cartId themselves.
    let lines: Vec<Value> = state
        .cart
        .iter()
        .rev()
        .filter_map(|row| {
            let product = state.product(row.product_id)?;
            Some(json!({
                "cartId": row.cart_id,
                "productId": row.product_id,
                "name": product["name"],
                "image": product["image"],
                "price": product["price"].as_str().map_or_else(|| product["price"].to_string(), String::from),
                "quantity": row.quantity.to_string(),
            }))
        })
        .collect();
    Json(Value::Array(lines)).into_response()
}

async fn add_to_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddBody>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut guard = lock(&state);
    let state = &mut *guard;
    if state.fail_cart_writes {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "cart store unavailable");
    }
    if state.product(body.product_id).is_none() {
        return error(StatusCode::NOT_FOUND, "Product not found");
    }

    if let Some(row) = state.cart.iter_mut().find(|r| r.product_id == body.product_id) {
        row.quantity += body.quantity;
    } else {
        let cart_id = state.next_cart_id;
        state.next_cart_id += 1;
        state.cart.push(CartRow {
            cart_id,
            product_id: body.product_id,
            quantity: body.quantity,
        });
    }
    Json(json!({ "message": "Added to cart" })).into_response()
}

async fn update_cart_line(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(cart_id): Path<i32>,
    Json(body): Json<QuantityBody>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut state = lock(&state);
    if state.fail_cart_writes {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "cart store unavailable");
    }
    match state.cart.iter_mut().find(|r| r.cart_id == cart_id) {
        Some(row) => {
            row.quantity = body.quantity;
            Json(json!({ "message": "Updated" })).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Cart item not found"),
    }
}

async fn remove_cart_line(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(cart_id): Path<i32>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut state = lock(&state);
    if state.fail_cart_writes {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "cart store unavailable");
    }
    state.cart.retain(|r| r.cart_id != cart_id);
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// Orders
// =============================================================================

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Please log in to place an order");
    }
    let items = body["items"].as_array().cloned().unwrap_or_default();
    if items.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Cart is empty");
    }

    let mut guard = lock(&state);
    let state = &mut *guard;
    let order_id = i32::try_from(state.orders.len()).unwrap_or(i32::MAX) + 1;
    let order_items: Vec<Value> = items
        .iter()
        .map(|item| {
            let product = state
                .product(i32::try_from(item["productId"].as_i64().unwrap_or_default()).unwrap_or_default())
                .cloned()
                .unwrap_or_default();
            json!({
                "productId": item["productId"],
                "name": product["name"],
                "image": product["image"],
                "quantity": item["quantity"],
                "price": item["unitPrice"],
            })
        })
        .collect();
    state.orders.push(json!({
        "id": order_id,
        "total": body["total"],
        "createdAt": format!("2026-05-{:02}T10:00:00Z", order_id.clamp(1, 28)),
        "items": order_items,
        "shippingAddress": body["shippingAddress"],
        "summary": {
            "subtotal": body["subtotal"],
            "deliveryCharge": body["deliveryCharge"],
            "tax": body["tax"],
        },
    }));
    state.cart.clear();

    let reply = match state.order_reply {
        OrderReply::Flat => json!({ "orderId": order_id }),
        OrderReply::Nested => json!({ "order": { "id": order_id, "total": body["total"] } }),
        OrderReply::MessageOnly => json!({ "message": "Order placed" }),
    };
    (StatusCode::CREATED, Json(reply)).into_response()
}

async fn list_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    Json(json!({ "orders": lock(&state).orders })).into_response()
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct SignupBody {
    name: String,
    email: String,
    password: String,
}

fn session(id: usize, name: &str, email: &str) -> Response {
    Json(json!({
        "token": VALID_TOKEN,
        "user": { "id": id, "name": name, "email": email },
    }))
    .into_response()
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let state = lock(&state);
    match state.registered_emails.iter().position(|e| *e == body.email) {
        Some(index) if body.password == VALID_PASSWORD => session(index + 1, "Asha", &body.email),
        _ => error(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    }
}

async fn signup(State(state): State<Shared>, Json(body): Json<SignupBody>) -> Response {
    let mut state = lock(&state);
    if state.registered_emails.contains(&body.email) {
        return error(StatusCode::CONFLICT, "Email already registered");
    }
    if body.password.len() < 8 {
        return error(StatusCode::BAD_REQUEST, "Password too short");
    }
    state.registered_emails.push(body.email.clone());
    session(state.registered_emails.len(), &body.name, &body.email)
}
