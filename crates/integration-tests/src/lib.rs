//! Integration tests for the POS Core client.
//!
//! The client is exercised against [`FakeApi`], an in-process stand-in for
//! the POS API that records every request it receives.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p poscore-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_client` - services and the API client, driven directly
//! - `client_flow` - the web client, driven over HTTP with a cookie jar

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header::AUTHORIZATION};
use axum::Json;
use axum::response::{IntoResponse, Response};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use poscore_client::config::ApiConfig;
use poscore_client::{AppState, ClientConfig};

/// Password accepted for every known user.
pub const PASSWORD: &str = "secreto";

/// Signing secret for test clients (64+ chars, mixed alphabet).
const TEST_SESSION_SECRET: &str =
    "q7Lm2Vx9Rk4Tz8Np1Wc6Hb3Jy5Fd0Gs-Ua7Ke2Mi9Oh4Pr6Qt1Zv8Xw3Yn5Bl0Cj_Dq";

/// A request as seen by the fake API.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path below the API base, e.g. `/products/p1`.
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// Whether this is `method path`.
    #[must_use]
    pub fn is(&self, method: &str, path: &str) -> bool {
        self.method == method && self.path == path
    }
}

#[derive(Debug, Default)]
struct FakeState {
    requests: Vec<RecordedRequest>,
    products: Vec<Value>,
    sales: Vec<Value>,
    reject_tokens: bool,
    next_id: u32,
}

type SharedState = Arc<Mutex<FakeState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, FakeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process POS API.
///
/// Users `ana` (cashier) and `admin` log in with [`PASSWORD`]. Every other
/// endpoint requires the bearer token issued at login.
pub struct FakeApi {
    addr: SocketAddr,
    state: SharedState,
}

impl FakeApi {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = SharedState::default();
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake API listener");
        let addr = listener.local_addr().expect("fake API address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// Requests matching `method path`.
    #[must_use]
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.is(method, path))
            .collect()
    }

    /// From now on every token is rejected with `401`.
    pub fn expire_tokens(&self) {
        lock(&self.state).reject_tokens = true;
    }

    /// Replace the product catalogue.
    pub fn set_products(&self, products: Vec<Value>) {
        lock(&self.state).products = products;
    }

    /// Replace today's sales.
    pub fn set_sales(&self, sales: Vec<Value>) {
        lock(&self.state).sales = sales;
    }

    #[must_use]
    pub fn products(&self) -> Vec<Value> {
        lock(&self.state).products.clone()
    }
}

/// A product record in the API's wire format.
#[must_use]
pub fn product_json(id: &str, name: &str, price: f64, stock: u32) -> Value {
    json!({
        "id": id,
        "nombre": name,
        "descripcion": "",
        "precio": price,
        "stock": stock,
        "stock_minimo": 2,
        "categoria": "Abarrotes",
        "proveedor": "",
        "sku": format!("SKU-{id}"),
        "activo": true,
    })
}

fn user_json(username: &str) -> Option<Value> {
    match username {
        "ana" => Some(json!({
            "id": "u1",
            "nombre": "Ana",
            "usuario": "ana",
            "rol": "cajero",
            "email": "ana@tienda.com",
            "activo": true,
        })),
        "admin" => Some(json!({
            "id": "u2",
            "nombre": "Admin",
            "usuario": "admin",
            "rol": "admin",
            "email": "admin@tienda.com",
            "activo": true,
        })),
        _ => None,
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn handle(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix("/api")
        .unwrap_or_else(|| uri.path())
        .to_string();
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let body: Option<Value> = serde_json::from_slice(&body).ok();

    let mut state = lock(&state);
    state.requests.push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    if method == Method::POST && path == "/auth/login" {
        return login(body.as_ref());
    }

    let bearer_ok = authorization
        .as_deref()
        .is_some_and(|v| v.starts_with("Bearer tok-"));
    if !bearer_ok || state.reject_tokens {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Token invalido" })),
        )
            .into_response();
    }

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("POST", ["auth", "logout"]) => Json(json!({ "ok": true })).into_response(),
        ("GET", ["auth", "verify"]) => Json(json!({ "valid": true })).into_response(),

        ("GET", ["products"]) => Json(Value::Array(state.products.clone())).into_response(),
        ("POST", ["products"]) => {
            let Some(mut product) = body else {
                return error(StatusCode::BAD_REQUEST, "Cuerpo invalido");
            };
            state.next_id += 1;
            product["id"] = json!(format!("p{}", state.next_id));
            state.products.push(product.clone());
            (StatusCode::CREATED, Json(product)).into_response()
        }
        ("GET", ["products", id]) => match find_product(&state.products, id) {
            Some(index) => Json(state.products[index].clone()).into_response(),
            None => error(StatusCode::NOT_FOUND, "Producto no encontrado"),
        },
        ("PUT", ["products", id]) => {
            let (Some(index), Some(mut product)) = (find_product(&state.products, id), body) else {
                return error(StatusCode::NOT_FOUND, "Producto no encontrado");
            };
            product["id"] = json!(id);
            state.products[index] = product.clone();
            Json(product).into_response()
        }
        ("DELETE", ["products", id]) => match find_product(&state.products, id) {
            Some(index) => {
                state.products.remove(index);
                Json(json!({ "ok": true })).into_response()
            }
            None => error(StatusCode::NOT_FOUND, "Producto no encontrado"),
        },
        ("PATCH", ["inventory", "product", id, "stock"]) => {
            let stock = body.as_ref().and_then(|b| b.get("stock")).cloned();
            match (find_product(&state.products, id), stock) {
                (Some(index), Some(stock)) => {
                    state.products[index]["stock"] = stock;
                    Json(json!({ "ok": true })).into_response()
                }
                _ => error(StatusCode::NOT_FOUND, "Producto no encontrado"),
            }
        }

        ("GET", ["sales"] | ["sales", "today"]) => {
            Json(Value::Array(state.sales.clone())).into_response()
        }
        ("POST", ["sales"]) => {
            let Some(Value::Object(mut sale)) = body else {
                return error(StatusCode::BAD_REQUEST, "Cuerpo invalido");
            };
            state.next_id += 1;
            let lines = match sale.remove("productos") {
                Some(Value::Array(lines)) => lines,
                _ => Vec::new(),
            };
            let detalles: Vec<Value> = lines.iter().map(detail_line).collect();
            sale.insert("id".to_string(), json!(format!("s{}", state.next_id)));
            sale.insert("fecha".to_string(), json!("2025-03-01T10:30:00"));
            sale.insert("estado".to_string(), json!("completada"));
            sale.insert("detalles".to_string(), Value::Array(detalles));
            let sale = Value::Object(sale);
            state.sales.push(sale.clone());
            (StatusCode::CREATED, Json(sale)).into_response()
        }

        _ => error(StatusCode::NOT_FOUND, "Ruta no encontrada"),
    }
}

fn login(body: Option<&Value>) -> Response {
    let field = |name: &str| {
        body.and_then(|b| b.get(name))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let username = field("username");

    match user_json(&username) {
        Some(user) if field("password") == PASSWORD => Json(json!({
            "token": format!("tok-{username}"),
            "user": user,
        }))
        .into_response(),
        _ => error(StatusCode::BAD_REQUEST, "Credenciales invalidas"),
    }
}

/// A submitted line as the API stores it: no name and no subtotal.
fn detail_line(line: &Value) -> Value {
    let product_id = line.get("producto_id").and_then(Value::as_str).unwrap_or_default();
    json!({
        "producto_id": product_id,
        "cantidad": line.get("cantidad").cloned().unwrap_or(Value::Null),
        "precio_unitario": line.get("precio_unitario").cloned().unwrap_or(Value::Null),
        "sku": format!("SKU-{product_id}"),
    })
}

fn find_product(products: &[Value], id: &str) -> Option<usize> {
    products
        .iter()
        .position(|p| p.get("id").and_then(Value::as_str) == Some(id))
}

/// Start the web client against `api_base_url` and return its base URL.
///
/// # Panics
///
/// Panics if the router cannot be built or the listener cannot be bound.
pub async fn spawn_client(api_base_url: &str) -> String {
    let config = ClientConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        api: ApiConfig {
            base_url: api_base_url.to_string(),
        },
        session_secret: SecretString::from(TEST_SESSION_SECRET.to_string()),
        sentry_dsn: None,
        sentry_environment: None,
    };
    let app = poscore_client::router(AppState::new(config)).expect("build client router");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind client listener");
    let addr = listener.local_addr().expect("client address");
    tokio::spawn(async move {
        let _ = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await;
    });

    format!("http://{addr}")
}

/// A browser-like HTTP client: keeps cookies, does not follow redirects.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("build browser client")
}
