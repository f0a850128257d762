//! Integration tests for the web client.
//!
//! Each test starts a fake API and a client wired to it, then drives the
//! client the way the browser script does: form posts with the
//! `HX-Request` header, cookies kept between requests.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use reqwest::header::LOCATION;

use poscore_integration_tests::{FakeApi, PASSWORD, browser, product_json, spawn_client};

struct Harness {
    api: FakeApi,
    base: String,
    http: reqwest::Client,
}

impl Harness {
    async fn start() -> Self {
        let api = FakeApi::start().await;
        api.set_products(vec![
            product_json("p1", "Leche Entera", 10.5, 8),
            product_json("p2", "Pan Blanco", 35.0, 1),
        ]);
        let base = spawn_client(&api.base_url()).await;
        Self {
            api,
            base,
            http: browser(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.http.get(self.url(path)).send().await.unwrap()
    }

    async fn post(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.http
            .post(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .unwrap()
    }

    async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/auth/login", &[("username", username), ("password", password)])
            .await
    }

    /// Log in as the cashier and open the dashboard.
    async fn open_dashboard(&self) -> String {
        let response = self.login("ana", PASSWORD).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = self.get("/index.html").await;
        assert_eq!(response.status(), StatusCode::OK);
        response.text().await.unwrap()
    }
}

fn location(response: &reqwest::Response) -> Option<&str> {
    response.headers().get(LOCATION).and_then(|v| v.to_str().ok())
}

fn hx_redirect(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get("hx-redirect")
        .and_then(|v| v.to_str().ok())
}

// =============================================================================
// Pages and Login
// =============================================================================

#[tokio::test]
async fn test_health() {
    let h = Harness::start().await;
    let response = h.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_dashboard_requires_login() {
    let h = Harness::start().await;

    let response = h.get("/index.html").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login.html"));
}

#[tokio::test]
async fn test_login_page_renders() {
    let h = Harness::start().await;

    let response = h.get("/login.html").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("name=\"username\""));
    assert!(html.contains("name=\"password\""));
}

#[tokio::test]
async fn test_blank_login_never_reaches_api() {
    let h = Harness::start().await;

    let response = h.login("", "").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(hx_redirect(&response).is_none());
    let html = response.text().await.unwrap();
    assert!(html.contains("Por favor completa todos los campos"));
    assert!(h.api.requests().is_empty());
}

#[tokio::test]
async fn test_wrong_password_shows_api_message() {
    let h = Harness::start().await;

    let response = h.login("ana", "incorrecta").await;

    assert!(hx_redirect(&response).is_none());
    assert!(response.text().await.unwrap().contains("Credenciales invalidas"));
    assert_eq!(h.get("/index.html").await.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_login_redirects_to_dashboard() {
    let h = Harness::start().await;

    let response = h.login("ana", PASSWORD).await;

    assert_eq!(hx_redirect(&response), Some("/index.html"));
    assert!(response.text().await.unwrap().contains("Bienvenido Ana"));
}

#[tokio::test]
async fn test_plain_form_login_gets_redirect() {
    let h = Harness::start().await;

    let response = h
        .http
        .post(h.url("/auth/login"))
        .form(&[("username", "ana"), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/index.html"));
}

#[tokio::test]
async fn test_cashier_dashboard() {
    let h = Harness::start().await;

    let html = h.open_dashboard().await;

    assert!(html.contains("Turno activo - Ana"));
    assert!(html.contains("Leche Entera"));
    assert!(!html.contains("Panel de Administracion"));
    assert_eq!(h.api.requests_to("GET", "/sales/today").len(), 1);
}

#[tokio::test]
async fn test_admin_dashboard() {
    let h = Harness::start().await;
    h.login("admin", PASSWORD).await;

    let html = h.get("/").await.text().await.unwrap();

    assert!(html.contains("Panel de Administracion"));
}

#[tokio::test]
async fn test_logout() {
    let h = Harness::start().await;
    h.open_dashboard().await;

    let response = h.post("/auth/logout", &[]).await;

    assert_eq!(hx_redirect(&response), Some("/login.html"));
    assert_eq!(h.api.requests_to("POST", "/auth/logout").len(), 1);
    assert_eq!(h.get("/index.html").await.status(), StatusCode::SEE_OTHER);
}

// =============================================================================
// Navigation
// =============================================================================

#[tokio::test]
async fn test_navigate_marks_section_active() {
    let h = Harness::start().await;
    h.open_dashboard().await;

    let response = h.post("/navigate/inventario", &[]).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("id=\"inventario\" class=\"content-section active\""));
    assert!(html.contains("id=\"dashboard\" class=\"content-section\""));
}

#[tokio::test]
async fn test_navigate_unknown_section() {
    let h = Harness::start().await;
    h.open_dashboard().await;

    let response = h.post("/navigate/ajustes", &[]).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_theme_toggle_persists() {
    let h = Harness::start().await;

    let first = h.post("/preferences/theme", &[]).await.text().await.unwrap();
    let second = h.post("/preferences/theme", &[]).await.text().await.unwrap();

    assert_eq!(first, "dark");
    assert_eq!(second, "light");
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn test_cart_and_checkout() {
    let h = Harness::start().await;
    h.open_dashboard().await;

    let html = h
        .post("/cart/add", &[("product_id", "p1"), ("quantity", "2")])
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("$21.00"));

    let html = h
        .post("/cart/checkout", &[("metodo_pago", "tarjeta")])
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("Venta procesada: $21.00"));
    assert!(html.contains("El carrito esta vacio"));

    let sale = &h.api.requests_to("POST", "/sales")[0];
    assert_eq!(sale.authorization.as_deref(), Some("Bearer tok-ana"));
    let body = sale.body.clone().unwrap();
    assert_eq!(body["usuario_id"], "u1");
    assert_eq!(body["metodo_pago"], "tarjeta");
    assert_eq!(body["productos"][0]["producto_id"], "p1");
    assert_eq!(body["productos"][0]["cantidad"], 2);
}

#[tokio::test]
async fn test_checkout_lowers_cached_stock() {
    let h = Harness::start().await;
    h.open_dashboard().await;

    h.post("/cart/add", &[("product_id", "p1"), ("quantity", "2")])
        .await;
    h.post("/cart/checkout", &[("metodo_pago", "efectivo")]).await;

    // 8 in stock, 2 sold: the cart now accepts at most 6.
    let html = h
        .post("/cart/add", &[("product_id", "p1"), ("quantity", "7")])
        .await
        .text()
        .await
        .unwrap();
    assert!(html.contains("No hay suficiente stock disponible"));

    let html = h
        .post("/cart/add", &[("product_id", "p1"), ("quantity", "6")])
        .await
        .text()
        .await
        .unwrap();
    assert!(!html.contains("No hay suficiente stock disponible"));
    assert!(html.contains("$63.00"));
}

#[tokio::test]
async fn test_cart_rejects_quantity_over_stock() {
    let h = Harness::start().await;
    h.open_dashboard().await;

    let html = h
        .post("/cart/add", &[("product_id", "p2"), ("quantity", "3")])
        .await
        .text()
        .await
        .unwrap();

    assert!(html.contains("No hay suficiente stock disponible"));
}

#[tokio::test]
async fn test_empty_checkout_never_reaches_api() {
    let h = Harness::start().await;
    h.open_dashboard().await;

    let response = h.post("/cart/checkout", &[("metodo_pago", "efectivo")]).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("El carrito esta vacio"));
    assert!(h.api.requests_to("POST", "/sales").is_empty());
}

// =============================================================================
// Inventory
// =============================================================================

#[tokio::test]
async fn test_create_product_from_form() {
    let h = Harness::start().await;
    h.open_dashboard().await;

    let html = h
        .post(
            "/products",
            &[
                ("nombre", "Cafe Molido"),
                ("precio", "85.50"),
                ("stock", "10"),
                ("stock_minimo", ""),
                ("categoria", "Bebidas"),
                ("activo", "on"),
            ],
        )
        .await
        .text()
        .await
        .unwrap();

    assert!(html.contains("Producto creado: Cafe Molido"));
    let body = h.api.requests_to("POST", "/products")[0].body.clone().unwrap();
    assert_eq!(body["precio"], 85.5);
    assert_eq!(body["stock_minimo"], 5);
    assert_eq!(body["activo"], true);
}

#[tokio::test]
async fn test_search_inventory() {
    let h = Harness::start().await;
    h.open_dashboard().await;

    let html = h.get("/products?q=pan").await.text().await.unwrap();

    assert!(html.contains("Pan Blanco"));
    assert!(!html.contains("Leche Entera"));
}

#[tokio::test]
async fn test_stock_update() {
    let h = Harness::start().await;
    h.open_dashboard().await;

    h.post("/products/p2/stock", &[("stock", "40")]).await;

    let patch = &h.api.requests_to("PATCH", "/inventory/product/p2/stock")[0];
    assert_eq!(patch.body, Some(serde_json::json!({ "stock": 40 })));
    assert_eq!(h.api.products()[1]["stock"], 40);
}

#[tokio::test]
async fn test_expired_token_returns_to_login() {
    let h = Harness::start().await;
    h.open_dashboard().await;
    h.api.expire_tokens();

    let response = h.get("/products?q=").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login.html"));
    assert_eq!(h.get("/index.html").await.status(), StatusCode::SEE_OTHER);
}
