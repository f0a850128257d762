//! Integration tests for the API client and services.
//!
//! The services run against the fake API with in-memory storage, so these
//! tests pin down the exact requests the client sends.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use poscore_client::api::{ApiClient, ApiError};
use poscore_client::models::{Credentials, Product, Sale};
use poscore_client::services::{AuthService, ProductService, SalesService, ServiceError};
use poscore_client::storage::{MemoryStorage, Storage};
use poscore_core::{PaymentMethod, Price, ProductId, Role, UserId};
use poscore_integration_tests::{FakeApi, PASSWORD, product_json};

fn client(api: &FakeApi) -> ApiClient<MemoryStorage> {
    ApiClient::new(reqwest::Client::new(), api.base_url(), MemoryStorage::new())
}

async fn logged_in(api: &FakeApi) -> ApiClient<MemoryStorage> {
    let client = client(api);
    AuthService::new(client.clone())
        .login(&Credentials::new("ana", PASSWORD))
        .await
        .unwrap()
        .unwrap();
    client
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_login_stores_token_and_user() {
    let api = FakeApi::start().await;
    let client = client(&api);

    let user = AuthService::new(client.clone())
        .login(&Credentials::new("ana", PASSWORD))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(user.name, "Ana");
    assert_eq!(user.role, Role::Cashier);
    assert_eq!(client.storage().token().await.as_deref(), Some("tok-ana"));
    assert_eq!(client.storage().current_user().await, Some(user));

    let login = &api.requests_to("POST", "/auth/login")[0];
    assert_eq!(
        login.body,
        Some(json!({ "username": "ana", "password": PASSWORD }))
    );
    assert!(login.authorization.is_none());
}

#[tokio::test]
async fn test_rejected_login_surfaces_api_message() {
    let api = FakeApi::start().await;
    let client = client(&api);

    let err = AuthService::new(client.clone())
        .login(&Credentials::new("ana", "incorrecta"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Credenciales invalidas");
    assert!(client.storage().token().await.is_none());
}

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let api = FakeApi::start().await;
    let client = logged_in(&api).await;

    ProductService::new(client).get_products().await.unwrap();

    let list = &api.requests_to("GET", "/products")[0];
    assert_eq!(list.authorization.as_deref(), Some("Bearer tok-ana"));
}

#[tokio::test]
async fn test_unauthorized_clears_credentials() {
    let api = FakeApi::start().await;
    let client = logged_in(&api).await;
    api.expire_tokens();

    let err = ProductService::new(client.clone())
        .get_products()
        .await
        .unwrap_err();

    assert!(err.is_session_expired());
    assert_eq!(err.to_string(), "Sesion expirada");
    assert!(client.storage().token().await.is_none());
    assert!(client.storage().current_user().await.is_none());
}

#[tokio::test]
async fn test_logout_forgets_credentials() {
    let api = FakeApi::start().await;
    let client = logged_in(&api).await;
    let auth = AuthService::new(client.clone());

    assert!(auth.verify_token().await);
    auth.logout().await;

    assert!(!auth.is_authenticated().await);
    assert_eq!(api.requests_to("POST", "/auth/logout").len(), 1);
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_product_crud_round() {
    let api = FakeApi::start().await;
    let products = ProductService::new(logged_in(&api).await);

    let created = products
        .create_product(&Product {
            name: "Cafe Molido".to_string(),
            price: Price::from_units(85),
            stock: 10,
            category: "Bebidas".to_string(),
            ..Product::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id, ProductId::new("p1"));

    let sent = api.requests_to("POST", "/products")[0].body.clone().unwrap();
    assert_eq!(sent["nombre"], "Cafe Molido");
    assert_eq!(sent["categoria"], "Bebidas");
    assert_eq!(sent["stock_minimo"], 5);

    let renamed = Product {
        name: "Cafe de Grano".to_string(),
        ..created.clone()
    };
    let updated = products.update_product(&created.id, &renamed).await.unwrap();
    assert_eq!(updated.name, "Cafe de Grano");

    products.update_stock(&created.id, 12).await.unwrap();
    let patch = &api.requests_to("PATCH", "/inventory/product/p1/stock")[0];
    assert_eq!(patch.body, Some(json!({ "stock": 12 })));
    assert_eq!(products.get_product(&created.id).await.unwrap().stock, 12);

    products.delete_product(&created.id).await.unwrap();
    assert!(products.get_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_product_is_not_sent() {
    let api = FakeApi::start().await;
    let products = ProductService::new(logged_in(&api).await);

    let err = products
        .create_product(&Product {
            name: "   ".to_string(),
            price: Price::from_units(10),
            ..Product::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Model(_)));
    assert!(api.requests_to("POST", "/products").is_empty());
}

#[tokio::test]
async fn test_missing_product_reports_api_message() {
    let api = FakeApi::start().await;
    let products = ProductService::new(logged_in(&api).await);

    let err = products
        .get_product(&ProductId::new("nada"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Api(ApiError::Status { ref message, .. }) if message == "Producto no encontrado"
    ));
}

#[tokio::test]
async fn test_search_filters_locally() {
    let api = FakeApi::start().await;
    api.set_products(vec![
        product_json("p1", "Leche Entera", 22.5, 10),
        product_json("p2", "Pan Blanco", 35.0, 4),
    ]);
    let products = ProductService::new(logged_in(&api).await);

    let found = products.search_products("LECHE").await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Leche Entera");
    assert!(api.requests().iter().all(|r| r.path != "/products/search"));
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn test_create_sale_payload() {
    let api = FakeApi::start().await;
    api.set_products(vec![product_json("p1", "Leche Entera", 22.5, 10)]);
    let client = logged_in(&api).await;
    let catalogue = ProductService::new(client.clone()).get_products().await.unwrap();

    let mut sale = Sale {
        payment_method: PaymentMethod::Transfer,
        user_id: UserId::new("u1"),
        ..Sale::default()
    };
    sale.add_product(&catalogue[0], 2);

    let created = SalesService::new(client).create_sale(&sale).await.unwrap();
    assert_eq!(created.total, Price::from_units(45));
    assert_eq!(created.items.len(), 1);
    assert_eq!(created.items[0].product_id, ProductId::new("p1"));
    assert_eq!(created.items[0].quantity, 2);
    assert_eq!(created.items[0].subtotal, Price::from_units(45));

    let body = api.requests_to("POST", "/sales")[0].body.clone().unwrap();
    assert_eq!(body["usuario_id"], "u1");
    assert_eq!(body["metodo_pago"], "transferencia");
    assert_eq!(body["total"], 45.0);
    assert_eq!(body["productos"][0]["producto_id"], "p1");
    assert_eq!(body["productos"][0]["cantidad"], 2);
    assert_eq!(body["productos"][0]["precio_unitario"], 22.5);
    assert!(body.get("fecha").is_none());
}

#[tokio::test]
async fn test_empty_sale_is_not_sent() {
    let api = FakeApi::start().await;
    let sales = SalesService::new(logged_in(&api).await);

    let err = sales.create_sale(&Sale::default()).await.unwrap_err();

    assert!(matches!(err, ServiceError::Model(_)));
    assert!(api.requests_to("POST", "/sales").is_empty());
}

#[tokio::test]
async fn test_stats_from_todays_sales() {
    let api = FakeApi::start().await;
    api.set_sales(vec![
        json!({ "id": "s1", "fecha": "2025-03-01T09:10:00", "total": 30, "metodo_pago": "efectivo" }),
        json!({ "id": "s2", "fecha": "2025-03-01T09:40:00", "total": 12.5, "metodo_pago": "tarjeta" }),
        json!({ "id": "s3", "fecha": "2025-03-01T14:05:00", "total": 7.5, "metodo_pago": "efectivo" }),
    ]);
    let sales = SalesService::new(logged_in(&api).await);

    let stats = sales.get_sales_stats().await.unwrap();

    assert_eq!(stats.total_sales, 3);
    assert_eq!(stats.total_revenue, Price::from_units(50));
    let nine = stats.hourly.iter().find(|h| h.hour == 9).unwrap();
    assert_eq!(nine.transactions, 2);
    assert_eq!(api.requests_to("GET", "/sales/today").len(), 1);
}
