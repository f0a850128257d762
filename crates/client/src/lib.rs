//! POS Core web client library.
//!
//! Server-rendered point-of-sale front end for the POS Core API: login, a
//! role-dependent dashboard, inventory management and a cart that turns
//! into sales. The binary in `main.rs` only loads configuration and serves
//! [`routes::router`].
//!
//! # Layers
//!
//! - [`api`]: HTTP JSON client with bearer auth and session expiry handling
//! - [`services`]: one service per API resource
//! - [`controllers`]: operations returning `ActionResult` and notifying hooks
//! - [`views`]: askama templates fed from controller state
//! - [`routes`]: axum handlers wiring the above to a visitor's session

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod config;
pub mod controllers;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod views;

pub use config::ClientConfig;
pub use routes::router;
pub use state::AppState;
