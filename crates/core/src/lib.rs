//! POS Core - Shared types library.
//!
//! This crate provides common types used across the POS Core components:
//! - `client` - Server-rendered POS web client (login, dashboard, inventory, sales)
//! - `integration-tests` - End-to-end tests against a fake POS API
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no sessions,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, roles, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
