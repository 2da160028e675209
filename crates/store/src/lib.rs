//! Marketplace store library.
//!
//! Persistence for the marketplace: the `market` schema and its migrations,
//! one repository per aggregate, the account service, and the admin registry.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven store configuration
//! - [`db`] - Connection pool, migrations and repositories
//! - [`models`] - Domain types returned by the repositories
//! - [`services`] - Account lifecycle (user manager, login, confirmation)
//! - [`admin`] - Entity registry and generic admin operations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

pub use config::{ConfigError, StoreConfig};
