//! Marketplace Core - Shared types library.
//!
//! This crate provides the domain types used across all marketplace components:
//! - `store` - Schema, repositories, account service and admin registry
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no database access, no
//! network clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, states and field limits
//! - [`token`] - Confirmation token key generation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod token;
pub mod types;

pub use token::{RandomTokenGenerator, TokenGenerator};
pub use types::*;
