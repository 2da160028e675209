//! Core types for the marketplace.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod limits;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use limits::{ValidationError, check_length};
pub use status::*;
