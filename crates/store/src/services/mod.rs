//! Business services layered over the repositories.
//!
//! - [`accounts`] - User manager, authentication and the email confirmation flow

pub mod accounts;

pub use accounts::{AccountError, AccountService};
