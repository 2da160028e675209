//! Domain models for the marketplace.
//!
//! These types represent validated domain objects separate from database row
//! types. Each maps onto one table of the `market` schema.

pub mod catalog;
pub mod contact;
pub mod order;
pub mod shop;
pub mod token;
pub mod user;

pub use catalog::{Category, Listing, Parameter, Product, ProductInfo, ProductParameter};
pub use contact::{Contact, ContactDetails};
pub use order::{Order, OrderItem};
pub use shop::{Shop, ShopDetails};
pub use token::{ConfirmEmailToken, OwnedToken};
pub use user::{AccountFlags, NewUser, User, UserProfile};
