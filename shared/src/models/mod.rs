//! Data models
//!
//! Shared between the service crate, its stores and the payment-platform client.
//! Wire names follow the dashboard's JSON (camelCase); payment-platform objects
//! keep the platform's snake_case.

pub mod category;
pub mod coupon;
pub mod order;
pub mod product;
pub mod setting;

// Re-exports
pub use category::*;
pub use coupon::*;
pub use order::*;
pub use product::*;
pub use setting::*;
