//! Shared types for the shop admin workspace
//!
//! Domain models (categories, products, coupons, settings, orders) and the
//! unified error system used by the service crate and its CLI.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
