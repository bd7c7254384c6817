//! shop-admin - back-office services for a small online shop
//!
//! - **Catalog** (`catalog`): category property inheritance
//! - **Coupons** (`coupons`): validation, applicability and Stripe reconciliation
//! - **Products** (`products`): product / price mirroring onto Stripe
//! - **Settings** (`settings`): typed shop settings over a pluggable store
//! - **Stats** (`stats`): paid-order dashboard figures
//! - **Stores** (`db`): PostgreSQL persistence
//! - **Platform** (`platform`, `stripe`): payment-platform seam and its REST client

pub mod catalog;
pub mod config;
pub mod coupons;
pub mod db;
pub mod error;
pub mod platform;
pub mod products;
pub mod settings;
pub mod state;
pub mod stats;
pub mod stripe;

pub use config::Config;
pub use error::{BoxError, ServiceError, ServiceResult};
pub use state::AppState;
