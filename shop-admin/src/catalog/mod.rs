//! Catalog logic over category and product records

pub mod properties;

pub use properties::{MAX_CATEGORY_DEPTH, category_path, resolve_properties};
