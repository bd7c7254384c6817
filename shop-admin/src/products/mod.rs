//! Local products mirrored onto the payment platform

pub mod mirror;

pub use mirror::ProductMirror;
