//! Database access layer

pub mod catalog;
pub mod orders;
pub mod settings;

pub use settings::PgSettingsStore;
