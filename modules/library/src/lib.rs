//! Library management: catalog, members and the lending workflow.

// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::model;

// === MODULE DEFINITION ===
pub mod module;
pub use module::Library;

pub use config::LibraryConfig;
pub use infra::security::TokenSettings;

// === INTERNAL MODULES ===
// Exposed for integration tests; only `contract` and `module` are stable.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
