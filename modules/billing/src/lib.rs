// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::model;

// === MODULE PIECES ===
pub mod config;
pub mod factory;
pub mod module;
pub use module::Billing;

// === INTERNAL MODULES ===
// Exposed for the server binary and integration tests.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
