//! Crediglass credit-settlement core.
//!
//! Settlement and tax-withholding engine behind the point-of-sale front
//! end of a glass and aluminum retailer: payment allocation across
//! outstanding credits, IVA/retefuente computation, payment-instrument
//! reconciliation, and batch settlement submission against the backend
//! API.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use modules::allocation;
pub use modules::instruments;
pub use modules::obligations;
pub use modules::settlements;
pub use modules::taxes;
