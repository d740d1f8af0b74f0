pub mod models;
pub mod services;

pub use models::{InstrumentKind, PaymentInstrument};
pub use services::InstrumentReconciler;
