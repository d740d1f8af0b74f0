mod payment_instrument;

pub use payment_instrument::{InstrumentKind, PaymentInstrument};
