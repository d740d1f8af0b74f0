pub mod models;
pub mod services;

pub use models::{
    BatchMode, BatchSummary, InstrumentShare, SettlementMetadata, SettlementOutcome,
    SettlementRequest,
};
pub use services::{BatchSubmitter, SettlementInput, SettlementSession};
