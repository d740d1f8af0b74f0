mod settlement;

pub use settlement::{
    BatchMode, BatchSummary, InstrumentShare, SettlementMetadata, SettlementOutcome,
    SettlementRequest,
};
