mod batch_submitter;
mod settlement_session;

pub use batch_submitter::BatchSubmitter;
pub use settlement_session::{SettlementInput, SettlementSession};
