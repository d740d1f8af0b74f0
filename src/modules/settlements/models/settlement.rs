use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::modules::instruments::models::InstrumentKind;

/// How the batch materializes each allocation line on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// One settlement (abono) per obligation, applied against its credit.
    Settlements,
    /// One invoice per obligation, created and immediately marked paid.
    Invoices,
}

/// Session-level fields attached to every request in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementMetadata {
    pub settlement_date: NaiveDate,
    /// Free-text reference entered by the cashier.
    pub reference: String,
    pub branch_id: i64,
    pub client_id: i64,
}

/// This obligation's slice of one payment instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentShare {
    pub kind: InstrumentKind,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_reference: Option<String>,
}

/// One settlement-creation request, targeting a single obligation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementRequest {
    /// Client-generated reference for tracing this request end to end.
    pub reference_id: String,
    pub obligation_id: i64,
    pub obligation_number: String,
    pub applied_amount: Decimal,
    /// Proportional slices of the session's instruments; they sum to
    /// exactly `applied_amount`.
    pub instrument_shares: Vec<InstrumentShare>,
    /// Zero unless this request closes the obligation.
    pub withholding_amount: Decimal,
    /// True when `applied_amount` brings the pending balance to zero.
    pub closes_obligation: bool,
    pub settlement_date: NaiveDate,
    pub reference: String,
    pub branch_id: i64,
    pub client_id: i64,
}

/// Outcome of one request within a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementOutcome {
    /// The backend created the settlement/invoice.
    Created {
        obligation_id: i64,
        external_id: String,
    },
    /// The obligation already carried a settlement/invoice; safe to skip,
    /// which makes retrying a partially successful batch idempotent.
    SkippedAlreadySettled { obligation_id: i64 },
    /// The backend rejected the request; message kept verbatim for display.
    Failed { obligation_id: i64, reason: String },
}

impl SettlementOutcome {
    pub fn obligation_id(&self) -> i64 {
        match self {
            SettlementOutcome::Created { obligation_id, .. }
            | SettlementOutcome::SkippedAlreadySettled { obligation_id }
            | SettlementOutcome::Failed { obligation_id, .. } => *obligation_id,
        }
    }
}

/// Aggregated result of a batch submission.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub created: usize,
    pub skipped: usize,
    pub failed: Vec<(i64, String)>,
    pub outcomes: Vec<SettlementOutcome>,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: Vec<SettlementOutcome>) -> Self {
        let mut summary = BatchSummary {
            outcomes: Vec::new(),
            ..Default::default()
        };
        for outcome in &outcomes {
            match outcome {
                SettlementOutcome::Created { .. } => summary.created += 1,
                SettlementOutcome::SkippedAlreadySettled { .. } => summary.skipped += 1,
                SettlementOutcome::Failed {
                    obligation_id,
                    reason,
                } => summary.failed.push((*obligation_id, reason.clone())),
            }
        }
        summary.outcomes = outcomes;
        summary
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.failed.len() == self.outcomes.len()
    }
}
