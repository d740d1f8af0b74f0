use std::sync::Arc;

use futures_util::future::join_all;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::money::round2;
use crate::core::{AppError, Result};
use crate::modules::allocation::models::{Allocation, AllocationLine};
use crate::modules::instruments::models::PaymentInstrument;
use crate::modules::obligations::repositories::ObligationRepository;
use crate::modules::settlements::models::{
    BatchMode, BatchSummary, InstrumentShare, SettlementMetadata, SettlementOutcome,
    SettlementRequest,
};

/// Turns an allocation into one settlement/invoice creation call per
/// obligation.
///
/// Requests are independent and dispatched concurrently; completion
/// order does not matter because each request only targets its own
/// obligation. There is no rollback of earlier successes when a later
/// request fails, and no cancellation once submission starts.
pub struct BatchSubmitter {
    repo: Arc<dyn ObligationRepository>,
}

impl BatchSubmitter {
    pub fn new(repo: Arc<dyn ObligationRepository>) -> Self {
        Self { repo }
    }

    /// Submit one request per allocation line with a positive applied
    /// amount. Returns the aggregated outcomes; errors only when the
    /// allocation contains nothing to submit.
    pub async fn submit_batch(
        &self,
        mode: BatchMode,
        allocation: &Allocation,
        instruments: &[PaymentInstrument],
        metadata: &SettlementMetadata,
    ) -> Result<BatchSummary> {
        let lines: Vec<&AllocationLine> = allocation.submittable_lines().collect();
        if lines.is_empty() {
            return Err(AppError::validation(
                "No obligations with an amount to settle".to_string(),
            ));
        }

        let requests: Vec<SettlementRequest> = lines
            .iter()
            .map(|line| Self::build_request(line, instruments, allocation.total_applied, metadata))
            .collect();

        info!(
            mode = ?mode,
            count = requests.len(),
            total = %allocation.total_applied,
            "Submitting settlement batch"
        );

        let outcomes = join_all(
            requests
                .into_iter()
                .map(|request| self.submit_one(mode, request)),
        )
        .await;

        let summary = BatchSummary::from_outcomes(outcomes);
        info!(
            created = summary.created,
            skipped = summary.skipped,
            failed = summary.failed.len(),
            "Settlement batch finished"
        );

        Ok(summary)
    }

    /// Build the request for one line: the line's applied amount plus its
    /// proportional slice of every counted instrument. The last share
    /// absorbs the rounding residual so the shares sum to exactly the
    /// applied amount.
    fn build_request(
        line: &AllocationLine,
        instruments: &[PaymentInstrument],
        allocated_total: Decimal,
        metadata: &SettlementMetadata,
    ) -> SettlementRequest {
        SettlementRequest {
            reference_id: Uuid::new_v4().to_string(),
            obligation_id: line.obligation_id,
            obligation_number: line.obligation_number.clone(),
            applied_amount: line.applied_amount,
            instrument_shares: Self::instrument_shares(
                instruments,
                line.applied_amount,
                allocated_total,
            ),
            withholding_amount: line.withholding_amount,
            closes_obligation: line.closes_obligation(),
            settlement_date: metadata.settlement_date,
            reference: metadata.reference.clone(),
            branch_id: metadata.branch_id,
            client_id: metadata.client_id,
        }
    }

    /// Proportional split of the session's instruments for one line.
    pub fn instrument_shares(
        instruments: &[PaymentInstrument],
        applied_amount: Decimal,
        allocated_total: Decimal,
    ) -> Vec<InstrumentShare> {
        let counted: Vec<&PaymentInstrument> =
            instruments.iter().filter(|i| i.is_counted()).collect();
        if counted.is_empty() || allocated_total <= Decimal::ZERO {
            return Vec::new();
        }

        let ratio = applied_amount / allocated_total;
        let mut shares = Vec::with_capacity(counted.len());
        let mut distributed = Decimal::ZERO;

        for (idx, instrument) in counted.iter().enumerate() {
            let amount = if idx == counted.len() - 1 {
                applied_amount - distributed
            } else {
                round2(instrument.amount * ratio)
            };
            distributed += amount;

            shares.push(InstrumentShare {
                kind: instrument.kind,
                amount,
                bank_reference: instrument.bank_reference.clone(),
            });
        }

        shares
    }

    async fn submit_one(&self, mode: BatchMode, request: SettlementRequest) -> SettlementOutcome {
        let obligation_id = request.obligation_id;

        // Sticky withholding fields converge on the backend before the
        // settlement itself is written.
        if mode == BatchMode::Settlements
            && request.closes_obligation
            && request.withholding_amount > Decimal::ZERO
        {
            if let Err(err) = self
                .repo
                .update_withholding(obligation_id, request.withholding_amount)
                .await
            {
                warn!(
                    obligation_id,
                    error = %err,
                    "Withholding update failed, obligation not settled"
                );
                return SettlementOutcome::Failed {
                    obligation_id,
                    reason: Self::failure_reason(&err),
                };
            }
        }

        let result = match mode {
            BatchMode::Settlements => self.repo.create_settlement(&request).await,
            BatchMode::Invoices => self.create_and_pay_invoice(&request).await,
        };

        match result {
            Ok(external_id) => SettlementOutcome::Created {
                obligation_id,
                external_id,
            },
            Err(err) if err.is_duplicate_settlement() => {
                info!(obligation_id, "Obligation already settled, skipping");
                SettlementOutcome::SkippedAlreadySettled { obligation_id }
            }
            Err(err) => {
                warn!(obligation_id, error = %err, "Settlement request failed");
                SettlementOutcome::Failed {
                    obligation_id,
                    reason: Self::failure_reason(&err),
                }
            }
        }
    }

    async fn create_and_pay_invoice(&self, request: &SettlementRequest) -> Result<String> {
        let invoice_id = self.repo.create_invoice(request).await?;
        self.repo.mark_invoice_paid(&invoice_id).await?;
        Ok(invoice_id)
    }

    /// Backend messages travel to the user verbatim; wrapper prefixes are
    /// stripped for the error kinds that carry one.
    fn failure_reason(err: &AppError) -> String {
        match err {
            AppError::Backend(message) => message.clone(),
            AppError::Conflict { message, .. } => message.clone(),
            AppError::NotFound(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
