use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use tracing::info;

use crate::core::{AppError, Result};
use crate::modules::allocation::models::Allocation;
use crate::modules::allocation::services::AllocationEngine;
use crate::modules::instruments::models::PaymentInstrument;
use crate::modules::instruments::services::InstrumentReconciler;
use crate::modules::obligations::models::Obligation;
use crate::modules::obligations::repositories::ObligationRepository;
use crate::modules::settlements::models::{BatchMode, BatchSummary, SettlementMetadata};
use crate::modules::settlements::services::BatchSubmitter;
use crate::modules::taxes::models::TaxSettings;
use crate::modules::taxes::repositories::TaxSettingsProvider;

/// Everything the cashier confirmed for one settlement.
#[derive(Debug, Clone)]
pub struct SettlementInput {
    pub client_id: Option<i64>,
    pub payment_total: Decimal,
    pub settlement_date: NaiveDate,
    /// Free-text reference entered by the cashier.
    pub reference: String,
    pub branch_id: i64,
    pub instruments: Vec<PaymentInstrument>,
    pub selected: Vec<Obligation>,
    pub mode: BatchMode,
}

/// One settlement flow end to end: validate the input, allocate the
/// payment, reconcile the instruments, submit the batch.
///
/// Tax settings are snapshotted when the session opens and never
/// re-fetched mid-flow. `preview` is the pure recompute the UI calls on
/// every input change; `submit` is the only entry point that performs
/// writes.
pub struct SettlementSession {
    repo: Arc<dyn ObligationRepository>,
    settings: TaxSettings,
    submitter: BatchSubmitter,
}

impl SettlementSession {
    pub async fn open(
        settings_provider: &dyn TaxSettingsProvider,
        repo: Arc<dyn ObligationRepository>,
    ) -> Result<Self> {
        let settings = settings_provider.fetch_settings().await?;
        info!(
            iva = %settings.iva_rate,
            rete = %settings.withholding_rate,
            threshold = %settings.withholding_threshold,
            "Settlement session opened"
        );

        Ok(Self {
            submitter: BatchSubmitter::new(Arc::clone(&repo)),
            repo,
            settings,
        })
    }

    pub fn settings(&self) -> &TaxSettings {
        &self.settings
    }

    /// Outstanding obligations for the selected client.
    pub async fn outstanding(&self, client_id: i64) -> Result<Vec<Obligation>> {
        self.repo.list_outstanding(client_id).await
    }

    /// Recompute the allocation for the current inputs. Pure; safe to
    /// call on every keystroke.
    pub fn preview(&self, payment_total: Decimal, selected: &[Obligation]) -> Result<Allocation> {
        AllocationEngine::allocate(payment_total, selected, &self.settings)
    }

    /// Validate, allocate, reconcile, and submit in one pass. No write
    /// happens unless every validation rule passes.
    pub async fn submit(&self, input: SettlementInput) -> Result<BatchSummary> {
        let client_id = input
            .client_id
            .ok_or_else(|| AppError::validation("No client selected".to_string()))?;

        if input.payment_total <= Decimal::ZERO {
            return Err(AppError::validation(
                "Payment amount must be positive".to_string(),
            ));
        }
        if input.settlement_date > Local::now().date_naive() {
            return Err(AppError::validation(
                "Settlement date cannot be in the future".to_string(),
            ));
        }
        if input.selected.is_empty() {
            return Err(AppError::validation(
                "No obligations selected".to_string(),
            ));
        }

        let allocation =
            AllocationEngine::allocate(input.payment_total, &input.selected, &self.settings)?;
        let instruments =
            InstrumentReconciler::reconcile(&input.instruments, allocation.total_applied)?;

        let metadata = SettlementMetadata {
            settlement_date: input.settlement_date,
            reference: input.reference,
            branch_id: input.branch_id,
            client_id,
        };

        self.submitter
            .submit_batch(input.mode, &allocation, &instruments, &metadata)
            .await
    }
}
