use rust_decimal::Decimal;
use tracing::debug;

use crate::core::money::format_amount;
use crate::core::{AppError, Result};
use crate::modules::allocation::models::{Allocation, AllocationLine};
use crate::modules::obligations::models::Obligation;
use crate::modules::taxes::models::TaxSettings;
use crate::modules::taxes::services::WithholdingCalculator;

/// Distributes a payment across selected obligations.
///
/// Pure computation: called with the full input on every UI event
/// (payment edited, selection toggled, withholding flag toggled) and
/// returns a fresh result. It holds no state between calls.
pub struct AllocationEngine;

impl AllocationEngine {
    /// Allocate `payment_total` across `selected` obligations.
    ///
    /// Ordering is oldest debt first (ascending date, ties broken by
    /// ascending id). Each obligation is paid down to zero before any
    /// amount reaches the next one.
    ///
    /// Fails fast, with no partial allocation, when the payment exceeds
    /// the combined pending balance; the excess is reported in the error.
    pub fn allocate(
        payment_total: Decimal,
        selected: &[Obligation],
        settings: &TaxSettings,
    ) -> Result<Allocation> {
        if payment_total <= Decimal::ZERO {
            return Err(AppError::validation(
                "Payment amount must be positive".to_string(),
            ));
        }
        if selected.is_empty() {
            return Err(AppError::validation(
                "No obligations selected".to_string(),
            ));
        }
        for obligation in selected {
            obligation.validate()?;
        }

        let total_balance: Decimal = selected.iter().map(|o| o.pending_balance).sum();
        if payment_total > total_balance {
            let excess = payment_total - total_balance;
            return Err(AppError::validation(format!(
                "Payment exceeds total debt by {}",
                format_amount(excess)
            )));
        }

        let mut ordered: Vec<&Obligation> = selected.iter().collect();
        ordered.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

        let mut remaining_payment = payment_total;
        let mut lines = Vec::with_capacity(ordered.len());
        let mut total_withholding = Decimal::ZERO;

        for obligation in ordered {
            let balance_before = obligation.pending_balance;

            let applied_amount = if remaining_payment <= Decimal::ZERO {
                Decimal::ZERO
            } else if remaining_payment >= balance_before {
                remaining_payment -= balance_before;
                balance_before
            } else {
                let applied = remaining_payment;
                remaining_payment = Decimal::ZERO;
                applied
            };

            let balance_after = balance_before - applied_amount;

            // Withholding is an attribute of the obligation, computed on
            // its full base, not on the cash applied this round. It is
            // only charged when this allocation closes the obligation;
            // partially paid obligations carry no partial withholding.
            let breakdown = WithholdingCalculator::compute(
                obligation.total_with_tax,
                obligation.discount,
                obligation.has_withholding,
                settings,
            );
            let closes = applied_amount > Decimal::ZERO && balance_after == Decimal::ZERO;
            let withholding_amount = if closes {
                breakdown.withholding_amount
            } else {
                Decimal::ZERO
            };
            total_withholding += withholding_amount;

            lines.push(AllocationLine {
                obligation_id: obligation.id,
                obligation_number: obligation.number.clone(),
                balance_before,
                applied_amount,
                balance_after,
                withholding_eligible: breakdown.withholding_eligible,
                withholding_amount,
            });
        }

        let total_applied = payment_total - remaining_payment;
        debug!(
            payment = %payment_total,
            applied = %total_applied,
            withholding = %total_withholding,
            lines = lines.len(),
            "Allocation computed"
        );

        Ok(Allocation {
            lines,
            total_applied,
            total_withholding,
        })
    }
}
