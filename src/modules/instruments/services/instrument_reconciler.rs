use rust_decimal::Decimal;
use tracing::debug;

use crate::core::money::{approx_eq, format_amount};
use crate::core::{AppError, Result};
use crate::modules::instruments::models::PaymentInstrument;

/// Validates that declared payment instruments cover an allocated total.
pub struct InstrumentReconciler;

impl InstrumentReconciler {
    /// Reconcile instruments against the total being allocated.
    ///
    /// Returns the effective instrument list: identical to the input,
    /// except that a single instrument with an unset/zero amount is
    /// auto-filled with the allocated total (cashier convenience). With
    /// two or more instruments nothing is auto-filled and any mismatch is
    /// reported.
    pub fn reconcile(
        instruments: &[PaymentInstrument],
        allocated_total: Decimal,
    ) -> Result<Vec<PaymentInstrument>> {
        if instruments.is_empty() {
            return Err(AppError::validation(
                "At least one payment instrument is required".to_string(),
            ));
        }

        let mut effective = instruments.to_vec();

        if effective.len() == 1 && effective[0].amount == Decimal::ZERO {
            debug!(
                total = %allocated_total,
                "Single instrument without amount, defaulting to allocated total"
            );
            effective[0].amount = allocated_total;
        }

        for instrument in &effective {
            instrument.validate()?;
        }

        if !effective.iter().any(|i| i.is_counted()) {
            return Err(AppError::validation(
                "No payment instrument with a positive amount".to_string(),
            ));
        }

        let difference = Self::difference(&effective, allocated_total);
        if !approx_eq(difference, Decimal::ZERO) {
            let direction = if difference > Decimal::ZERO {
                "over"
            } else {
                "under"
            };
            return Err(AppError::validation(format!(
                "Payment instruments {} the allocated total by {} (difference {})",
                direction,
                format_amount(difference.abs()),
                difference
            )));
        }

        Ok(effective)
    }

    /// Signed difference between the counted instrument sum and the
    /// allocated total: positive means the instruments declare too much.
    pub fn difference(instruments: &[PaymentInstrument], allocated_total: Decimal) -> Decimal {
        let declared: Decimal = instruments
            .iter()
            .filter(|i| i.is_counted())
            .map(|i| i.amount)
            .sum();
        declared - allocated_total
    }
}
