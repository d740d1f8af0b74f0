use rust_decimal::Decimal;
use tracing::warn;

use crate::core::money::round2;
use crate::modules::taxes::models::TaxSettings;

/// Per-obligation tax breakdown.
///
/// `subtotal_no_tax + iva_amount` always equals the tax-inclusive base
/// exactly: IVA is computed as the residual after rounding the subtotal,
/// never as an independent percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxBreakdown {
    pub base_with_tax: Decimal,
    pub subtotal_no_tax: Decimal,
    pub iva_amount: Decimal,
    pub withholding_eligible: bool,
    pub withholding_amount: Decimal,
}

/// Computes IVA and withholding (retefuente) amounts for one obligation.
///
/// Withholding is informational and deductible at payment time; it is
/// never subtracted from the invoiced total.
pub struct WithholdingCalculator;

impl WithholdingCalculator {
    /// Compute the tax breakdown for a tax-inclusive total.
    ///
    /// * `total_with_tax` - the obligation's total including IVA
    /// * `discount` - discounts already granted on the obligation
    /// * `withholding_requested` - the obligation's withholding flag
    pub fn compute(
        total_with_tax: Decimal,
        discount: Decimal,
        withholding_requested: bool,
        settings: &TaxSettings,
    ) -> TaxBreakdown {
        let base_with_tax = (total_with_tax - discount).max(Decimal::ZERO);

        // iva_rate = 0 leaves divisor at 1: no tax split.
        let divisor = Decimal::ONE + settings.iva_rate / Decimal::from(100);
        let subtotal_no_tax = round2(base_with_tax / divisor);
        let iva_amount = round2(base_with_tax - subtotal_no_tax);

        let withholding_eligible = subtotal_no_tax >= settings.withholding_threshold;

        let withholding_amount = if withholding_requested && withholding_eligible {
            if settings.withholding_rate_valid() {
                round2(subtotal_no_tax * settings.withholding_rate / Decimal::from(100))
            } else {
                warn!(
                    rate = %settings.withholding_rate,
                    "Withholding requested but rate is not applicable, forcing zero"
                );
                Decimal::ZERO
            }
        } else {
            Decimal::ZERO
        };

        TaxBreakdown {
            base_with_tax,
            subtotal_no_tax,
            iva_amount,
            withholding_eligible,
            withholding_amount,
        }
    }
}
