// Property-based tests for the IVA / withholding split.
//
// The load-bearing invariant: the tax-exclusive subtotal and the IVA
// amount always sum exactly to the tax-inclusive base, because IVA is
// computed as the rounding residual rather than an independent
// percentage.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crediglass::core::money::round2;
use crediglass::modules::taxes::models::TaxSettings;
use crediglass::modules::taxes::services::WithholdingCalculator;

fn settings(iva: Decimal, rete: Decimal, threshold: Decimal) -> TaxSettings {
    TaxSettings {
        iva_rate: iva,
        withholding_rate: rete,
        withholding_threshold: threshold,
    }
}

proptest! {
    #[test]
    fn residual_split_sums_exactly(
        total_cents in 0u64..10_000_000_000u64,
        iva_percent in 0u8..=50u8
    ) {
        let total = Decimal::new(total_cents as i64, 2);
        let s = settings(Decimal::from(iva_percent), dec!(2.5), dec!(1000000));

        let breakdown = WithholdingCalculator::compute(total, Decimal::ZERO, false, &s);

        prop_assert_eq!(
            breakdown.subtotal_no_tax + breakdown.iva_amount,
            breakdown.base_with_tax,
            "subtotal {} + iva {} must equal base {}",
            breakdown.subtotal_no_tax,
            breakdown.iva_amount,
            breakdown.base_with_tax
        );
        prop_assert!(breakdown.subtotal_no_tax >= Decimal::ZERO);
        prop_assert!(breakdown.iva_amount >= Decimal::ZERO);
    }

    #[test]
    fn withholding_is_zero_without_flag_or_below_threshold(
        total_cents in 0u64..10_000_000_000u64,
        flag in any::<bool>()
    ) {
        let total = Decimal::new(total_cents as i64, 2);
        let s = settings(dec!(19), dec!(2.5), dec!(1000000));

        let breakdown = WithholdingCalculator::compute(total, Decimal::ZERO, flag, &s);

        if !flag || !breakdown.withholding_eligible {
            prop_assert_eq!(breakdown.withholding_amount, Decimal::ZERO);
        }
    }

    #[test]
    fn withholding_matches_rate_when_applicable(
        total_cents in 200_000_000u64..10_000_000_000u64
    ) {
        // Totals from 2,000,000.00 up keep the subtotal above threshold.
        let total = Decimal::new(total_cents as i64, 2);
        let s = settings(dec!(19), dec!(2.5), dec!(1000000));

        let breakdown = WithholdingCalculator::compute(total, Decimal::ZERO, true, &s);

        prop_assert!(breakdown.withholding_eligible);
        prop_assert_eq!(
            breakdown.withholding_amount,
            round2(breakdown.subtotal_no_tax * dec!(2.5) / dec!(100))
        );
    }

    #[test]
    fn invalid_rate_never_computes_garbage(
        total_cents in 200_000_000u64..10_000_000_000u64,
        bad_rate in prop_oneof![Just(dec!(0)), Just(dec!(-3)), Just(dec!(120))]
    ) {
        let total = Decimal::new(total_cents as i64, 2);
        let s = settings(dec!(19), bad_rate, dec!(1000000));

        let breakdown = WithholdingCalculator::compute(total, Decimal::ZERO, true, &s);

        prop_assert_eq!(breakdown.withholding_amount, Decimal::ZERO);
    }

    #[test]
    fn displayed_total_never_reduced_by_withholding(
        total_cents in 0u64..10_000_000_000u64
    ) {
        let total = Decimal::new(total_cents as i64, 2);
        let s = settings(dec!(19), dec!(2.5), dec!(0));

        let breakdown = WithholdingCalculator::compute(total, Decimal::ZERO, true, &s);

        // Withholding is informational; the invoiced base stays intact.
        prop_assert_eq!(breakdown.base_with_tax, total);
    }
}

#[test]
fn exact_and_residual_rounding_cases() {
    let s = settings(dec!(19), dec!(2.5), dec!(1000000));

    let exact = WithholdingCalculator::compute(dec!(119000), dec!(0), false, &s);
    assert_eq!(exact.subtotal_no_tax, dec!(100000.00));
    assert_eq!(exact.iva_amount, dec!(19000.00));

    let residual = WithholdingCalculator::compute(dec!(100000), dec!(0), false, &s);
    assert_eq!(residual.subtotal_no_tax, dec!(84033.61));
    assert_eq!(residual.iva_amount, dec!(15966.39));
    assert_eq!(residual.subtotal_no_tax + residual.iva_amount, dec!(100000.00));
}

#[test]
fn threshold_boundary_scenario() {
    let s = settings(dec!(19), dec!(2.5), dec!(1000000));

    // subtotal 1,200,000 (total 1,428,000): above threshold.
    let above = WithholdingCalculator::compute(dec!(1428000), dec!(0), true, &s);
    assert_eq!(above.withholding_amount, dec!(30000.00));

    // subtotal 900,000 (total 1,071,000): below threshold, flag ignored.
    let below = WithholdingCalculator::compute(dec!(1071000), dec!(0), true, &s);
    assert_eq!(below.withholding_amount, dec!(0));
}
