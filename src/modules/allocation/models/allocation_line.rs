use rust_decimal::Decimal;
use serde::Serialize;

/// One obligation's slice of an allocation. Derived data, never persisted
/// by this engine.
///
/// Invariants: `balance_after = balance_before - applied_amount`, always
/// >= 0; `applied_amount` >= 0 and <= `balance_before`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationLine {
    pub obligation_id: i64,
    pub obligation_number: String,
    pub balance_before: Decimal,
    pub applied_amount: Decimal,
    pub balance_after: Decimal,
    /// The obligation's tax-exclusive subtotal clears the threshold.
    pub withholding_eligible: bool,
    /// Full obligation-level withholding when this allocation closes the
    /// obligation; zero otherwise.
    pub withholding_amount: Decimal,
}

impl AllocationLine {
    pub fn closes_obligation(&self) -> bool {
        self.applied_amount > Decimal::ZERO && self.balance_after == Decimal::ZERO
    }
}

/// Result of distributing one payment across selected obligations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub lines: Vec<AllocationLine>,
    /// Sum of applied amounts; equals the payment total unless capped.
    pub total_applied: Decimal,
    pub total_withholding: Decimal,
}

impl Allocation {
    pub fn submittable_lines(&self) -> impl Iterator<Item = &AllocationLine> {
        self.lines.iter().filter(|l| l.applied_amount > Decimal::ZERO)
    }
}
