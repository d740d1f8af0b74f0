use rust_decimal::Decimal;

/// Currency scale for all monetary amounts (pesos, 2 decimal places).
pub const MONEY_SCALE: u32 = 2;

/// Tolerance for comparing declared instrument sums against an allocated
/// total: one cent.
pub fn epsilon() -> Decimal {
    Decimal::new(1, MONEY_SCALE)
}

/// Rounds a monetary amount to currency precision (banker's rounding,
/// matching `Decimal::round_dp`).
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp(MONEY_SCALE)
}

/// True when two amounts are equal within currency tolerance.
pub fn approx_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= epsilon()
}

/// Formats an amount for user-facing messages with 2 decimal places.
pub fn format_amount(amount: Decimal) -> String {
    format!("${:.2}", amount)
}
