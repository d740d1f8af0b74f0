mod withholding_calculator;

pub use withholding_calculator::{TaxBreakdown, WithholdingCalculator};
