use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Closed set of payment instrument kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstrumentKind {
    Cash,
    Transfer,
    Check,
    Other,
}

impl std::fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentKind::Cash => write!(f, "CASH"),
            InstrumentKind::Transfer => write!(f, "TRANSFER"),
            InstrumentKind::Check => write!(f, "CHECK"),
            InstrumentKind::Other => write!(f, "OTHER"),
        }
    }
}

impl std::str::FromStr for InstrumentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CASH" => Ok(InstrumentKind::Cash),
            "TRANSFER" => Ok(InstrumentKind::Transfer),
            "CHECK" => Ok(InstrumentKind::Check),
            "OTHER" => Ok(InstrumentKind::Other),
            _ => Err(format!("Invalid instrument kind: {}", s)),
        }
    }
}

/// One payment instrument declared for a settlement session.
///
/// Instruments are structured data from the start; they are never
/// reconstructed by parsing a description string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInstrument {
    pub kind: InstrumentKind,
    pub amount: Decimal,
    /// Required iff `kind` is `Transfer`; must be absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_reference: Option<String>,
}

impl PaymentInstrument {
    pub fn new(kind: InstrumentKind, amount: Decimal) -> Self {
        Self {
            kind,
            amount,
            bank_reference: None,
        }
    }

    pub fn transfer(amount: Decimal, bank_reference: impl Into<String>) -> Self {
        Self {
            kind: InstrumentKind::Transfer,
            amount,
            bank_reference: Some(bank_reference.into()),
        }
    }

    /// An instrument only counts toward the reconciled sum when its
    /// amount is positive.
    pub fn is_counted(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn validate(&self) -> Result<()> {
        if self.amount < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "{} amount cannot be negative",
                self.kind
            )));
        }

        let has_bank = self
            .bank_reference
            .as_deref()
            .map(|b| !b.trim().is_empty())
            .unwrap_or(false);

        match self.kind {
            InstrumentKind::Transfer if !has_bank => Err(AppError::validation(
                "Transfer instrument requires a bank reference".to_string(),
            )),
            InstrumentKind::Transfer => Ok(()),
            _ if has_bank => Err(AppError::validation(format!(
                "{} instrument must not carry a bank reference",
                self.kind
            ))),
            _ => Ok(()),
        }
    }
}
