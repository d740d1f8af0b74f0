use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Business-wide tax parameters.
///
/// Read once when a settlement session opens and held immutable for the
/// whole allocation flow; never re-fetched mid-computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSettings {
    /// IVA rate as a percentage (e.g. 19 for 19%).
    pub iva_rate: Decimal,
    /// Withholding (retefuente) rate as a percentage (e.g. 2.5).
    pub withholding_rate: Decimal,
    /// Minimum tax-exclusive base required before withholding applies.
    pub withholding_threshold: Decimal,
}

impl TaxSettings {
    /// Safe fallback when the backend settings are missing or malformed:
    /// no tax split, no withholding.
    pub fn safe_defaults() -> Self {
        Self {
            iva_rate: Decimal::ZERO,
            withholding_rate: Decimal::ZERO,
            withholding_threshold: Decimal::ZERO,
        }
    }

    /// A withholding rate outside (0, 100] cannot produce a meaningful
    /// deduction and is treated as non-applicable.
    pub fn withholding_rate_valid(&self) -> bool {
        self.withholding_rate > Decimal::ZERO && self.withholding_rate <= Decimal::from(100)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.iva_rate < Decimal::ZERO || self.iva_rate > Decimal::from(100) {
            return Err(format!("IVA rate out of range: {}", self.iva_rate));
        }
        if self.withholding_threshold < Decimal::ZERO {
            return Err(format!(
                "Withholding threshold cannot be negative: {}",
                self.withholding_threshold
            ));
        }
        Ok(())
    }
}

/// Wire shape of the business settings endpoint.
///
/// The backend names the withholding fields `reteRate` / `reteThreshold`;
/// the internal model uses the explicit names above. All fields are
/// optional on the wire so a sparse payload degrades instead of failing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSettingsDto {
    pub iva_rate: Option<Decimal>,
    pub rete_rate: Option<Decimal>,
    pub rete_threshold: Option<Decimal>,
}

impl From<TaxSettingsDto> for TaxSettings {
    fn from(dto: TaxSettingsDto) -> Self {
        let defaults = TaxSettings::safe_defaults();
        let settings = TaxSettings {
            iva_rate: dto.iva_rate.unwrap_or(defaults.iva_rate),
            withholding_rate: dto.rete_rate.unwrap_or(defaults.withholding_rate),
            withholding_threshold: dto.rete_threshold.unwrap_or(defaults.withholding_threshold),
        };

        match settings.validate() {
            Ok(()) => settings,
            Err(reason) => {
                warn!("Invalid tax settings from backend ({}), using safe defaults", reason);
                defaults
            }
        }
    }
}
