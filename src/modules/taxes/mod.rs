pub mod models;
pub mod repositories;
pub mod services;

pub use models::{TaxSettings, TaxSettingsDto};
pub use repositories::{HttpTaxSettingsProvider, TaxSettingsProvider};
pub use services::{TaxBreakdown, WithholdingCalculator};
