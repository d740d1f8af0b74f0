mod tax_settings_repository;

pub use tax_settings_repository::{HttpTaxSettingsProvider, TaxSettingsProvider};
