mod tax_settings;

pub use tax_settings::{TaxSettings, TaxSettingsDto};
