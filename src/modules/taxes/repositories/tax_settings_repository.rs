use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use tracing::warn;

use crate::core::Result;
use crate::modules::taxes::models::{TaxSettings, TaxSettingsDto};

/// Source of the business tax settings.
///
/// A settlement session reads these once at open; the snapshot stays
/// immutable for the session's computations.
#[async_trait]
pub trait TaxSettingsProvider: Send + Sync {
    async fn fetch_settings(&self) -> Result<TaxSettings>;
}

/// Reads tax settings from the backend's business-configuration endpoint.
pub struct HttpTaxSettingsProvider {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl HttpTaxSettingsProvider {
    pub fn new(client: ClientWithMiddleware, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl TaxSettingsProvider for HttpTaxSettingsProvider {
    async fn fetch_settings(&self) -> Result<TaxSettings> {
        let url = format!("{}/negocio/configuracion", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            // Missing settings degrade to no-withholding defaults rather
            // than blocking the session.
            warn!(
                status = %response.status(),
                "Tax settings unavailable, using safe defaults"
            );
            return Ok(TaxSettings::safe_defaults());
        }

        match response.json::<TaxSettingsDto>().await {
            Ok(dto) => Ok(TaxSettings::from(dto)),
            Err(err) => {
                warn!("Malformed tax settings payload ({}), using safe defaults", err);
                Ok(TaxSettings::safe_defaults())
            }
        }
    }
}
