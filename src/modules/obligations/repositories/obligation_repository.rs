use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::ClientWithMiddleware;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::core::{AppError, Result};
use crate::modules::obligations::models::{Obligation, ObligationDetailDto, ObligationListDto};
use crate::modules::settlements::models::SettlementRequest;

/// Write/read boundary to the backend's credit API.
///
/// Each call is a single independent HTTP request; the engine issues N
/// independent calls instead of batching. The backend owns every
/// obligation's pending balance and is trusted to reject a write whose
/// balance changed concurrently.
#[async_trait]
pub trait ObligationRepository: Send + Sync {
    /// List outstanding credit obligations for a client.
    async fn list_outstanding(&self, client_id: i64) -> Result<Vec<Obligation>>;

    /// Read one obligation through the detail endpoint.
    async fn find_by_id(&self, obligation_id: i64) -> Result<Option<Obligation>>;

    /// Create a settlement (abono) under the obligation named by the
    /// request. Returns the backend's settlement id.
    async fn create_settlement(&self, request: &SettlementRequest) -> Result<String>;

    /// Persist an obligation's withholding flag and computed amount.
    /// Sticky: once set, the backend keeps it.
    async fn update_withholding(
        &self,
        obligation_id: i64,
        withholding_amount: Decimal,
    ) -> Result<()>;

    /// Create an invoice for an obligation. Returns the invoice id.
    async fn create_invoice(&self, request: &SettlementRequest) -> Result<String>;

    /// Mark a previously created invoice as paid.
    async fn mark_invoice_paid(&self, invoice_id: &str) -> Result<()>;
}

/// Marker the backend places in conflict payloads when the obligation
/// already carries an invoice/settlement.
const ALREADY_SETTLED_CODE: &str = "YA_FACTURADO";

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct CreatedResource {
    id: String,
}

/// HTTP implementation over the backend REST API.
pub struct HttpObligationRepository {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl HttpObligationRepository {
    pub fn new(client: ClientWithMiddleware, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Map a non-success response to the error taxonomy. Conflict bodies
    /// split in two: the duplicate-invoice marker means a safe skip, any
    /// other conflict means the obligation changed under us and must
    /// surface as a failure. Backend messages are kept verbatim.
    async fn map_error(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body_text = response.text().await.unwrap_or_default();
        let body: BackendErrorBody = serde_json::from_str(&body_text).unwrap_or(BackendErrorBody {
            code: String::new(),
            message: body_text.clone(),
        });
        let message = if body.message.is_empty() {
            format!("backend returned {}", status)
        } else {
            body.message
        };

        match status {
            StatusCode::CONFLICT if body.code == ALREADY_SETTLED_CODE => {
                AppError::duplicate_settlement(message)
            }
            StatusCode::CONFLICT => AppError::balance_conflict(message),
            StatusCode::NOT_FOUND => AppError::not_found(message),
            _ => AppError::backend(message),
        }
    }
}

#[async_trait]
impl ObligationRepository for HttpObligationRepository {
    async fn list_outstanding(&self, client_id: i64) -> Result<Vec<Obligation>> {
        let url = format!("{}/creditos/pendientes/{}", self.base_url, client_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response).await);
        }

        let dtos: Vec<ObligationListDto> = response.json().await?;
        Ok(dtos.into_iter().map(Obligation::from).collect())
    }

    async fn find_by_id(&self, obligation_id: i64) -> Result<Option<Obligation>> {
        let url = format!("{}/creditos/{}", self.base_url, obligation_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::map_error(response).await);
        }

        // The detail endpoint uses its own field names; normalization
        // happens here, never at call sites.
        let dto: ObligationDetailDto = response.json().await?;
        Ok(Some(Obligation::from(dto)))
    }

    async fn create_settlement(&self, request: &SettlementRequest) -> Result<String> {
        let url = format!(
            "{}/creditos/{}/abonos",
            self.base_url, request.obligation_id
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response).await);
        }

        let created: CreatedResource = response.json().await?;
        Ok(created.id)
    }

    async fn update_withholding(
        &self,
        obligation_id: i64,
        withholding_amount: Decimal,
    ) -> Result<()> {
        let url = format!("{}/ventas/{}/retefuente", self.base_url, obligation_id);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "retefuente": true,
                "valorRetefuente": withholding_amount,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response).await);
        }
        Ok(())
    }

    async fn create_invoice(&self, request: &SettlementRequest) -> Result<String> {
        let url = format!("{}/facturas", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "referenceId": request.reference_id,
                "ventaId": request.obligation_id,
                "fecha": request.settlement_date,
                "sucursalId": request.branch_id,
                "clienteId": request.client_id,
                "observacion": request.reference,
                "valorRetefuente": request.withholding_amount,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response).await);
        }

        let created: CreatedResource = response.json().await?;
        Ok(created.id)
    }

    async fn mark_invoice_paid(&self, invoice_id: &str) -> Result<()> {
        let url = format!("{}/facturas/{}/pagar", self.base_url, invoice_id);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_error(response).await);
        }
        Ok(())
    }
}
