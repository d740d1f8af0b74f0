use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// An outstanding credit sale with a pending balance.
///
/// The backend exposes credits through two differently shaped read
/// endpoints (a list view and a detail view). Both normalize into this
/// one canonical type at the repository boundary; nothing downstream ever
/// sees the wire shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: i64,
    /// Human-facing consecutive number of the underlying sale.
    pub number: String,
    pub date: NaiveDate,
    pub client_id: i64,
    pub branch_id: i64,
    /// Total including IVA. Withholding is never subtracted from it.
    pub total_with_tax: Decimal,
    /// Subtotal as declared at sale time; may be stale or absent.
    pub declared_subtotal: Option<Decimal>,
    pub discount: Decimal,
    /// Authoritative outstanding balance, owned by the backend. This
    /// engine only reads it and submits settlement amounts against it.
    pub pending_balance: Decimal,
    /// Sticky flag, persisted once the obligation's withholding is decided.
    pub has_withholding: bool,
    pub withholding_amount: Decimal,
}

impl Obligation {
    pub fn is_closed(&self) -> bool {
        self.pending_balance <= Decimal::ZERO
    }

    pub fn validate(&self) -> Result<()> {
        if self.pending_balance < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Obligation {} has a negative pending balance",
                self.number
            )));
        }
        if self.total_with_tax < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "Obligation {} has a negative total",
                self.number
            )));
        }
        Ok(())
    }
}

/// Wire shape of the credit *list* endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObligationListDto {
    pub id: i64,
    pub numero: String,
    pub fecha: NaiveDate,
    pub cliente_id: i64,
    pub sucursal_id: i64,
    pub total: Decimal,
    pub subtotal: Option<Decimal>,
    #[serde(default)]
    pub descuento: Decimal,
    pub saldo_pendiente: Decimal,
    #[serde(default)]
    pub retefuente: bool,
    #[serde(default)]
    pub valor_retefuente: Decimal,
}

/// Wire shape of the credit *detail* endpoint. Same concepts, different
/// field names (e.g. `idSucursal` vs the list's `sucursalId`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObligationDetailDto {
    pub id: i64,
    pub consecutivo: String,
    pub fecha_venta: NaiveDate,
    pub id_cliente: i64,
    pub id_sucursal: i64,
    pub total_venta: Decimal,
    pub subtotal_declarado: Option<Decimal>,
    #[serde(default)]
    pub descuento: Decimal,
    pub saldo: Decimal,
    #[serde(default)]
    pub tiene_retefuente: bool,
    #[serde(default)]
    pub valor_retefuente: Decimal,
}

impl From<ObligationListDto> for Obligation {
    fn from(dto: ObligationListDto) -> Self {
        Self {
            id: dto.id,
            number: dto.numero,
            date: dto.fecha,
            client_id: dto.cliente_id,
            branch_id: dto.sucursal_id,
            total_with_tax: dto.total,
            declared_subtotal: dto.subtotal,
            discount: dto.descuento,
            pending_balance: dto.saldo_pendiente,
            has_withholding: dto.retefuente,
            withholding_amount: dto.valor_retefuente,
        }
    }
}

impl From<ObligationDetailDto> for Obligation {
    fn from(dto: ObligationDetailDto) -> Self {
        Self {
            id: dto.id,
            number: dto.consecutivo,
            date: dto.fecha_venta,
            client_id: dto.id_cliente,
            branch_id: dto.id_sucursal,
            total_with_tax: dto.total_venta,
            declared_subtotal: dto.subtotal_declarado,
            discount: dto.descuento,
            pending_balance: dto.saldo,
            has_withholding: dto.tiene_retefuente,
            withholding_amount: dto.valor_retefuente,
        }
    }
}
