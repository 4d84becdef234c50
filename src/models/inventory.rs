// src/models/inventory.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Saldo por (variante, closet) ---
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub closet_id: Uuid,
    pub in_stock: i32,    // Disponível
    pub in_reserve: i32,  // Comprometido com remessas
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Transferência entre os dois baldes. A soma dos baldes nunca muda.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockTransfer {
    /// in_stock -> in_reserve
    Reserve(i32),
    /// in_reserve -> in_stock
    Release(i32),
}

impl StockTransfer {
    pub fn kind(&self) -> StockMoveKind {
        match self {
            StockTransfer::Reserve(_) => StockMoveKind::Reserve,
            StockTransfer::Release(_) => StockMoveKind::Release,
        }
    }

    pub fn quantity(&self) -> i32 {
        match self {
            StockTransfer::Reserve(q) | StockTransfer::Release(q) => *q,
        }
    }

    /// Calcula os novos (in_stock, in_reserve). Falha em estouro de i32.
    pub fn apply(&self, in_stock: i32, in_reserve: i32) -> Result<(i32, i32), AppError> {
        let q = self.quantity();
        let (stock_delta, reserve_delta) = match self {
            StockTransfer::Reserve(_) => (q.checked_neg(), Some(q)),
            StockTransfer::Release(_) => (Some(q), q.checked_neg()),
        };

        let overflow = || AppError::InternalServerError(anyhow::anyhow!("Estouro no saldo do estoque"));
        let new_stock = stock_delta
            .and_then(|d| in_stock.checked_add(d))
            .ok_or_else(overflow)?;
        let new_reserve = reserve_delta
            .and_then(|d| in_reserve.checked_add(d))
            .ok_or_else(overflow)?;

        Ok((new_stock, new_reserve))
    }
}

// Mapeia o CREATE TYPE stock_move_kind do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "stock_move_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockMoveKind {
    Reserve,
    Release,
}

// --- Histórico de transferências ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMove {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub closet_id: Uuid,
    pub shipment_id: Uuid,
    pub quantity: i32,
    pub kind: StockMoveKind,
    pub created_at: DateTime<Utc>,
}
