// src/db/inventory_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    models::inventory::{Inventory, StockMove, StockTransfer},
};

const INVENTORY_COLUMNS: &str = "id, variant_id, closet_id, in_stock, in_reserve, created_at, updated_at";

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Saldo zerado para uma variante recém-criada no closet.
    pub async fn create_for_variant<'e, E>(
        &self,
        executor: E,
        variant_id: Uuid,
        closet_id: Uuid,
    ) -> Result<Inventory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inventory = sqlx::query_as::<_, Inventory>(&format!(
            r#"
            INSERT INTO inventories (variant_id, closet_id, in_stock, in_reserve)
            VALUES ($1, $2, 0, 0)
            RETURNING {INVENTORY_COLUMNS}
            "#
        ))
        .bind(variant_id)
        .bind(closet_id)
        .fetch_one(executor)
        .await?;
        Ok(inventory)
    }

    /// Busca o saldo travando a linha (FOR UPDATE) até o fim da transação.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        variant_id: Uuid,
        closet_id: Uuid,
    ) -> Result<Option<Inventory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inventory = sqlx::query_as::<_, Inventory>(&format!(
            r#"
            SELECT {INVENTORY_COLUMNS}
            FROM inventories
            WHERE variant_id = $1 AND closet_id = $2
            FOR UPDATE
            "#
        ))
        .bind(variant_id)
        .bind(closet_id)
        .fetch_optional(executor)
        .await?;
        Ok(inventory)
    }

    pub async fn set_levels<'e, E>(
        &self,
        executor: E,
        inventory_id: Uuid,
        in_stock: i32,
        in_reserve: i32,
    ) -> Result<Inventory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inventory = sqlx::query_as::<_, Inventory>(&format!(
            r#"
            UPDATE inventories
            SET in_stock = $2, in_reserve = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {INVENTORY_COLUMNS}
            "#
        ))
        .bind(inventory_id)
        .bind(in_stock)
        .bind(in_reserve)
        .fetch_one(executor)
        .await?;
        Ok(inventory)
    }

    /// Registra a transferência no histórico.
    pub async fn record_stock_move<'e, E>(
        &self,
        executor: E,
        inventory: &Inventory,
        shipment_id: Uuid,
        transfer: StockTransfer,
    ) -> Result<StockMove, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stock_move = sqlx::query_as::<_, StockMove>(
            r#"
            INSERT INTO stock_moves (variant_id, closet_id, shipment_id, quantity, kind)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, variant_id, closet_id, shipment_id, quantity, kind, created_at
            "#,
        )
        .bind(inventory.variant_id)
        .bind(inventory.closet_id)
        .bind(shipment_id)
        .bind(transfer.quantity())
        .bind(transfer.kind())
        .fetch_one(executor)
        .await?;
        Ok(stock_move)
    }

    /// Histórico do closet, mais recentes primeiro.
    pub async fn list_stock_moves(
        &self,
        closet_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<StockMove>, AppError> {
        let moves = sqlx::query_as::<_, StockMove>(
            r#"
            SELECT id, variant_id, closet_id, shipment_id, quantity, kind, created_at
            FROM stock_moves
            WHERE closet_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(closet_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(moves)
    }

    pub async fn count_stock_moves(&self, closet_id: Uuid) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stock_moves WHERE closet_id = $1")
            .bind(closet_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
