// src/db/shipment_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    models::shipment::{Shipment, ShipmentDraft, ShipmentSummary, ShipmentVariantLine},
};

const SHIPMENT_COLUMNS: &str = "id, closet_id, supplier_id, reference, notes, created_at, updated_at";

#[derive(Clone)]
pub struct ShipmentRepository {
    pool: PgPool,
}

impl ShipmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    /// Remessas do closet com a contagem de variantes.
    pub async fn list_in_closet(
        &self,
        closet_id: Uuid,
        pattern: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<ShipmentSummary>, AppError> {
        let shipments = sqlx::query_as::<_, ShipmentSummary>(
            r#"
            SELECT s.id, s.reference, s.supplier_id,
                   COUNT(sv.variant_id) AS variant_count,
                   s.created_at
            FROM shipments s
            LEFT JOIN shipment_variants sv ON sv.shipment_id = s.id
            WHERE s.closet_id = $1
              AND s.deleted_at IS NULL
              AND ($2::text IS NULL OR s.reference ILIKE $2)
            GROUP BY s.id
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(closet_id)
        .bind(pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(shipments)
    }

    pub async fn count_in_closet(&self, closet_id: Uuid, pattern: Option<&str>) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM shipments
            WHERE closet_id = $1
              AND deleted_at IS NULL
              AND ($2::text IS NULL OR reference ILIKE $2)
            "#,
        )
        .bind(closet_id)
        .bind(pattern)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Remessa do closet; de outro closet conta como inexistente.
    pub async fn find_in_closet(&self, id: Uuid, closet_id: Uuid) -> Result<Option<Shipment>, AppError> {
        let shipment = sqlx::query_as::<_, Shipment>(&format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = $1 AND closet_id = $2 AND deleted_at IS NULL"
        ))
        .bind(id)
        .bind(closet_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(shipment)
    }

    /// Mesma busca, mas travando a remessa dentro de uma transação.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Shipment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let shipment = sqlx::query_as::<_, Shipment>(&format!(
            "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(shipment)
    }

    pub async fn variant_lines(&self, shipment_id: Uuid) -> Result<Vec<ShipmentVariantLine>, AppError> {
        let lines = sqlx::query_as::<_, ShipmentVariantLine>(
            r#"
            SELECT sv.variant_id, v.sku, sv.quantity
            FROM shipment_variants sv
            JOIN variants v ON v.id = sv.variant_id
            WHERE sv.shipment_id = $1
            ORDER BY v.sku ASC
            "#,
        )
        .bind(shipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    pub async fn variant_exists<'e, E>(&self, executor: E, variant_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM variants WHERE id = $1)")
            .bind(variant_id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    // ---
    // Escrita (transacional)
    // ---

    pub async fn create<'e, E>(&self, executor: E, draft: &ShipmentDraft) -> Result<Shipment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let shipment = sqlx::query_as::<_, Shipment>(&format!(
            r#"
            INSERT INTO shipments (closet_id, supplier_id, reference, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING {SHIPMENT_COLUMNS}
            "#
        ))
        .bind(draft.closet_id)
        .bind(draft.supplier_id)
        .bind(&draft.reference)
        .bind(draft.notes.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(shipment)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        closet_id: Uuid,
        reference: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Option<Shipment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let shipment = sqlx::query_as::<_, Shipment>(&format!(
            r#"
            UPDATE shipments
            SET reference = COALESCE($2, reference),
                notes = COALESCE($3, notes),
                updated_at = NOW()
            WHERE id = $1 AND closet_id = $4 AND deleted_at IS NULL
            RETURNING {SHIPMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(reference)
        .bind(notes)
        .bind(closet_id)
        .fetch_optional(executor)
        .await?;
        Ok(shipment)
    }

    pub async fn soft_delete<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        closet_id: Uuid,
    ) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reference = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE shipments SET deleted_at = NOW()
            WHERE id = $1 AND closet_id = $2 AND deleted_at IS NULL
            RETURNING reference
            "#,
        )
        .bind(id)
        .bind(closet_id)
        .fetch_optional(executor)
        .await?;
        Ok(reference)
    }

    /// Cria o vínculo remessa-variante. Vínculo já existente fica intacto (retorna false).
    pub async fn attach_variant<'e, E>(
        &self,
        executor: E,
        shipment_id: Uuid,
        variant_id: Uuid,
        quantity: i32,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO shipment_variants (shipment_id, variant_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (shipment_id, variant_id) DO NOTHING
            "#,
        )
        .bind(shipment_id)
        .bind(variant_id)
        .bind(quantity)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Remove o vínculo e devolve a quantidade que ele carregava.
    pub async fn detach_variant<'e, E>(
        &self,
        executor: E,
        shipment_id: Uuid,
        variant_id: Uuid,
    ) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quantity = sqlx::query_scalar::<_, i32>(
            r#"
            DELETE FROM shipment_variants
            WHERE shipment_id = $1 AND variant_id = $2
            RETURNING quantity
            "#,
        )
        .bind(shipment_id)
        .bind(variant_id)
        .fetch_optional(executor)
        .await?;
        Ok(quantity)
    }
}
