// src/db/agency_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    models::agency::{Agency, AgencySummary},
};

const AGENCY_COLUMNS: &str = "id, name, email, created_at, updated_at";

#[derive(Clone)]
pub struct AgencyRepository {
    pool: PgPool,
}

impl AgencyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura (pool principal)
    // ---

    /// Página de agências ativas, filtrando por nome OU e-mail (ILIKE).
    pub async fn list(
        &self,
        pattern: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<AgencySummary>, AppError> {
        let agencies = sqlx::query_as::<_, AgencySummary>(
            r#"
            SELECT id, name, email, created_at
            FROM agencies
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1)
            ORDER BY name ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(agencies)
    }

    pub async fn count(&self, pattern: Option<&str>) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM agencies
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1)
            "#,
        )
        .bind(pattern)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Agency>, AppError> {
        let agency = sqlx::query_as::<_, Agency>(&format!(
            "SELECT {AGENCY_COLUMNS} FROM agencies WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(agency)
    }

    // ---
    // Escrita (aceita transação)
    // ---

    pub async fn create<'e, E>(&self, executor: E, name: &str, email: &str) -> Result<Agency, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let agency = sqlx::query_as::<_, Agency>(&format!(
            "INSERT INTO agencies (name, email) VALUES ($1, $2) RETURNING {AGENCY_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .fetch_one(executor)
        .await?;
        Ok(agency)
    }

    /// Atualização parcial: campos `None` mantêm o valor atual.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Agency>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let agency = sqlx::query_as::<_, Agency>(&format!(
            r#"
            UPDATE agencies
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {AGENCY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_optional(executor)
        .await?;
        Ok(agency)
    }

    /// Exclusão lógica. Retorna o nome da agência excluída, se existia.
    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let name = sqlx::query_scalar::<_, String>(
            "UPDATE agencies SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL RETURNING name",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(name)
    }
}
