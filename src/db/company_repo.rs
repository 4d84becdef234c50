// src/db/company_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    models::company::{Address, AddressInput, AddressOwner, Company, CompanySummary, Country},
};

const COMPANY_COLUMNS: &str = "id, name, abbreviation, logo, created_at, updated_at";
const ADDRESS_COLUMNS: &str = "id, owner_kind, owner_id, line_1, line_2, zip_code, city, \
                               state_or_region, country_id, created_at, updated_at";

#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    /// Página de empresas, filtrando por nome OU sigla.
    pub async fn list(
        &self,
        pattern: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<CompanySummary>, AppError> {
        let companies = sqlx::query_as::<_, CompanySummary>(
            r#"
            SELECT id, name, abbreviation, logo, created_at
            FROM companies
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR name ILIKE $1 OR abbreviation ILIKE $1)
            ORDER BY name ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }

    pub async fn count(&self, pattern: Option<&str>) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM companies
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR name ILIKE $1 OR abbreviation ILIKE $1)
            "#,
        )
        .bind(pattern)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }

    /// Endereço de um dono qualquer (tipo + id).
    pub async fn find_address(&self, owner: AddressOwner) -> Result<Option<Address>, AppError> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE owner_kind = $1 AND owner_id = $2"
        ))
        .bind(owner.kind)
        .bind(owner.id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(address)
    }

    pub async fn list_countries(&self) -> Result<Vec<Country>, AppError> {
        let countries = sqlx::query_as::<_, Country>("SELECT id, name, code FROM countries ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(countries)
    }

    pub async fn country_exists<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM countries WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    // ---
    // Escrita (transacional)
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        abbreviation: &str,
        logo: &str,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(&format!(
            "INSERT INTO companies (name, abbreviation, logo) VALUES ($1, $2, $3) RETURNING {COMPANY_COLUMNS}"
        ))
        .bind(name)
        .bind(abbreviation)
        .bind(logo)
        .fetch_one(executor)
        .await?;
        Ok(company)
    }

    /// Atualiza os campos do formulário. `logo = None` mantém o caminho atual.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        abbreviation: &str,
        logo: Option<&str>,
    ) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(&format!(
            r#"
            UPDATE companies
            SET name = $2,
                abbreviation = $3,
                logo = COALESCE($4, logo),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {COMPANY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(abbreviation)
        .bind(logo)
        .fetch_optional(executor)
        .await?;
        Ok(company)
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let name = sqlx::query_scalar::<_, String>(
            "UPDATE companies SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL RETURNING name",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(name)
    }

    /// Cria o endereço do dono se não existir; senão, atualiza o existente.
    pub async fn upsert_address<'e, E>(
        &self,
        executor: E,
        owner: AddressOwner,
        input: &AddressInput,
    ) -> Result<Address, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let address = sqlx::query_as::<_, Address>(&format!(
            r#"
            INSERT INTO addresses (
                owner_kind, owner_id, line_1, line_2, zip_code, city, state_or_region, country_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (owner_kind, owner_id)
            DO UPDATE SET
                line_1 = EXCLUDED.line_1,
                line_2 = EXCLUDED.line_2,
                zip_code = EXCLUDED.zip_code,
                city = EXCLUDED.city,
                state_or_region = EXCLUDED.state_or_region,
                country_id = EXCLUDED.country_id,
                updated_at = NOW()
            RETURNING {ADDRESS_COLUMNS}
            "#
        ))
        .bind(owner.kind)
        .bind(owner.id)
        .bind(&input.line_1)
        .bind(input.line_2.as_deref())
        .bind(&input.zip_code)
        .bind(&input.city)
        .bind(input.state_or_region.as_deref())
        .bind(input.country_id)
        .fetch_one(executor)
        .await?;
        Ok(address)
    }
}
