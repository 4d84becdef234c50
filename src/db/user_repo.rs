// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Closet, User},
};

const USER_COLUMNS: &str = "id, name, email, company_id, agency_id, created_at, updated_at";

/// A qual organização um vínculo de usuário se refere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Company,
    Agency,
}

impl Membership {
    fn column(&self) -> &'static str {
        match self {
            Membership::Company => "company_id",
            Membership::Agency => "agency_id",
        }
    }
}

// O repositório de usuários, responsável pela tabela 'users' e seus vínculos
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Slugs de todas as permissões do usuário, via seus cargos.
    pub async fn permission_slugs(&self, user_id: Uuid) -> Result<Vec<String>, AppError> {
        let slugs = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT p.slug
            FROM user_roles ur
            JOIN role_permissions rp ON rp.role_id = ur.role_id
            JOIN permissions p ON p.id = rp.permission_id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(slugs)
    }

    /// O closet atual do usuário: o vínculo marcado como ativo.
    pub async fn active_closet(&self, user_id: Uuid) -> Result<Option<Closet>, AppError> {
        let closet = sqlx::query_as::<_, Closet>(
            r#"
            SELECT c.id, c.company_id, c.warehouse_id, c.name, c.active
            FROM closets c
            JOIN closet_users cu ON cu.closet_id = c.id
            WHERE cu.user_id = $1
              AND cu.active = TRUE
              AND c.deleted_at IS NULL
            ORDER BY cu.created_at ASC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(closet)
    }

    /// Membros da organização.
    pub async fn members<'e, E>(
        &self,
        executor: E,
        membership: Membership,
        org_id: Uuid,
    ) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {} = $1 ORDER BY name ASC",
            membership.column()
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(org_id)
            .fetch_all(executor)
            .await?;
        Ok(users)
    }

    /// Usuários que ainda não pertencem à organização (candidatos a vínculo).
    pub async fn non_members<'e, E>(
        &self,
        executor: E,
        membership: Membership,
        org_id: Uuid,
    ) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {} IS DISTINCT FROM $1 ORDER BY name ASC",
            membership.column()
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(org_id)
            .fetch_all(executor)
            .await?;
        Ok(users)
    }

    /// Define (ou limpa, com None) a organização do usuário. Retorna linhas afetadas.
    pub async fn set_membership<'e, E>(
        &self,
        executor: E,
        membership: Membership,
        user_id: Uuid,
        org_id: Option<Uuid>,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE users SET {} = $2, updated_at = NOW() WHERE id = $1",
            membership.column()
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(org_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Desvincula somente se o usuário pertence mesmo a essa organização.
    pub async fn clear_membership<'e, E>(
        &self,
        executor: E,
        membership: Membership,
        user_id: Uuid,
        org_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let column = membership.column();
        let sql = format!(
            "UPDATE users SET {column} = NULL, updated_at = NOW() WHERE id = $1 AND {column} = $2"
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(org_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
