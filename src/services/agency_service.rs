// src/services/agency_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{ListQuery, Paginated},
        response::{Filters, ListPage, Listed},
    },
    db::{AgencyRepository, Membership, UserRepository},
    middleware::{
        context::RequestContext,
        rbac::{Ability, Model},
    },
    models::agency::{Agency, AgencyDetails, AgencySummary, CreateAgencyPayload, UpdateAgencyPayload},
};

#[derive(Clone)]
pub struct AgencyService {
    agency_repo: AgencyRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl AgencyService {
    pub fn new(agency_repo: AgencyRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { agency_repo, user_repo, pool }
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> Result<ListPage<AgencySummary>, AppError> {
        ctx.authorize(Ability::ViewAny, Model::Agency)?;

        let page = query.page_request();
        let pattern = query.search_pattern();

        let rows = self.agency_repo.list(pattern.as_deref(), page).await?;
        let total = self.agency_repo.count(pattern.as_deref()).await?;

        let row_can = ctx.can_map(Model::Agency, &[Ability::Delete]);
        Ok(ListPage {
            items: Paginated::new(rows, page, total).map(|item| Listed {
                item,
                can: row_can.clone(),
            }),
            filters: Filters { search: query.search.clone() },
            can: ctx.can_map(Model::Agency, &[Ability::Create, Ability::DeleteAny]),
        })
    }

    /// Formulário vazio: nada é buscado, só a permissão é conferida.
    pub fn create_form(&self, ctx: &RequestContext) -> Result<AgencyDetails, AppError> {
        ctx.authorize(Ability::Create, Model::Agency)?;

        Ok(AgencyDetails {
            agency: None,
            agency_users: None,
            non_agency_users: None,
        })
    }

    pub async fn store(&self, ctx: &RequestContext, payload: CreateAgencyPayload) -> Result<Agency, AppError> {
        ctx.authorize(Ability::Create, Model::Agency)?;

        let agency = self
            .agency_repo
            .create(&self.pool, payload.name.trim(), payload.email.trim())
            .await?;

        tracing::info!(agency_id = %agency.id, user_id = %ctx.user.id, "Agência criada");
        Ok(agency)
    }

    pub async fn details(&self, ctx: &RequestContext, id: Uuid) -> Result<AgencyDetails, AppError> {
        ctx.authorize(Ability::View, Model::Agency)?;

        let agency = self
            .agency_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("agency"))?;

        let members = self.user_repo.members(&self.pool, Membership::Agency, agency.id).await?;
        let non_members = self.user_repo.non_members(&self.pool, Membership::Agency, agency.id).await?;

        Ok(AgencyDetails {
            agency: Some(agency),
            agency_users: Some(members),
            non_agency_users: Some(non_members),
        })
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: UpdateAgencyPayload,
    ) -> Result<Agency, AppError> {
        ctx.authorize(Ability::Update, Model::Agency)?;

        self.agency_repo
            .update(
                &self.pool,
                id,
                payload.name.as_deref().map(str::trim),
                payload.email.as_deref().map(str::trim),
            )
            .await?
            .ok_or(AppError::NotFound("agency"))
    }

    /// Exclusão lógica. Devolve o nome para a mensagem de confirmação.
    pub async fn destroy(&self, ctx: &RequestContext, id: Uuid) -> Result<String, AppError> {
        ctx.authorize(Ability::Delete, Model::Agency)?;

        let name = self
            .agency_repo
            .soft_delete(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("agency"))?;

        tracing::info!(agency_id = %id, user_id = %ctx.user.id, "Agência excluída");
        Ok(name)
    }

    pub async fn attach_user(&self, ctx: &RequestContext, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        ctx.authorize(Ability::Update, Model::Agency)?;

        self.agency_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("agency"))?;

        let affected = self
            .user_repo
            .set_membership(&self.pool, Membership::Agency, user_id, Some(id))
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound("user"));
        }
        Ok(())
    }

    pub async fn detach_user(&self, ctx: &RequestContext, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        ctx.authorize(Ability::Update, Model::Agency)?;

        let affected = self
            .user_repo
            .clear_membership(&self.pool, Membership::Agency, user_id, id)
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound("user"));
        }
        Ok(())
    }
}
