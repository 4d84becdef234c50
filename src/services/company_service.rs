// src/services/company_service.rs

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{ListQuery, Paginated},
        response::{Filters, ListPage, Listed},
        storage::{LogoStorage, Upload},
    },
    db::{CompanyRepository, Membership, UserRepository},
    middleware::{
        context::RequestContext,
        rbac::{Ability, Model},
    },
    models::company::{AddressInput, AddressOwner, Company, CompanyDetails, CompanyForm, CompanySummary},
};

const LOGO_DIR: &str = "logos";

#[derive(Clone)]
pub struct CompanyService {
    company_repo: CompanyRepository,
    user_repo: UserRepository,
    storage: Arc<dyn LogoStorage>,
    max_logo_bytes: usize,
    pool: PgPool,
}

impl CompanyService {
    pub fn new(
        company_repo: CompanyRepository,
        user_repo: UserRepository,
        storage: Arc<dyn LogoStorage>,
        max_logo_bytes: usize,
        pool: PgPool,
    ) -> Self {
        Self {
            company_repo,
            user_repo,
            storage,
            max_logo_bytes,
            pool,
        }
    }

    /// Limite do arquivo de logo, usado também no limite do corpo da requisição.
    pub fn max_logo_bytes(&self) -> usize {
        self.max_logo_bytes
    }

    // O banco guarda o caminho; as telas recebem a URL pública
    fn public_logo(&self, logo: Option<String>) -> Option<String> {
        logo.map(|path| self.storage.url(&path))
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> Result<ListPage<CompanySummary>, AppError> {
        ctx.authorize(Ability::ViewAny, Model::Company)?;

        let page = query.page_request();
        let pattern = query.search_pattern();

        let rows = self.company_repo.list(pattern.as_deref(), page).await?;
        let total = self.company_repo.count(pattern.as_deref()).await?;

        let row_can = ctx.can_map(Model::Company, &[Ability::Delete]);
        Ok(ListPage {
            items: Paginated::new(rows, page, total).map(|mut item| {
                item.logo = self.public_logo(item.logo.take());
                Listed {
                    item,
                    can: row_can.clone(),
                }
            }),
            filters: Filters { search: query.search.clone() },
            can: ctx.can_map(Model::Company, &[Ability::Create, Ability::DeleteAny]),
        })
    }

    pub async fn create_form(&self, ctx: &RequestContext) -> Result<CompanyDetails, AppError> {
        ctx.authorize(Ability::Create, Model::Company)?;

        Ok(CompanyDetails {
            company: None,
            address: None,
            country: None,
            countries: self.company_repo.list_countries().await?,
            company_users: None,
            non_company_users: None,
        })
    }

    /// Cria a empresa com logo e endereço. O arquivo é removido se o banco falhar.
    pub async fn store(&self, ctx: &RequestContext, form: CompanyForm) -> Result<Company, AppError> {
        ctx.authorize(Ability::Create, Model::Company)?;

        let upload = form.logo.as_ref().ok_or(AppError::UploadFailed("logo"))?;
        let logo = self.upload_logo(upload).await?;

        match self.insert_with_address(&form, &logo).await {
            Ok(company) => {
                tracing::info!(company_id = %company.id, user_id = %ctx.user.id, "Empresa criada");
                Ok(company)
            }
            Err(e) => {
                self.discard_logo(&logo).await;
                Err(e)
            }
        }
    }

    async fn insert_with_address(&self, form: &CompanyForm, logo: &str) -> Result<Company, AppError> {
        let address = form.address().ok_or(AppError::PersistenceFailed("address"))?;

        let mut tx = self.pool.begin().await?;

        self.ensure_country(&mut tx, &address).await?;

        let company = self
            .company_repo
            .create(&mut *tx, form.name.trim(), form.abbreviation.trim(), logo)
            .await?;
        self.company_repo
            .upsert_address(&mut *tx, AddressOwner::company(company.id), &address)
            .await?;

        tx.commit().await?;
        Ok(company)
    }

    pub async fn details(&self, ctx: &RequestContext, id: Uuid) -> Result<CompanyDetails, AppError> {
        ctx.authorize(Ability::View, Model::Company)?;

        let mut company = self
            .company_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("company"))?;
        company.logo = self.public_logo(company.logo.take());

        let address = self.company_repo.find_address(AddressOwner::company(company.id)).await?;
        let countries = self.company_repo.list_countries().await?;
        let country = address
            .as_ref()
            .and_then(|a| countries.iter().find(|c| c.id == a.country_id).cloned());

        let members = self.user_repo.members(&self.pool, Membership::Company, company.id).await?;
        let non_members = self.user_repo.non_members(&self.pool, Membership::Company, company.id).await?;

        Ok(CompanyDetails {
            company: Some(company),
            address,
            country,
            countries,
            company_users: Some(members),
            non_company_users: Some(non_members),
        })
    }

    /// Atualização pelo formulário completo. Sem arquivo novo, o logo atual é mantido;
    /// com arquivo novo, o antigo é apagado depois do commit.
    pub async fn update(&self, ctx: &RequestContext, id: Uuid, form: CompanyForm) -> Result<Company, AppError> {
        ctx.authorize(Ability::Update, Model::Company)?;

        let previous = self
            .company_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("company"))?;

        let new_logo = match form.logo.as_ref() {
            Some(upload) => Some(self.upload_logo(upload).await?),
            None => None,
        };

        match self.update_with_address(id, &form, new_logo.as_deref()).await {
            Ok(company) => {
                if let (Some(_), Some(old)) = (&new_logo, &previous.logo) {
                    self.discard_logo(old).await;
                }
                tracing::info!(company_id = %company.id, user_id = %ctx.user.id, "Empresa atualizada");
                Ok(company)
            }
            Err(e) => {
                if let Some(logo) = &new_logo {
                    self.discard_logo(logo).await;
                }
                Err(e)
            }
        }
    }

    async fn update_with_address(
        &self,
        id: Uuid,
        form: &CompanyForm,
        logo: Option<&str>,
    ) -> Result<Company, AppError> {
        let address = form.address().ok_or(AppError::PersistenceFailed("address"))?;

        let mut tx = self.pool.begin().await?;

        self.ensure_country(&mut tx, &address).await?;

        let company = self
            .company_repo
            .update(&mut *tx, id, form.name.trim(), form.abbreviation.trim(), logo)
            .await?
            .ok_or(AppError::NotFound("company"))?;
        self.company_repo
            .upsert_address(&mut *tx, AddressOwner::company(company.id), &address)
            .await?;

        tx.commit().await?;
        Ok(company)
    }

    pub async fn destroy(&self, ctx: &RequestContext, id: Uuid) -> Result<String, AppError> {
        ctx.authorize(Ability::Delete, Model::Company)?;

        let name = self
            .company_repo
            .soft_delete(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("company"))?;

        tracing::info!(company_id = %id, user_id = %ctx.user.id, "Empresa excluída");
        Ok(name)
    }

    pub async fn attach_user(&self, ctx: &RequestContext, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        ctx.authorize(Ability::Update, Model::Company)?;

        self.company_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("company"))?;

        let affected = self
            .user_repo
            .set_membership(&self.pool, Membership::Company, user_id, Some(id))
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound("user"));
        }
        Ok(())
    }

    pub async fn detach_user(&self, ctx: &RequestContext, id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        ctx.authorize(Ability::Update, Model::Company)?;

        let affected = self
            .user_repo
            .clear_membership(&self.pool, Membership::Company, user_id, id)
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound("user"));
        }
        Ok(())
    }

    // ---
    // Auxiliares
    // ---

    async fn upload_logo(&self, upload: &Upload) -> Result<String, AppError> {
        upload.check("logo", self.max_logo_bytes)?;
        self.storage.put(LOGO_DIR, upload).await
    }

    async fn discard_logo(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            tracing::warn!("Falha ao remover o logo {}: {:?}", path, e);
        }
    }

    async fn ensure_country(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        address: &AddressInput,
    ) -> Result<(), AppError> {
        if !self.company_repo.country_exists(&mut **tx, address.country_id).await? {
            return Err(AppError::NotFound("country"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use sqlx::postgres::PgPoolOptions;

    use crate::middleware::rbac::Permissions;
    use crate::models::auth::User;

    /// Armazenamento em memória que registra o que foi gravado e apagado.
    #[derive(Default)]
    struct RecordingStorage {
        puts: Mutex<Vec<String>>,
        deletes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LogoStorage for RecordingStorage {
        async fn put(&self, dir: &str, _upload: &Upload) -> Result<String, AppError> {
            let path = format!("{dir}/novo.png");
            self.puts.lock().unwrap().push(path.clone());
            Ok(path)
        }

        async fn delete(&self, path: &str) -> Result<(), AppError> {
            self.deletes.lock().unwrap().push(path.to_string());
            Ok(())
        }

        fn url(&self, path: &str) -> String {
            format!("/storage/{path}")
        }
    }

    fn ctx(slugs: &[&str]) -> RequestContext {
        let now = chrono::Utc::now();
        RequestContext {
            user: User {
                id: Uuid::new_v4(),
                name: "Ana".into(),
                email: "ana@example.com".into(),
                company_id: None,
                agency_id: None,
                created_at: now,
                updated_at: now,
            },
            closet: None,
            permissions: Permissions::new(slugs.iter().map(|s| s.to_string())),
        }
    }

    fn service(storage: Arc<RecordingStorage>) -> CompanyService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        CompanyService::new(
            CompanyRepository::new(pool.clone()),
            UserRepository::new(pool.clone()),
            storage,
            1024,
            pool,
        )
    }

    fn form_with_logo(bytes: Vec<u8>, content_type: &str) -> CompanyForm {
        CompanyForm {
            name: "ACME".into(),
            abbreviation: "AC".into(),
            address_line_1: "Rua A, 1".into(),
            address_zip_code: "01000-000".into(),
            address_city: "São Paulo".into(),
            address_country: Some(Uuid::new_v4()),
            logo: Some(Upload {
                file_name: Some("logo.png".into()),
                content_type: Some(content_type.into()),
                bytes,
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn store_without_permission_never_touches_storage() {
        let storage = Arc::new(RecordingStorage::default());
        let result = service(storage.clone())
            .store(&ctx(&[]), form_with_logo(vec![1, 2, 3], "image/png"))
            .await;

        assert!(matches!(
            result,
            Err(AppError::Forbidden { ability: Ability::Create, model: Model::Company })
        ));
        assert!(storage.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_logo_is_an_upload_failure_before_any_write() {
        let storage = Arc::new(RecordingStorage::default());
        let result = service(storage.clone())
            .store(&ctx(&["company:create"]), form_with_logo(vec![1, 2, 3], "text/plain"))
            .await;

        assert!(matches!(result, Err(AppError::UploadFailed("logo"))));
        assert!(storage.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_logo_is_rejected() {
        let storage = Arc::new(RecordingStorage::default());
        let result = service(storage.clone())
            .store(&ctx(&["company:create"]), form_with_logo(vec![0; 2048], "image/png"))
            .await;

        assert!(matches!(result, Err(AppError::UploadFailed("logo"))));
    }

    #[tokio::test]
    async fn destroy_without_permission_is_forbidden() {
        let storage = Arc::new(RecordingStorage::default());
        let result = service(storage).destroy(&ctx(&["company:view"]), Uuid::new_v4()).await;

        assert!(matches!(
            result,
            Err(AppError::Forbidden { ability: Ability::Delete, model: Model::Company })
        ));
    }
}
