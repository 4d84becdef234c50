// src/config.rs

pub mod settings;

use std::{sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::{
        i18n::I18nStore,
        storage::{DiskStorage, LogoStorage},
    },
    db::{
        AgencyRepository, CompanyRepository, InventoryRepository, ProductRepository, ShipmentRepository,
        UserRepository,
    },
    services::{
        auth::AuthService, AgencyService, CompanyService, InventoryService, ProductService, ShipmentService,
    },
};

pub use settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub agency_service: AgencyService,
    pub company_service: CompanyService,
    pub product_service: ProductService,
    pub shipment_service: ShipmentService,
    pub inventory_service: InventoryService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let storage = Arc::new(DiskStorage::new(&settings.storage_dir, settings.storage_url.clone()));
        Ok(Self::with_pool(db_pool, settings, storage))
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn with_pool(db_pool: PgPool, settings: &Settings, storage: Arc<dyn LogoStorage>) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let agency_repo = AgencyRepository::new(db_pool.clone());
        let company_repo = CompanyRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let shipment_repo = ShipmentRepository::new(db_pool.clone());

        Self {
            auth_service: AuthService::new(user_repo.clone(), settings.jwt_secret.clone()),
            agency_service: AgencyService::new(agency_repo, user_repo.clone(), db_pool.clone()),
            company_service: CompanyService::new(
                company_repo,
                user_repo,
                storage,
                settings.max_logo_bytes,
                db_pool.clone(),
            ),
            product_service: ProductService::new(product_repo, inventory_repo.clone(), db_pool.clone()),
            shipment_service: ShipmentService::new(shipment_repo, inventory_repo.clone(), db_pool.clone()),
            inventory_service: InventoryService::new(inventory_repo),
            i18n_store: Arc::new(I18nStore::default()),
            db_pool,
        }
    }
}
