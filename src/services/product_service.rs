// src/services/product_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{ListQuery, Paginated},
        response::{Filters, ListPage, Listed},
    },
    db::{InventoryRepository, ProductRepository},
    middleware::{
        context::RequestContext,
        rbac::{Ability, Model},
    },
    models::product::{
        AddProductVariantPayload, CreateProductPayload, Product, ProductDetails, ProductSummary,
        UpdateProductPayload, Variant, VariationAttribute,
    },
};

#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    inventory_repo: InventoryRepository,
    pool: PgPool,
}

impl ProductService {
    pub fn new(product_repo: ProductRepository, inventory_repo: InventoryRepository, pool: PgPool) -> Self {
        Self {
            product_repo,
            inventory_repo,
            pool,
        }
    }

    /// Produtos do closet ativo do usuário.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> Result<ListPage<ProductSummary>, AppError> {
        ctx.authorize(Ability::ViewAny, Model::Product)?;
        let closet_id = ctx.closet_id()?;

        let page = query.page_request();
        let pattern = query.search_pattern();

        let rows = self
            .product_repo
            .list_in_closet(closet_id, pattern.as_deref(), page)
            .await?;
        let total = self.product_repo.count_in_closet(closet_id, pattern.as_deref()).await?;

        let row_can = ctx.can_map(Model::Product, &[Ability::Delete]);
        Ok(ListPage {
            items: Paginated::new(rows, page, total).map(|item| Listed {
                item,
                can: row_can.clone(),
            }),
            filters: Filters { search: query.search.clone() },
            can: ctx.can_map(Model::Product, &[Ability::Create, Ability::DeleteAny]),
        })
    }

    pub async fn create_form(&self, ctx: &RequestContext) -> Result<ProductDetails, AppError> {
        ctx.authorize(Ability::Create, Model::Product)?;

        Ok(ProductDetails {
            product: None,
            product_variants: None,
            sizes: self.product_repo.list_sizes().await?,
            colors: self.product_repo.list_colors().await?,
        })
    }

    /// Cria o produto e já o vincula ao closet ativo.
    pub async fn store(&self, ctx: &RequestContext, payload: CreateProductPayload) -> Result<Product, AppError> {
        ctx.authorize(Ability::Create, Model::Product)?;
        let closet_id = ctx.closet_id()?;

        let description = payload.desc.as_deref().map(str::trim).filter(|d| !d.is_empty());

        let mut tx = self.pool.begin().await?;

        let product = self
            .product_repo
            .create(&mut *tx, payload.name.trim(), payload.sku.trim(), description, payload.price)
            .await?;
        self.product_repo
            .attach_to_closet(&mut *tx, product.id, closet_id)
            .await?;

        tx.commit().await?;

        tracing::info!(product_id = %product.id, closet_id = %closet_id, "Produto criado");
        Ok(product)
    }

    pub async fn details(&self, ctx: &RequestContext, id: Uuid) -> Result<ProductDetails, AppError> {
        ctx.authorize(Ability::View, Model::Product)?;
        let closet_id = ctx.closet_id()?;

        let product = self
            .product_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("product"))?;

        let variants = self.product_repo.variants_in_closet(product.id, closet_id).await?;

        Ok(ProductDetails {
            product: Some(product),
            product_variants: Some(variants),
            sizes: self.product_repo.list_sizes().await?,
            colors: self.product_repo.list_colors().await?,
        })
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: UpdateProductPayload,
    ) -> Result<Product, AppError> {
        ctx.authorize(Ability::Update, Model::Product)?;

        self.product_repo
            .update(
                &self.pool,
                id,
                payload.name.as_deref().map(str::trim),
                payload.sku.as_deref().map(str::trim),
                payload.desc.as_deref().map(str::trim).filter(|d| !d.is_empty()),
                payload.price,
            )
            .await?
            .ok_or(AppError::NotFound("product"))
    }

    pub async fn destroy(&self, ctx: &RequestContext, id: Uuid) -> Result<String, AppError> {
        ctx.authorize(Ability::Delete, Model::Product)?;

        let name = self
            .product_repo
            .soft_delete(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("product"))?;

        tracing::info!(product_id = %id, user_id = %ctx.user.id, "Produto excluído");
        Ok(name)
    }

    /// Cria uma variante (tamanho + cor) com saldo zerado no closet ativo.
    /// Tamanho ou cor inexistente aborta antes de qualquer escrita.
    pub async fn add_variant(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        payload: AddProductVariantPayload,
    ) -> Result<Variant, AppError> {
        ctx.authorize(Ability::Update, Model::Product)?;
        let closet_id = ctx.closet_id()?;

        let product = self
            .product_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("product"))?;

        let mut tx = self.pool.begin().await?;

        let size = self
            .product_repo
            .find_size(&mut *tx, payload.size_id)
            .await?
            .ok_or(AppError::NotFound("size"))?;
        let color = self
            .product_repo
            .find_color(&mut *tx, payload.color_id)
            .await?
            .ok_or(AppError::NotFound("color"))?;

        let sku = Variant::compose_sku(&product, &size, &color);
        let variant = self.product_repo.create_variant(&mut *tx, product.id, &sku).await?;

        self.inventory_repo
            .create_for_variant(&mut *tx, variant.id, closet_id)
            .await?;
        self.product_repo
            .create_variation(&mut *tx, variant.id, VariationAttribute::Size, size.id)
            .await?;
        self.product_repo
            .create_variation(&mut *tx, variant.id, VariationAttribute::Color, color.id)
            .await?;

        tx.commit().await?;

        tracing::info!(variant_id = %variant.id, sku = %variant.sku, "Variante criada");
        Ok(variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sqlx::postgres::PgPoolOptions;

    use crate::middleware::rbac::Permissions;
    use crate::models::auth::User;

    fn service() -> ProductService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        ProductService::new(
            ProductRepository::new(pool.clone()),
            InventoryRepository::new(pool.clone()),
            pool,
        )
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

    #[tokio::test]
    async fn store_needs_create_permission() {
        let payload = CreateProductPayload {
            name: "Camiseta".into(),
            sku: "CAM".into(),
            desc: None,
            price: Decimal::ONE,
        };
        let result = service().store(&ctx(&["product:view"]), payload).await;

        assert!(matches!(
            result,
            Err(AppError::Forbidden { ability: Ability::Create, model: Model::Product })
        ));
    }

    #[tokio::test]
    async fn listing_without_an_active_closet_fails() {
        let result = service()
            .list(&ctx(&["product:view-any"]), &ListQuery::default())
            .await;

        assert!(matches!(result, Err(AppError::NoActiveCloset)));
    }

    #[tokio::test]
    async fn adding_a_variant_without_a_closet_fails_before_any_query() {
        let payload = AddProductVariantPayload {
            size_id: Uuid::new_v4(),
            color_id: Uuid::new_v4(),
        };
        let result = service()
            .add_variant(&ctx(&["product:update"]), Uuid::new_v4(), payload)
            .await;

        assert!(matches!(result, Err(AppError::NoActiveCloset)));
    }
}
