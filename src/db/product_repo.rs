// src/db/product_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::{map_unique_violation, AppError}, pagination::PageRequest},
    models::product::{
        Color, Product, ProductSummary, Size, Variant, VariantLine, Variation, VariationAttribute,
    },
};

const PRODUCT_COLUMNS: &str = "id, name, sku, description, price, created_at, updated_at";

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    /// Produtos do closet, filtrando por nome OU SKU.
    pub async fn list_in_closet(
        &self,
        closet_id: Uuid,
        pattern: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<ProductSummary>, AppError> {
        let products = sqlx::query_as::<_, ProductSummary>(
            r#"
            SELECT p.id, p.name, p.sku, p.description, p.price, p.created_at
            FROM products p
            JOIN closet_products cp ON cp.product_id = p.id
            WHERE cp.closet_id = $1
              AND p.deleted_at IS NULL
              AND ($2::text IS NULL OR p.name ILIKE $2 OR p.sku ILIKE $2)
            ORDER BY p.name ASC, p.id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(closet_id)
        .bind(pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn count_in_closet(&self, closet_id: Uuid, pattern: Option<&str>) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM products p
            JOIN closet_products cp ON cp.product_id = p.id
            WHERE cp.closet_id = $1
              AND p.deleted_at IS NULL
              AND ($2::text IS NULL OR p.name ILIKE $2 OR p.sku ILIKE $2)
            "#,
        )
        .bind(closet_id)
        .bind(pattern)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    /// Variantes do produto com atributos e o saldo no closet informado.
    pub async fn variants_in_closet(
        &self,
        product_id: Uuid,
        closet_id: Uuid,
    ) -> Result<Vec<VariantLine>, AppError> {
        let variants = sqlx::query_as::<_, VariantLine>(
            r#"
            SELECT v.id, v.sku,
                   s.value AS size,
                   c.name AS color,
                   i.in_stock,
                   i.in_reserve
            FROM variants v
            LEFT JOIN variations vs ON vs.variant_id = v.id AND vs.attribute = 'SIZE'
            LEFT JOIN sizes s ON s.id = vs.attribute_id
            LEFT JOIN variations vc ON vc.variant_id = v.id AND vc.attribute = 'COLOR'
            LEFT JOIN colors c ON c.id = vc.attribute_id
            LEFT JOIN inventories i ON i.variant_id = v.id AND i.closet_id = $2
            WHERE v.product_id = $1
            ORDER BY v.sku ASC
            "#,
        )
        .bind(product_id)
        .bind(closet_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(variants)
    }

    pub async fn list_sizes(&self) -> Result<Vec<Size>, AppError> {
        let sizes = sqlx::query_as::<_, Size>("SELECT id, value FROM sizes ORDER BY value ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(sizes)
    }

    pub async fn list_colors(&self) -> Result<Vec<Color>, AppError> {
        let colors = sqlx::query_as::<_, Color>("SELECT id, name FROM colors ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(colors)
    }

    pub async fn find_size<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Size>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let size = sqlx::query_as::<_, Size>("SELECT id, value FROM sizes WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(size)
    }

    pub async fn find_color<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Color>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let color = sqlx::query_as::<_, Color>("SELECT id, name FROM colors WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(color)
    }

    // ---
    // Escrita (transacional)
    // ---

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        sku: &str,
        description: Option<&str>,
        price: Decimal,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (name, sku, description, price)
            VALUES ($1, $2, $3, $4)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(sku)
        .bind(description)
        .bind(price)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    /// Vincula o produto ao closet (idempotente).
    pub async fn attach_to_closet<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        closet_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO closet_products (closet_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(closet_id)
        .bind(product_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        sku: Option<&str>,
        description: Option<&str>,
        price: Option<Decimal>,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                sku = COALESCE($3, sku),
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(sku)
        .bind(description)
        .bind(price)
        .fetch_optional(executor)
        .await?;
        Ok(product)
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let name = sqlx::query_scalar::<_, String>(
            "UPDATE products SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL RETURNING name",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(name)
    }

    pub async fn create_variant<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        sku: &str,
    ) -> Result<Variant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Variant>(
            r#"
            INSERT INTO variants (product_id, sku)
            VALUES ($1, $2)
            RETURNING id, product_id, sku, created_at, updated_at
            "#,
        )
        .bind(product_id)
        .bind(sku)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, || sku.to_string()))
    }

    pub async fn create_variation<'e, E>(
        &self,
        executor: E,
        variant_id: Uuid,
        attribute: VariationAttribute,
        attribute_id: Uuid,
    ) -> Result<Variation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let variation = sqlx::query_as::<_, Variation>(
            r#"
            INSERT INTO variations (variant_id, attribute, attribute_id)
            VALUES ($1, $2, $3)
            RETURNING id, variant_id, attribute, attribute_id, created_at
            "#,
        )
        .bind(variant_id)
        .bind(attribute)
        .bind(attribute_id)
        .fetch_one(executor)
        .await?;
        Ok(variation)
    }
}
