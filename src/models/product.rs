// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::validation::not_blank;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Camiseta Básica")]
    pub name: String,
    #[schema(example = "CAM-BAS")]
    pub sku: String,
    pub description: Option<String>,
    #[schema(example = 59.9)]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Size {
    pub id: Uuid,
    #[schema(example = "M")]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Color {
    pub id: Uuid,
    #[schema(example = "Azul")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: Uuid,
    pub product_id: Uuid,
    #[schema(example = "CAM-BAS-M-Azul")]
    pub sku: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variant {
    /// SKU da variante: `{produto}-{tamanho}-{cor}`.
    pub fn compose_sku(product: &Product, size: &Size, color: &Color) -> String {
        format!("{}-{}-{}", product.sku, size.value, color.name)
    }
}

// Mapeia o CREATE TYPE variation_attribute do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "variation_attribute", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariationAttribute {
    Size,
    Color,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub attribute: VariationAttribute,
    pub attribute_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Variante como aparece na tela do produto: atributos + saldo no closet.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariantLine {
    pub id: Uuid,
    pub sku: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub in_stock: Option<i32>,
    pub in_reserve: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetails {
    pub product: Option<Product>,
    pub product_variants: Option<Vec<VariantLine>>,
    pub sizes: Vec<Size>,
    pub colors: Vec<Color>,
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("price_negative".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductPayload {
    #[validate(
        length(min = 1, max = 255, message = "name_required"),
        custom(function = "not_blank", message = "name_required")
    )]
    #[schema(example = "Camiseta Básica")]
    pub name: String,

    #[validate(
        length(min = 1, max = 64, message = "sku_required"),
        custom(function = "not_blank", message = "sku_required")
    )]
    #[schema(example = "CAM-BAS")]
    pub sku: String,

    pub desc: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = 59.9)]
    pub price: Decimal,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductPayload {
    #[validate(
        length(min = 1, max = 255, message = "name_required"),
        custom(function = "not_blank", message = "name_required")
    )]
    pub name: Option<String>,

    #[validate(
        length(min = 1, max = 64, message = "sku_required"),
        custom(function = "not_blank", message = "sku_required")
    )]
    pub sku: Option<String>,

    pub desc: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddProductVariantPayload {
    pub size_id: Uuid,
    pub color_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(sku: &str) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Camiseta".into(),
            sku: sku.into(),
            description: None,
            price: Decimal::new(5990, 2),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn variant_sku_joins_product_size_and_color() {
        let size = Size { id: Uuid::new_v4(), value: "M".into() };
        let color = Color { id: Uuid::new_v4(), name: "Azul".into() };

        assert_eq!(Variant::compose_sku(&product("CAM-BAS"), &size, &color), "CAM-BAS-M-Azul");
    }

    #[test]
    fn negative_price_is_rejected_but_zero_is_fine() {
        let mut payload = CreateProductPayload {
            name: "Camiseta".into(),
            sku: "CAM".into(),
            desc: None,
            price: Decimal::new(-1, 0),
        };
        assert!(payload.validate().is_err());

        payload.price = Decimal::ZERO;
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn whitespace_name_or_sku_is_rejected() {
        let payload = CreateProductPayload {
            name: "   ".into(),
            sku: "  ".into(),
            desc: None,
            price: Decimal::ZERO,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("sku"));

        let patch = UpdateProductPayload { name: Some("  ".into()), ..Default::default() };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn patch_with_no_fields_is_valid() {
        assert!(UpdateProductPayload::default().validate().is_ok());
    }
}
