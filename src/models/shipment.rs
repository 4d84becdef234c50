// src/models/shipment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::{error::AppError, validation::not_blank};
use crate::middleware::context::RequestContext;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: Uuid,
    pub closet_id: Uuid,
    pub supplier_id: Uuid,
    #[schema(example = "REM-2025-0001")]
    pub reference: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Os campos derivados de uma remessa nova, calculados antes do INSERT.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentDraft {
    pub closet_id: Uuid,
    pub supplier_id: Uuid,
    pub reference: String,
    pub notes: Option<String>,
}

impl ShipmentDraft {
    /// A remessa nasce no closet ativo do usuário, com ele como fornecedor.
    pub fn new(ctx: &RequestContext, payload: CreateShipmentPayload) -> Result<Self, AppError> {
        Ok(Self {
            closet_id: ctx.closet_id()?,
            supplier_id: ctx.user.id,
            reference: payload.reference.trim().to_string(),
            notes: payload.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentSummary {
    pub id: Uuid,
    pub reference: String,
    pub supplier_id: Uuid,
    pub variant_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Linha do pivot remessa-variante.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentVariantLine {
    pub variant_id: Uuid,
    pub sku: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentDetails {
    pub shipment: Shipment,
    pub shipment_variants: Vec<ShipmentVariantLine>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateShipmentPayload {
    #[validate(
        length(min = 1, max = 255, message = "reference_required"),
        custom(function = "not_blank", message = "reference_required")
    )]
    #[schema(example = "REM-2025-0001")]
    pub reference: String,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateShipmentPayload {
    #[validate(
        length(min = 1, max = 255, message = "reference_required"),
        custom(function = "not_blank", message = "reference_required")
    )]
    pub reference: Option<String>,
    pub notes: Option<String>,
}

fn validate_positive(val: i32) -> Result<(), ValidationError> {
    if val < 1 {
        let mut err = ValidationError::new("range");
        err.message = Some("quantity_positive".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddShipmentVariantPayload {
    pub variant_id: Uuid,

    #[validate(custom(function = "validate_positive"))]
    #[schema(example = 3)]
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::rbac::Permissions;
    use crate::models::auth::{Closet, User};

    fn ctx(closet: Option<Closet>) -> RequestContext {
        let now = Utc::now();
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
            closet,
            permissions: Permissions::default(),
        }
    }

    fn closet() -> Closet {
        Closet {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            warehouse_id: Uuid::new_v4(),
            name: "Loja Centro".into(),
            active: true,
        }
    }

    #[test]
    fn draft_takes_closet_and_supplier_from_context() {
        let ctx = ctx(Some(closet()));
        let draft = ShipmentDraft::new(
            &ctx,
            CreateShipmentPayload { reference: "  REM-1 ".into(), notes: Some("  ".into()) },
        )
        .unwrap();

        assert_eq!(draft.closet_id, ctx.closet.as_ref().unwrap().id);
        assert_eq!(draft.supplier_id, ctx.user.id);
        assert_eq!(draft.reference, "REM-1");
        assert_eq!(draft.notes, None);
    }

    #[test]
    fn draft_requires_an_active_closet() {
        let result = ShipmentDraft::new(
            &ctx(None),
            CreateShipmentPayload { reference: "REM-1".into(), notes: None },
        );
        assert!(matches!(result, Err(AppError::NoActiveCloset)));
    }

    #[test]
    fn blank_reference_is_rejected() {
        let payload = CreateShipmentPayload { reference: " \t ".into(), notes: None };
        assert!(payload.validate().is_err());

        let patch = UpdateShipmentPayload { reference: Some("   ".into()), notes: None };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn quantity_must_be_positive() {
        let payload = AddShipmentVariantPayload { variant_id: Uuid::new_v4(), quantity: 0 };
        assert!(payload.validate().is_err());

        let payload = AddShipmentVariantPayload { variant_id: Uuid::new_v4(), quantity: -3 };
        assert!(payload.validate().is_err());

        let payload = AddShipmentVariantPayload { variant_id: Uuid::new_v4(), quantity: 1 };
        assert!(payload.validate().is_ok());
    }
}
