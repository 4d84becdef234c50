// src/models/company.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::common::{storage::Upload, validation::not_blank};
use crate::models::auth::User;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    #[schema(example = "ACME Confecções")]
    pub name: String,
    #[schema(example = "ACME")]
    pub abbreviation: String,
    /// Caminho armazenado (na listagem/detalhes vira URL pública).
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CompanySummary {
    pub id: Uuid,
    pub name: String,
    pub abbreviation: String,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Mapeia o CREATE TYPE address_owner_kind do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "address_owner_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerKind {
    Company,
}

/// Referência ao dono de um endereço: tipo + id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressOwner {
    pub kind: OwnerKind,
    pub id: Uuid,
}

impl AddressOwner {
    pub fn company(id: Uuid) -> Self {
        Self { kind: OwnerKind::Company, id }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub owner_kind: OwnerKind,
    pub owner_id: Uuid,
    pub line_1: String,
    pub line_2: Option<String>,
    pub zip_code: String,
    pub city: String,
    pub state_or_region: Option<String>,
    pub country_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: Uuid,
    #[schema(example = "Brasil")]
    pub name: String,
    #[schema(example = "BR")]
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompanyDetails {
    pub company: Option<Company>,
    pub address: Option<Address>,
    pub country: Option<Country>,
    pub countries: Vec<Country>,
    pub company_users: Option<Vec<User>>,
    pub non_company_users: Option<Vec<User>>,
}

/// Os campos de endereço já validados.
#[derive(Debug, Clone)]
pub struct AddressInput {
    pub line_1: String,
    pub line_2: Option<String>,
    pub zip_code: String,
    pub city: String,
    pub state_or_region: Option<String>,
    pub country_id: Uuid,
}

/// Formulário multipart de empresa (criação e atualização).
#[derive(Debug, Default, Validate)]
pub struct CompanyForm {
    #[validate(
        length(min = 1, max = 255, message = "name_required"),
        custom(function = "not_blank", message = "name_required")
    )]
    pub name: String,

    #[validate(length(min = 1, max = 10, message = "abbreviation_length"))]
    pub abbreviation: String,

    #[validate(length(min = 1, message = "address_line_1_required"))]
    pub address_line_1: String,

    pub address_line_2: Option<String>,

    #[validate(length(min = 1, message = "address_zip_code_required"))]
    pub address_zip_code: String,

    #[validate(length(min = 1, message = "address_city_required"))]
    pub address_city: String,

    pub address_state_or_region: Option<String>,

    #[validate(required(message = "address_country_required"))]
    pub address_country: Option<Uuid>,

    pub logo: Option<Upload>,
}

impl CompanyForm {
    /// Validação da criação: além dos campos, o logo é obrigatório.
    pub fn validate_store(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if self.logo.is_none() {
            let mut err = ValidationError::new("required");
            err.message = Some("logo_required".into());
            errors.add("logo", err);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Extrai o endereço do formulário. Chamar depois de `validate()`.
    pub fn address(&self) -> Option<AddressInput> {
        Some(AddressInput {
            line_1: self.address_line_1.clone(),
            line_2: self.address_line_2.clone().filter(|s| !s.is_empty()),
            zip_code: self.address_zip_code.clone(),
            city: self.address_city.clone(),
            state_or_region: self.address_state_or_region.clone().filter(|s| !s.is_empty()),
            country_id: self.address_country?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> CompanyForm {
        CompanyForm {
            name: "ACME".into(),
            abbreviation: "AC".into(),
            address_line_1: "Rua A, 1".into(),
            address_line_2: Some(String::new()),
            address_zip_code: "01000-000".into(),
            address_city: "São Paulo".into(),
            address_state_or_region: Some("SP".into()),
            address_country: Some(Uuid::new_v4()),
            logo: None,
        }
    }

    #[test]
    fn complete_form_is_valid_and_yields_address() {
        let form = form();
        assert!(form.validate().is_ok());

        let address = form.address().expect("address");
        assert_eq!(address.line_2, None);
        assert_eq!(address.state_or_region.as_deref(), Some("SP"));
    }

    #[test]
    fn store_requires_a_logo_but_update_does_not() {
        let form = form();
        assert!(form.validate().is_ok());

        let errors = form.validate_store().unwrap_err();
        assert!(errors.field_errors().contains_key("logo"));
    }

    #[test]
    fn long_abbreviation_and_missing_country_are_rejected() {
        let mut form = form();
        form.abbreviation = "ABCDEFGHIJK".into();
        form.address_country = None;

        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("abbreviation"));
        assert!(fields.contains_key("address_country"));
    }
}
