// src/models/agency.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::not_blank;
use crate::models::auth::User;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Agency {
    pub id: Uuid,
    #[schema(example = "Agência Central")]
    pub name: String,
    #[schema(example = "contato@agencia.com")]
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Linha da listagem de agências.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AgencySummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Tela de detalhes (e formulário de criação, com tudo nulo).
#[derive(Debug, Serialize, ToSchema)]
pub struct AgencyDetails {
    pub agency: Option<Agency>,
    pub agency_users: Option<Vec<User>>,
    pub non_agency_users: Option<Vec<User>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAgencyPayload {
    #[validate(
        length(min = 1, max = 255, message = "name_required"),
        custom(function = "not_blank", message = "name_required")
    )]
    #[schema(example = "Agência Central")]
    pub name: String,

    #[validate(email(message = "email_invalid"))]
    #[schema(example = "contato@agencia.com")]
    pub email: String,
}

/// Atualização parcial: só os campos enviados mudam.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAgencyPayload {
    #[validate(
        length(min = 1, max = 255, message = "name_required"),
        custom(function = "not_blank", message = "name_required")
    )]
    pub name: Option<String>,

    #[validate(email(message = "email_invalid"))]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        let payload = CreateAgencyPayload {
            name: "    ".into(),
            email: "contato@agencia.com".into(),
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));

        let patch = UpdateAgencyPayload { name: Some(" ".into()), email: None };
        assert!(patch.validate().is_err());
        assert!(UpdateAgencyPayload::default().validate().is_ok());
    }
}
