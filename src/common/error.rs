use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;
use crate::middleware::rbac::{Ability, Model};

// Nosso tipo de erro interno. Os serviços e repositórios só conhecem este.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Ação '{ability}' negada em '{model}'")]
    Forbidden { ability: Ability, model: Model },

    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("Falha no upload do arquivo '{0}'")]
    UploadFailed(&'static str),

    #[error("Falha ao persistir {0}")]
    PersistenceFailed(&'static str),

    #[error("Usuário sem closet ativo")]
    NoActiveCloset,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// O erro que sai pela borda HTTP: status + mensagem traduzida + campo.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    pub field: Option<String>,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            field: None,
            details: None,
        }
    }
}

impl AppError {
    /// Chave do catálogo de mensagens e status HTTP correspondente.
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::UserNotFound => (StatusCode::UNAUTHORIZED, "user_not_found"),
            AppError::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::UploadFailed(_) => (StatusCode::CONFLICT, "upload_failed"),
            AppError::PersistenceFailed(_) => (StatusCode::BAD_REQUEST, "persistence_failed"),
            AppError::NoActiveCloset => (StatusCode::BAD_REQUEST, "no_active_closet"),
            AppError::UniqueConstraintViolation(_) => (StatusCode::CONFLICT, "already_exists"),
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::JwtError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, key) = self.classify();
        let lang = locale.0.as_str();

        match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => store.translate(lang, m.as_ref()),
                            None => store.translate(lang, e.code.as_ref()),
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                let first_field = errors.field_errors().keys().min().map(|f| f.to_string());
                ApiError {
                    status,
                    error: store.translate(lang, key),
                    field: first_field,
                    details: Some(Value::Object(details)),
                }
            }
            AppError::Forbidden { ability, model } => ApiError {
                status,
                error: store.translate_with(
                    lang,
                    key,
                    &[("ability", ability.as_str()), ("model", model.as_str())],
                ),
                field: None,
                details: None,
            },
            AppError::NotFound(resource) | AppError::PersistenceFailed(resource) => ApiError {
                status,
                error: store.translate_with(lang, key, &[("resource", *resource)]),
                field: None,
                details: None,
            },
            AppError::UploadFailed(field) => ApiError {
                status,
                error: store.translate_with(lang, key, &[("field", *field)]),
                field: Some(field.to_string()),
                details: None,
            },
            AppError::UniqueConstraintViolation(what) => ApiError {
                status,
                error: store.translate_with(lang, key, &[("value", what.as_str())]),
                field: None,
                details: None,
            },
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                ApiError::new(status, store.translate(lang, key))
            }
            _ => ApiError::new(status, store.translate(lang, key)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

/// Converte violações de unicidade do Postgres em um erro amigável.
pub fn map_unique_violation(e: sqlx::Error, what: impl FnOnce() -> String) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(what());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn en() -> Locale {
        Locale("en".into())
    }

    #[test]
    fn forbidden_maps_to_403_with_ability_and_model() {
        let store = I18nStore::default();
        let err = AppError::Forbidden {
            ability: Ability::Delete,
            model: Model::Company,
        }
        .to_api_error(&en(), &store);

        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert!(err.error.contains("delete"));
        assert!(err.error.contains("company"));
    }

    #[test]
    fn upload_failure_is_a_conflict_keyed_by_field() {
        let store = I18nStore::default();
        let err = AppError::UploadFailed("logo").to_api_error(&en(), &store);

        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.field.as_deref(), Some("logo"));
    }

    #[test]
    fn validation_errors_carry_per_field_details() {
        let store = I18nStore::default();
        let mut errors = ValidationErrors::new();
        let mut e = ValidationError::new("length");
        e.message = Some("name_required".into());
        errors.add("name", e);

        let err = AppError::ValidationError(errors).to_api_error(&en(), &store);

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.field.as_deref(), Some("name"));
        let details = err.details.expect("details");
        assert_eq!(details["name"][0], "The name is required.");
    }

    #[test]
    fn not_found_names_the_resource() {
        let store = I18nStore::default();
        let err = AppError::NotFound("agency").to_api_error(&Locale("pt".into()), &store);

        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert!(err.error.contains("agency"));
    }
}
