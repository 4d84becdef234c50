// src/middleware/context.rs

use axum::{extract::FromRequestParts, http::request::Parts, http::StatusCode};
use uuid::Uuid;

use crate::{
    common::{error::{ApiError, AppError}, response::Can},
    middleware::rbac::{Ability, Model, Permissions},
    models::auth::{Closet, User},
};

/// Quem está agindo e onde. Montado pelo `context_guard` e passado
/// explicitamente para cada chamada de serviço.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: User,
    pub closet: Option<Closet>,
    pub permissions: Permissions,
}

impl RequestContext {
    /// O closet ativo, obrigatório para produtos, variantes e remessas.
    pub fn closet_id(&self) -> Result<Uuid, AppError> {
        self.closet.as_ref().map(|c| c.id).ok_or(AppError::NoActiveCloset)
    }

    pub fn authorize(&self, ability: Ability, model: Model) -> Result<(), AppError> {
        self.permissions.authorize(ability, model)
    }

    pub fn can_map(&self, model: Model, abilities: &[Ability]) -> Can {
        self.permissions.can_map(model, abilities)
    }
}

// Extrator para obter o contexto diretamente nos handlers
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Usuário não autenticado"))
    }
}
