// src/services/auth.rs

use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    middleware::{context::RequestContext, rbac::Permissions},
    models::auth::{Claims, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String) -> Self {
        Self { user_repo, jwt_secret }
    }

    /// Decodifica o token e devolve o id do usuário (claim `sub`).
    pub fn decode_subject(&self, token: &str) -> Result<Uuid, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims.sub)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let user_id = self.decode_subject(token)?;

        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    /// Monta o contexto completo da requisição: usuário, permissões e closet ativo.
    pub async fn build_context(&self, token: &str) -> Result<RequestContext, AppError> {
        let user = self.validate_token(token).await?;

        let slugs = self.user_repo.permission_slugs(user.id).await?;
        let closet = self.user_repo.active_closet(user.id).await?;

        Ok(RequestContext {
            permissions: Permissions::new(slugs),
            closet,
            user,
        })
    }
}
