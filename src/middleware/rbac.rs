// src/middleware/rbac.rs

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::common::error::AppError;
use crate::common::response::Can;

/// As habilidades verificadas pelas políticas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ability {
    ViewAny,
    View,
    Create,
    Update,
    Delete,
    DeleteAny,
}

impl Ability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ability::ViewAny => "view-any",
            Ability::View => "view",
            Ability::Create => "create",
            Ability::Update => "update",
            Ability::Delete => "delete",
            Ability::DeleteAny => "delete-any",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Os modelos protegidos por permissão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Model {
    Company,
    Agency,
    Product,
    Shipment,
}

impl Model {
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Company => "company",
            Model::Agency => "agency",
            Model::Product => "product",
            Model::Shipment => "shipment",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slug da permissão no banco: `modelo:habilidade`.
pub fn permission_slug(ability: Ability, model: Model) -> String {
    format!("{}:{}", model.as_str(), ability.as_str())
}

/// O conjunto de permissões do usuário, carregado uma vez por requisição.
#[derive(Debug, Clone, Default)]
pub struct Permissions(HashSet<String>);

impl Permissions {
    pub fn new(slugs: impl IntoIterator<Item = String>) -> Self {
        Self(slugs.into_iter().collect())
    }

    pub fn can(&self, ability: Ability, model: Model) -> bool {
        self.0.contains(&permission_slug(ability, model))
    }

    /// Falha com `Forbidden` antes de qualquer mutação.
    pub fn authorize(&self, ability: Ability, model: Model) -> Result<(), AppError> {
        if self.can(ability, model) {
            Ok(())
        } else {
            tracing::warn!("Acesso negado: {} em {}", ability, model);
            Err(AppError::Forbidden { ability, model })
        }
    }

    /// Mapa `can` para as telas, ex: `{"create": true, "delete-any": false}`.
    pub fn can_map(&self, model: Model, abilities: &[Ability]) -> Can {
        abilities
            .iter()
            .map(|ability| (*ability, self.can(*ability, model)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_model_colon_ability() {
        assert_eq!(permission_slug(Ability::DeleteAny, Model::Company), "company:delete-any");
        assert_eq!(permission_slug(Ability::ViewAny, Model::Shipment), "shipment:view-any");
    }

    #[test]
    fn authorize_checks_the_exact_slug() {
        let perms = Permissions::new(vec!["agency:update".to_string()]);

        assert!(perms.authorize(Ability::Update, Model::Agency).is_ok());
        assert!(matches!(
            perms.authorize(Ability::Delete, Model::Agency),
            Err(AppError::Forbidden { ability: Ability::Delete, model: Model::Agency })
        ));
        assert!(perms.authorize(Ability::Update, Model::Company).is_err());
    }

    #[test]
    fn can_map_serializes_kebab_case_keys() {
        let perms = Permissions::new(vec!["product:create".to_string()]);
        let can = perms.can_map(Model::Product, &[Ability::Create, Ability::DeleteAny]);

        let value = serde_json::to_value(&can).unwrap();
        assert_eq!(value, serde_json::json!({"create": true, "delete-any": false}));
    }
}
