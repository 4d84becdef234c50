// src/common/response.rs

use std::collections::BTreeMap;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::common::pagination::Paginated;
use crate::middleware::rbac::Ability;

/// Resposta de sucesso das mutações: 303 para a próxima tela, com a mensagem já traduzida.
#[derive(Debug)]
pub struct Redirect {
    pub to: String,
    pub message: String,
}

impl Redirect {
    pub fn to(to: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for Redirect {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": true,
            "redirect": self.to,
            "message": self.message,
        }));
        (StatusCode::SEE_OTHER, [(header::LOCATION, self.to)], body).into_response()
    }
}

/// Mapa de habilidades do usuário, ex: `{"create": true, "delete-any": false}`.
pub type Can = BTreeMap<Ability, bool>;

/// Linha de listagem com as habilidades do usuário sobre ela.
#[derive(Debug, Serialize)]
pub struct Listed<T> {
    #[serde(flatten)]
    pub item: T,
    pub can: Can,
}

#[derive(Debug, Serialize)]
pub struct Filters {
    pub search: Option<String>,
}

/// Payload completo de uma tela de listagem.
#[derive(Debug, Serialize)]
pub struct ListPage<T> {
    pub items: Paginated<Listed<T>>,
    pub filters: Filters,
    pub can: Can,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_is_see_other_with_location() {
        let response = Redirect::to("/api/agencies/1", "Agency created.").into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/api/agencies/1");
    }

    #[test]
    fn listed_rows_flatten_the_item() {
        #[derive(Serialize)]
        struct Row {
            name: &'static str,
        }
        let mut can = Can::new();
        can.insert(Ability::Delete, true);

        let value = serde_json::to_value(Listed { item: Row { name: "ACME" }, can }).unwrap();
        assert_eq!(value["name"], "ACME");
        assert_eq!(value["can"]["delete"], true);
    }
}
