// src/handlers/inventory.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    common::{error::ApiError, pagination::ListQuery},
    config::AppState,
    middleware::{context::RequestContext, i18n::Locale},
};

// GET /api/stock-moves
#[utoipa::path(
    get,
    path = "/api/stock-moves",
    tag = "Inventory",
    params(
        ("page" = Option<i64>, Query, description = "Página (1..)"),
        ("per_page" = Option<i64>, Query, description = "Itens por página (1..=100)")
    ),
    responses(
        (status = 200, description = "Movimentos de estoque do closet ativo, mais recentes primeiro"),
        (status = 400, description = "Usuário sem closet ativo"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_stock_moves(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request = query.page_request();

    let page = app_state
        .inventory_service
        .stock_moves(&ctx, request)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Formato de coleção: { data, links: { self }, meta }
    Ok(Json(json!({
        "data": page.data,
        "links": {
            "self": format!("/api/stock-moves?page={}&per_page={}", page.current_page, page.per_page),
        },
        "meta": {
            "current_page": page.current_page,
            "per_page": page.per_page,
            "total": page.total,
            "last_page": page.last_page,
        },
    })))
}
