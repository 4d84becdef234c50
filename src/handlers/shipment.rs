// src/handlers/shipment.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::{ApiError, AppError}, pagination::ListQuery, response::Redirect},
    config::AppState,
    middleware::{context::RequestContext, i18n::Locale},
    models::shipment::{
        AddShipmentVariantPayload, CreateShipmentPayload, ShipmentDetails, UpdateShipmentPayload,
    },
};

// GET /api/shipments
#[utoipa::path(
    get,
    path = "/api/shipments",
    tag = "Shipments",
    params(
        ("search" = Option<String>, Query, description = "Busca pela referência"),
        ("page" = Option<i64>, Query, description = "Página (1..)"),
        ("per_page" = Option<i64>, Query, description = "Itens por página (1..=100)")
    ),
    responses(
        (status = 200, description = "Remessas do closet ativo"),
        (status = 400, description = "Usuário sem closet ativo"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_shipments(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .shipment_service
        .list(&ctx, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(page))
}

// POST /api/shipments
#[utoipa::path(
    post,
    path = "/api/shipments",
    tag = "Shipments",
    request_body = CreateShipmentPayload,
    responses(
        (status = 303, description = "Remessa criada no closet ativo"),
        (status = 400, description = "Dados inválidos ou sem closet ativo"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn store_shipment(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Json(payload): Json<CreateShipmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let shipment = app_state
        .shipment_service
        .store(&ctx, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        format!("/api/shipments/{}", shipment.id),
        app_state.i18n_store.translate(&locale.0, "shipment-created"),
    ))
}

// GET /api/shipments/{id}
#[utoipa::path(
    get,
    path = "/api/shipments/{id}",
    tag = "Shipments",
    params(("id" = Uuid, Path, description = "ID da remessa")),
    responses(
        (status = 200, description = "Remessa com suas variantes", body = ShipmentDetails),
        (status = 404, description = "Remessa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn shipment_details(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let details = app_state
        .shipment_service
        .details(&ctx, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(details))
}

// PATCH/PUT /api/shipments/{id}
#[utoipa::path(
    patch,
    path = "/api/shipments/{id}",
    tag = "Shipments",
    params(("id" = Uuid, Path, description = "ID da remessa")),
    request_body = UpdateShipmentPayload,
    responses(
        (status = 303, description = "Remessa atualizada"),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Remessa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_shipment(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateShipmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let shipment = app_state
        .shipment_service
        .update(&ctx, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        format!("/api/shipments/{}", shipment.id),
        app_state.i18n_store.translate(&locale.0, "shipment-updated"),
    ))
}

// DELETE /api/shipments/{id}
#[utoipa::path(
    delete,
    path = "/api/shipments/{id}",
    tag = "Shipments",
    params(("id" = Uuid, Path, description = "ID da remessa")),
    responses(
        (status = 303, description = "Remessa excluída; redireciona para a listagem"),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Remessa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn destroy_shipment(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reference = app_state
        .shipment_service
        .destroy(&ctx, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        "/api/shipments",
        app_state
            .i18n_store
            .translate_with(&locale.0, "deleted", &[("name", reference.as_str())]),
    ))
}

// POST /api/shipments/{id}/variants
#[utoipa::path(
    post,
    path = "/api/shipments/{id}/variants",
    tag = "Shipments",
    params(("id" = Uuid, Path, description = "ID da remessa")),
    request_body = AddShipmentVariantPayload,
    responses(
        (status = 303, description = "Variante vinculada (ou já estava) e estoque reservado"),
        (status = 400, description = "Quantidade inválida"),
        (status = 404, description = "Remessa, variante ou inventário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_shipment_variant(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddShipmentVariantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let attached = app_state
        .shipment_service
        .add_variant(&ctx, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let key = if attached { "shipment-variant-added" } else { "shipment-variant-kept" };
    Ok(Redirect::to(
        format!("/api/shipments/{id}"),
        app_state.i18n_store.translate(&locale.0, key),
    ))
}

// DELETE /api/shipments/{id}/variants/{variant_id}
#[utoipa::path(
    delete,
    path = "/api/shipments/{id}/variants/{variant_id}",
    tag = "Shipments",
    params(
        ("id" = Uuid, Path, description = "ID da remessa"),
        ("variant_id" = Uuid, Path, description = "ID da variante")
    ),
    responses(
        (status = 303, description = "Variante desvinculada e reserva devolvida (ou nada a fazer)"),
        (status = 404, description = "Remessa ou inventário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_shipment_variant(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path((id, variant_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = app_state
        .shipment_service
        .remove_variant(&ctx, id, variant_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let key = if removed > 0 { "shipment-variant-removed" } else { "shipment-variant-absent" };
    Ok(Redirect::to(
        format!("/api/shipments/{id}"),
        app_state.i18n_store.translate(&locale.0, key),
    ))
}
