// src/handlers/agency.rs

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
    models::{
        agency::{AgencyDetails, CreateAgencyPayload, UpdateAgencyPayload},
        auth::AttachUserPayload,
    },
};

// GET /api/agencies
#[utoipa::path(
    get,
    path = "/api/agencies",
    tag = "Agencies",
    params(
        ("search" = Option<String>, Query, description = "Busca por nome ou e-mail"),
        ("page" = Option<i64>, Query, description = "Página (1..)"),
        ("per_page" = Option<i64>, Query, description = "Itens por página (1..=100)")
    ),
    responses(
        (status = 200, description = "Página de agências com o mapa `can`"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_agencies(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .agency_service
        .list(&ctx, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(page))
}

// GET /api/agencies/create
#[utoipa::path(
    get,
    path = "/api/agencies/create",
    tag = "Agencies",
    responses(
        (status = 200, description = "Formulário vazio", body = AgencyDetails),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_agency_form(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    let form = app_state
        .agency_service
        .create_form(&ctx)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(form))
}

// POST /api/agencies
#[utoipa::path(
    post,
    path = "/api/agencies",
    tag = "Agencies",
    request_body = CreateAgencyPayload,
    responses(
        (status = 303, description = "Agência criada; redireciona para os detalhes"),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn store_agency(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Json(payload): Json<CreateAgencyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let agency = app_state
        .agency_service
        .store(&ctx, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        format!("/api/agencies/{}", agency.id),
        app_state.i18n_store.translate(&locale.0, "agency-created"),
    ))
}

// GET /api/agencies/{id}
#[utoipa::path(
    get,
    path = "/api/agencies/{id}",
    tag = "Agencies",
    params(("id" = Uuid, Path, description = "ID da agência")),
    responses(
        (status = 200, description = "Agência com membros e candidatos", body = AgencyDetails),
        (status = 404, description = "Agência não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn agency_details(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let details = app_state
        .agency_service
        .details(&ctx, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(details))
}

// PATCH/PUT /api/agencies/{id}
#[utoipa::path(
    patch,
    path = "/api/agencies/{id}",
    tag = "Agencies",
    params(("id" = Uuid, Path, description = "ID da agência")),
    request_body = UpdateAgencyPayload,
    responses(
        (status = 303, description = "Agência atualizada"),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Agência não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_agency(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAgencyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let agency = app_state
        .agency_service
        .update(&ctx, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        format!("/api/agencies/{}", agency.id),
        app_state.i18n_store.translate(&locale.0, "agency-updated"),
    ))
}

// DELETE /api/agencies/{id}
#[utoipa::path(
    delete,
    path = "/api/agencies/{id}",
    tag = "Agencies",
    params(("id" = Uuid, Path, description = "ID da agência")),
    responses(
        (status = 303, description = "Agência excluída; redireciona para a listagem"),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Agência não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn destroy_agency(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let name = app_state
        .agency_service
        .destroy(&ctx, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        "/api/agencies",
        app_state
            .i18n_store
            .translate_with(&locale.0, "deleted", &[("name", name.as_str())]),
    ))
}

// POST /api/agencies/{id}/users
#[utoipa::path(
    post,
    path = "/api/agencies/{id}/users",
    tag = "Agencies",
    params(("id" = Uuid, Path, description = "ID da agência")),
    request_body = AttachUserPayload,
    responses(
        (status = 303, description = "Usuário vinculado"),
        (status = 404, description = "Agência ou usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn attach_agency_user(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .agency_service
        .attach_user(&ctx, id, payload.user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        format!("/api/agencies/{id}"),
        app_state.i18n_store.translate(&locale.0, "user-attached"),
    ))
}

// DELETE /api/agencies/{id}/users/{user_id}
#[utoipa::path(
    delete,
    path = "/api/agencies/{id}/users/{user_id}",
    tag = "Agencies",
    params(
        ("id" = Uuid, Path, description = "ID da agência"),
        ("user_id" = Uuid, Path, description = "ID do usuário")
    ),
    responses(
        (status = 303, description = "Usuário desvinculado"),
        (status = 404, description = "Usuário não pertence à agência")
    ),
    security(("api_jwt" = []))
)]
pub async fn detach_agency_user(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .agency_service
        .detach_user(&ctx, id, user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        format!("/api/agencies/{id}"),
        app_state.i18n_store.translate(&locale.0, "user-detached"),
    ))
}
