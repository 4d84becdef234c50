// src/handlers/company.rs

use axum::{
    extract::{multipart::Field, Multipart, Path, Query, State},
    response::IntoResponse,
    Json,
};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::{
        error::{ApiError, AppError},
        pagination::ListQuery,
        response::Redirect,
        storage::Upload,
    },
    config::AppState,
    middleware::{context::RequestContext, i18n::Locale},
    models::{auth::AttachUserPayload, company::{CompanyDetails, CompanyForm}},
};

// =============================================================================
//  FORMULÁRIO MULTIPART
// =============================================================================

/// Campos aceitos no multipart de empresa (só para a documentação).
#[derive(ToSchema)]
pub struct CompanyMultipart {
    pub name: String,
    pub abbreviation: String,
    /// Obrigatório na criação; na atualização, omitido mantém o atual.
    #[schema(value_type = Option<String>, format = Binary)]
    pub logo: Option<Vec<u8>>,
    pub address_line_1: String,
    pub address_line_2: Option<String>,
    pub address_zip_code: String,
    pub address_city: String,
    pub address_state_or_region: Option<String>,
    pub address_country: Uuid,
}

fn invalid(field: &'static str, message: &'static str) -> AppError {
    let mut errors = ValidationErrors::new();
    let mut err = ValidationError::new("invalid");
    err.message = Some(message.into());
    errors.add(field, err);
    AppError::ValidationError(errors)
}

async fn text(field: Field<'_>, name: &'static str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map(|v| v.trim().to_string())
        .map_err(|_| invalid(name, "validation_failed"))
}

/// Lê o multipart da empresa. Campos desconhecidos são ignorados;
/// um arquivo vazio sem nome conta como "sem logo".
pub async fn read_company_form(mut multipart: Multipart) -> Result<CompanyForm, AppError> {
    let mut form = CompanyForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::UploadFailed("logo"))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "name" => form.name = text(field, "name").await?,
            "abbreviation" => form.abbreviation = text(field, "abbreviation").await?,
            "address_line_1" => form.address_line_1 = text(field, "address_line_1").await?,
            "address_line_2" => form.address_line_2 = Some(text(field, "address_line_2").await?),
            "address_zip_code" => form.address_zip_code = text(field, "address_zip_code").await?,
            "address_city" => form.address_city = text(field, "address_city").await?,
            "address_state_or_region" => {
                form.address_state_or_region = Some(text(field, "address_state_or_region").await?)
            }
            "address_country" => {
                let raw = text(field, "address_country").await?;
                form.address_country = if raw.is_empty() {
                    None
                } else {
                    Some(Uuid::parse_str(&raw).map_err(|_| invalid("address_country", "uuid_invalid"))?)
                };
            }
            "logo" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|_| AppError::UploadFailed("logo"))?;

                let empty_input = bytes.is_empty() && file_name.as_deref().is_none_or(str::is_empty);
                if !empty_input {
                    form.logo = Some(Upload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

// =============================================================================
//  ROTAS
// =============================================================================

// GET /api/companies
#[utoipa::path(
    get,
    path = "/api/companies",
    tag = "Companies",
    params(
        ("search" = Option<String>, Query, description = "Busca por nome ou sigla"),
        ("page" = Option<i64>, Query, description = "Página (1..)"),
        ("per_page" = Option<i64>, Query, description = "Itens por página (1..=100)")
    ),
    responses(
        (status = 200, description = "Página de empresas com o mapa `can`"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .company_service
        .list(&ctx, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(page))
}

// GET /api/companies/create
#[utoipa::path(
    get,
    path = "/api/companies/create",
    tag = "Companies",
    responses(
        (status = 200, description = "Formulário vazio com a lista de países", body = CompanyDetails),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_company_form(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    let form = app_state
        .company_service
        .create_form(&ctx)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(form))
}

// POST /api/companies (multipart)
#[utoipa::path(
    post,
    path = "/api/companies",
    tag = "Companies",
    request_body(content = CompanyMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 303, description = "Empresa criada; redireciona para os detalhes"),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão"),
        (status = 409, description = "Falha no upload do logo")
    ),
    security(("api_jwt" = []))
)]
pub async fn store_company(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_company_form(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    form.validate_store()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let company = app_state
        .company_service
        .store(&ctx, form)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        format!("/api/companies/{}", company.id),
        app_state.i18n_store.translate(&locale.0, "company-created"),
    ))
}

// GET /api/companies/{id}
#[utoipa::path(
    get,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa com endereço, países e membros", body = CompanyDetails),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn company_details(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let details = app_state
        .company_service
        .details(&ctx, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(details))
}

// PATCH/PUT /api/companies/{id} (multipart)
#[utoipa::path(
    patch,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    request_body(content = CompanyMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 303, description = "Empresa atualizada"),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Empresa não encontrada"),
        (status = 409, description = "Falha no upload do logo")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_company(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_company_form(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    form.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let company = app_state
        .company_service
        .update(&ctx, id, form)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        format!("/api/companies/{}", company.id),
        app_state.i18n_store.translate(&locale.0, "company-updated"),
    ))
}

// DELETE /api/companies/{id}
#[utoipa::path(
    delete,
    path = "/api/companies/{id}",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    responses(
        (status = 303, description = "Empresa excluída; redireciona para a listagem"),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn destroy_company(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let name = app_state
        .company_service
        .destroy(&ctx, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        "/api/companies",
        app_state
            .i18n_store
            .translate_with(&locale.0, "deleted", &[("name", name.as_str())]),
    ))
}

// POST /api/companies/{id}/users
#[utoipa::path(
    post,
    path = "/api/companies/{id}/users",
    tag = "Companies",
    params(("id" = Uuid, Path, description = "ID da empresa")),
    request_body = AttachUserPayload,
    responses(
        (status = 303, description = "Usuário vinculado"),
        (status = 404, description = "Empresa ou usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn attach_company_user(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<AttachUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .company_service
        .attach_user(&ctx, id, payload.user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        format!("/api/companies/{id}"),
        app_state.i18n_store.translate(&locale.0, "user-attached"),
    ))
}

// DELETE /api/companies/{id}/users/{user_id}
#[utoipa::path(
    delete,
    path = "/api/companies/{id}/users/{user_id}",
    tag = "Companies",
    params(
        ("id" = Uuid, Path, description = "ID da empresa"),
        ("user_id" = Uuid, Path, description = "ID do usuário")
    ),
    responses(
        (status = 303, description = "Usuário desvinculado"),
        (status = 404, description = "Usuário não pertence à empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn detach_company_user(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .company_service
        .detach_user(&ctx, id, user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        format!("/api/companies/{id}"),
        app_state.i18n_store.translate(&locale.0, "user-detached"),
    ))
}
