// src/handlers/product.rs

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
    models::product::{AddProductVariantPayload, CreateProductPayload, ProductDetails, UpdateProductPayload},
};

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    params(
        ("search" = Option<String>, Query, description = "Busca por nome ou SKU"),
        ("page" = Option<i64>, Query, description = "Página (1..)"),
        ("per_page" = Option<i64>, Query, description = "Itens por página (1..=100)")
    ),
    responses(
        (status = 200, description = "Produtos do closet ativo"),
        (status = 400, description = "Usuário sem closet ativo"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .product_service
        .list(&ctx, &query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(page))
}

// GET /api/products/create
#[utoipa::path(
    get,
    path = "/api/products/create",
    tag = "Products",
    responses(
        (status = 200, description = "Formulário vazio com tamanhos e cores", body = ProductDetails),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product_form(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    let form = app_state
        .product_service
        .create_form(&ctx)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(form))
}

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 303, description = "Produto criado no closet ativo"),
        (status = 400, description = "Dados inválidos ou sem closet ativo"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn store_product(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .product_service
        .store(&ctx, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        format!("/api/products/{}", product.id),
        app_state.i18n_store.translate(&locale.0, "product-created"),
    ))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto com variantes e saldos do closet", body = ProductDetails),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn product_details(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let details = app_state
        .product_service
        .details(&ctx, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(details))
}

// PATCH/PUT /api/products/{id}
#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = UpdateProductPayload,
    responses(
        (status = 303, description = "Produto atualizado"),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state
        .product_service
        .update(&ctx, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        format!("/api/products/{}", product.id),
        app_state.i18n_store.translate(&locale.0, "product-updated"),
    ))
}

// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 303, description = "Produto excluído; redireciona para a listagem"),
        (status = 403, description = "Sem permissão"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn destroy_product(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let name = app_state
        .product_service
        .destroy(&ctx, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        "/api/products",
        app_state
            .i18n_store
            .translate_with(&locale.0, "deleted", &[("name", name.as_str())]),
    ))
}

// POST /api/products/{id}/variants
#[utoipa::path(
    post,
    path = "/api/products/{id}/variants",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = AddProductVariantPayload,
    responses(
        (status = 303, description = "Variante criada com saldo zerado no closet ativo"),
        (status = 404, description = "Produto, tamanho ou cor não encontrado"),
        (status = 409, description = "SKU da variante já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_product_variant(
    State(app_state): State<AppState>,
    locale: Locale,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddProductVariantPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .product_service
        .add_variant(&ctx, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Redirect::to(
        format!("/api/products/{id}"),
        app_state.i18n_store.translate(&locale.0, "variant-created"),
    ))
}
