// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::context_guard};

// Folga para os campos de texto que acompanham o logo no multipart
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(app_state: AppState) -> Router {
    let agency_routes = Router::new()
        .route(
            "/",
            get(handlers::agency::list_agencies).post(handlers::agency::store_agency),
        )
        .route("/create", get(handlers::agency::create_agency_form))
        .route(
            "/{id}",
            get(handlers::agency::agency_details)
                .patch(handlers::agency::update_agency)
                .put(handlers::agency::update_agency)
                .delete(handlers::agency::destroy_agency),
        )
        .route("/{id}/users", post(handlers::agency::attach_agency_user))
        .route("/{id}/users/{user_id}", delete(handlers::agency::detach_agency_user));

    let company_routes = Router::new()
        .route(
            "/",
            get(handlers::company::list_companies).post(handlers::company::store_company),
        )
        .route("/create", get(handlers::company::create_company_form))
        .route(
            "/{id}",
            get(handlers::company::company_details)
                .patch(handlers::company::update_company)
                .put(handlers::company::update_company)
                .delete(handlers::company::destroy_company),
        )
        .route("/{id}/users", post(handlers::company::attach_company_user))
        .route("/{id}/users/{user_id}", delete(handlers::company::detach_company_user))
        .layer(DefaultBodyLimit::max(
            app_state.company_service.max_logo_bytes() + FORM_OVERHEAD_BYTES,
        ));

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::product::list_products).post(handlers::product::store_product),
        )
        .route("/create", get(handlers::product::create_product_form))
        .route(
            "/{id}",
            get(handlers::product::product_details)
                .patch(handlers::product::update_product)
                .put(handlers::product::update_product)
                .delete(handlers::product::destroy_product),
        )
        .route("/{id}/variants", post(handlers::product::add_product_variant));

    let shipment_routes = Router::new()
        .route(
            "/",
            get(handlers::shipment::list_shipments).post(handlers::shipment::store_shipment),
        )
        .route(
            "/{id}",
            get(handlers::shipment::shipment_details)
                .patch(handlers::shipment::update_shipment)
                .put(handlers::shipment::update_shipment)
                .delete(handlers::shipment::destroy_shipment),
        )
        .route("/{id}/variants", post(handlers::shipment::add_shipment_variant))
        .route(
            "/{id}/variants/{variant_id}",
            delete(handlers::shipment::remove_shipment_variant),
        );

    // Tudo aqui exige o Bearer token e ganha o RequestContext
    let protected = Router::new()
        .nest("/agencies", agency_routes)
        .nest("/companies", company_routes)
        .nest("/products", product_routes)
        .nest("/shipments", shipment_routes)
        .route("/stock-moves", get(handlers::inventory::list_stock_moves))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            context_guard,
        ));

    let api = Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(protected);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
