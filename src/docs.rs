// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Agencies ---
        handlers::agency::list_agencies,
        handlers::agency::create_agency_form,
        handlers::agency::store_agency,
        handlers::agency::agency_details,
        handlers::agency::update_agency,
        handlers::agency::destroy_agency,
        handlers::agency::attach_agency_user,
        handlers::agency::detach_agency_user,

        // --- Companies ---
        handlers::company::list_companies,
        handlers::company::create_company_form,
        handlers::company::store_company,
        handlers::company::company_details,
        handlers::company::update_company,
        handlers::company::destroy_company,
        handlers::company::attach_company_user,
        handlers::company::detach_company_user,

        // --- Products ---
        handlers::product::list_products,
        handlers::product::create_product_form,
        handlers::product::store_product,
        handlers::product::product_details,
        handlers::product::update_product,
        handlers::product::destroy_product,
        handlers::product::add_product_variant,

        // --- Shipments ---
        handlers::shipment::list_shipments,
        handlers::shipment::store_shipment,
        handlers::shipment::shipment_details,
        handlers::shipment::update_shipment,
        handlers::shipment::destroy_shipment,
        handlers::shipment::add_shipment_variant,
        handlers::shipment::remove_shipment_variant,

        // --- Inventory ---
        handlers::inventory::list_stock_moves,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::Closet,
            models::auth::AttachUserPayload,

            // --- Agencies ---
            models::agency::Agency,
            models::agency::AgencyDetails,
            models::agency::CreateAgencyPayload,
            models::agency::UpdateAgencyPayload,

            // --- Companies ---
            models::company::Company,
            models::company::OwnerKind,
            models::company::Address,
            models::company::Country,
            models::company::CompanyDetails,
            handlers::company::CompanyMultipart,

            // --- Products ---
            models::product::Product,
            models::product::Size,
            models::product::Color,
            models::product::Variant,
            models::product::VariationAttribute,
            models::product::Variation,
            models::product::VariantLine,
            models::product::ProductDetails,
            models::product::CreateProductPayload,
            models::product::UpdateProductPayload,
            models::product::AddProductVariantPayload,

            // --- Shipments ---
            models::shipment::Shipment,
            models::shipment::ShipmentVariantLine,
            models::shipment::ShipmentDetails,
            models::shipment::CreateShipmentPayload,
            models::shipment::UpdateShipmentPayload,
            models::shipment::AddShipmentVariantPayload,

            // --- Inventory ---
            models::inventory::Inventory,
            models::inventory::StockMoveKind,
            models::inventory::StockMove,
        )
    ),
    tags(
        (name = "Agencies", description = "Agências e seus usuários"),
        (name = "Companies", description = "Empresas, logo, endereço e usuários"),
        (name = "Products", description = "Produtos e variantes do closet ativo"),
        (name = "Shipments", description = "Remessas e reserva de estoque"),
        (name = "Inventory", description = "Histórico de movimentos de estoque")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
