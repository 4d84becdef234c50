pub mod auth;
pub mod agency_service;
pub mod company_service;
pub mod product_service;
pub mod shipment_service;
pub mod inventory_service;

pub use agency_service::AgencyService;
pub use company_service::CompanyService;
pub use inventory_service::InventoryService;
pub use product_service::ProductService;
pub use shipment_service::ShipmentService;
