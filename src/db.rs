pub mod user_repo;
pub use user_repo::{Membership, UserRepository};
pub mod agency_repo;
pub use agency_repo::AgencyRepository;
pub mod company_repo;
pub use company_repo::CompanyRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod shipment_repo;
pub use shipment_repo::ShipmentRepository;
