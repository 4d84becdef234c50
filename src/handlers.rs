pub mod agency;
pub mod company;
pub mod inventory;
pub mod product;
pub mod shipment;
