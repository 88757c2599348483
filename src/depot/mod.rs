pub mod depot_service;

pub use depot_service::DepotService;
