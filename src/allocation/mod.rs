pub mod allocation_model;
pub mod allocation_service;

pub use allocation_model::AllocationBreakdown;
pub use allocation_service::AllocationService;
