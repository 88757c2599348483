pub mod snapshot_model;
pub mod snapshot_service;

pub use snapshot_model::SnapshotPoint;
pub use snapshot_service::{SnapshotService, SnapshotServiceTrait};
