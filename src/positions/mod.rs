pub mod enrichment;
pub mod positions_model;

pub use enrichment::{enrich_positions, summarize};
pub use positions_model::{DepotSummary, Position, RawPosition};
