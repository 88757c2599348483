pub mod allocation;
pub mod constants;
pub mod depot;
pub mod dividends;
pub mod errors;
pub mod fx;
pub mod market_data;
pub mod metadata;
pub mod positions;
pub mod snapshot;
pub mod storage;

pub use errors::{Error, Result};
