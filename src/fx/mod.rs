pub mod fx_cache;

pub use fx_cache::FxCache;
