pub mod models;
pub mod yahoo_provider;

pub use yahoo_provider::YahooProvider;
