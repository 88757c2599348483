pub mod market_data_errors;
pub mod market_data_model;
pub mod market_data_traits;
pub mod momentum;
pub mod price_service;
pub mod providers;

pub use market_data_errors::MarketDataError;
pub use market_data_model::Quote;
pub use market_data_traits::MarketDataProvider;
pub use momentum::momentum_3m;
pub use price_service::PriceService;
