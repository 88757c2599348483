use async_trait::async_trait;
use rust_decimal::Decimal;

use super::market_data_errors::MarketDataError;
use super::market_data_model::Quote;

/// Best-effort external quote oracle. Calls are unbatched, sequential and
/// carry no retry; every failure is degraded at the call site to the single
/// field being computed.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Latest traded price in the instrument's listing currency. FX pair
    /// symbols (e.g. `EURUSD=X`) resolve through the same call.
    async fn latest_price(&self, symbol: &str) -> Result<Decimal, MarketDataError>;

    /// Listing currency of the instrument.
    async fn currency(&self, symbol: &str) -> Result<String, MarketDataError>;

    /// Daily closes in native currency, ascending by date, covering roughly
    /// the trailing nine months.
    async fn close_history(&self, symbol: &str) -> Result<Vec<Quote>, MarketDataError>;
}
