use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use rust_decimal::Decimal;

use super::market_data_traits::MarketDataProvider;
use super::momentum::momentum_3m;
use crate::constants::{BASE_CURRENCY, PRICE_DECIMAL_PRECISION, VALUE_DECIMAL_PRECISION};
use crate::fx::FxCache;
use crate::metadata::MetadataRegistryTrait;
use crate::positions::positions_model::RawPosition;

/// Refreshes current prices (in EUR) and trailing momentum for a batch of
/// raw positions. Updates are strictly per-field: a momentum failure never
/// blocks the price update and vice versa, and any field whose calculation
/// fails keeps its prior value.
pub struct PriceService {
    provider: Arc<dyn MarketDataProvider>,
    registry: Arc<dyn MetadataRegistryTrait>,
    fx: Arc<FxCache>,
}

impl PriceService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        registry: Arc<dyn MetadataRegistryTrait>,
        fx: Arc<FxCache>,
    ) -> Self {
        PriceService {
            provider,
            registry,
            fx,
        }
    }

    /// Walks the batch position by position, sequentially. Returns the
    /// momentum values that could be computed, keyed by WKN; prices are
    /// written into `positions` in place.
    pub async fn refresh_prices(
        &self,
        positions: &mut [RawPosition],
    ) -> HashMap<String, Decimal> {
        let mut momentum = HashMap::new();

        for position in positions.iter_mut() {
            let Some(ticker) = self.registry.ticker_for(&position.wkn) else {
                warn!(
                    "No ticker for WKN {}; check the metadata table",
                    position.wkn
                );
                continue;
            };

            self.refresh_price(position, &ticker).await;

            match self.provider.close_history(&ticker).await {
                Ok(closes) => match momentum_3m(&closes) {
                    Some(value) => {
                        momentum.insert(position.wkn.clone(), value);
                    }
                    None => debug!(
                        "Insufficient history for 3-month momentum of {} (WKN {})",
                        ticker, position.wkn
                    ),
                },
                Err(e) => warn!(
                    "No close history for {} (WKN {}): {}",
                    ticker, position.wkn, e
                ),
            }
        }

        momentum
    }

    async fn refresh_price(&self, position: &mut RawPosition, ticker: &str) {
        let native = match self.provider.latest_price(ticker).await {
            Ok(price) => price,
            Err(e) => {
                warn!("No price available for {} (WKN {}): {}", ticker, position.wkn, e);
                return;
            }
        };

        let currency = match self.provider.currency(ticker).await {
            Ok(currency) if !currency.trim().is_empty() => currency,
            _ => BASE_CURRENCY.to_string(),
        };
        let multiplier = self.fx.resolve(&currency, self.provider.as_ref()).await;

        let price_eur = (native * multiplier).round_dp(PRICE_DECIMAL_PRECISION);
        position.current_price.price.value = price_eur;
        position.current_value.value =
            (position.quantity.value * price_eur).round_dp(VALUE_DECIMAL_PRECISION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::market_data_errors::MarketDataError;
    use crate::market_data::market_data_model::Quote;
    use crate::metadata::{AssetClass, MetadataRegistry, SecurityMetadata};
    use crate::positions::positions_model::{CurrentPrice, UnitValue};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    struct MockProvider {
        price: Option<Decimal>,
        currency: Option<String>,
        closes: Option<Vec<Quote>>,
        fx: Vec<(String, Decimal)>,
    }

    impl MockProvider {
        fn new() -> Self {
            MockProvider {
                price: None,
                currency: None,
                closes: None,
                fx: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        async fn latest_price(&self, symbol: &str) -> Result<Decimal, MarketDataError> {
            if symbol.ends_with("=X") {
                return self
                    .fx
                    .iter()
                    .find(|(pair, _)| pair == symbol)
                    .map(|(_, rate)| *rate)
                    .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()));
            }
            self.price
                .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))
        }

        async fn currency(&self, symbol: &str) -> Result<String, MarketDataError> {
            self.currency
                .clone()
                .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))
        }

        async fn close_history(&self, symbol: &str) -> Result<Vec<Quote>, MarketDataError> {
            self.closes
                .clone()
                .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))
        }
    }

    fn registry() -> MetadataRegistry {
        MetadataRegistry::from_entries(vec![SecurityMetadata {
            wkn: "A1B2C3".into(),
            name: "Example Fund".into(),
            ticker: "EXF.DE".into(),
            region: "".into(),
            asset_class: AssetClass::Etf,
            sector: "".into(),
            risk_estimation: Default::default(),
            region_breakdown: None,
            sector_breakdown: None,
        }])
    }

    fn position(wkn: &str) -> RawPosition {
        RawPosition {
            wkn: wkn.into(),
            quantity: UnitValue {
                value: dec!(10),
                unit: None,
            },
            purchase_price: UnitValue {
                value: dec!(80),
                unit: Some("EUR".into()),
            },
            purchase_value: UnitValue {
                value: dec!(800),
                unit: Some("EUR".into()),
            },
            current_price: CurrentPrice {
                price: UnitValue {
                    value: dec!(90.00),
                    unit: Some("EUR".into()),
                },
                price_date_time: None,
            },
            current_value: UnitValue {
                value: dec!(900),
                unit: Some("EUR".into()),
            },
        }
    }

    fn nine_month_series() -> Vec<Quote> {
        let end = NaiveDate::from_ymd_opt(2024, 9, 30).unwrap();
        let mut closes = Vec::new();
        let mut date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut close = dec!(100);
        while date <= end {
            closes.push(Quote::new(date, close));
            date = date.succ_opt().unwrap();
            close += dec!(0.1);
        }
        closes
    }

    fn service(provider: MockProvider) -> PriceService {
        PriceService::new(
            Arc::new(provider),
            Arc::new(registry()),
            Arc::new(FxCache::new()),
        )
    }

    #[tokio::test]
    async fn converts_native_price_and_recomputes_value() {
        let mut provider = MockProvider::new();
        provider.price = Some(dec!(120.50));
        provider.currency = Some("USD".into());
        provider.fx = vec![("EURUSD=X".to_string(), dec!(1.25))];

        let mut positions = vec![position("A1B2C3")];
        let momentum = service(provider).refresh_prices(&mut positions).await;

        // 120.50 * 0.8 = 96.40 EUR
        assert_eq!(positions[0].current_price.price.value, dec!(96.40));
        assert_eq!(positions[0].current_value.value, dec!(964));
        assert!(momentum.is_empty());
    }

    #[tokio::test]
    async fn fx_degrade_keeps_native_price() {
        let mut provider = MockProvider::new();
        provider.price = Some(dec!(120.50));
        provider.currency = Some("USD".into());
        // no FX quotes at all: multiplier degrades to 1.0

        let mut positions = vec![position("A1B2C3")];
        service(provider).refresh_prices(&mut positions).await;

        assert_eq!(positions[0].current_price.price.value, dec!(120.50));
        assert_eq!(positions[0].current_value.value, dec!(1205));
    }

    #[tokio::test]
    async fn missing_currency_defaults_to_eur() {
        let mut provider = MockProvider::new();
        provider.price = Some(dec!(42.123));

        let mut positions = vec![position("A1B2C3")];
        service(provider).refresh_prices(&mut positions).await;

        assert_eq!(positions[0].current_price.price.value, dec!(42.12));
    }

    #[tokio::test]
    async fn price_failure_keeps_prior_price_but_momentum_proceeds() {
        let mut provider = MockProvider::new();
        provider.closes = Some(nine_month_series());

        let mut positions = vec![position("A1B2C3")];
        let momentum = service(provider).refresh_prices(&mut positions).await;

        assert_eq!(positions[0].current_price.price.value, dec!(90.00));
        assert_eq!(positions[0].current_value.value, dec!(900));
        assert!(momentum.contains_key("A1B2C3"));
    }

    #[tokio::test]
    async fn momentum_failure_does_not_block_price_update() {
        let mut provider = MockProvider::new();
        provider.price = Some(dec!(95.00));
        provider.currency = Some("EUR".into());
        // close_history errors

        let mut positions = vec![position("A1B2C3")];
        let momentum = service(provider).refresh_prices(&mut positions).await;

        assert_eq!(positions[0].current_price.price.value, dec!(95.00));
        assert!(momentum.is_empty());
    }

    #[tokio::test]
    async fn unresolved_ticker_leaves_position_untouched() {
        let mut provider = MockProvider::new();
        provider.price = Some(dec!(95.00));
        provider.closes = Some(nine_month_series());

        let mut positions = vec![position("ZZZ999")];
        let momentum = service(provider).refresh_prices(&mut positions).await;

        assert_eq!(positions[0].current_price.price.value, dec!(90.00));
        assert!(momentum.is_empty());
    }
}
