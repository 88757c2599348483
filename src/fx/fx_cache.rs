use std::collections::HashMap;
use std::sync::RwLock;

use log::warn;
use rust_decimal::Decimal;

use crate::constants::BASE_CURRENCY;
use crate::market_data::MarketDataProvider;

/// Session-scoped cache of `currency code -> EUR multiplier`
/// (`eur_amount = native_amount * multiplier`). Lazily populated from the
/// quote provider, never persisted.
pub struct FxCache {
    rates: RwLock<HashMap<String, Decimal>>,
}

impl Default for FxCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FxCache {
    pub fn new() -> Self {
        let mut rates = HashMap::new();
        rates.insert(BASE_CURRENCY.to_string(), Decimal::ONE);
        FxCache {
            rates: RwLock::new(rates),
        }
    }

    pub fn get(&self, currency: &str) -> Option<Decimal> {
        self.rates
            .read()
            .unwrap()
            .get(&currency.to_uppercase())
            .copied()
    }

    /// EUR multiplier for a currency, resolving through the provider on a
    /// cache miss: try the `EUR{CUR}=X` quote and invert it, else the
    /// `{CUR}EUR=X` quote directly. When neither resolves the multiplier
    /// degrades to 1.0 with one warning; prices then stay in native terms
    /// rather than failing the refresh.
    pub async fn resolve(&self, currency: &str, provider: &dyn MarketDataProvider) -> Decimal {
        let code = if currency.trim().is_empty() {
            BASE_CURRENCY.to_string()
        } else {
            currency.to_uppercase()
        };

        if let Some(multiplier) = self.get(&code) {
            return multiplier;
        }

        let multiplier = self.fetch_multiplier(&code, provider).await;
        self.rates.write().unwrap().insert(code, multiplier);
        multiplier
    }

    async fn fetch_multiplier(&self, code: &str, provider: &dyn MarketDataProvider) -> Decimal {
        // 1 EUR = X CUR, so the multiplier is 1/X
        let direct_pair = format!("{}{}=X", BASE_CURRENCY, code);
        if let Ok(quote) = provider.latest_price(&direct_pair).await {
            if quote > Decimal::ZERO {
                return Decimal::ONE / quote;
            }
        }

        // 1 CUR = X EUR, the multiplier itself
        let inverse_pair = format!("{}{}=X", code, BASE_CURRENCY);
        if let Ok(quote) = provider.latest_price(&inverse_pair).await {
            if quote > Decimal::ZERO {
                return quote;
            }
        }

        warn!(
            "No FX quote for {}; keeping native values (multiplier 1)",
            code
        );
        Decimal::ONE
    }

    pub fn invalidate(&self) {
        let mut rates = self.rates.write().unwrap();
        rates.clear();
        rates.insert(BASE_CURRENCY.to_string(), Decimal::ONE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::market_data_errors::MarketDataError;
    use crate::market_data::market_data_model::Quote;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        prices: HashMap<String, Decimal>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn with_prices(pairs: &[(&str, Decimal)]) -> Self {
            MockProvider {
                prices: pairs
                    .iter()
                    .map(|(s, p)| (s.to_string(), *p))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        async fn latest_price(&self, symbol: &str) -> Result<Decimal, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prices
                .get(symbol)
                .copied()
                .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))
        }

        async fn currency(&self, _symbol: &str) -> Result<String, MarketDataError> {
            Err(MarketDataError::NotFound("currency".into()))
        }

        async fn close_history(&self, _symbol: &str) -> Result<Vec<Quote>, MarketDataError> {
            Err(MarketDataError::NotFound("history".into()))
        }
    }

    #[tokio::test]
    async fn base_currency_is_always_one() {
        let provider = MockProvider::with_prices(&[]);
        let cache = FxCache::new();
        assert_eq!(cache.resolve("EUR", &provider).await, Decimal::ONE);
        assert_eq!(cache.resolve("", &provider).await, Decimal::ONE);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn direct_pair_is_inverted() {
        let provider = MockProvider::with_prices(&[("EURUSD=X", dec!(1.25))]);
        let cache = FxCache::new();
        assert_eq!(cache.resolve("USD", &provider).await, dec!(0.8));
    }

    #[tokio::test]
    async fn inverse_pair_is_used_directly() {
        let provider = MockProvider::with_prices(&[("CHFEUR=X", dec!(1.04))]);
        let cache = FxCache::new();
        assert_eq!(cache.resolve("chf", &provider).await, dec!(1.04));
    }

    #[tokio::test]
    async fn unresolvable_currency_degrades_to_one() {
        let provider = MockProvider::with_prices(&[]);
        let cache = FxCache::new();
        assert_eq!(cache.resolve("GBP", &provider).await, Decimal::ONE);
    }

    #[tokio::test]
    async fn resolution_is_cached_per_session() {
        let provider = MockProvider::with_prices(&[("EURUSD=X", dec!(1.25))]);
        let cache = FxCache::new();
        cache.resolve("USD", &provider).await;
        let calls_after_first = provider.calls.load(Ordering::SeqCst);
        cache.resolve("USD", &provider).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), calls_after_first);

        cache.invalidate();
        cache.resolve("USD", &provider).await;
        assert!(provider.calls.load(Ordering::SeqCst) > calls_after_first);
    }
}
