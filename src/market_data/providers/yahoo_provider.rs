use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use log::debug;
use num_traits::FromPrimitive;
use reqwest::{header, Client};
use rust_decimal::Decimal;
use yahoo_finance_api as yahoo;

use super::models::{ChartEnvelope, ChartMeta};
use crate::market_data::market_data_errors::MarketDataError;
use crate::market_data::market_data_model::Quote;
use crate::market_data::market_data_traits::MarketDataProvider;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36";

/// Close history range covering the momentum window with headroom.
const HISTORY_RANGE: &str = "9mo";

pub struct YahooProvider {
    provider: yahoo::YahooConnector,
    client: Client,
}

impl YahooProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        let provider = yahoo::YahooConnector::new()?;
        Ok(YahooProvider {
            provider,
            client: Client::new(),
        })
    }

    async fn fetch_chart_meta(&self, symbol: &str) -> Result<ChartMeta, MarketDataError> {
        let url = format!("{}/{}?interval=1d&range=1d", CHART_URL, symbol);
        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?;

        let envelope: ChartEnvelope = response.json().await?;
        envelope
            .chart
            .result
            .and_then(|mut r| (!r.is_empty()).then(|| r.remove(0).meta))
            .ok_or_else(|| MarketDataError::NotFound(format!("No chart data for {}", symbol)))
    }

    fn positive_price(close: f64) -> Option<Decimal> {
        Decimal::from_f64(close).filter(|p| *p > Decimal::ZERO)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    /// Ordered fallback: delayed realtime quote, then the last traded price
    /// from the chart metadata, then the most recent daily close. Each
    /// attempt is guarded on its own; the first success wins.
    async fn latest_price(&self, symbol: &str) -> Result<Decimal, MarketDataError> {
        match self.provider.get_latest_quotes(symbol, "1d").await {
            Ok(response) => {
                if let Ok(quote) = response.last_quote() {
                    if let Some(price) = Self::positive_price(quote.close) {
                        return Ok(price);
                    }
                }
            }
            Err(e) => debug!("Latest quote lookup failed for {}: {}", symbol, e),
        }

        match self.fetch_chart_meta(symbol).await {
            Ok(meta) => {
                if let Some(price) = meta.regular_market_price.and_then(Self::positive_price) {
                    return Ok(price);
                }
            }
            Err(e) => debug!("Chart metadata lookup failed for {}: {}", symbol, e),
        }

        let response = self.provider.get_quote_range(symbol, "1d", "1mo").await?;
        response
            .quotes()?
            .iter()
            .rev()
            .find_map(|q| Self::positive_price(q.close))
            .ok_or_else(|| MarketDataError::NotFound(format!("No price available for {}", symbol)))
    }

    async fn currency(&self, symbol: &str) -> Result<String, MarketDataError> {
        let meta = self.fetch_chart_meta(symbol).await?;
        meta.currency
            .filter(|c| !c.is_empty())
            .ok_or_else(|| MarketDataError::NotFound(format!("No currency for {}", symbol)))
    }

    async fn close_history(&self, symbol: &str) -> Result<Vec<Quote>, MarketDataError> {
        let response = self
            .provider
            .get_quote_range(symbol, "1d", HISTORY_RANGE)
            .await?;

        let mut closes: Vec<Quote> = response
            .quotes()?
            .iter()
            .filter_map(|q| {
                let date = Utc
                    .timestamp_opt(q.timestamp as i64, 0)
                    .single()?
                    .date_naive();
                // adjusted close, momentum is defined on the adjusted series
                let close = Decimal::from_f64(q.adjclose).filter(|c| !c.is_zero())?;
                Some(Quote::new(date, close))
            })
            .collect();
        closes.sort_by_key(|q| q.date);
        Ok(closes)
    }
}
