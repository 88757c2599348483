use chrono::Months;
use rust_decimal::Decimal;

use super::market_data_model::Quote;
use crate::constants::MOMENTUM_FALLBACK_TRADING_DAYS;

/// Trailing 3-month momentum: `last_close / base_close - 1`, computed on
/// native-currency closes so the signal is invariant under FX conversion.
///
/// The base close is the last close at or before three calendar months
/// before the final close; when none exists the close 63 trading days
/// before the end is used instead. Returns `None` when the history is too
/// short for either, never a substitute zero.
pub fn momentum_3m(closes: &[Quote]) -> Option<Decimal> {
    let last = closes.last()?;
    let target = last.date.checked_sub_months(Months::new(3))?;

    let base = closes
        .iter()
        .rev()
        .find(|q| q.date <= target)
        .map(|q| q.close)
        .or_else(|| {
            (closes.len() > MOMENTUM_FALLBACK_TRADING_DAYS)
                .then(|| closes[closes.len() - MOMENTUM_FALLBACK_TRADING_DAYS].close)
        })?;

    if base.is_zero() {
        return None;
    }
    Some(last.close / base - Decimal::ONE)
}
