use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::dividends_model::{DividendRecord, StatementTransaction};
use crate::constants::{DIVIDEND_MARKER, UNKNOWN_NAME};
use crate::metadata::MetadataRegistryTrait;

lazy_static! {
    // Field tag 04 carries the security identifier
    static ref WKN_RE: Regex = Regex::new(r"04([A-Z0-9]{5,6})").unwrap();
    // Field tag 02 carries the share count at booking time
    static ref SHARES_RE: Regex = Regex::new(r"02DEPOTBESTAND:\s*([\d,.]+)").unwrap();
    static ref PER_SHARE_RE: Regex = Regex::new(r"USD\s*([\d,.]+)|EUR\s*([\d,.]+)").unwrap();
}

/// Extracts a dividend record from one statement transaction.
///
/// Returns `None` when the remittance text carries no dividend-credit marker
/// or the credited amount is unparsable; the caller continues with the rest
/// of the batch either way.
pub fn parse_dividend(
    txn: &StatementTransaction,
    registry: &dyn MetadataRegistryTrait,
) -> Option<DividendRecord> {
    let info = &txn.remittance_info;
    let upper = info.to_uppercase();
    if !upper.contains(DIVIDEND_MARKER) {
        return None;
    }

    let amount = match Decimal::from_str(txn.amount.value.trim()) {
        Ok(amount) => amount,
        Err(e) => {
            warn!(
                "Skipping dividend credit on {}: unparsable amount '{}': {}",
                txn.booking_date, txn.amount.value, e
            );
            return None;
        }
    };

    let wkn = WKN_RE
        .captures(&upper)
        .map(|c| c[1].trim().to_string());

    let company = wkn
        .as_deref()
        .map(|w| registry.name_for(w))
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());

    let shares = SHARES_RE
        .captures(info)
        .and_then(|c| parse_statement_decimal(&c[1]));

    let div_per_share = PER_SHARE_RE
        .captures(info)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .and_then(|m| parse_statement_decimal(m.as_str()));

    Some(DividendRecord {
        date: txn.booking_date,
        amount,
        company,
        wkn,
        shares,
        div_per_share,
    })
}

// Statement fields use a comma decimal separator ("12,34").
fn parse_statement_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.replace(',', ".")).ok()
}
