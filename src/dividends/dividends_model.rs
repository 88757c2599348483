use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One bank-statement transaction as delivered upstream. Read-only; the
/// amount value stays a string so one malformed record cannot poison a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementTransaction {
    #[serde(rename = "bookingDate")]
    pub booking_date: NaiveDate,
    pub amount: StatementAmount,
    #[serde(rename = "remittanceInfo", default)]
    pub remittance_info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementAmount {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A dividend credit extracted from statement text. Identity is the
/// `(date, amount, company)` triple; records are append-only once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendRecord {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wkn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub div_per_share: Option<Decimal>,
}

impl DividendRecord {
    pub fn identity(&self) -> (NaiveDate, Decimal, String) {
        (self.date, self.amount.normalize(), self.company.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearChange {
    pub year: i32,
    pub amount: Decimal,
    /// Change versus the previous year; `None` for the first year on record
    /// or when the previous year received nothing.
    pub change_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyDividend {
    /// Display label, e.g. "Mar 2024"
    pub month: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DividendStatistics {
    pub total: Decimal,
    pub per_year: BTreeMap<i32, Decimal>,
    pub year_changes: Vec<YearChange>,
    pub avg_12_months: Decimal,
    pub last_12_months: Vec<MonthlyDividend>,
}
