use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One end-of-day observation of the whole depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPoint {
    pub date: NaiveDate,
    #[serde(rename = "currentValue")]
    pub current_value: Decimal,
    #[serde(rename = "investedCapital")]
    pub invested_capital: Decimal,
}
