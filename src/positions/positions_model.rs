use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Nested monetary field as delivered by the bank collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitValue {
    pub value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentPrice {
    pub price: UnitValue,
    #[serde(
        rename = "priceDateTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub price_date_time: Option<String>,
}

/// One depot position in the raw store shape. Recreated on every refresh;
/// the price-refresh job mutates `current_price`/`current_value` in place
/// before writing the list back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPosition {
    pub wkn: String,
    pub quantity: UnitValue,
    #[serde(rename = "purchasePrice")]
    pub purchase_price: UnitValue,
    #[serde(rename = "purchaseValue")]
    pub purchase_value: UnitValue,
    #[serde(rename = "currentPrice")]
    pub current_price: CurrentPrice,
    #[serde(rename = "currentValue")]
    pub current_value: UnitValue,
}

/// Analytics-ready position row. Monetary values carry the display rounding
/// policy: 0 decimals for values, 2 for prices and percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub wkn: String,
    pub name: String,
    pub count: Decimal,
    pub purchase_price: Decimal,
    pub purchase_value: Decimal,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub absolute_gain_loss: Decimal,
    pub performance_pct: Decimal,
    /// Share of the depot's total value; `None` when the depot total is zero.
    pub percentage_in_depot: Option<Decimal>,
    /// Summed ledger dividends for this WKN. `None` means no ledger rows
    /// joined, which is not the same as an explicit zero.
    pub total_dividends: Option<Decimal>,
    /// Trailing 3-month return in native currency; `None` when unavailable.
    pub momentum_3m: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DepotSummary {
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub performance_pct: Decimal,
}
