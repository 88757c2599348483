use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One daily close in the instrument's native currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub date: NaiveDate,
    pub close: Decimal,
}

impl Quote {
    pub fn new(date: NaiveDate, close: Decimal) -> Self {
        Quote { date, close }
    }
}
