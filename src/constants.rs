/// Base currency all prices are normalized into
pub const BASE_CURRENCY: &str = "EUR";

/// Decimal precision for prices and display amounts
pub const PRICE_DECIMAL_PRECISION: u32 = 2;

/// Decimal precision for position market values
pub const VALUE_DECIMAL_PRECISION: u32 = 0;

/// Marker identifying a dividend credit in statement remittance text
pub const DIVIDEND_MARKER: &str = "ERTRAEGNISGUTSCHRIFT";

/// Sentinel for unresolved WKN lookups
pub const UNKNOWN_NAME: &str = "Unknown";

/// Trading-day offset used when no close exists at the 3-month mark
pub const MOMENTUM_FALLBACK_TRADING_DAYS: usize = 63;
