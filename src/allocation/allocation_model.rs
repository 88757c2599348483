use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

/// Portfolio exposure per region and sector bucket, in EUR. Buckets cover
/// the full vocabulary of the metadata table so the breakdown stays
/// comparable across refreshes and depots; unused buckets hold zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllocationBreakdown {
    pub regions: BTreeMap<String, Decimal>,
    pub sectors: BTreeMap<String, Decimal>,
}
