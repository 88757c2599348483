use std::collections::BTreeMap;
use std::sync::Arc;

use log::warn;
use rust_decimal::Decimal;

use super::allocation_model::AllocationBreakdown;
use crate::metadata::{MetadataRegistryTrait, SecurityMetadata};
use crate::positions::positions_model::Position;

/// Tolerated drift of a breakdown's weight sum from 1.0 before a curation
/// warning is logged. Weights are distributed as given either way.
const WEIGHT_SUM_TOLERANCE: Decimal = rust_decimal_macros::dec!(0.01);

pub struct AllocationService {
    registry: Arc<dyn MetadataRegistryTrait>,
}

impl AllocationService {
    pub fn new(registry: Arc<dyn MetadataRegistryTrait>) -> Self {
        AllocationService { registry }
    }

    /// Look-through distribution of position values across region and
    /// sector buckets. ETFs with a breakdown spread `current_value * weight`
    /// over every named bucket; other instruments attribute their full value
    /// to their single region/sector; positions with neither contribute
    /// nothing for that dimension.
    pub fn distribute(&self, positions: &[Position]) -> AllocationBreakdown {
        let mut breakdown = AllocationBreakdown {
            regions: zero_buckets(self.registry.all_regions()),
            sectors: zero_buckets(self.registry.all_sectors()),
        };

        for position in positions {
            if position.current_value <= Decimal::ZERO {
                continue;
            }
            let Some(meta) = self.registry.get(&position.wkn) else {
                continue;
            };

            distribute_dimension(
                &mut breakdown.regions,
                position.current_value,
                &meta,
                meta.region_breakdown.as_ref().filter(|_| meta.is_etf()),
                &meta.region,
            );
            distribute_dimension(
                &mut breakdown.sectors,
                position.current_value,
                &meta,
                meta.sector_breakdown.as_ref().filter(|_| meta.is_etf()),
                &meta.sector,
            );
        }

        breakdown
    }

    /// Total current value per asset class, classes drawn from the
    /// metadata table.
    pub fn by_asset_class(&self, positions: &[Position]) -> BTreeMap<String, Decimal> {
        let mut allocation: BTreeMap<String, Decimal> = BTreeMap::new();
        for position in positions {
            if position.current_value <= Decimal::ZERO {
                continue;
            }
            let Some(meta) = self.registry.get(&position.wkn) else {
                continue;
            };
            *allocation
                .entry(meta.asset_class.as_str().to_string())
                .or_default() += position.current_value;
        }
        allocation
    }
}

fn zero_buckets(names: impl IntoIterator<Item = String>) -> BTreeMap<String, Decimal> {
    names.into_iter().map(|name| (name, Decimal::ZERO)).collect()
}

fn distribute_dimension(
    buckets: &mut BTreeMap<String, Decimal>,
    current_value: Decimal,
    meta: &SecurityMetadata,
    weighted: Option<&BTreeMap<String, Decimal>>,
    single: &str,
) {
    match weighted {
        Some(weights) if !weights.is_empty() => {
            warn_on_weight_drift(&meta.wkn, weights);
            for (name, weight) in weights {
                *buckets.entry(name.clone()).or_default() += current_value * weight;
            }
        }
        _ => {
            let single = single.trim();
            if !single.is_empty() {
                *buckets.entry(single.to_string()).or_default() += current_value;
            }
        }
    }
}

fn warn_on_weight_drift(wkn: &str, weights: &BTreeMap<String, Decimal>) {
    let sum: Decimal = weights.values().sum();
    if (sum - Decimal::ONE).abs() > WEIGHT_SUM_TOLERANCE {
        warn!(
            "Breakdown weights for WKN {} sum to {}, expected about 1.0",
            wkn, sum
        );
    }
}
