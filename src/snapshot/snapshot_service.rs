use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, error};

use super::snapshot_model::SnapshotPoint;
use crate::errors::Result;
use crate::positions::positions_model::DepotSummary;
use crate::storage::SnapshotStoreTrait;

pub trait SnapshotServiceTrait: Send + Sync {
    /// Records today's depot valuation, replacing an earlier point for the
    /// same date. A failed write is logged and swallowed so a disk hiccup
    /// never takes down the refresh cycle.
    fn record_daily(&self, summary: &DepotSummary, today: NaiveDate);

    /// Full valuation history, oldest first.
    fn history(&self) -> Result<Vec<SnapshotPoint>>;
}

pub struct SnapshotService {
    store: Arc<dyn SnapshotStoreTrait>,
}

impl SnapshotService {
    pub fn new(store: Arc<dyn SnapshotStoreTrait>) -> Self {
        SnapshotService { store }
    }
}

impl SnapshotServiceTrait for SnapshotService {
    fn record_daily(&self, summary: &DepotSummary, today: NaiveDate) {
        let point = SnapshotPoint {
            date: today,
            current_value: summary.total_value.round_dp(2),
            invested_capital: summary.total_cost.round_dp(2),
        };
        match self.store.upsert_by_date(point) {
            Ok(()) => debug!("Recorded depot snapshot for {}", today),
            Err(e) => error!("Failed to record depot snapshot for {}: {}", today, e),
        }
    }

    fn history(&self) -> Result<Vec<SnapshotPoint>> {
        let mut points = self.store.get_all()?;
        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}
