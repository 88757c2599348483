use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use log::{error, info};
use rust_decimal::Decimal;

use crate::allocation::{AllocationBreakdown, AllocationService};
use crate::dividends::{
    DividendRecord, DividendService, DividendServiceTrait, DividendStatistics,
};
use crate::errors::Result;
use crate::fx::FxCache;
use crate::market_data::{MarketDataProvider, PriceService};
use crate::metadata::MetadataRegistryTrait;
use crate::positions::{enrich_positions, summarize, DepotSummary, Position};
use crate::snapshot::{SnapshotPoint, SnapshotService, SnapshotServiceTrait};
use crate::storage::{
    DividendLedgerTrait, PositionStoreTrait, SnapshotStoreTrait, StatementStoreTrait,
};

/// Composition root of the reconciliation pipeline. Owns every collaborator
/// and the cross-cutting session state: the FX rate cache and the momentum
/// values accumulated across price refreshes.
pub struct DepotService {
    position_store: Arc<dyn PositionStoreTrait>,
    statement_store: Arc<dyn StatementStoreTrait>,
    registry: Arc<dyn MetadataRegistryTrait>,
    fx: Arc<FxCache>,
    price_service: PriceService,
    dividend_service: DividendService,
    allocation_service: AllocationService,
    snapshot_service: SnapshotService,
    // Extended, never replaced, so a failed recompute keeps the prior value.
    momentum: RwLock<HashMap<String, Decimal>>,
}

impl DepotService {
    pub fn new(
        position_store: Arc<dyn PositionStoreTrait>,
        statement_store: Arc<dyn StatementStoreTrait>,
        ledger: Arc<dyn DividendLedgerTrait>,
        snapshot_store: Arc<dyn SnapshotStoreTrait>,
        registry: Arc<dyn MetadataRegistryTrait>,
        provider: Arc<dyn MarketDataProvider>,
    ) -> Self {
        let fx = Arc::new(FxCache::new());
        DepotService {
            position_store,
            statement_store,
            registry: registry.clone(),
            fx: fx.clone(),
            price_service: PriceService::new(provider, registry.clone(), fx),
            dividend_service: DividendService::new(ledger, registry.clone()),
            allocation_service: AllocationService::new(registry),
            snapshot_service: SnapshotService::new(snapshot_store),
            momentum: RwLock::new(HashMap::new()),
        }
    }

    /// Syncs the dividend ledger from the latest statements, then returns
    /// the enriched position rows.
    pub fn positions(&self) -> Result<Vec<Position>> {
        let raw = self.position_store.get_all()?;
        let ledger = self.dividends()?;
        let momentum = self.momentum.read().unwrap();
        Ok(enrich_positions(
            &raw,
            &ledger,
            &momentum,
            self.registry.as_ref(),
        ))
    }

    pub fn summary(&self) -> Result<DepotSummary> {
        Ok(summarize(&self.positions()?))
    }

    /// Fetches current EUR prices and recomputes momentum for every position
    /// with a known ticker, then writes the updated raw positions back. A
    /// failed write-back is logged; the refreshed values still serve the
    /// current session.
    pub async fn update_prices(&self) -> Result<()> {
        let mut raw = self.position_store.get_all()?;
        let refreshed = self.price_service.refresh_prices(&mut raw).await;

        info!(
            "Price refresh complete: {} of {} positions with fresh momentum",
            refreshed.len(),
            raw.len()
        );
        self.momentum.write().unwrap().extend(refreshed);

        if let Err(e) = self.position_store.save_all(&raw) {
            error!("Failed to write refreshed positions back: {}", e);
        }
        Ok(())
    }

    /// Drops cached FX rates so the next refresh re-fetches them.
    pub fn invalidate_fx(&self) {
        self.fx.invalidate();
    }

    pub fn allocation(&self) -> Result<AllocationBreakdown> {
        Ok(self.allocation_service.distribute(&self.positions()?))
    }

    pub fn asset_allocation(&self) -> Result<BTreeMap<String, Decimal>> {
        Ok(self.allocation_service.by_asset_class(&self.positions()?))
    }

    /// Records today's valuation point, replacing any earlier point for the
    /// same date.
    pub fn record_snapshot(&self, today: NaiveDate) -> Result<()> {
        let summary = self.summary()?;
        self.snapshot_service.record_daily(&summary, today);
        Ok(())
    }

    pub fn snapshot_history(&self) -> Result<Vec<SnapshotPoint>> {
        self.snapshot_service.history()
    }

    /// The merged dividend ledger after reconciling the current statements.
    pub fn dividends(&self) -> Result<Vec<DividendRecord>> {
        let statements = self.statement_store.get_all()?;
        self.dividend_service.sync_ledger(&statements)
    }

    pub fn dividend_statistics(&self, today: NaiveDate) -> Result<DividendStatistics> {
        self.dividend_service.statistics(today)
    }
}
