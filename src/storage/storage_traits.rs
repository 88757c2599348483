use crate::dividends::dividends_model::{DividendRecord, StatementTransaction};
use crate::errors::Result;
use crate::positions::positions_model::RawPosition;
use crate::snapshot::snapshot_model::SnapshotPoint;

/// Raw position snapshots as delivered by the bank collaborator. The
/// price-refresh job writes converted prices back through `save_all`.
pub trait PositionStoreTrait: Send + Sync {
    fn get_all(&self) -> Result<Vec<RawPosition>>;
    fn save_all(&self, positions: &[RawPosition]) -> Result<()>;
}

/// Bank statement transactions, read-only for this pipeline.
pub trait StatementStoreTrait: Send + Sync {
    fn get_all(&self) -> Result<Vec<StatementTransaction>>;
}

/// Append-only dividend ledger. Records are never updated or deleted;
/// `append` persists existing + new in one write.
pub trait DividendLedgerTrait: Send + Sync {
    fn get_all(&self) -> Result<Vec<DividendRecord>>;
    fn append(&self, new_records: &[DividendRecord]) -> Result<()>;
}

/// Daily valuation history, one point per calendar day per depot.
pub trait SnapshotStoreTrait: Send + Sync {
    fn get_all(&self) -> Result<Vec<SnapshotPoint>>;
    fn upsert_by_date(&self, point: SnapshotPoint) -> Result<()>;
}
