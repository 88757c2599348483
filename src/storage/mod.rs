pub mod file_stores;
pub mod storage_traits;

pub use file_stores::{
    FileDividendLedger, FilePositionStore, FileSnapshotStore, FileStatementStore,
};
pub use storage_traits::{
    DividendLedgerTrait, PositionStoreTrait, SnapshotStoreTrait, StatementStoreTrait,
};
