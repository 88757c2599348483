//! File-backed stores. Each depot owns its own directory of files, so jobs
//! for different depots never contend. Writes within one depot are
//! read-modify-write and must be serialized by the caller.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::storage_traits::{
    DividendLedgerTrait, PositionStoreTrait, SnapshotStoreTrait, StatementStoreTrait,
};
use crate::dividends::dividends_model::{DividendRecord, StatementTransaction};
use crate::errors::Result;
use crate::positions::positions_model::RawPosition;
use crate::snapshot::snapshot_model::SnapshotPoint;

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

// A missing file reads as an empty list and is created on the spot, so a
// fresh depot directory bootstraps itself.
fn read_list<T, F>(path: &Path, empty: &str, parse: F) -> Result<Vec<T>>
where
    F: FnOnce(&str) -> Result<Vec<T>>,
{
    if !path.exists() {
        ensure_parent_dir(path)?;
        fs::write(path, empty)?;
        debug!("Created persistent local data: {}", path.display());
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    parse(&raw)
}

fn read_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    read_list(path, "[]", |raw| Ok(serde_json::from_str(raw)?))
}

fn write_json_list<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, serde_json::to_string_pretty(items)?)?;
    Ok(())
}

fn read_yaml_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    read_list(path, "[]\n", |raw| Ok(serde_yaml::from_str(raw)?))
}

fn write_yaml_list<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, serde_yaml::to_string(items)?)?;
    Ok(())
}

pub struct FilePositionStore {
    path: PathBuf,
}

impl FilePositionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FilePositionStore { path: path.into() }
    }
}

impl PositionStoreTrait for FilePositionStore {
    fn get_all(&self) -> Result<Vec<RawPosition>> {
        read_json_list(&self.path)
    }

    fn save_all(&self, positions: &[RawPosition]) -> Result<()> {
        write_json_list(&self.path, positions)
    }
}

pub struct FileStatementStore {
    path: PathBuf,
}

impl FileStatementStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStatementStore { path: path.into() }
    }
}

impl StatementStoreTrait for FileStatementStore {
    fn get_all(&self) -> Result<Vec<StatementTransaction>> {
        read_json_list(&self.path)
    }
}

/// YAML keeps the ledger reviewable by hand, which matters for a file that
/// is only ever appended to.
pub struct FileDividendLedger {
    path: PathBuf,
}

impl FileDividendLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileDividendLedger { path: path.into() }
    }
}

impl DividendLedgerTrait for FileDividendLedger {
    fn get_all(&self) -> Result<Vec<DividendRecord>> {
        read_yaml_list(&self.path)
    }

    fn append(&self, new_records: &[DividendRecord]) -> Result<()> {
        let mut all = self.get_all()?;
        all.extend_from_slice(new_records);
        write_yaml_list(&self.path, &all)
    }
}

pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSnapshotStore { path: path.into() }
    }
}

impl SnapshotStoreTrait for FileSnapshotStore {
    fn get_all(&self) -> Result<Vec<SnapshotPoint>> {
        read_json_list(&self.path)
    }

    fn upsert_by_date(&self, point: SnapshotPoint) -> Result<()> {
        let mut all = self.get_all()?;
        match all.iter_mut().find(|p| p.date == point.date) {
            Some(existing) => *existing = point,
            None => all.push(point),
        }
        write_json_list(&self.path, &all)
    }
}
