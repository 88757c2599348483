use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use log::{debug, warn};

use super::metadata_model::SecurityMetadata;
use crate::constants::UNKNOWN_NAME;
use crate::errors::Result;

pub trait MetadataRegistryTrait: Send + Sync {
    /// Complete metadata for a WKN, or `None` when the table has no entry.
    /// Misses are logged for manual curation and never fabricated.
    fn get(&self, wkn: &str) -> Option<SecurityMetadata>;

    /// Security name for a WKN, falling back to the "Unknown" sentinel.
    fn name_for(&self, wkn: &str) -> String;

    /// Quote-provider ticker for a WKN. `None` when the WKN is unresolved
    /// or the curated ticker is blank or still the sentinel.
    fn ticker_for(&self, wkn: &str) -> Option<String>;

    fn all(&self) -> Vec<SecurityMetadata>;

    /// Union of every region name in the table: single-value fields plus
    /// every region-breakdown key. Stable across refreshes and depots.
    fn all_regions(&self) -> BTreeSet<String>;

    /// Union of every sector name in the table, see [`all_regions`].
    fn all_sectors(&self) -> BTreeSet<String>;

    /// Rebuild the cache from the backing table.
    fn refresh(&self) -> Result<()>;

    /// Drop the cache; the next lookup reloads lazily.
    fn invalidate(&self);
}

/// WKN -> metadata lookup backed by a manually curated JSON table,
/// cached for the process lifetime.
pub struct MetadataRegistry {
    path: Option<PathBuf>,
    cache: RwLock<Option<HashMap<String, SecurityMetadata>>>,
}

impl MetadataRegistry {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        MetadataRegistry {
            path: Some(path.into()),
            cache: RwLock::new(None),
        }
    }

    /// Registry over a fixed in-memory table, used when the table is
    /// assembled by the host instead of read from disk.
    pub fn from_entries(entries: Vec<SecurityMetadata>) -> Self {
        let table = entries
            .into_iter()
            .map(|m| (m.wkn.clone(), m))
            .collect::<HashMap<_, _>>();
        MetadataRegistry {
            path: None,
            cache: RwLock::new(Some(table)),
        }
    }

    fn load_table(&self) -> Result<HashMap<String, SecurityMetadata>> {
        let Some(path) = &self.path else {
            return Ok(HashMap::new());
        };
        if !path.exists() {
            warn!(
                "Metadata table {} does not exist; all lookups will miss",
                path.display()
            );
            return Ok(HashMap::new());
        }
        let raw = fs::read_to_string(path)?;
        let table: HashMap<String, SecurityMetadata> = serde_json::from_str(&raw)?;
        // The table keys records by WKN without repeating it in the value.
        let table = table
            .into_iter()
            .map(|(wkn, mut meta)| {
                meta.wkn = wkn.clone();
                (wkn, meta)
            })
            .collect();
        debug!("Loaded metadata table from {}", path.display());
        Ok(table)
    }

    fn with_cache<T>(&self, f: impl FnOnce(&HashMap<String, SecurityMetadata>) -> T) -> T {
        {
            let cache = self.cache.read().unwrap();
            if let Some(table) = cache.as_ref() {
                return f(table);
            }
        }
        let table = self.load_table().unwrap_or_else(|e| {
            warn!("Failed to load metadata table: {}", e);
            HashMap::new()
        });
        let mut cache = self.cache.write().unwrap();
        let table = cache.get_or_insert(table);
        f(table)
    }
}

impl MetadataRegistryTrait for MetadataRegistry {
    fn get(&self, wkn: &str) -> Option<SecurityMetadata> {
        let found = self.with_cache(|table| table.get(wkn).cloned());
        if found.is_none() {
            warn!(
                "WKN '{}' not found in metadata lookup, please add it manually",
                wkn
            );
        }
        found
    }

    fn name_for(&self, wkn: &str) -> String {
        self.get(wkn)
            .map(|m| m.name)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }

    fn ticker_for(&self, wkn: &str) -> Option<String> {
        self.get(wkn)
            .map(|m| m.ticker)
            .filter(|t| !t.trim().is_empty() && t != UNKNOWN_NAME)
    }

    fn all(&self) -> Vec<SecurityMetadata> {
        self.with_cache(|table| table.values().cloned().collect())
    }

    fn all_regions(&self) -> BTreeSet<String> {
        self.with_cache(|table| {
            let mut regions = BTreeSet::new();
            for meta in table.values() {
                if !meta.region.trim().is_empty() {
                    regions.insert(meta.region.clone());
                }
                if let Some(breakdown) = &meta.region_breakdown {
                    regions.extend(breakdown.keys().cloned());
                }
            }
            regions
        })
    }

    fn all_sectors(&self) -> BTreeSet<String> {
        self.with_cache(|table| {
            let mut sectors = BTreeSet::new();
            for meta in table.values() {
                if !meta.sector.trim().is_empty() {
                    sectors.insert(meta.sector.clone());
                }
                if let Some(breakdown) = &meta.sector_breakdown {
                    sectors.extend(breakdown.keys().cloned());
                }
            }
            sectors
        })
    }

    fn refresh(&self) -> Result<()> {
        let table = self.load_table()?;
        let mut cache = self.cache.write().unwrap();
        *cache = Some(table);
        Ok(())
    }

    fn invalidate(&self) {
        let mut cache = self.cache.write().unwrap();
        *cache = None;
    }
}
