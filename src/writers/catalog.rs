use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::warn;

use crate::error::{PipelineError, Result};
use crate::models::{CatalogEntry, RasterField};

const INDEX_FILE: &str = "index.json";

/// File-backed catalog of accumulated-GDD surfaces, one entry per date.
///
/// Each entry lives at `<root>/GDD_YYYYMMDD.bin` (bincode-encoded
/// `CatalogEntry`) and `index.json` maps ISO dates to entry names — the date
/// attribute the accumulation recurrence queries by, kept explicit instead
/// of being re-derived from the naming scheme. Republishing a date is
/// last-write-wins and logged.
pub struct RasterCatalog {
    root: PathBuf,
}

impl RasterCatalog {
    /// Open (creating if necessary) a catalog rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let catalog = Self { root };
        if !catalog.index_path().exists() {
            catalog.save_index(&BTreeMap::new())?;
        }
        Ok(catalog)
    }

    /// Deterministic entry name for a date.
    pub fn entry_name(date: NaiveDate) -> String {
        date.format("GDD_%Y%m%d").to_string()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.entry_path(name).exists()
    }

    /// Store a field as the catalog entry for its date and index it.
    /// An existing entry for the date is overwritten (last-write-wins);
    /// an index entry under a different name means the catalog was edited
    /// out-of-band and is rejected.
    pub fn publish(&self, field: &RasterField, date: NaiveDate) -> Result<String> {
        let name = Self::entry_name(date);
        let mut index = self.load_index()?;
        if let Some(existing) = index.get(&date) {
            if existing != &name {
                return Err(PipelineError::CatalogConflict {
                    name: existing.clone(),
                });
            }
            warn!("catalog entry {} already exists, overwriting", name);
        }

        let entry = CatalogEntry {
            name: name.clone(),
            date,
            field: field.clone(),
        };
        let bytes = bincode::serde::encode_to_vec(&entry, bincode::config::standard())?;
        fs::write(self.entry_path(&name), bytes)?;

        index.insert(date, name.clone());
        self.save_index(&index)?;
        Ok(name)
    }

    /// Look up the entry for an exact date via the index. `None` marks the
    /// start of a series (or a chain gap the caller must decide about).
    pub fn entry_for_date(&self, date: NaiveDate) -> Result<Option<CatalogEntry>> {
        let index = self.load_index()?;
        let name = match index.get(&date) {
            Some(name) => name,
            None => return Ok(None),
        };
        let bytes = fs::read(self.entry_path(name))?;
        let (entry, _) =
            bincode::serde::decode_from_slice::<CatalogEntry, _>(&bytes, bincode::config::standard())?;
        Ok(Some(entry))
    }

    /// All catalogued dates in ascending order.
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        Ok(self.load_index()?.keys().copied().collect())
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.bin", name))
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    fn load_index(&self) -> Result<BTreeMap<NaiveDate, String>> {
        let bytes = fs::read(self.index_path())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write-then-rename so a killed process never leaves a torn index.
    fn save_index(&self, index: &BTreeMap<NaiveDate, String>) -> Result<()> {
        let tmp = self.root.join(format!("{}.tmp", INDEX_FILE));
        fs::write(&tmp, serde_json::to_vec_pretty(index)?)?;
        fs::rename(&tmp, self.index_path())?;
        Ok(())
    }
}

/// Convenience used by the date loop: the previous day's entry, if any.
pub fn previous_entry(catalog: &RasterCatalog, date: NaiveDate) -> Result<Option<CatalogEntry>> {
    match date.pred_opt() {
        Some(previous) => catalog.entry_for_date(previous),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldKind, GridSpec};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
    }

    fn field(values: Vec<f32>) -> RasterField {
        let spec = GridSpec::new(0.0, 0.0, 20.0, 10.0, 10.0);
        RasterField::new(date(), FieldKind::AccumulatedGdd, spec, values).unwrap()
    }

    #[test]
    fn test_entry_name_scheme() {
        assert_eq!(RasterCatalog::entry_name(date()), "GDD_20230601");
    }

    #[test]
    fn test_publish_and_lookup_by_date() {
        let dir = TempDir::new().unwrap();
        let catalog = RasterCatalog::open(dir.path()).unwrap();

        let name = catalog.publish(&field(vec![1.5, 2.5]), date()).unwrap();
        assert_eq!(name, "GDD_20230601");
        assert!(catalog.exists(&name));

        let entry = catalog.entry_for_date(date()).unwrap().unwrap();
        assert_eq!(entry.name, name);
        assert_eq!(entry.date, date());
        assert_eq!(entry.field.values, vec![1.5, 2.5]);

        assert!(catalog
            .entry_for_date(date().succ_opt().unwrap())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_republish_is_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let catalog = RasterCatalog::open(dir.path()).unwrap();

        catalog.publish(&field(vec![1.0, 1.0]), date()).unwrap();
        catalog.publish(&field(vec![9.0, 9.0]), date()).unwrap();

        let entry = catalog.entry_for_date(date()).unwrap().unwrap();
        assert_eq!(entry.field.values, vec![9.0, 9.0]);
        assert_eq!(catalog.dates().unwrap(), vec![date()]);
    }

    #[test]
    fn test_reopen_preserves_entries() {
        let dir = TempDir::new().unwrap();
        {
            let catalog = RasterCatalog::open(dir.path()).unwrap();
            catalog.publish(&field(vec![3.0, 4.0]), date()).unwrap();
        }
        let reopened = RasterCatalog::open(dir.path()).unwrap();
        let entry = reopened.entry_for_date(date()).unwrap().unwrap();
        assert_eq!(entry.field.values, vec![3.0, 4.0]);
    }

    #[test]
    fn test_previous_entry() {
        let dir = TempDir::new().unwrap();
        let catalog = RasterCatalog::open(dir.path()).unwrap();
        catalog.publish(&field(vec![3.0, 4.0]), date()).unwrap();

        let next = date().succ_opt().unwrap();
        let previous = previous_entry(&catalog, next).unwrap().unwrap();
        assert_eq!(previous.date, date());
        assert!(previous_entry(&catalog, date()).unwrap().is_none());
    }
}
