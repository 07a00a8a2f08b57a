//! Product catalog persistence
//!
//! Static product data (stock numbers, specifications, safety markings) is
//! kept in a JSON catalog so operators only key the per-batch values. Saves
//! are atomic: the new content goes to a temp file in the target directory,
//! the previous file becomes a .bak, and the temp is renamed into place.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{LabelError, Result, ResultExt};
use crate::fields::LabelRecord;

/// A catalog entry holding the static fields for one product
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProductCatalogEntry {
    pub id: String,
    #[serde(default)]
    pub product_description: String,
    #[serde(default)]
    pub nato_stock_no: String,
    #[serde(default)]
    pub nato_code: String,
    #[serde(default)]
    pub jsd_reference: String,
    #[serde(default)]
    pub specification: String,
    #[serde(default)]
    pub unit_of_issue: String,
    #[serde(default)]
    pub capacity_net_weight: String,
    #[serde(default)]
    pub shelf_life_months: u32,
    #[serde(default)]
    pub batch_managed: String,
    #[serde(default)]
    pub contractor_details: String,
    #[serde(default)]
    pub safety_markings: String,
    #[serde(default)]
    pub hazardous_material_code: String,
}

impl ProductCatalogEntry {
    /// Project this entry into a record, used to fill blanks in a batch row
    pub fn to_record(&self) -> LabelRecord {
        let mut record = LabelRecord::new();
        record.set("product_description", &self.product_description);
        record.set("nato_stock_no", &self.nato_stock_no);
        record.set("nato_code", &self.nato_code);
        record.set("jsd_reference", &self.jsd_reference);
        record.set("specification", &self.specification);
        record.set("unit_of_issue", &self.unit_of_issue);
        record.set("capacity_net_weight", &self.capacity_net_weight);
        if self.shelf_life_months > 0 {
            record.set("shelf_life_months", &self.shelf_life_months.to_string());
        }
        record.set("batch_managed", &self.batch_managed);
        record.set("contractor_details", &self.contractor_details);
        record.set("safety_markings", &self.safety_markings);
        record.set("hazardous_material_code", &self.hazardous_material_code);
        record
    }
}

/// Catalog of products keyed by id
#[derive(Debug, Default)]
pub struct ProductCatalog {
    entries: BTreeMap<String, ProductCatalogEntry>,
}

impl ProductCatalog {
    pub fn new() -> ProductCatalog {
        ProductCatalog::default()
    }

    /// Load a catalog from disk. A missing file yields an empty catalog;
    /// a present but unparseable file is a hard error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ProductCatalog> {
        let path = path.as_ref();
        if !path.exists() {
            info!("Catalog {} not found, starting empty", path.display());
            return Ok(ProductCatalog::new());
        }
        let content = std::fs::read_to_string(path).with_path_context("read", path)?;
        let list: Vec<ProductCatalogEntry> =
            serde_json::from_str(&content).map_err(|e| {
                debug!("Catalog parse failure: {}", e);
                LabelError::CatalogUnreadable {
                    path: path.display().to_string(),
                }
            })?;

        let mut entries = BTreeMap::new();
        for entry in list {
            if entries.insert(entry.id.clone(), entry).is_some() {
                return Err(LabelError::CatalogUnreadable {
                    path: path.display().to_string(),
                }
                .into());
            }
        }
        info!("Loaded {} catalog entries from {}", entries.len(), path.display());
        Ok(ProductCatalog { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ProductCatalogEntry> {
        self.entries.get(id)
    }

    /// Insert a new entry, rejecting duplicate ids
    pub fn add(&mut self, entry: ProductCatalogEntry) -> Result<()> {
        if self.entries.contains_key(&entry.id) {
            return Err(LabelError::DuplicateProduct {
                id: entry.id.clone(),
            }
            .into());
        }
        self.entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    /// Replace an existing entry or insert a new one
    pub fn update(&mut self, entry: ProductCatalogEntry) {
        self.entries.insert(entry.id.clone(), entry);
    }

    pub fn remove(&mut self, id: &str) -> Option<ProductCatalogEntry> {
        self.entries.remove(id)
    }

    /// Persist atomically: temp file in the target directory, previous file
    /// kept as .bak, rename into place
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let list: Vec<&ProductCatalogEntry> = self.entries.values().collect();
        let content = serde_json::to_string_pretty(&list)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)
            .with_path_context("create temp file in", dir)?;
        std::io::Write::write_all(&mut temp, content.as_bytes())
            .with_path_context("write", temp.path())?;

        if path.exists() {
            let backup = path.with_extension("json.bak");
            std::fs::copy(path, &backup).with_path_context("back up", path)?;
        }
        temp.persist(path)
            .map_err(|e| anyhow::anyhow!("Failed to persist catalog {}: {}", path.display(), e))?;
        info!("Saved {} catalog entries to {}", self.entries.len(), path.display());
        Ok(())
    }

    /// Build the render record for one batch: catalog statics plus the
    /// operator's per-batch values, which always win
    pub fn merge_batch(&self, id: &str, batch: &LabelRecord) -> LabelRecord {
        let mut record = batch.clone();
        if let Some(entry) = self.get(id) {
            record.fill_missing_from(&entry.to_record());
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> ProductCatalogEntry {
        ProductCatalogEntry {
            id: "OM-11".to_string(),
            product_description: "Fuchs OM-11".to_string(),
            nato_stock_no: "9150-66-035-7879".to_string(),
            nato_code: "H-515".to_string(),
            specification: "DEF STAN 91-39".to_string(),
            unit_of_issue: "DR".to_string(),
            shelf_life_months: 36,
            batch_managed: "Y".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let mut catalog = ProductCatalog::new();
        catalog.add(sample_entry()).unwrap();
        let err = catalog.add(sample_entry()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LabelError>(),
            Some(LabelError::DuplicateProduct { .. })
        ));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let mut catalog = ProductCatalog::new();
        catalog.add(sample_entry()).unwrap();
        catalog.save(&path).unwrap();

        let loaded = ProductCatalog::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("OM-11").unwrap().shelf_life_months, 36);
    }

    #[test]
    fn test_save_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let mut catalog = ProductCatalog::new();
        catalog.add(sample_entry()).unwrap();
        catalog.save(&path).unwrap();

        let mut updated = sample_entry();
        updated.shelf_life_months = 48;
        catalog.update(updated);
        catalog.save(&path).unwrap();

        assert!(path.with_extension("json.bak").exists());
        let loaded = ProductCatalog::load(&path).unwrap();
        assert_eq!(loaded.get("OM-11").unwrap().shelf_life_months, 48);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ProductCatalog::load(dir.path().join("absent.json")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_load_unparseable_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = ProductCatalog::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LabelError>(),
            Some(LabelError::CatalogUnreadable { .. })
        ));
    }

    #[test]
    fn test_merge_batch_prefers_operator_values() {
        let mut catalog = ProductCatalog::new();
        catalog.add(sample_entry()).unwrap();

        let mut batch = LabelRecord::new();
        batch.set("batch_lot_no", "FM251115A");
        batch.set("date_of_manufacture", "15/11/2025");
        batch.set("unit_of_issue", "PL");

        let merged = catalog.merge_batch("OM-11", &batch);
        assert_eq!(merged.get("unit_of_issue"), "PL");
        assert_eq!(merged.get("nato_stock_no"), "9150-66-035-7879");
        assert_eq!(merged.get("batch_lot_no"), "FM251115A");
    }
}
