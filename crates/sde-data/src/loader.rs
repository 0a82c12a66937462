//! SDE Loader (SDL): an in-memory dictionary of the ~40 record
//! families, loadable from the file tree, queryable by family name or
//! (family, key).

use crate::error::SdeError;
use crate::fingerprint::DataDir;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

/// A single family's in-memory table: item key (string form) to decoded
/// JSON record.
pub type FamilyTable = HashMap<String, Value>;

/// In-memory SDE catalog. `ensure_loaded` is guarded by a
/// `tokio::sync::OnceCell` so concurrent callers race safely onto a
/// single load rather than each kicking off its own reload.
#[derive(Clone)]
pub struct SdlCatalog {
    data_dir: DataDir,
    families: Arc<RwLock<HashMap<String, FamilyTable>>>,
    first_load: Arc<OnceCell<()>>,
}

impl SdlCatalog {
    pub fn new(data_dir: DataDir) -> Self {
        Self {
            data_dir,
            families: Arc::new(RwLock::new(HashMap::new())),
            first_load: Arc::new(OnceCell::new()),
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.first_load.initialized()
    }

    /// Force a load if one has never happened. Concurrent callers share
    /// the same in-flight load.
    pub async fn ensure_loaded(&self) -> Result<(), SdeError> {
        let families = self.families.clone();
        let data_dir = self.data_dir.clone();
        self.first_load
            .get_or_try_init(|| async move { reload_all_into(&data_dir, &families).await })
            .await?;
        Ok(())
    }

    /// `ReloadAll`: reload every known family from the file tree,
    /// replacing the in-memory snapshot.
    pub async fn reload_all(&self) -> Result<(), SdeError> {
        reload_all_into(&self.data_dir, &self.families).await?;
        let _ = self.first_load.set(());
        Ok(())
    }

    /// `ReloadOne(family)`: reload a single family from its file.
    pub async fn reload_one(&self, family: &str) -> Result<(), SdeError> {
        let table = load_family_file(&self.data_dir, family).await?;
        self.families.write().await.insert(family.to_string(), table);
        Ok(())
    }

    /// `GetAll(family) -> map[key]record`.
    pub async fn get_all(&self, family: &str) -> Result<FamilyTable, SdeError> {
        {
            let families = self.families.read().await;
            if let Some(table) = families.get(family) {
                return Ok(table.clone());
            }
        }
        let table = load_family_file(&self.data_dir, family).await?;
        self.families
            .write()
            .await
            .insert(family.to_string(), table.clone());
        Ok(table)
    }

    /// `GetMaterials(typeKey)`: the derived `typeMaterials` family.
    /// Returns `None` when the type key has no materials entry at all,
    /// which callers must treat as a silent per-item skip.
    pub async fn get_materials(&self, type_key: &str) -> Result<Option<Value>, SdeError> {
        let table = self.get_all("typeMaterials").await?;
        Ok(table.get(type_key).cloned())
    }
}

async fn reload_all_into(
    data_dir: &DataDir,
    families: &Arc<RwLock<HashMap<String, FamilyTable>>>,
) -> Result<(), SdeError> {
    let mut loaded = HashMap::new();
    for stem in crate::extractor::SDE_FILE_STEMS {
        match load_family_file(data_dir, stem).await {
            Ok(table) => {
                loaded.insert(stem.to_string(), table);
            }
            Err(SdeError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                // Not every family is necessarily present on disk yet; an
                // absent file yields an empty table rather than failing
                // the whole catalog load.
                loaded.insert(stem.to_string(), HashMap::new());
            }
            Err(other) => return Err(other),
        }
    }
    *families.write().await = loaded;
    Ok(())
}

/// Load `<family>.json` from the data directory into a key→record table.
/// The on-disk shape is a JSON object keyed by the item's natural
/// identifier, matching the cache-key convention used downstream.
async fn load_family_file(data_dir: &DataDir, family: &str) -> Result<FamilyTable, SdeError> {
    let filename = format!("{family}.json");
    let contents = data_dir.read_whole(&filename).await?;
    let value: Value = serde_json::from_str(&contents)?;
    let object = value
        .as_object()
        .ok_or_else(|| SdeError::Fatal(format!("{family}.json is not a JSON object")))?;
    Ok(object.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn catalog_with(families: &[(&str, &str)]) -> (tempfile::TempDir, SdlCatalog) {
        let dir = tempdir().unwrap();
        let data_dir = DataDir::new(dir.path().join("data"), dir.path().join("tmp"));
        for (family, json) in families {
            data_dir.write_whole(&format!("{family}.json"), json).await.unwrap();
        }
        let catalog = SdlCatalog::new(data_dir);
        (dir, catalog)
    }

    #[tokio::test]
    async fn ensure_loaded_is_idempotent_and_loads_known_families() {
        let (_dir, catalog) = catalog_with(&[("agents", r#"{"1": {"name": "Agent One"}}"#)]).await;
        assert!(!catalog.is_loaded().await);
        catalog.ensure_loaded().await.unwrap();
        catalog.ensure_loaded().await.unwrap();
        assert!(catalog.is_loaded().await);

        let agents = catalog.get_all("agents").await.unwrap();
        assert_eq!(agents.len(), 1);
    }

    #[tokio::test]
    async fn missing_family_file_yields_empty_table_not_error() {
        let (_dir, catalog) = catalog_with(&[]).await;
        let table = catalog.get_all("categories").await.unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn get_materials_returns_none_for_unknown_type_key() {
        let (_dir, catalog) =
            catalog_with(&[("typeMaterials", r#"{"34": [{"materialTypeID": 35, "quantity": 100}]}"#)]).await;
        assert!(catalog.get_materials("999999").await.unwrap().is_none());
        assert!(catalog.get_materials("34").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn reload_one_refreshes_only_that_family() {
        let (_dir, catalog) = catalog_with(&[("agents", r#"{"1": {}}"#)]).await;
        catalog.ensure_loaded().await.unwrap();
        catalog
            .reload_one("agents")
            .await
            .unwrap_or_else(|e| panic!("reload failed: {e}"));
    }
}
