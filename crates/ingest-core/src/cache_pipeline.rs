//! Keyed-Cache Import Pipeline: project the in-memory SDE into the
//! Keyed Cache under `sde:<family>:<key>`, with batched writes,
//! skip-if-present semantics, and live progress via the Status Fabric.

use crate::clock::now;
use crate::error::CoreError;
use crate::family::{Family, FamilyKeying};
use ingest_resilience::pacing::{clamp_batch_size, DEFAULT_BATCH_SIZE};
use keyed_cache::{family_item_key, KeyedCache, LAST_IMPORT_KEY};
use sde_data::SdlCatalog;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use status_fabric::{FamilyState, JobKind, JobSnapshot, JobState, Progress, StatusFabric};
use std::collections::HashMap;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;

/// Job entry input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheImportRequest {
    /// Empty means "all known families".
    pub families: Vec<String>,
    pub force: bool,
    pub batch_size: usize,
}

impl Default for CacheImportRequest {
    fn default() -> Self {
        Self {
            families: Vec::new(),
            force: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Validate the request and create the job. Returns the parsed,
/// validated family list alongside the job id so the caller can spawn
/// the worker.
pub async fn start_cache_import(
    fabric: &StatusFabric,
    request: &CacheImportRequest,
) -> Result<(String, Vec<Family>), CoreError> {
    let families = resolve_families(&request.families)?;
    let batch_size = clamp_batch_size(request.batch_size);
    if batch_size != request.batch_size {
        tracing::warn!(
            requested = request.batch_size,
            clamped = batch_size,
            "batch_size out of range, clamped"
        );
    }

    let family_names: Vec<String> = families.iter().map(|f| f.to_string()).collect();
    let progress = Progress::new(family_names);
    let job_id = fabric.create_job(JobKind::SdeImport, progress).await?;

    Ok((job_id, families))
}

fn resolve_families(requested: &[String]) -> Result<Vec<Family>, CoreError> {
    if requested.is_empty() {
        return Ok(Family::ALL.to_vec());
    }
    requested
        .iter()
        .map(|name| Family::from_str(name).map_err(|e| CoreError::Validation(e.to_string())))
        .collect()
}

/// The detached worker, driven by `tokio::spawn` with its own
/// `CancellationToken` rather than the request's.
pub async fn run_cache_import(
    fabric: &StatusFabric,
    cache: &KeyedCache,
    catalog: &SdlCatalog,
    job_id: &str,
    families: &[Family],
    force: bool,
    batch_size: usize,
    cancel: CancellationToken,
) -> Result<(), CoreError> {
    let mut snapshot = fabric.get_status(job_id).await?;
    snapshot = fabric.mark_running(snapshot).await;

    if !catalog.is_loaded().await {
        if let Err(err) = catalog.ensure_loaded().await {
            let _ = fabric.fail_job(snapshot, err.to_string()).await;
            return Err(CoreError::Sde(err));
        }
    }

    let total = families.len();
    for (i, family) in families.iter().enumerate() {
        if cancel.is_cancelled() {
            let _ = fabric.fail_job(snapshot, "job cancelled").await;
            return Err(CoreError::Cancelled);
        }

        snapshot.progress.current_step = format!("Processing {} ({}/{})", family, i + 1, total);
        set_family_state(&mut snapshot, family.name(), FamilyState::Processing);
        snapshot = fabric.update_status(snapshot).await;

        let result = process_family(fabric, cache, catalog, &mut snapshot, *family, force, batch_size, &cancel).await;

        match result {
            Ok(()) => {
                set_family_state(&mut snapshot, family.name(), FamilyState::Completed);
                snapshot.progress.completed_steps += 1;
                snapshot = fabric.update_status(snapshot).await;
            }
            Err(err) => {
                if let Some(fs) = snapshot.progress.families.get_mut(family.name()) {
                    fs.state = FamilyState::Failed;
                    fs.error = Some(err.to_string());
                }
                let _ = fabric.fail_job(snapshot, format!("family {family} failed: {err}")).await;
                return Err(err);
            }
        }
    }

    if let Err(err) = cache.set(LAST_IMPORT_KEY, &now().to_rfc3339()).await {
        let _ = fabric.fail_job(snapshot, err.to_string()).await;
        return Err(CoreError::Cache(err));
    }

    fabric.complete_job(snapshot).await;
    Ok(())
}

fn set_family_state(snapshot: &mut JobSnapshot, family_name: &str, state: FamilyState) {
    if let Some(fs) = snapshot.progress.families.get_mut(family_name) {
        fs.state = state;
    }
}

#[allow(clippy::too_many_arguments)]
async fn process_family(
    fabric: &StatusFabric,
    cache: &KeyedCache,
    catalog: &SdlCatalog,
    snapshot: &mut JobSnapshot,
    family: Family,
    force: bool,
    batch_size: usize,
    cancel: &CancellationToken,
) -> Result<(), CoreError> {
    let (items, count) = load_family_items(catalog, family).await?;
    if let Some(fs) = snapshot.progress.families.get_mut(family.name()) {
        fs.count = count;
    }

    let mut batch: HashMap<String, String> = HashMap::new();
    // Items dropped by `load_family_items` before returning (the Derived
    // keying's "no materials" case) are already accounted for against
    // `count`: they are processed with no write, so they are folded into
    // `processed` up front rather than left for end-of-function cleanup.
    let mut processed: u64 = count - items.len() as u64;

    for (cache_key, item) in items {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        if !force && cache.exists(&cache_key).await? {
            processed += 1;
            continue;
        }

        let encoded = serde_json::to_string(&item).map_err(|e| CoreError::Sde(sde_data::SdeError::Fatal(e.to_string())))?;
        batch.insert(cache_key, encoded);

        if batch.len() >= batch_size {
            flush_batch(cache, &mut batch).await?;
            processed += batch_size as u64;
            if let Some(fs) = snapshot.progress.families.get_mut(family.name()) {
                fs.processed = processed.min(count);
            }
            *snapshot = fabric.update_status(snapshot.clone()).await;
        }
    }

    let residual = batch.len() as u64;
    if residual > 0 {
        flush_batch(cache, &mut batch).await?;
        processed += residual;
    }

    if let Some(fs) = snapshot.progress.families.get_mut(family.name()) {
        fs.processed = processed;
    }
    *snapshot = fabric.update_status(snapshot.clone()).await;

    Ok(())
}

async fn flush_batch(cache: &KeyedCache, batch: &mut HashMap<String, String>) -> Result<(), CoreError> {
    if batch.is_empty() {
        return Ok(());
    }
    let entries: Vec<(String, String)> = batch.drain().collect();
    cache.pipeline_set(&entries).await?;
    Ok(())
}

/// Load a family's items as `(cache_key, value)` pairs, per the
/// per-family keying dispatch rules, alongside the family's true item
/// count. For `Derived` keying the returned item count can be smaller
/// than the true count: a type key with no materials entry is a silent
/// skip and is not itself returned as an item, but it still counts
/// toward `F.count`.
async fn load_family_items(catalog: &SdlCatalog, family: Family) -> Result<(Vec<(String, Value)>, u64), CoreError> {
    match family.keying() {
        FamilyKeying::MapKeyed => {
            let table = catalog.get_all(family.name()).await?;
            let items: Vec<(String, Value)> = table
                .into_iter()
                .map(|(key, value)| (family_item_key(family.name(), &key), value))
                .collect();
            let count = items.len() as u64;
            Ok((items, count))
        }
        FamilyKeying::ArrayKeyed { id_field } => {
            let table = catalog.get_all(family.name()).await?;
            let items: Vec<(String, Value)> = table
                .into_values()
                .filter_map(|value| {
                    let id = value.get(id_field)?;
                    let key = match id {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    Some((family_item_key(family.name(), &key), value))
                })
                .collect();
            let count = items.len() as u64;
            Ok((items, count))
        }
        FamilyKeying::Derived => {
            let type_keys = catalog.get_all("typeIDs").await?;
            let count = type_keys.len() as u64;
            let mut out = Vec::new();
            for type_key in type_keys.keys() {
                if let Some(materials) = catalog.get_materials(type_key).await? {
                    out.push((family_item_key(family.name(), type_key), materials));
                }
                // "no materials" (`None`) is a silent per-item skip: it
                // still counts toward `count` (via `|typeIDs|`) but is
                // never written and is not among the returned items.
            }
            Ok((out, count))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_uses_default_batch_size() {
        let request = CacheImportRequest::default();
        assert_eq!(request.batch_size, DEFAULT_BATCH_SIZE);
        assert!(request.families.is_empty());
    }

    #[test]
    fn resolve_families_empty_means_all() {
        let resolved = resolve_families(&[]).unwrap();
        assert_eq!(resolved.len(), Family::ALL.len());
    }

    #[test]
    fn resolve_families_rejects_unknown_names() {
        let err = resolve_families(&["notAFamily".to_string()]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn derived_family_count_includes_type_keys_with_no_materials() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = sde_data::DataDir::new(dir.path().join("data"), dir.path().join("tmp"));
        data_dir
            .write_whole("typeIDs.json", r#"{"1": {}, "2": {}, "3": {}}"#)
            .await
            .unwrap();
        data_dir
            .write_whole("typeMaterials.json", r#"{"1": [{"materialTypeID": 34, "quantity": 10}]}"#)
            .await
            .unwrap();
        let catalog = SdlCatalog::new(data_dir);
        catalog.ensure_loaded().await.unwrap();

        let (items, count) = load_family_items(&catalog, Family::TypeMaterials).await.unwrap();
        assert_eq!(count, 3);
        assert_eq!(items.len(), 1);
    }
}
