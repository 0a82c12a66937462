//! Bulk Alliance Importer: enumerate all alliance ids via the UAC,
//! fetch per-id detail, upsert each into the Document Store.
//!
//! Invoked synchronously by the HTTP handler and returns its stats
//! directly; it does not interact with the Status Fabric.

use crate::clock::now;
use crate::error::CoreError;
use alliance_client::AllianceClient;
use ingest_document_store::alliances::AllianceRecord;
use ingest_document_store::DocumentStore;
use ingest_resilience::pacing::delay_after;
use serde::{Deserialize, Serialize};

/// `RunBulkImport(ctx) -> stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkImportStats {
    pub total: usize,
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    /// Reserved; always 0 in this version.
    pub skipped: usize,
}

pub async fn run_bulk_import(
    client: &AllianceClient,
    store: &DocumentStore,
) -> Result<BulkImportStats, CoreError> {
    let ids = client.list_alliances().await?;
    let mut stats = BulkImportStats {
        total: ids.len(),
        ..Default::default()
    };

    for (i, alliance_id) in ids.iter().copied().enumerate() {
        if i > 0 {
            tokio::time::sleep(delay_after(i - 1)).await;
        }

        let is_update = store.alliances().exists(alliance_id).await?;

        let detail = match client.alliance_detail(alliance_id).await {
            Ok(detail) => detail,
            Err(err) => {
                tracing::warn!(alliance_id, error = %err, "alliance detail fetch failed; skipping");
                stats.failed += 1;
                continue;
            }
        };

        let now = now();
        let record = AllianceRecord {
            alliance_id: detail.alliance_id,
            name: detail.name,
            ticker: detail.ticker,
            date_founded: detail.date_founded.unwrap_or(now),
            creator_corporation_id: detail.creator_corporation_id.unwrap_or_default(),
            creator_character_id: detail.creator_character_id.unwrap_or_default(),
            executor_corporation_id: detail.executor_corporation_id,
            faction_id: detail.faction_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        if let Err(err) = store.alliances().upsert(&record).await {
            tracing::warn!(alliance_id, error = %err, "alliance upsert failed; skipping");
            stats.failed += 1;
            continue;
        }

        stats.processed += 1;
        if is_update {
            stats.updated += 1;
        } else {
            stats.created += 1;
        }
    }

    Ok(stats)
}
