//! Reconciliation of fetched batches against storage: in-batch dedup,
//! sanitation, and create-or-update keyed on `source_id`. Shared by the CLI
//! and any interactive caller; the two differ only in where the raw records
//! come from and how the counts are rendered.

use crate::domain::StoredEvent;
use crate::error::{HarvestError, Result};
use crate::sanitize::{sanitize_event_data, SanitizedEvent};
use crate::storage::EventStore;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Tally of one reconciliation run. The counts sum to at most the number of
/// records surviving in-batch dedup; a batch never fails wholesale for
/// data-quality reasons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl IngestStats {
    pub fn total_processed(&self) -> usize {
        self.created + self.updated + self.skipped
    }
}

enum Outcome {
    Created,
    Updated,
    Skipped,
}

pub struct Reconciler {
    store: Arc<dyn EventStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Batch entry point. Deduplicates by source id (first occurrence
    /// wins), sanitizes each survivor, and upserts it. In dry-run mode the
    /// transforms still run but storage is untouched and every surviving
    /// record is tallied as created for reporting.
    #[instrument(skip(self, records), fields(total = records.len()))]
    pub async fn ingest(&self, records: &[Value], dry_run: bool) -> IngestStats {
        let deduped = dedupe_by_source_id(records);
        info!(
            total = records.len(),
            unique = deduped.len(),
            dry_run,
            "Starting ingestion batch"
        );

        let mut stats = IngestStats::default();
        for raw in deduped {
            match self.process_record(raw, dry_run).await {
                Ok(Outcome::Created) => stats.created += 1,
                Ok(Outcome::Updated) => stats.updated += 1,
                Ok(Outcome::Skipped) => stats.skipped += 1,
                Err(HarvestError::DuplicateSourceId(id)) => {
                    // A concurrent run won the create race; the row exists now
                    warn!(source_id = %id, "Duplicate source id during create, skipping");
                    stats.skipped += 1;
                }
                Err(e) => {
                    error!(error = %e, "Failed to process record");
                    stats.errors += 1;
                }
            }
        }

        info!(
            created = stats.created,
            updated = stats.updated,
            skipped = stats.skipped,
            errors = stats.errors,
            "Ingestion batch complete"
        );
        stats
    }

    async fn process_record(&self, raw: &Value, dry_run: bool) -> Result<Outcome> {
        let sanitized = sanitize_event_data(raw);

        if dry_run {
            debug!(
                title = sanitized.title.as_deref().unwrap_or("<untitled>"),
                "Dry run, not persisting"
            );
            return Ok(Outcome::Created);
        }

        let source_id = match sanitized.source_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                warn!("Skipping record without source_id");
                return Ok(Outcome::Skipped);
            }
        };

        self.upsert(&source_id, &sanitized).await
    }

    async fn upsert(&self, source_id: &str, sanitized: &SanitizedEvent) -> Result<Outcome> {
        match self.store.get_event_by_source_id(source_id).await? {
            Some(mut existing) => {
                existing.apply(sanitized);
                self.store.update_event(&existing).await?;
                debug!(source_id, title = %existing.title, "Updated event");
                Ok(Outcome::Updated)
            }
            None => {
                let mut event = StoredEvent::from_sanitized(source_id, sanitized);
                self.store.create_event(&mut event).await?;
                debug!(source_id, title = %event.title, "Created event");
                Ok(Outcome::Created)
            }
        }
    }
}

/// First occurrence per source id wins; later duplicates in the same batch
/// are dropped before sanitation and never counted. Records without a
/// source id pass through and are classified downstream.
fn dedupe_by_source_id(records: &[Value]) -> Vec<&Value> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());
    for record in records {
        match record.get("source_id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => {
                if seen.insert(id.to_string()) {
                    unique.push(record);
                }
            }
            _ => unique.push(record),
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dedupe_keeps_first_occurrence_in_order() {
        let records = vec![
            json!({"source_id": "s:1", "title": "a"}),
            json!({"source_id": "s:2", "title": "b"}),
            json!({"source_id": "s:1", "title": "c"}),
        ];
        let unique = dedupe_by_source_id(&records);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].get("title").unwrap(), "a");
        assert_eq!(unique[1].get("title").unwrap(), "b");
    }

    #[test]
    fn test_dedupe_passes_through_records_without_source_id() {
        let records = vec![
            json!({"title": "no id"}),
            json!({"title": "also no id"}),
            json!({"source_id": "", "title": "empty id"}),
        ];
        assert_eq!(dedupe_by_source_id(&records).len(), 3);
    }
}
