use crate::domain::StoredEvent;
use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// Storage seam for persisted events. The reconciler builds its upsert from
/// these three primitives; the `source_id` uniqueness constraint lives
/// behind this trait and is the only coordination between concurrent
/// ingestion runs.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get_event_by_source_id(&self, source_id: &str) -> Result<Option<StoredEvent>>;

    /// Assigns an id and persists the row. Fails with
    /// `HarvestError::DuplicateSourceId` if the key already exists.
    async fn create_event(&self, event: &mut StoredEvent) -> Result<()>;

    /// Replaces the stored row for `event.id`.
    async fn update_event(&self, event: &StoredEvent) -> Result<()>;
}

#[derive(Default)]
struct Inner {
    events: HashMap<Uuid, StoredEvent>,
    by_source_id: HashMap<String, Uuid>,
}

/// In-memory store for development and testing.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_count(&self) -> usize {
        self.inner.lock().unwrap().events.len()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn get_event_by_source_id(&self, source_id: &str) -> Result<Option<StoredEvent>> {
        let inner = self.inner.lock().unwrap();
        let event = inner
            .by_source_id
            .get(source_id)
            .and_then(|id| inner.events.get(id))
            .cloned();
        Ok(event)
    }

    async fn create_event(&self, event: &mut StoredEvent) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.by_source_id.contains_key(&event.source_id) {
            return Err(HarvestError::DuplicateSourceId(event.source_id.clone()));
        }

        let id = Uuid::new_v4();
        event.id = Some(id);
        inner.by_source_id.insert(event.source_id.clone(), id);
        inner.events.insert(id, event.clone());

        debug!("Created event: {} with id {}", event.source_id, id);
        Ok(())
    }

    async fn update_event(&self, event: &StoredEvent) -> Result<()> {
        let event_id = event.id.ok_or_else(|| HarvestError::Api {
            message: "Cannot update event without ID".to_string(),
        })?;

        let mut inner = self.inner.lock().unwrap();
        inner.events.insert(event_id, event.clone());

        debug!("Updated event: {} with id {}", event.source_id, event_id);
        Ok(())
    }
}
