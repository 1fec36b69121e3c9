use std::collections::{BTreeMap, HashMap};

use notion_core::{ApiErrorClass, NotionClient, NotionError};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use super::backoff::{Backoff, TokioWaiter, Waiter};
use super::properties::{PropertyError, build_properties};
use crate::entity::EntityRecord;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid entity: {0}")]
    Property(#[from] PropertyError),
    #[error("api error: {0}")]
    Api(#[from] NotionError),
}

/// Mapping value for one entity id: either an existing page to update
/// or a marker that no page exists yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTarget {
    Create,
    Existing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpsertResult {
    Created,
    Updated,
}

/// Aggregate result of one `sync_entities` run. Every entity that
/// carried an id lands in exactly one bucket.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct SyncOutcome {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub missing_mapping: Vec<String>,
    pub not_found: Vec<String>,
    pub failed: BTreeMap<String, String>,
}

pub struct SyncEngine<W: Waiter = TokioWaiter> {
    client: NotionClient,
    max_attempts: u32,
    backoff: Backoff,
    waiter: W,
}

impl SyncEngine<TokioWaiter> {
    pub fn new(client: NotionClient) -> Self {
        Self {
            client,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::default(),
            waiter: TokioWaiter,
        }
    }
}

impl<W: Waiter> SyncEngine<W> {
    pub fn with_retry_policy(mut self, max_attempts: u32, backoff: Backoff) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.backoff = backoff;
        self
    }

    pub fn with_waiter<W2: Waiter>(self, waiter: W2) -> SyncEngine<W2> {
        SyncEngine {
            client: self.client,
            max_attempts: self.max_attempts,
            backoff: self.backoff,
            waiter,
        }
    }

    /// Pushes each entity to its mapped page, sequentially, and files
    /// every id into one outcome bucket. A single entity's failure
    /// never aborts the batch.
    pub async fn sync_entities(
        &self,
        entities: &[EntityRecord],
        mappings: &HashMap<String, PageTarget>,
    ) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        for entity in entities {
            let Some(entity_id) = entity.entity_id() else {
                error!(entity = ?entity, "entity missing identifier; skipping");
                continue;
            };

            let Some(target) = mappings.get(entity_id) else {
                warn!(entity_id, "no page mapping for entity");
                outcome.missing_mapping.push(entity_id.to_string());
                continue;
            };

            match self.upsert_entity(entity, entity_id, target).await {
                Ok(UpsertResult::Created) => outcome.created.push(entity_id.to_string()),
                Ok(UpsertResult::Updated) => outcome.updated.push(entity_id.to_string()),
                Err(SyncError::Property(err)) => {
                    warn!(entity_id, error = %err, "entity failed payload validation");
                    outcome.failed.insert(entity_id.to_string(), err.to_string());
                }
                Err(SyncError::Api(err)) => match err.classification() {
                    Some(ApiErrorClass::NotFound) => {
                        warn!(entity_id, target = ?target, "page not found during sync");
                        outcome.not_found.push(entity_id.to_string());
                    }
                    Some(_) => {
                        error!(
                            entity_id,
                            target = ?target,
                            status = ?err.status(),
                            error = %err,
                            "failed to sync entity"
                        );
                        outcome.failed.insert(entity_id.to_string(), err.to_string());
                    }
                    None => {
                        error!(
                            entity_id,
                            target = ?target,
                            error = ?err,
                            "unexpected error during sync"
                        );
                        outcome.failed.insert(entity_id.to_string(), err.to_string());
                    }
                },
            }
        }

        outcome
    }

    async fn upsert_entity(
        &self,
        entity: &EntityRecord,
        entity_id: &str,
        target: &PageTarget,
    ) -> Result<UpsertResult, SyncError> {
        let properties = build_properties(entity)?;

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let result = match target {
                PageTarget::Create => self
                    .client
                    .create_page(&properties)
                    .await
                    .map(|_| UpsertResult::Created),
                PageTarget::Existing(page_id) => self
                    .client
                    .update_page(page_id, &properties)
                    .await
                    .map(|_| UpsertResult::Updated),
            };

            match result {
                Ok(UpsertResult::Created) => {
                    info!(entity_id, "created new page");
                    return Ok(UpsertResult::Created);
                }
                Ok(UpsertResult::Updated) => {
                    if let PageTarget::Existing(page_id) = target {
                        info!(entity_id, page_id = %page_id, "updated existing page");
                    }
                    return Ok(UpsertResult::Updated);
                }
                Err(err) if err.is_transient() && attempts < self.max_attempts => {
                    let delay = self.backoff.delay(attempts);
                    warn!(
                        entity_id,
                        target = ?target,
                        status = ?err.status(),
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "transient api error; will retry"
                    );
                    self.waiter.wait(delay).await;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
