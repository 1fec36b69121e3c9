use std::collections::HashMap;

use notion_core::{NotionClient, NotionError};
use tracing::debug;

use crate::entity::EntityRecord;
use crate::sync::engine::PageTarget;

/// Builds the caller-owned id → page-target map by looking each entity
/// up by its reference string. Entities without an id or a reference
/// get no entry, which the engine reports as `missing_mapping`.
pub async fn resolve_page_targets(
    client: &NotionClient,
    entities: &[EntityRecord],
) -> Result<HashMap<String, PageTarget>, NotionError> {
    let mut targets = HashMap::new();
    for entity in entities {
        let (Some(entity_id), Some(reference)) = (entity.entity_id(), entity.reference.as_deref())
        else {
            continue;
        };
        let target = match client.find_page_by_reference(reference).await? {
            Some(page_id) => PageTarget::Existing(page_id),
            None => PageTarget::Create,
        };
        debug!(entity_id, reference, target = ?target, "resolved page target");
        targets.insert(entity_id.to_string(), target);
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entity(id: &str, reference: &str) -> EntityRecord {
        EntityRecord {
            id: Some(id.into()),
            title: Some("Test".into()),
            reference: Some(reference.into()),
            ..EntityRecord::default()
        }
    }

    #[tokio::test]
    async fn known_references_map_to_existing_pages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/db-1/query"))
            .and(body_partial_json(serde_json::json!({
                "filter": {"rich_text": {"equals": "issue:42"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"id": "page-42"}]
            })))
            .mount(&server)
            .await;

        let client = NotionClient::with_base_url(&server.uri(), "token", "db-1").unwrap();
        let targets = resolve_page_targets(&client, &[entity("42", "issue:42")])
            .await
            .unwrap();
        assert_eq!(
            targets.get("42"),
            Some(&PageTarget::Existing("page-42".into()))
        );
    }

    #[tokio::test]
    async fn unknown_references_map_to_create() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/db-1/query"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"results": []})),
            )
            .mount(&server)
            .await;

        let client = NotionClient::with_base_url(&server.uri(), "token", "db-1").unwrap();
        let targets = resolve_page_targets(&client, &[entity("42", "issue:42")])
            .await
            .unwrap();
        assert_eq!(targets.get("42"), Some(&PageTarget::Create));
    }

    #[tokio::test]
    async fn entities_without_a_reference_get_no_entry() {
        let server = MockServer::start().await;
        let client = NotionClient::with_base_url(&server.uri(), "token", "db-1").unwrap();
        let mut unreferenced = entity("42", "issue:42");
        unreferenced.reference = None;

        let targets = resolve_page_targets(&client, &[unreferenced]).await.unwrap();
        assert!(targets.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
