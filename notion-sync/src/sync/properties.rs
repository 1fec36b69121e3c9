use notion_core::{
    MultiSelectProperty, PageProperties, RichTextProperty, SelectProperty, UrlProperty,
};
use thiserror::Error;

use crate::entity::EntityRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertyError {
    #[error("entity requires a 'title' or 'name' field")]
    MissingDisplayName,
}

/// Turns one entity record into the page property set. Pure; absent or
/// empty entity fields are omitted from the result.
pub fn build_properties(entity: &EntityRecord) -> Result<PageProperties, PropertyError> {
    let display_name = entity
        .title
        .as_deref()
        .filter(|value| !value.is_empty())
        .or_else(|| entity.name.as_deref().filter(|value| !value.is_empty()))
        .ok_or(PropertyError::MissingDisplayName)?;

    let mut properties = PageProperties::with_name(display_name);

    if let Some(description) = entity.description.as_deref().filter(|v| !v.is_empty()) {
        properties.description = Some(RichTextProperty::new(description));
    }
    if let Some(status) = entity.status.as_deref().filter(|v| !v.is_empty()) {
        properties.status = Some(SelectProperty::new(status));
    }
    if !entity.tags.is_empty() {
        // Duplicate tag values are preserved as given.
        properties.tags = Some(MultiSelectProperty::new(entity.tags.iter().cloned()));
    }
    if !entity.assignees.is_empty() {
        properties.assignees = Some(MultiSelectProperty::new(entity.assignees.iter().cloned()));
    }
    if let Some(url) = entity.url.as_deref().filter(|v| !v.is_empty()) {
        properties.url = Some(UrlProperty { url: url.into() });
    }
    if let Some(reference) = entity.reference.as_deref().filter(|v| !v.is_empty()) {
        properties.reference = Some(RichTextProperty::new(reference));
    }
    if let Some(id) = entity.entity_id() {
        properties.github_id = Some(RichTextProperty::new(id));
    }
    if let Some(kind) = entity.kind.as_deref().filter(|v| !v.is_empty()) {
        properties.entity = Some(SelectProperty::new(kind));
    }

    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_entity_maps_every_field() {
        let entity = EntityRecord {
            id: Some("1".into()),
            title: Some("Test".into()),
            description: Some("d".into()),
            status: Some("Active".into()),
            tags: vec!["a".into(), "b".into()],
            assignees: vec!["octocat".into()],
            kind: Some("issue".into()),
            ..EntityRecord::default()
        };

        let properties = build_properties(&entity).unwrap();
        assert_eq!(properties.name.title[0].text.content, "Test");
        assert_eq!(
            properties.description.unwrap().rich_text[0].text.content,
            "d"
        );
        assert_eq!(properties.status.unwrap().select.name, "Active");
        let tags: Vec<_> = properties
            .tags
            .unwrap()
            .multi_select
            .into_iter()
            .map(|option| option.name)
            .collect();
        assert_eq!(tags, vec!["a", "b"]);
        assert_eq!(
            properties.assignees.unwrap().multi_select[0].name,
            "octocat"
        );
        assert_eq!(properties.github_id.unwrap().rich_text[0].text.content, "1");
        assert_eq!(properties.entity.unwrap().select.name, "issue");
    }

    #[test]
    fn name_is_the_fallback_for_a_missing_title() {
        let entity = EntityRecord {
            name: Some("fallback".into()),
            ..EntityRecord::default()
        };
        let properties = build_properties(&entity).unwrap();
        assert_eq!(properties.name.title[0].text.content, "fallback");
    }

    #[test]
    fn missing_display_name_is_a_validation_error() {
        let entity = EntityRecord {
            description: Some("d".into()),
            ..EntityRecord::default()
        };
        assert_eq!(
            build_properties(&entity),
            Err(PropertyError::MissingDisplayName)
        );
    }

    #[test]
    fn empty_title_falls_back_then_fails() {
        let entity = EntityRecord {
            title: Some(String::new()),
            name: Some(String::new()),
            ..EntityRecord::default()
        };
        assert_eq!(
            build_properties(&entity),
            Err(PropertyError::MissingDisplayName)
        );
    }

    #[test]
    fn empty_optional_fields_stay_unset() {
        let entity = EntityRecord {
            title: Some("Test".into()),
            description: Some(String::new()),
            status: Some(String::new()),
            tags: vec![],
            ..EntityRecord::default()
        };
        let properties = build_properties(&entity).unwrap();
        assert!(properties.description.is_none());
        assert!(properties.status.is_none());
        assert!(properties.tags.is_none());
        assert!(properties.assignees.is_none());
        assert!(properties.url.is_none());
        assert!(properties.reference.is_none());
        assert!(properties.github_id.is_none());
        assert!(properties.entity.is_none());
    }

    #[test]
    fn duplicate_tags_are_not_deduplicated() {
        let entity = EntityRecord {
            title: Some("Test".into()),
            tags: vec!["x".into(), "x".into()],
            ..EntityRecord::default()
        };
        let properties = build_properties(&entity).unwrap();
        assert_eq!(properties.tags.unwrap().multi_select.len(), 2);
    }
}
