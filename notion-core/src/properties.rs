use serde::Serialize;

/// Rich-text property holding the `<entity-kind>:<entity-id>` reference
/// used to deduplicate pages inside the database.
pub const REFERENCE_PROPERTY: &str = "GitHub Reference";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TextContent {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RichTextObject {
    pub text: TextContent,
}

impl RichTextObject {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            text: TextContent {
                content: content.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TitleProperty {
    pub title: Vec<RichTextObject>,
}

impl TitleProperty {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            title: vec![RichTextObject::new(text)],
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RichTextProperty {
    pub rich_text: Vec<RichTextObject>,
}

impl RichTextProperty {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            rich_text: vec![RichTextObject::new(text)],
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SelectProperty {
    pub select: SelectOption,
}

impl SelectProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            select: SelectOption { name: name.into() },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MultiSelectProperty {
    pub multi_select: Vec<SelectOption>,
}

impl MultiSelectProperty {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            multi_select: names
                .into_iter()
                .map(|name| SelectOption { name: name.into() })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UrlProperty {
    pub url: String,
}

/// Property set sent on page create/update. Optional fields are omitted
/// from the serialized body entirely; an absent field means "unset".
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageProperties {
    #[serde(rename = "Name")]
    pub name: TitleProperty,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<RichTextProperty>,
    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<SelectProperty>,
    #[serde(rename = "Tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<MultiSelectProperty>,
    #[serde(rename = "Assignees", skip_serializing_if = "Option::is_none")]
    pub assignees: Option<MultiSelectProperty>,
    #[serde(rename = "URL", skip_serializing_if = "Option::is_none")]
    pub url: Option<UrlProperty>,
    #[serde(rename = "GitHub Reference", skip_serializing_if = "Option::is_none")]
    pub reference: Option<RichTextProperty>,
    #[serde(rename = "GitHub ID", skip_serializing_if = "Option::is_none")]
    pub github_id: Option<RichTextProperty>,
    #[serde(rename = "Entity", skip_serializing_if = "Option::is_none")]
    pub entity: Option<SelectProperty>,
}

impl PageProperties {
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: TitleProperty::new(name),
            description: None,
            status: None,
            tags: None,
            assignees: None,
            url: None,
            reference: None,
            github_id: None,
            entity: None,
        }
    }
}
