/// One trackable item to reflect remotely. Fields left `None` (or an
/// empty `tags` list) are treated as unset and never reach the page
/// payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub assignees: Vec<String>,
    pub url: Option<String>,
    pub reference: Option<String>,
    pub kind: Option<String>,
}

impl EntityRecord {
    /// Identifier as the engine sees it: present and non-empty, or nothing.
    pub fn entity_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}
