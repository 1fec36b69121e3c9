use anyhow::Context;

const DEFAULT_DONE_STATUS: &str = "Done";

#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub token: String,
    pub database_id: String,
    pub done_status: String,
}

impl SyncConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let token = lookup("NOTION_API_KEY").context("NOTION_API_KEY is not set")?;
        let database_id = lookup("NOTION_DATABASE_ID").context("NOTION_DATABASE_ID is not set")?;
        let done_status =
            lookup("NOTION_DONE_STATUS").unwrap_or_else(|| DEFAULT_DONE_STATUS.to_string());
        Ok(Self {
            token,
            database_id,
            done_status,
        })
    }
}
