use std::path::{Path, PathBuf};

use anyhow::Context;
use notion_core::NotionClient;
use notion_sync::config::SyncConfig;
use notion_sync::event::{EntityKind, WebhookEvent, detect_entity_kind, entity_from_event};
use notion_sync::mapping::resolve_page_targets;
use notion_sync::sync::engine::SyncEngine;
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq, Eq)]
enum CliMode {
    Run(CliOptions),
    Help,
}

#[derive(Debug, PartialEq, Eq)]
struct CliOptions {
    event_path: PathBuf,
    entity: Option<EntityKind>,
}

fn parse_cli_mode<I>(args: I) -> anyhow::Result<CliMode>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().skip(1);
    let mut event_path = None;
    let mut entity = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--event" => {
                let value = args.next().context("--event requires a path")?;
                event_path = Some(PathBuf::from(value));
            }
            "--entity" => {
                let value = args.next().context("--entity requires a kind")?;
                entity = Some(
                    EntityKind::parse(&value)
                        .with_context(|| format!("unknown entity kind: {value}"))?,
                );
            }
            "--help" | "-h" => return Ok(CliMode::Help),
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    let event_path = event_path.context("--event is required")?;
    Ok(CliMode::Run(CliOptions { event_path, entity }))
}

fn print_usage() {
    println!("Usage: notion-sync --event <path> [--entity <kind>]");
    println!("  --event <path>    GitHub event payload (JSON file)");
    println!("  --entity <kind>   Override the inferred entity kind");
    println!("                    (issue, pull_request, discussion, project_card, workflow_run)");
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

async fn load_event(path: &Path) -> anyhow::Result<WebhookEvent> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read event payload at {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid event payload at {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let options = match parse_cli_mode(std::env::args())? {
        CliMode::Help => {
            print_usage();
            return Ok(());
        }
        CliMode::Run(options) => options,
    };

    let config = SyncConfig::from_env()?;
    let event = load_event(&options.event_path).await?;
    let kind = match options.entity {
        Some(kind) => kind,
        None => detect_entity_kind(&event)?,
    };

    let entity = entity_from_event(&event, kind, &config.done_status);
    let client = NotionClient::new(&config.token, &config.database_id)?;
    let entities = [entity];
    let mappings = resolve_page_targets(&client, &entities)
        .await
        .context("failed to resolve page mappings")?;

    let engine = SyncEngine::new(client);
    let outcome = engine.sync_entities(&entities, &mappings).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
