use serde::Deserialize;
use thiserror::Error;

use crate::entity::EntityRecord;

const BODY_SNIPPET_LIMIT: usize = 180;
const IN_PROGRESS_STATUS: &str = "In Progress";
const QUEUED_STATUS: &str = "Queued";

#[derive(Debug, Error)]
pub enum EventError {
    #[error("could not determine entity type from payload")]
    UnknownEntityType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Issue,
    PullRequest,
    Discussion,
    ProjectCard,
    WorkflowRun,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Issue => "issue",
            EntityKind::PullRequest => "pull_request",
            EntityKind::Discussion => "discussion",
            EntityKind::ProjectCard => "project_card",
            EntityKind::WorkflowRun => "workflow_run",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "issue" => Some(EntityKind::Issue),
            "pull_request" => Some(EntityKind::PullRequest),
            "discussion" => Some(EntityKind::Discussion),
            "project_card" => Some(EntityKind::ProjectCard),
            "workflow_run" => Some(EntityKind::WorkflowRun),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub issue: Option<IssuePayload>,
    #[serde(default)]
    pub pull_request: Option<PullRequestPayload>,
    #[serde(default)]
    pub discussion: Option<DiscussionPayload>,
    #[serde(default)]
    pub project_card: Option<ProjectCardPayload>,
    #[serde(default)]
    pub project_column: Option<ProjectColumnPayload>,
    #[serde(default)]
    pub workflow_run: Option<WorkflowRunPayload>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IssuePayload {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<Assignee>,
    /// Marker object GitHub attaches to issues that are pull requests.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PullRequestPayload {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub merged: Option<bool>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<Assignee>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiscussionPayload {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub category: Option<DiscussionCategory>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DiscussionCategory {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectCardPayload {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectColumnPayload {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WorkflowRunPayload {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_title: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub head_commit: Option<HeadCommit>,
    #[serde(default)]
    pub actor: Option<Actor>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HeadCommit {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Assignee {
    #[serde(default)]
    pub login: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Actor {
    #[serde(default)]
    pub login: Option<String>,
}

/// Decides which entity kind a payload describes. Pull requests win
/// over plain issues, including issues carrying the pull-request marker.
pub fn detect_entity_kind(event: &WebhookEvent) -> Result<EntityKind, EventError> {
    if event.pull_request.is_some() {
        return Ok(EntityKind::PullRequest);
    }
    if let Some(issue) = &event.issue {
        if issue.pull_request.is_some() {
            return Ok(EntityKind::PullRequest);
        }
        return Ok(EntityKind::Issue);
    }
    if event.discussion.is_some() {
        return Ok(EntityKind::Discussion);
    }
    if event.project_card.is_some() {
        return Ok(EntityKind::ProjectCard);
    }
    if event.workflow_run.is_some() {
        return Ok(EntityKind::WorkflowRun);
    }
    Err(EventError::UnknownEntityType)
}

pub fn entity_from_event(
    event: &WebhookEvent,
    kind: EntityKind,
    done_status: &str,
) -> EntityRecord {
    let mut entity = match kind {
        EntityKind::Issue => issue_entity(event, done_status),
        EntityKind::PullRequest => pull_request_entity(event, done_status),
        EntityKind::Discussion => discussion_entity(event, done_status),
        EntityKind::ProjectCard => project_card_entity(event, done_status),
        EntityKind::WorkflowRun => workflow_run_entity(event, done_status),
    };

    entity.kind = Some(kind.as_str().to_string());
    if let Some(id) = entity.id.as_deref().filter(|id| !id.is_empty()) {
        entity.reference = Some(format!("{}:{id}", kind.as_str()));
    }
    entity
}

fn issue_entity(event: &WebhookEvent, done_status: &str) -> EntityRecord {
    let Some(issue) = &event.issue else {
        return EntityRecord::default();
    };
    let mut status = status_from_state(issue.state.as_deref(), done_status);
    if event.action.as_deref() == Some("closed") {
        status = done_status.to_string();
    }
    EntityRecord {
        id: issue.number.map(|number| number.to_string()),
        title: Some(
            issue
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled Issue".to_string()),
        ),
        description: issue.body.as_deref().and_then(body_snippet),
        status: Some(status),
        tags: label_names(&issue.labels),
        assignees: assignee_logins(&issue.assignees),
        url: issue.html_url.clone(),
        ..EntityRecord::default()
    }
}

fn pull_request_entity(event: &WebhookEvent, done_status: &str) -> EntityRecord {
    let Some(pull_request) = &event.pull_request else {
        return EntityRecord::default();
    };
    let merged = pull_request.merged.unwrap_or(false);
    let mut status = if merged {
        done_status.to_string()
    } else {
        status_from_state(pull_request.state.as_deref(), done_status)
    };
    if event.action.as_deref() == Some("closed") {
        status = done_status.to_string();
    }
    EntityRecord {
        id: pull_request.number.map(|number| number.to_string()),
        title: Some(
            pull_request
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled Pull Request".to_string()),
        ),
        description: pull_request.body.as_deref().and_then(body_snippet),
        status: Some(status),
        tags: label_names(&pull_request.labels),
        assignees: assignee_logins(&pull_request.assignees),
        url: pull_request.html_url.clone(),
        ..EntityRecord::default()
    }
}

fn discussion_entity(event: &WebhookEvent, done_status: &str) -> EntityRecord {
    let Some(discussion) = &event.discussion else {
        return EntityRecord::default();
    };
    let mut status = status_from_state(discussion.state.as_deref(), done_status);
    if event.action.as_deref() == Some("answered") {
        status = done_status.to_string();
    }
    EntityRecord {
        id: discussion.id.map(|id| id.to_string()),
        title: Some(
            discussion
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled Discussion".to_string()),
        ),
        description: discussion.body.as_deref().and_then(body_snippet),
        status: Some(status),
        tags: discussion
            .category
            .as_ref()
            .and_then(|category| category.name.clone())
            .filter(|name| !name.is_empty())
            .into_iter()
            .collect(),
        url: discussion.html_url.clone(),
        ..EntityRecord::default()
    }
}

fn project_card_entity(event: &WebhookEvent, done_status: &str) -> EntityRecord {
    let Some(card) = &event.project_card else {
        return EntityRecord::default();
    };
    let column_name = event
        .project_column
        .as_ref()
        .and_then(|column| column.name.clone())
        .filter(|name| !name.is_empty());
    let mut status = column_name
        .unwrap_or_else(|| status_from_state(event.action.as_deref(), done_status));
    if matches!(event.action.as_deref(), Some("deleted") | Some("converted")) {
        status = done_status.to_string();
    }
    EntityRecord {
        id: card.id.map(|id| id.to_string()),
        title: Some(
            card.note
                .clone()
                .filter(|note| !note.is_empty())
                .unwrap_or_else(|| "Project Card".to_string()),
        ),
        description: card.note.as_deref().and_then(body_snippet),
        status: Some(status),
        url: card.url.clone(),
        ..EntityRecord::default()
    }
}

fn workflow_run_entity(event: &WebhookEvent, done_status: &str) -> EntityRecord {
    let Some(run) = &event.workflow_run else {
        return EntityRecord::default();
    };
    let mut status = status_from_workflow_run(run, done_status);
    if matches!(
        run.conclusion.as_deref(),
        Some("success") | Some("failure") | Some("cancelled")
    ) {
        status = done_status.to_string();
    }
    let title = run
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .or_else(|| run.display_title.clone().filter(|t| !t.is_empty()))
        .unwrap_or_else(|| "Workflow Run".to_string());
    EntityRecord {
        id: run.id.map(|id| id.to_string()),
        title: Some(title),
        description: run
            .head_commit
            .as_ref()
            .and_then(|commit| commit.message.as_deref())
            .and_then(body_snippet),
        status: Some(status),
        tags: [run.event.as_deref(), run.conclusion.as_deref()]
            .into_iter()
            .flatten()
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect(),
        assignees: run
            .actor
            .as_ref()
            .and_then(|actor| actor.login.clone())
            .filter(|login| !login.is_empty())
            .into_iter()
            .collect(),
        url: run.html_url.clone(),
        ..EntityRecord::default()
    }
}

fn status_from_state(state: Option<&str>, done_status: &str) -> String {
    match state.unwrap_or("").to_ascii_lowercase().as_str() {
        "closed" | "completed" | "resolved" => done_status.to_string(),
        _ => IN_PROGRESS_STATUS.to_string(),
    }
}

fn status_from_workflow_run(run: &WorkflowRunPayload, done_status: &str) -> String {
    let status = run.status.as_deref().unwrap_or("").to_ascii_lowercase();
    if status == "completed" {
        let conclusion = run.conclusion.as_deref().unwrap_or("").to_ascii_lowercase();
        if matches!(conclusion.as_str(), "success" | "neutral") {
            return done_status.to_string();
        }
    }
    if matches!(status.as_str(), "queued" | "in_progress") {
        return IN_PROGRESS_STATUS.to_string();
    }
    QUEUED_STATUS.to_string()
}

/// Trims the body and truncates it to the snippet limit, terminating
/// a truncated snippet with an ellipsis. Empty bodies map to `None`.
fn body_snippet(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().count() <= BODY_SNIPPET_LIMIT {
        return Some(trimmed.to_string());
    }
    let mut snippet: String = trimmed.chars().take(BODY_SNIPPET_LIMIT - 1).collect();
    snippet.push('…');
    Some(snippet)
}

fn label_names(labels: &[Label]) -> Vec<String> {
    labels
        .iter()
        .filter_map(|label| label.name.clone())
        .filter(|name| !name.is_empty())
        .collect()
}

fn assignee_logins(assignees: &[Assignee]) -> Vec<String> {
    assignees
        .iter()
        .filter_map(|assignee| assignee.login.clone())
        .filter(|login| !login.is_empty())
        .collect()
}
