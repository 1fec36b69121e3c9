use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::properties::{PageProperties, REFERENCE_PROPERTY};

const DEFAULT_BASE_URL: &str = "https://api.notion.com";
const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("api returned {status}: {body}")]
    Api { status: StatusCode, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorClass {
    NotFound,
    Transient,
    Permanent,
}

impl NotionError {
    pub fn classification(&self) -> Option<ApiErrorClass> {
        match self {
            NotionError::Api { status, .. } => Some(classify_api_status(*status)),
            _ => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self.classification(), Some(ApiErrorClass::Transient))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.classification(), Some(ApiErrorClass::NotFound))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            NotionError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn classify_api_status(status: StatusCode) -> ApiErrorClass {
    if status == StatusCode::NOT_FOUND {
        ApiErrorClass::NotFound
    } else if status.is_server_error()
        || matches!(
            status,
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS
        )
    {
        ApiErrorClass::Transient
    } else {
        ApiErrorClass::Permanent
    }
}

#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    base_url: Url,
    token: String,
    database_id: String,
}

impl NotionClient {
    pub fn new(
        token: impl Into<String>,
        database_id: impl Into<String>,
    ) -> Result<Self, NotionError> {
        Self::with_base_url(DEFAULT_BASE_URL, token, database_id)
    }

    pub fn with_base_url(
        base_url: &str,
        token: impl Into<String>,
        database_id: impl Into<String>,
    ) -> Result<Self, NotionError> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(base_url)?,
            token: token.into(),
            database_id: database_id.into(),
        })
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub async fn create_page(&self, properties: &PageProperties) -> Result<(), NotionError> {
        let url = self.endpoint("/v1/pages")?;
        let body = CreatePageBody {
            parent: DatabaseParent {
                database_id: &self.database_id,
            },
            properties,
        };
        let response = self
            .http
            .post(url)
            .header("Authorization", self.auth_header_value())
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;
        Self::ensure_success(response).await
    }

    pub async fn update_page(
        &self,
        page_id: &str,
        properties: &PageProperties,
    ) -> Result<(), NotionError> {
        let url = self.endpoint(&format!("/v1/pages/{page_id}"))?;
        let body = UpdatePageBody { properties };
        let response = self
            .http
            .patch(url)
            .header("Authorization", self.auth_header_value())
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;
        Self::ensure_success(response).await
    }

    /// Looks up a page whose reference property equals `reference`.
    /// Returns the first matching page id, if any.
    pub async fn find_page_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<String>, NotionError> {
        let url = self.endpoint(&format!("/v1/databases/{}/query", self.database_id))?;
        let body = QueryBody {
            filter: ReferenceFilter {
                property: REFERENCE_PROPERTY,
                rich_text: TextEquals { equals: reference },
            },
        };
        let response = self
            .http
            .post(url)
            .header("Authorization", self.auth_header_value())
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;
        let payload: QueryResponse = Self::handle_response(response).await?;
        Ok(payload.results.into_iter().next().map(|page| page.id))
    }

    fn auth_header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn endpoint(&self, path: &str) -> Result<Url, NotionError> {
        Ok(self.base_url.join(path)?)
    }

    async fn ensure_success(response: reqwest::Response) -> Result<(), NotionError> {
        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(NotionError::Api { status, body })
        }
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, NotionError> {
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(NotionError::Api { status, body })
        }
    }
}

#[derive(Serialize)]
struct CreatePageBody<'a> {
    parent: DatabaseParent<'a>,
    properties: &'a PageProperties,
}

#[derive(Serialize)]
struct DatabaseParent<'a> {
    database_id: &'a str,
}

#[derive(Serialize)]
struct UpdatePageBody<'a> {
    properties: &'a PageProperties,
}

#[derive(Serialize)]
struct QueryBody<'a> {
    filter: ReferenceFilter<'a>,
}

#[derive(Serialize)]
struct ReferenceFilter<'a> {
    property: &'a str,
    rich_text: TextEquals<'a>,
}

#[derive(Serialize)]
struct TextEquals<'a> {
    equals: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<PageRef>,
}

#[derive(Debug, Deserialize)]
struct PageRef {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> NotionClient {
        NotionClient::with_base_url(&server.uri(), "secret-token", "db-1").unwrap()
    }

    #[tokio::test]
    async fn create_page_posts_properties_under_database_parent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .and(header("authorization", "Bearer secret-token"))
            .and(header("notion-version", NOTION_VERSION))
            .and(body_partial_json(serde_json::json!({
                "parent": {"database_id": "db-1"},
                "properties": {
                    "Name": {"title": [{"text": {"content": "Test"}}]}
                }
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let properties = PageProperties::with_name("Test");
        client.create_page(&properties).await.unwrap();
    }

    #[tokio::test]
    async fn update_page_patches_the_page_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v1/pages/page-9"))
            .and(header("authorization", "Bearer secret-token"))
            .and(body_partial_json(serde_json::json!({
                "properties": {
                    "Name": {"title": [{"text": {"content": "Test"}}]}
                }
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let properties = PageProperties::with_name("Test");
        client.update_page("page-9", &properties).await.unwrap();
    }

    #[tokio::test]
    async fn find_page_by_reference_returns_first_match() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/db-1/query"))
            .and(body_partial_json(serde_json::json!({
                "filter": {
                    "property": "GitHub Reference",
                    "rich_text": {"equals": "issue:42"}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"id": "page-a"}, {"id": "page-b"}]
            })))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let found = client.find_page_by_reference("issue:42").await.unwrap();
        assert_eq!(found.as_deref(), Some("page-a"));
    }

    #[tokio::test]
    async fn find_page_by_reference_returns_none_without_matches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/databases/db-1/query"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"results": []})),
            )
            .mount(&server)
            .await;

        let client = make_client(&server);
        let found = client.find_page_by_reference("issue:42").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad payload"))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let properties = PageProperties::with_name("Test");
        let err = client.create_page(&properties).await.unwrap_err();
        match err {
            NotionError::Api { status, ref body } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(body, "bad payload");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.classification(), Some(ApiErrorClass::Permanent));
    }

    #[test]
    fn classification_covers_the_status_taxonomy() {
        assert_eq!(
            classify_api_status(StatusCode::NOT_FOUND),
            ApiErrorClass::NotFound
        );
        for status in [
            StatusCode::REQUEST_TIMEOUT,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::GATEWAY_TIMEOUT,
        ] {
            assert_eq!(classify_api_status(status), ApiErrorClass::Transient);
        }
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::CONFLICT,
        ] {
            assert_eq!(classify_api_status(status), ApiErrorClass::Permanent);
        }
    }
}
