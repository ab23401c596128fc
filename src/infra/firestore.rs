use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::post::{DocumentHandle, NewPost};
use crate::infra::store::PostStore;

pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Firestore REST client that writes posts with a server-assigned timestamp.
#[derive(Clone)]
pub struct FirestoreClient {
    http: reqwest::Client,
    commit_url: Url,
    database_path: String,
    collection: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    #[serde(default)]
    write_results: Vec<WriteResult>,
    commit_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WriteResult {
    #[serde(default)]
    transform_results: Vec<TransformResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransformResult {
    timestamp_value: Option<String>,
}

impl FirestoreClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let project_id = config
            .firestore_project_id
            .as_deref()
            .ok_or_else(|| anyhow!("missing FIRESTORE_PROJECT_ID"))?;

        let database_path = format!(
            "projects/{}/databases/{}",
            project_id, config.firestore_database
        );
        let mut commit_url = Url::parse(&format!(
            "{}/v1/{}/documents:commit",
            config.firestore_endpoint.trim_end_matches('/'),
            database_path
        ))
        .map_err(|err| anyhow!("invalid FIRESTORE_ENDPOINT: {}", err))?;
        if let Some(ref key) = config.firestore_api_key {
            commit_url.query_pairs_mut().append_pair("key", key);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.store_timeout_seconds))
            .user_agent(concat!("tweetbox/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            commit_url,
            database_path,
            collection: config.posts_collection.clone(),
        })
    }

    pub fn commit_url(&self) -> &Url {
        &self.commit_url
    }

    pub fn document_name(&self, id: &str) -> String {
        format!("{}/documents/{}/{}", self.database_path, self.collection, id)
    }

    /// Commit request creating one post document. The timestamp is a
    /// `REQUEST_TIME` transform so Firestore fills it in.
    pub fn commit_body(&self, id: &str, record: &NewPost) -> Value {
        json!({
            "writes": [{
                "update": {
                    "name": self.document_name(id),
                    "fields": {
                        "displayName": { "stringValue": record.display_name },
                        "userName": { "stringValue": record.user_name },
                        "verified": { "booleanValue": record.verified },
                        "text": { "stringValue": record.text },
                        "avatar": { "stringValue": record.avatar },
                        "image": { "stringValue": record.image },
                    },
                },
                "updateTransforms": [{
                    "fieldPath": TIMESTAMP_FIELD,
                    "setToServerValue": "REQUEST_TIME",
                }],
                "currentDocument": { "exists": false },
            }],
        })
    }
}

impl PostStore for FirestoreClient {
    async fn create_post(&self, record: NewPost) -> Result<DocumentHandle> {
        let id = Uuid::new_v4().simple().to_string();
        let body = self.commit_body(&id, &record);

        let response = self
            .http
            .post(self.commit_url.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(status = %status, detail = %detail, "firestore commit rejected");
            return Err(anyhow!("firestore commit failed: HTTP status {}", status));
        }

        let commit: CommitResponse = response.json().await?;
        let server_timestamp = parse_server_timestamp(&commit);
        debug!(post_id = %id, "firestore commit accepted");

        Ok(DocumentHandle {
            path: format!("{}/{}", self.collection, id),
            id,
            server_timestamp,
        })
    }
}

fn parse_server_timestamp(commit: &CommitResponse) -> Option<OffsetDateTime> {
    commit
        .write_results
        .iter()
        .flat_map(|result| result.transform_results.iter())
        .find_map(|transform| transform.timestamp_value.as_deref())
        .or(commit.commit_time.as_deref())
        .and_then(|value| OffsetDateTime::parse(value, &Rfc3339).ok())
}
