//! Firestore document store over the REST API
//!
//! Documents are written with `PATCH` and no update mask, which replaces
//! the whole document (creating it when missing).

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::handle_empty_response;
use crate::store::{DocumentStore, Fields};

/// Default Firestore REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Default database name
pub const DEFAULT_DATABASE: &str = "(default)";

/// Document store backed by Google Cloud Firestore
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    base_url: String,
    project_id: String,
    database: String,
    /// OAuth2 bearer token, when the environment does not inject credentials
    access_token: Option<String>,
    client: Client,
}

impl FirestoreStore {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self::with_client(project_id, Client::new())
    }

    /// Create a store with a custom HTTP client
    pub fn with_client(project_id: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: project_id.into(),
            database: DEFAULT_DATABASE.to_string(),
            access_token: None,
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Builds the document URL, percent-encoding each path segment
    fn document_url(&self, collection: &str, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("invalid base URL '{}': {}", self.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidRequest(format!("base URL '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend([
                "projects",
                self.project_id.as_str(),
                "databases",
                self.database.as_str(),
                "documents",
                collection,
                id,
            ]);

        Ok(url)
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn upsert(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        if collection.is_empty() || id.is_empty() {
            return Err(ClientError::InvalidRequest(
                "collection and document id cannot be empty".to_string(),
            ));
        }

        let url = self.document_url(collection, id)?;
        debug!("Writing document {}/{} ({} fields)", collection, id, fields.len());

        let mut request = self
            .client
            .patch(url)
            .json(&json!({ "fields": encode_fields(&fields) }));

        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        handle_empty_response(response).await
    }
}

// =============================================================================
// Value Encoding
// =============================================================================

/// Encodes a field map into Firestore's typed value representation
fn encode_fields(fields: &Fields) -> Value {
    let encoded: serde_json::Map<String, Value> = fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect();
    Value::Object(encoded)
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // Firestore expects int64 values as strings
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}
