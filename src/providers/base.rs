use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DialResult;
use crate::models::message::Message;

/// Backend-specific parameters forwarded opaquely with a completion request
pub type CustomFields = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Metadata the bucket returns for a stored object
pub struct FileMetadata {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub parent_path: Option<String>,
    #[serde(default)]
    pub content_length: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// A blob store session: stages bytes under a url and fetches them back.
///
/// Methods take `&mut self` so a session is only ever driven by its owner.
#[async_trait]
pub trait BlobStore: Send {
    /// Upload `content` and return the metadata holding its url
    async fn put(&mut self, name: &str, mime_type: &str, content: Vec<u8>)
        -> DialResult<FileMetadata>;

    /// Fetch the exact bytes previously stored under `url`
    async fn get(&mut self, url: &str) -> DialResult<Vec<u8>>;
}

/// Uniform call surface over deployments with different optional parameters
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Name of the deployment serving the requests
    fn deployment(&self) -> &str;

    /// Send the conversation; `custom_fields` is passed through untouched
    async fn complete(
        &self,
        messages: &[Message],
        custom_fields: Option<&CustomFields>,
    ) -> DialResult<(Message, Usage)>;
}
