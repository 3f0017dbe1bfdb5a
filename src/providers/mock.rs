use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::errors::{DialError, DialResult};
use crate::models::message::Message;
use crate::providers::base::{BlobStore, CompletionClient, CustomFields, FileMetadata, Usage};

/// An in-memory bucket for testing
#[derive(Default)]
pub struct MockBlobStore {
    objects: HashMap<String, Vec<u8>>,
    pub gets: Vec<String>,
}

impl MockBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load an object as if a backend had generated it
    pub fn insert<U: Into<String>>(&mut self, url: U, content: Vec<u8>) {
        self.objects.insert(url.into(), content);
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn put(
        &mut self,
        name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> DialResult<FileMetadata> {
        if name.is_empty() {
            return Err(DialError::InvalidRequest(
                "File name must not be empty".to_string(),
            ));
        }
        let url = format!("files/mock-bucket/{}/{}", self.objects.len(), name);
        let content_length = content.len() as u64;
        self.objects.insert(url.clone(), content);
        Ok(FileMetadata {
            url,
            name: Some(name.to_string()),
            bucket: Some("mock-bucket".to_string()),
            parent_path: None,
            content_length: Some(content_length),
            content_type: Some(mime_type.to_string()),
            updated_at: None,
        })
    }

    async fn get(&mut self, url: &str) -> DialResult<Vec<u8>> {
        self.gets.push(url.to_string());
        self.objects
            .get(url)
            .cloned()
            .ok_or_else(|| DialError::NotFound(url.to_string()))
    }
}

/// A completion client that replays a canned reply and records what it was sent
pub struct MockCompletionClient {
    reply: Result<Message, String>,
    pub calls: Arc<Mutex<Vec<(Vec<Message>, Option<CustomFields>)>>>,
}

impl MockCompletionClient {
    pub fn new(reply: Message) -> Self {
        Self {
            reply: Ok(reply),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing<S: Into<String>>(reason: S) -> Self {
        Self {
            reply: Err(reason.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    fn deployment(&self) -> &str {
        "mock-deployment"
    }

    async fn complete(
        &self,
        messages: &[Message],
        custom_fields: Option<&CustomFields>,
    ) -> DialResult<(Message, Usage)> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), custom_fields.cloned()));
        match &self.reply {
            Ok(message) => Ok((message.clone(), Usage::default())),
            Err(reason) => Err(DialError::Invocation(reason.clone())),
        }
    }
}
