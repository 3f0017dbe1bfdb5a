use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info};

use super::base::{CompletionClient, CustomFields, Usage};
use super::configs::CompletionConfig;
use super::utils::{
    build_payload, check_dial_error, dial_response_to_message, get_usage, messages_to_dial_format,
};
use crate::errors::{DialError, DialResult};
use crate::models::message::Message;

/// Chat-completion client bound to a single deployment
pub struct DialModelClient {
    client: Client,
    config: CompletionConfig,
}

impl DialModelClient {
    pub fn new(config: CompletionConfig) -> DialResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DialError::Invocation(format!("Could not build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: Value) -> DialResult<Value> {
        let url = self.config.url();

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DialError::Invocation(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| DialError::Invocation(format!("Malformed response: {}", e)));
        }

        let err_text = response.text().await.unwrap_or_default();
        let reason = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "Authentication failed",
            StatusCode::NOT_FOUND => "Unknown deployment",
            StatusCode::TOO_MANY_REQUESTS => "Rate limited",
            status if status.is_server_error() => "Server error",
            _ => "Request failed",
        };
        Err(DialError::Invocation(format!(
            "{} ({}) for deployment {}: {}",
            reason, status, self.config.deployment, err_text
        )))
    }
}

#[async_trait]
impl CompletionClient for DialModelClient {
    fn deployment(&self) -> &str {
        &self.config.deployment
    }

    async fn complete(
        &self,
        messages: &[Message],
        custom_fields: Option<&CustomFields>,
    ) -> DialResult<(Message, Usage)> {
        if messages.is_empty() {
            return Err(DialError::InvalidRequest(
                "At least one message is required".to_string(),
            ));
        }

        let payload = build_payload(messages_to_dial_format(messages)?, custom_fields);
        debug!(
            deployment = %self.config.deployment,
            messages = messages.len(),
            custom_fields = custom_fields.map(|f| f.len()).unwrap_or(0),
            "sending completion request"
        );

        let response = self.post(payload).await?;

        if let Some(err) = check_dial_error(&response) {
            return Err(err);
        }

        let message = dial_response_to_message(&response)?;
        let usage = get_usage(&response);

        info!(
            deployment = %self.config.deployment,
            attachments = message.attachments().len(),
            total_tokens = ?usage.total_tokens,
            "completion received"
        );
        Ok((message, usage))
    }
}
