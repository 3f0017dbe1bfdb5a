use serde_json::{json, Value};
use std::path::Path;

use super::base::{CustomFields, Usage};
use crate::errors::{DialError, DialResult};
use crate::models::content::CustomContent;
use crate::models::message::Message;
use crate::models::role::Role;

/// Convert internal messages to the gateway's chat message format
pub fn messages_to_dial_format(messages: &[Message]) -> DialResult<Vec<Value>> {
    messages
        .iter()
        .map(|message| {
            serde_json::to_value(message)
                .map_err(|e| DialError::InvalidRequest(format!("Unserializable message: {}", e)))
        })
        .collect()
}

/// Build the request body; custom fields travel verbatim under `custom_fields.configuration`
pub fn build_payload(messages: Vec<Value>, custom_fields: Option<&CustomFields>) -> Value {
    let mut payload = json!({ "messages": messages });
    if let Some(fields) = custom_fields {
        payload["custom_fields"] = json!({ "configuration": fields });
    }
    payload
}

/// Convert the gateway's completion response to an internal message
pub fn dial_response_to_message(response: &Value) -> DialResult<Message> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| DialError::Invocation("Response contains no message".to_string()))?;

    let text = original
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let message = Message::new(Role::Assistant, text);

    match original.get("custom_content") {
        Some(Value::Null) | None => Ok(message),
        Some(custom_content) => {
            let custom_content: CustomContent = serde_json::from_value(custom_content.clone())
                .map_err(|e| {
                    DialError::Invocation(format!("Malformed custom_content in response: {}", e))
                })?;
            Ok(message.with_custom_content(custom_content))
        }
    }
}

pub fn get_usage(data: &Value) -> Usage {
    let Some(usage) = data.get("usage") else {
        return Usage::default();
    };

    let input_tokens = usage
        .get("prompt_tokens")
        .and_then(|v| v.as_i64())
        .and_then(|v| i32::try_from(v).ok());

    let output_tokens = usage
        .get("completion_tokens")
        .and_then(|v| v.as_i64())
        .and_then(|v| i32::try_from(v).ok());

    let total_tokens = usage
        .get("total_tokens")
        .and_then(|v| v.as_i64())
        .and_then(|v| i32::try_from(v).ok())
        .or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        });

    Usage::new(input_tokens, output_tokens, total_tokens)
}

/// Backend-reported error embedded in a successful HTTP response
pub fn check_dial_error(response: &Value) -> Option<DialError> {
    let error = response.get("error").filter(|e| !e.is_null())?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| error.to_string());
    Some(DialError::Invocation(format!("Gateway error: {}", message)))
}

/// Guess the MIME type of a local file from its extension
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
