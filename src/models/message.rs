use super::content::{Attachment, CustomContent};
use super::role::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One conversation turn sent to or received from a deployment
pub struct Message {
    role: Role,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_content: Option<CustomContent>,
}

impl Message {
    pub fn new<S: Into<String>>(role: Role, content: S) -> Self {
        Message {
            role,
            content: content.into(),
            custom_content: None,
        }
    }

    /// Create a new user message
    pub fn user<S: Into<String>>(content: S) -> Self {
        Message::new(Role::User, content)
    }

    /// Create a new assistant message
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Message::new(Role::Assistant, content)
    }

    /// Create a new system message
    pub fn system<S: Into<String>>(content: S) -> Self {
        Message::new(Role::System, content)
    }

    /// Replace the custom content of the message
    pub fn with_custom_content(mut self, custom_content: CustomContent) -> Self {
        self.custom_content = Some(custom_content);
        self
    }

    /// Append an attachment, creating the custom content when needed
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        let mut attachments = self
            .custom_content
            .take()
            .map(|content| content.attachments().to_vec())
            .unwrap_or_default();
        attachments.push(attachment);
        self.custom_content = Some(CustomContent::new(attachments));
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The text of the message, possibly empty
    pub fn text(&self) -> &str {
        &self.content
    }

    pub fn custom_content(&self) -> Option<&CustomContent> {
        self.custom_content.as_ref()
    }

    /// Attachments carried by the message, empty when there is no custom content
    pub fn attachments(&self) -> &[Attachment] {
        self.custom_content
            .as_ref()
            .map(CustomContent::attachments)
            .unwrap_or(&[])
    }
}
