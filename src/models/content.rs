use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A reference to binary content held in the bucket, not the content itself.
///
/// The `url` only resolves through a bucket session holding matching
/// credentials. Attachments returned by a backend may carry no `url` at all
/// (metadata-only) or inline `data` instead.
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

impl Attachment {
    pub fn new<S: Into<String>, U: Into<String>, T: Into<String>>(
        title: S,
        url: U,
        mime_type: T,
    ) -> Self {
        Attachment {
            title: Some(title.into()),
            url: Some(url.into()),
            mime_type: Some(mime_type.into()),
            data: None,
        }
    }

    /// An attachment that describes content without pointing at a stored object
    pub fn metadata_only<S: Into<String>, T: Into<String>>(title: S, mime_type: T) -> Self {
        Attachment {
            title: Some(title.into()),
            url: None,
            mime_type: Some(mime_type.into()),
            data: None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Structured payload carried next to the text of a message
pub struct CustomContent {
    #[serde(default)]
    attachments: Vec<Attachment>,
}

impl CustomContent {
    pub fn new(attachments: Vec<Attachment>) -> Self {
        CustomContent { attachments }
    }

    /// Attachments in presentation order
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }
}
