//! The two multimodal flows, strictly sequential:
//! stage → invoke for image description, invoke → materialize for generation.
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{DialError, DialResult};
use crate::materialize::Materializer;
use crate::models::content::Attachment;
use crate::models::message::Message;
use crate::providers::base::{BlobStore, CompletionClient, CustomFields, Usage};
use crate::providers::utils::mime_type_for_path;

pub const DEFAULT_VISION_PROMPT: &str = "What do you see on this picture?";
pub const DEFAULT_GENERATION_PROMPT: &str = "Sunny day on Bali";

/// Upload a local image and return the attachment referencing it.
///
/// The MIME type is inferred from the extension unless given.
pub async fn stage_image<S>(
    store: &mut S,
    path: &Path,
    mime_type: Option<&str>,
) -> DialResult<Attachment>
where
    S: BlobStore + ?Sized,
{
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| DialError::local_io(path, e))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            DialError::InvalidRequest(format!("No usable file name in {}", path.display()))
        })?;
    let mime_type = mime_type.unwrap_or_else(|| mime_type_for_path(path));

    let metadata = store.put(name, mime_type, content).await?;
    Ok(Attachment::new(name, metadata.url, mime_type))
}

/// Ask a vision deployment about an already staged attachment
pub async fn describe_attachment<C>(
    client: &C,
    attachment: Attachment,
    prompt: &str,
) -> DialResult<(Message, Usage)>
where
    C: CompletionClient + ?Sized,
{
    let message = Message::user(prompt).with_attachment(attachment);
    client.complete(&[message], None).await
}

/// Stage `image` and ask the deployment to describe it
pub async fn describe_image<S, C>(
    store: &mut S,
    client: &C,
    image: &Path,
    mime_type: Option<&str>,
    prompt: &str,
) -> DialResult<(Attachment, Message)>
where
    S: BlobStore + ?Sized,
    C: CompletionClient + ?Sized,
{
    let attachment = stage_image(store, image, mime_type).await?;
    info!(url = ?attachment.url(), deployment = client.deployment(), "image staged, invoking");
    let (reply, _usage) = describe_attachment(client, attachment.clone(), prompt).await?;
    Ok((attachment, reply))
}

/// Ask an image-generation deployment for images; attachments stay remote
pub async fn generate_images<C>(
    client: &C,
    prompt: &str,
    custom_fields: Option<&CustomFields>,
) -> DialResult<Message>
where
    C: CompletionClient + ?Sized,
{
    let (reply, _usage) = client
        .complete(&[Message::user(prompt)], custom_fields)
        .await?;
    info!(
        deployment = client.deployment(),
        attachments = reply.attachments().len(),
        "generation finished"
    );
    Ok(reply)
}

/// Persist the attachments of a reply; a reply without attachments writes nothing
pub async fn save_generated<S>(
    store: &mut S,
    reply: &Message,
    materializer: &Materializer,
) -> DialResult<Vec<PathBuf>>
where
    S: BlobStore + ?Sized,
{
    if reply.attachments().is_empty() {
        return Ok(Vec::new());
    }
    materializer.materialize(store, reply.attachments()).await
}
