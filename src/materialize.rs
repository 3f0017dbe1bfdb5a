//! Resolve output attachments to files on local disk.
//!
//! Names are `{prefix}_{timestamp}_{index}.{extension}` with a second
//! resolution local timestamp taken once per batch and the ordinal position
//! of the attachment in the batch. Two batches finishing in the same second
//! produce the same names; files are created with create-new semantics so
//! such a collision fails with `AlreadyExists` rather than overwriting the
//! earlier output.
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::errors::{AttachmentFailure, DialError, DialResult};
use crate::models::content::Attachment;
use crate::providers::base::BlobStore;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNaming {
    pub prefix: String,
    pub extension: String,
}

impl Default for FileNaming {
    fn default() -> Self {
        Self {
            prefix: "generated_image".to_string(),
            extension: "png".to_string(),
        }
    }
}

impl FileNaming {
    pub fn file_name(&self, timestamp: &str, index: usize) -> String {
        format!(
            "{}_{}_{}.{}",
            self.prefix, timestamp, index, self.extension
        )
    }
}

pub struct Materializer {
    destination: PathBuf,
    naming: FileNaming,
}

impl Materializer {
    pub fn new<P: Into<PathBuf>>(destination: P) -> Self {
        Self {
            destination: destination.into(),
            naming: FileNaming::default(),
        }
    }

    pub fn with_naming(mut self, naming: FileNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Download every attachment that has a url and write it to the destination.
    ///
    /// Paths come back in attachment order. Every attachment is attempted;
    /// when any of them fails the result is a `Materialization` error that
    /// still lists the files already written.
    pub async fn materialize<S>(
        &self,
        store: &mut S,
        attachments: &[Attachment],
    ) -> DialResult<Vec<PathBuf>>
    where
        S: BlobStore + ?Sized,
    {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.materialize_at(store, attachments, &timestamp).await
    }

    pub(crate) async fn materialize_at<S>(
        &self,
        store: &mut S,
        attachments: &[Attachment],
        timestamp: &str,
    ) -> DialResult<Vec<PathBuf>>
    where
        S: BlobStore + ?Sized,
    {
        fs::create_dir_all(&self.destination)
            .await
            .map_err(|e| DialError::local_io(&self.destination, e))?;

        let mut written = Vec::new();
        let mut failures = Vec::new();

        for (index, attachment) in attachments.iter().enumerate() {
            let Some(url) = attachment.url().filter(|u| !u.is_empty()) else {
                debug!(index, title = ?attachment.title(), "attachment has no url, skipping");
                continue;
            };

            let path = self
                .destination
                .join(self.naming.file_name(timestamp, index));
            match self.fetch_and_write(store, url, &path).await {
                Ok(()) => {
                    info!(index, url, path = %path.display(), "attachment saved");
                    written.push(path);
                }
                Err(error) => {
                    warn!(index, url, %error, "attachment could not be saved");
                    failures.push(AttachmentFailure {
                        index,
                        error: Box::new(error),
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(written)
        } else {
            Err(DialError::Materialization { written, failures })
        }
    }

    async fn fetch_and_write<S>(&self, store: &mut S, url: &str, path: &Path) -> DialResult<()>
    where
        S: BlobStore + ?Sized,
    {
        let content = store.get(url).await?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| DialError::local_io(path, e))?;
        file.write_all(&content)
            .await
            .map_err(|e| DialError::local_io(path, e))?;
        file.flush().await.map_err(|e| DialError::local_io(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockBlobStore;
    use tempfile::tempdir;

    const STAMP: &str = "20241018_120000";

    fn _store_with(objects: &[(&str, &str)]) -> MockBlobStore {
        let mut store = MockBlobStore::new();
        for (url, content) in objects {
            store.insert(*url, content.as_bytes().to_vec());
        }
        store
    }

    #[test]
    fn test_default_file_name() {
        assert_eq!(
            FileNaming::default().file_name(STAMP, 3),
            "generated_image_20241018_120000_3.png"
        );
    }

    #[tokio::test]
    async fn test_materialize_preserves_order_and_bytes() -> DialResult<()> {
        let dir = tempdir().unwrap();
        let mut store = _store_with(&[
            ("files/b/x.png", "xxx"),
            ("files/b/y.png", "yy"),
            ("files/b/z.png", "z"),
        ]);
        let attachments = vec![
            Attachment::new("X", "files/b/x.png", "image/png"),
            Attachment::new("Y", "files/b/y.png", "image/png"),
            Attachment::new("Z", "files/b/z.png", "image/png"),
        ];

        let paths = Materializer::new(dir.path())
            .materialize_at(&mut store, &attachments, STAMP)
            .await?;

        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "generated_image_20241018_120000_0.png",
                "generated_image_20241018_120000_1.png",
                "generated_image_20241018_120000_2.png",
            ]
        );
        assert_eq!(std::fs::read(&paths[0]).unwrap(), b"xxx");
        assert_eq!(std::fs::read(&paths[1]).unwrap(), b"yy");
        assert_eq!(std::fs::read(&paths[2]).unwrap(), b"z");
        assert_eq!(store.gets, vec!["files/b/x.png", "files/b/y.png", "files/b/z.png"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_attachment_without_url_is_skipped() -> DialResult<()> {
        let dir = tempdir().unwrap();
        let mut store = _store_with(&[("files/b/img.png", "img")]);
        let attachments = vec![
            Attachment::metadata_only("Revised prompt", "text/plain"),
            Attachment::new("Image", "files/b/img.png", "image/png"),
        ];

        let paths = Materializer::new(dir.path())
            .materialize_at(&mut store, &attachments, STAMP)
            .await?;

        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("generated_image_20241018_120000_1.png"));
        assert_eq!(store.gets, vec!["files/b/img.png"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_attachment_with_empty_url_is_skipped() -> DialResult<()> {
        let dir = tempdir().unwrap();
        let mut store = MockBlobStore::new();
        let attachments = vec![Attachment::new("x", "", "image/png")];

        let paths = Materializer::new(dir.path())
            .materialize_at(&mut store, &attachments, STAMP)
            .await?;

        assert!(paths.is_empty());
        assert!(store.gets.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_batch_writes_nothing() -> DialResult<()> {
        let dir = tempdir().unwrap();
        let mut store = MockBlobStore::new();

        let paths = Materializer::new(dir.path())
            .materialize(&mut store, &[])
            .await?;

        assert!(paths.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_written_files() {
        let dir = tempdir().unwrap();
        let mut store = _store_with(&[("files/b/a.png", "a"), ("files/b/c.png", "c")]);
        let attachments = vec![
            Attachment::new("A", "files/b/a.png", "image/png"),
            Attachment::new("B", "files/b/expired.png", "image/png"),
            Attachment::new("C", "files/b/c.png", "image/png"),
        ];

        let result = Materializer::new(dir.path())
            .materialize_at(&mut store, &attachments, STAMP)
            .await;

        match result {
            Err(DialError::Materialization { written, failures }) => {
                assert_eq!(written.len(), 2);
                assert!(written.iter().all(|p| p.exists()));
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].index, 1);
                assert!(matches!(*failures[0].error, DialError::NotFound(_)));
            }
            other => panic!("Expected materialization error, got {:?}", other),
        }
        assert_eq!(store.gets.len(), 3);
    }

    #[tokio::test]
    async fn test_same_second_collision_does_not_overwrite() {
        let dir = tempdir().unwrap();
        let mut store = _store_with(&[("files/b/first.png", "first"), ("files/b/second.png", "second")]);
        let materializer = Materializer::new(dir.path());

        let first = materializer
            .materialize_at(
                &mut store,
                &[Attachment::new("1", "files/b/first.png", "image/png")],
                STAMP,
            )
            .await
            .unwrap();

        let second = materializer
            .materialize_at(
                &mut store,
                &[Attachment::new("2", "files/b/second.png", "image/png")],
                STAMP,
            )
            .await;

        match second {
            Err(DialError::Materialization { written, failures }) => {
                assert!(written.is_empty());
                match failures[0].error.as_ref() {
                    DialError::LocalIo { source, .. } => {
                        assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists)
                    }
                    other => panic!("Expected local I/O failure, got {:?}", other),
                }
            }
            other => panic!("Expected collision error, got {:?}", other),
        }
        assert_eq!(std::fs::read(&first[0]).unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_custom_naming_and_nested_destination() -> DialResult<()> {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("out").join("images");
        let mut store = _store_with(&[("files/b/a.jpg", "jpeg")]);

        let paths = Materializer::new(&destination)
            .with_naming(FileNaming {
                prefix: "bali".to_string(),
                extension: "jpg".to_string(),
            })
            .materialize_at(
                &mut store,
                &[Attachment::new("A", "files/b/a.jpg", "image/jpeg")],
                STAMP,
            )
            .await?;

        assert_eq!(paths, vec![destination.join("bali_20241018_120000_0.jpg")]);
        Ok(())
    }
}
