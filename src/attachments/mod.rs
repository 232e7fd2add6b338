//! File attachments for outgoing chat messages.
//!
//! A staged file is turned into message content at send time:
//!
//! - `image/*` files are base64-encoded and attached as image payloads
//! - anything else is read as text and appended to the message body inside
//!   a "hidden file content" block

mod image_processing;

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;
use tracing::debug;

use crate::chat::ChatMessage;

pub use image_processing::downscale_if_needed;

/// Opening marker of an inlined text file. Followed by ` (<file name>) ---`.
pub const HIDDEN_CONTENT_START: &str = "--- hidden file content";

/// Closing marker of an inlined text file.
pub const HIDDEN_CONTENT_END: &str = "--- end of hidden file content ---";

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),
    #[error("Could not read attachment {filename}: {source}")]
    Read {
        filename: String,
        #[source]
        source: std::io::Error,
    },
}

/// A file staged for the next outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAttachment {
    /// Full path to the file
    pub path: PathBuf,
    /// Filename for display
    pub filename: String,
    /// Media type guessed from the file name
    pub media_type: String,
}

impl PendingAttachment {
    /// Stage a file. The path must point at an existing regular file.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, AttachmentError> {
        let path = path.into();
        let metadata =
            std::fs::metadata(&path).map_err(|_| AttachmentError::NotFound(path.clone()))?;
        if !metadata.is_file() {
            return Err(AttachmentError::NotAFile(path));
        }
        Ok(Self::new_unchecked(path))
    }

    /// Build an attachment without touching the filesystem.
    pub fn new_unchecked(path: PathBuf) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = media_type_for(&path);
        Self {
            path,
            filename,
            media_type,
        }
    }

    /// Check if this is an image attachment
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// Media type for a path, from its extension. Unknown types are
/// `application/octet-stream` and therefore treated as text.
pub fn media_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Options for turning attachments into message content.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Downscale images larger than this before encoding.
    pub max_image_dimension: Option<u32>,
}

/// A user message under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub images: Vec<String>,
}

impl OutgoingMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            images: Vec::new(),
        }
    }

    /// Append a file's text inside a delimited hidden-content block.
    pub fn append_hidden_file(&mut self, filename: &str, contents: &str) {
        if !self.text.is_empty() {
            self.text.push_str("\n\n");
        }
        self.text.push_str(&format!(
            "{} ({}) ---\n{}",
            HIDDEN_CONTENT_START, filename, contents
        ));
        if !contents.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push_str(HIDDEN_CONTENT_END);
    }

    pub fn into_message(self) -> ChatMessage {
        ChatMessage::user_with_images(self.text, self.images)
    }
}

/// Read a staged file into the outgoing message.
pub async fn ingest(
    attachment: &PendingAttachment,
    draft: &mut OutgoingMessage,
    options: IngestOptions,
) -> Result<(), AttachmentError> {
    let bytes = tokio::fs::read(&attachment.path)
        .await
        .map_err(|source| AttachmentError::Read {
            filename: attachment.filename.clone(),
            source,
        })?;

    debug!(
        file = %attachment.filename,
        media_type = %attachment.media_type,
        size = bytes.len(),
        "Ingesting attachment"
    );

    if attachment.is_image() {
        let bytes = match options.max_image_dimension {
            Some(max) => downscale_if_needed(bytes, max),
            None => bytes,
        };
        draft.images.push(BASE64.encode(bytes));
    } else {
        let text = String::from_utf8_lossy(&bytes);
        draft.append_hidden_file(&attachment.filename, &text);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_media_type_detection() {
        assert_eq!(media_type_for(Path::new("photo.png")), "image/png");
        assert_eq!(media_type_for(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(media_type_for(Path::new("notes.txt")), "text/plain");
        assert_eq!(
            media_type_for(Path::new("no_extension")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_is_image() {
        assert!(PendingAttachment::new_unchecked("a/photo.webp".into()).is_image());
        assert!(PendingAttachment::new_unchecked("anim.gif".into()).is_image());
        assert!(!PendingAttachment::new_unchecked("main.rs".into()).is_image());
        assert!(!PendingAttachment::new_unchecked("report.pdf".into()).is_image());
    }

    #[test]
    fn test_filename_from_path() {
        let att = PendingAttachment::new_unchecked(PathBuf::from("/tmp/some/dir/data.csv"));
        assert_eq!(att.filename, "data.csv");
    }

    #[test]
    fn test_from_path_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = PendingAttachment::from_path(temp.path().join("ghost.txt")).unwrap_err();
        assert!(matches!(err, AttachmentError::NotFound(_)));
    }

    #[test]
    fn test_from_path_directory() {
        let temp = TempDir::new().unwrap();
        let err = PendingAttachment::from_path(temp.path()).unwrap_err();
        assert!(matches!(err, AttachmentError::NotAFile(_)));
    }

    #[test]
    fn test_hidden_block_after_text() {
        let mut draft = OutgoingMessage::new("Summarize this");
        draft.append_hidden_file("notes.txt", "line one\nline two\n");
        assert_eq!(
            draft.text,
            "Summarize this\n\n--- hidden file content (notes.txt) ---\nline one\nline two\n--- end of hidden file content ---"
        );
    }

    #[test]
    fn test_hidden_block_with_empty_text() {
        let mut draft = OutgoingMessage::new("");
        draft.append_hidden_file("a.txt", "x");
        assert!(draft.text.starts_with(HIDDEN_CONTENT_START));
        assert!(draft.text.ends_with(HIDDEN_CONTENT_END));
    }

    #[tokio::test]
    async fn test_ingest_image_attaches_base64() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("photo.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let att = PendingAttachment::from_path(&path).unwrap();
        let mut draft = OutgoingMessage::new("");
        ingest(&att, &mut draft, IngestOptions::default()).await.unwrap();

        assert_eq!(draft.images, vec![BASE64.encode([0x89, b'P', b'N', b'G'])]);
        assert_eq!(draft.text, "");
    }

    #[tokio::test]
    async fn test_ingest_text_file_appends_block() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("main.rs");
        std::fs::write(&path, "fn main() {}\n").unwrap();

        let att = PendingAttachment::from_path(&path).unwrap();
        let mut draft = OutgoingMessage::new("Review this");
        ingest(&att, &mut draft, IngestOptions::default()).await.unwrap();

        assert!(draft.images.is_empty());
        assert!(draft.text.starts_with("Review this\n\n"));
        assert!(draft.text.contains("hidden file content (main.rs)"));
        assert!(draft.text.contains("fn main() {}"));
    }

    #[tokio::test]
    async fn test_ingest_invalid_utf8_is_lossy() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blob.bin");
        std::fs::write(&path, [b'o', b'k', 0xff]).unwrap();

        let att = PendingAttachment::from_path(&path).unwrap();
        let mut draft = OutgoingMessage::new("");
        ingest(&att, &mut draft, IngestOptions::default()).await.unwrap();

        assert!(draft.text.contains("ok\u{fffd}"));
    }

    #[tokio::test]
    async fn test_ingest_unreadable_file() {
        let temp = TempDir::new().unwrap();
        let att = PendingAttachment::new_unchecked(temp.path().join("vanished.png"));
        let mut draft = OutgoingMessage::new("hi");

        let err = ingest(&att, &mut draft, IngestOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("vanished.png"));
        assert_eq!(draft, OutgoingMessage::new("hi"));
    }

    #[test]
    fn test_into_message() {
        let draft = OutgoingMessage {
            text: "look".into(),
            images: vec!["aGk=".into()],
        };
        let msg = draft.into_message();
        assert_eq!(msg.content(), "look");
        assert_eq!(msg.images(), ["aGk=".to_string()]);
    }
}
