use std::io::{self, Write};
use std::path::Path;

use bytes::Buf;
use futures::stream::TryStreamExt;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use warp::multipart::{FormData, Part};

use crate::errors::UploadError;
use crate::fields::RawFields;

/// Name used when a file arrives without one.
pub const UNKNOWN_FILENAME: &str = "(unknown)";

/// Media type used when a file arrives without one.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// The multipart part carrying the file.
const FILE_PART: &str = "file";

/// A file received in a single request. The bytes live in a temporary
/// file that is removed when this is dropped.
#[derive(Debug)]
pub struct UploadedFile {
    filename: Option<String>,
    media_type: Option<String>,
    content: NamedTempFile,
    size: u64,
}

impl UploadedFile {
    /// Spools `bytes` into a new temporary file.
    pub fn from_bytes(
        filename: Option<String>,
        media_type: Option<String>,
        bytes: &[u8],
    ) -> io::Result<Self> {
        let mut content = NamedTempFile::new()?;
        content.write_all(bytes)?;
        content.flush()?;

        Ok(UploadedFile {
            filename,
            media_type,
            content,
            size: bytes.len() as u64,
        })
    }

    /// Streams a multipart part into a new temporary file.
    pub async fn from_part(part: Part) -> Result<Self, UploadError> {
        let filename = part.filename().map(str::to_owned);
        let media_type = part.content_type().map(str::to_owned);

        let content = NamedTempFile::new().map_err(UploadError::TemporaryFile)?;
        let mut writer =
            tokio::fs::File::from_std(content.reopen().map_err(UploadError::TemporaryFile)?);

        let mut size = 0u64;
        let stream = part.stream();
        futures::pin_mut!(stream);

        while let Some(mut chunk) = stream.try_next().await.map_err(form_error)? {
            while chunk.has_remaining() {
                let bytes = chunk.chunk();
                writer
                    .write_all(bytes)
                    .await
                    .map_err(UploadError::TemporaryFile)?;
                let len = bytes.len();
                size += len as u64;
                chunk.advance(len);
            }
        }

        writer.flush().await.map_err(UploadError::TemporaryFile)?;

        Ok(UploadedFile {
            filename,
            media_type,
            content,
            size,
        })
    }

    /// The submitted filename, if there was a non-blank one. Browsers
    /// send an empty name when no file was picked.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref().filter(|n| !n.trim().is_empty())
    }

    /// The submitted filename or a placeholder.
    pub fn resolved_name(&self) -> &str {
        self.filename().unwrap_or(UNKNOWN_FILENAME)
    }

    /// The declared media type or the generic binary one.
    pub fn media_type(&self) -> &str {
        self.media_type.as_deref().unwrap_or(DEFAULT_MEDIA_TYPE)
    }

    pub fn path(&self) -> &Path {
        self.content.path()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Reads the whole content back into memory.
    pub async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.path()).await
    }
}

/// A parsed multipart submission.
#[derive(Debug, Default)]
pub struct Submission {
    pub file: Option<UploadedFile>,
    pub fields: RawFields,
}

/// Splits a multipart body into the first `file` part and the scalar
/// fields. Later `file` parts are drained and discarded.
pub async fn parse_submission(mut form: FormData) -> Result<Submission, UploadError> {
    let mut submission = Submission::default();

    while let Some(part) = form.try_next().await.map_err(form_error)? {
        let name = part.name().to_owned();

        if name == FILE_PART {
            if submission.file.is_none() {
                submission.file = Some(UploadedFile::from_part(part).await?);
            } else {
                part_as_vec(part).await?;
            }
        } else {
            let value = part_as_vec(part).await?;
            submission
                .fields
                .insert(name, String::from_utf8_lossy(&value).into_owned());
        }
    }

    Ok(submission)
}

/// Collects the chunks of a [`Part`].
async fn part_as_vec(part: Part) -> Result<Vec<u8>, UploadError> {
    part.stream()
        .map_err(form_error)
        .try_fold(Vec::new(), |mut vec, mut chunk| async move {
            while chunk.has_remaining() {
                let bytes = chunk.chunk();
                let len = bytes.len();
                vec.extend_from_slice(bytes);
                chunk.advance(len);
            }
            Ok::<_, UploadError>(vec)
        })
        .await
}

fn form_error(e: warp::Error) -> UploadError {
    UploadError::FormParseFailed {
        details: e.to_string(),
    }
}
