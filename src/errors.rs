use std::io;

use thiserror::Error;

/// Enumerates the ways handling an upload can fail.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The multipart body could not be read.
    #[error("Form parse error")]
    FormParseFailed { details: String },

    /// The submission had no `file` part.
    #[error("No file received")]
    NoFileReceived,

    /// The route does not accept the verb used.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The object storage service rejected the upload.
    #[error("Upload failed")]
    StorageUploadFailed { source: RemoteError },

    /// The tabular data service rejected the metadata row.
    #[error("Metadata append failed")]
    MetadataAppendFailed { source: RemoteError },

    /// A setting needed by an enabled step is missing.
    #[error("Missing configuration")]
    MissingConfiguration { name: &'static str },

    /// The uploaded bytes could not be spooled or read back.
    #[error("Temporary file error")]
    TemporaryFile(#[source] io::Error),
}

impl UploadError {
    /// The part of the error that is safe to show the caller beyond the
    /// summary, if any.
    pub fn details(&self) -> Option<String> {
        use UploadError::*;

        match self {
            FormParseFailed { details } => Some(details.clone()),
            StorageUploadFailed { source } | MetadataAppendFailed { source } => {
                Some(source.message())
            }
            MissingConfiguration { name } => Some(format!("{} is not set", name)),
            NoFileReceived | MethodNotAllowed | TemporaryFile(..) => None,
        }
    }
}

/// Enumerates failures talking to a remote service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// No access token could be obtained.
    #[error("Authorization failed: {0}")]
    Authorization(String),

    /// The request never completed.
    #[error("Request failed: {source}")]
    Request { source: reqwest::Error },

    /// The service answered with a non-success status.
    #[error("Service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// A request or response body could not be (de)serialized.
    #[error("Malformed JSON: {source}")]
    Json { source: serde_json::Error },

    /// The local content could not be read.
    #[error("Could not read content: {source}")]
    Io { source: io::Error },

    /// An endpoint URL could not be built.
    #[error("Invalid endpoint URL")]
    InvalidEndpoint,
}

impl RemoteError {
    /// The message reported by the service when there is one, otherwise
    /// a description of what went wrong locally.
    pub fn message(&self) -> String {
        match self {
            RemoteError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(source: reqwest::Error) -> Self {
        RemoteError::Request { source }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(source: serde_json::Error) -> Self {
        RemoteError::Json { source }
    }
}

impl From<io::Error> for RemoteError {
    fn from(source: io::Error) -> Self {
        RemoteError::Io { source }
    }
}

/// Enumerates problems with the startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("must define {0} environment variable")]
    Missing(&'static str),

    #[error("could not parse {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
