use std::sync::Arc;

use bytes::Bytes;
use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::errors::RemoteError;
use crate::google::{check_response, GoogleAuth};
use crate::upload::UploadedFile;

const UPLOAD_ENDPOINT: &str =
    "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart&fields=id";

/// What the object storage service reports about a new object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredObject {
    /// The remote identifier, if the service returned one.
    pub id: Option<String>,
}

pub trait Store: Send + Sync {
    /// Uploads `file` as `name` into the container `parent`.
    fn save<'a>(
        &'a self,
        name: &'a str,
        parent: &'a str,
        media_type: &'a str,
        file: &'a UploadedFile,
    ) -> BoxFuture<'a, Result<StoredObject, RemoteError>>;
}

/// A store that files uploads in a Google Drive folder.
pub struct DriveStore {
    client: Client,
    auth: Arc<GoogleAuth>,
    endpoint: String,
}

impl DriveStore {
    pub fn new(client: Client, auth: Arc<GoogleAuth>) -> Self {
        Self {
            client,
            auth,
            endpoint: UPLOAD_ENDPOINT.to_owned(),
        }
    }
}

impl Store for DriveStore {
    fn save<'a>(
        &'a self,
        name: &'a str,
        parent: &'a str,
        media_type: &'a str,
        file: &'a UploadedFile,
    ) -> BoxFuture<'a, Result<StoredObject, RemoteError>> {
        upload(self, name, parent, media_type, file).boxed()
    }
}

#[derive(Serialize)]
struct FileMetadata<'a> {
    name: &'a str,
    parents: [&'a str; 1],
}

#[derive(Deserialize)]
struct CreatedFile {
    id: Option<String>,
}

async fn upload(
    store: &DriveStore,
    name: &str,
    parent: &str,
    media_type: &str,
    file: &UploadedFile,
) -> Result<StoredObject, RemoteError> {
    let token = store.auth.access_token().await?;

    let boundary = format!("uploader-{}", Uuid::new_v4().to_simple());
    let metadata = serde_json::to_string(&FileMetadata {
        name,
        parents: [parent],
    })?;
    let (head, tail) = related_envelope(&boundary, &metadata, media_type);

    let content = tokio::fs::File::open(file.path()).await?;
    let length = head.len() as u64 + file.size() + tail.len() as u64;

    let body = stream::once(future::ready(Ok(head)))
        .chain(ReaderStream::new(content))
        .chain(stream::once(future::ready(Ok(tail))));

    let response = store
        .client
        .post(&store.endpoint)
        .bearer_auth(token)
        .header(
            CONTENT_TYPE,
            format!("multipart/related; boundary={}", boundary),
        )
        .header(CONTENT_LENGTH, length)
        .body(Body::wrap_stream(body))
        .send()
        .await?;

    let created: CreatedFile = check_response(response).await?.json().await?;

    Ok(StoredObject { id: created.id })
}

/// The bytes that go before and after the media in a
/// `multipart/related` upload body.
fn related_envelope(boundary: &str, metadata: &str, media_type: &str) -> (Bytes, Bytes) {
    let head = format!(
        "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{m}\r\n--{b}\r\nContent-Type: {t}\r\n\r\n",
        b = boundary,
        m = metadata,
        t = media_type,
    );
    let tail = format!("\r\n--{}--\r\n", boundary);

    (Bytes::from(head), Bytes::from(tail))
}
