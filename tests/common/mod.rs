#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{self, BoxFuture, FutureExt};

use uploader::config::{AppendPolicy, Config};
use uploader::environment::Environment;
use uploader::errors::RemoteError;
use uploader::rkg;
use uploader::store::{Store, StoredObject};
use uploader::table::Table;
use uploader::upload::UploadedFile;
use uploader::urls::ViewerLinks;

pub const FOLDER_ID: &str = "folder-123";
pub const SHEET_ID: &str = "sheet-456";
pub const SHEET_RANGE: &str = "Sheet1!A:G";

/// One call the mock store received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedFile {
    pub name: String,
    pub parent: String,
    pub media_type: String,
    pub content: Vec<u8>,
}

/// A store that keeps uploads in memory, or fails every one.
pub struct MockStore {
    pub saved: Mutex<Vec<SavedFile>>,
    id: Option<String>,
    failure: Option<String>,
}

impl MockStore {
    pub fn returning(id: Option<&str>) -> Self {
        MockStore {
            saved: Mutex::new(vec![]),
            id: id.map(str::to_owned),
            failure: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        MockStore {
            saved: Mutex::new(vec![]),
            id: None,
            failure: Some(message.to_owned()),
        }
    }

    pub fn calls(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

impl Store for MockStore {
    fn save<'a>(
        &'a self,
        name: &'a str,
        parent: &'a str,
        media_type: &'a str,
        file: &'a UploadedFile,
    ) -> BoxFuture<'a, Result<StoredObject, RemoteError>> {
        async move {
            let content = file.read().await?;

            self.saved.lock().unwrap().push(SavedFile {
                name: name.to_owned(),
                parent: parent.to_owned(),
                media_type: media_type.to_owned(),
                content,
            });

            match &self.failure {
                Some(message) => Err(RemoteError::Api {
                    status: 403,
                    message: message.clone(),
                }),
                None => Ok(StoredObject {
                    id: self.id.clone(),
                }),
            }
        }
        .boxed()
    }
}

/// One call the mock table received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendedRow {
    pub destination: String,
    pub range: String,
    pub values: Vec<String>,
}

/// A table that keeps rows in memory, or fails every append.
#[derive(Default)]
pub struct MockTable {
    pub rows: Mutex<Vec<AppendedRow>>,
    failure: Option<String>,
}

impl MockTable {
    pub fn failing(message: &str) -> Self {
        MockTable {
            failure: Some(message.to_owned()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl Table for MockTable {
    fn append_row<'a>(
        &'a self,
        destination: &'a str,
        range: &'a str,
        values: Vec<String>,
    ) -> BoxFuture<'a, Result<(), RemoteError>> {
        self.rows.lock().unwrap().push(AppendedRow {
            destination: destination.to_owned(),
            range: range.to_owned(),
            values,
        });

        let result = match &self.failure {
            Some(message) => Err(RemoteError::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        };

        future::ready(result).boxed()
    }
}

pub fn config(append_policy: AppendPolicy, sheet_id: Option<&str>) -> Config {
    Config {
        drive_folder_id: FOLDER_ID.to_owned(),
        sheet_id: sheet_id.map(str::to_owned),
        sheet_range: SHEET_RANGE.to_owned(),
        append_policy,
    }
}

/// Wires the mocks into an environment with a decoder that counts its
/// calls.
pub fn environment(
    store: Arc<MockStore>,
    table: Arc<MockTable>,
    config: Config,
) -> (Environment, Arc<AtomicUsize>) {
    let decodes = Arc::new(AtomicUsize::new(0));
    let counter = decodes.clone();

    let environment = Environment::new(
        Arc::new(log::discard()),
        store,
        table,
        Arc::new(ViewerLinks::default()),
        Arc::new(config),
    )
    .with_decoder(Arc::new(move |bytes: &[u8]| {
        counter.fetch_add(1, Ordering::SeqCst);
        rkg::decode(bytes)
    }));

    (environment, decodes)
}

/// A minimal RKG record dated 15 June 2025.
pub fn record_bytes() -> Vec<u8> {
    let mut bytes = b"RKGD".to_vec();
    bytes.resize(0x88, 0);
    bytes[9] = 0x33;
    bytes[10] = 0x2C;
    bytes[11] = 0xF0;
    bytes
}
