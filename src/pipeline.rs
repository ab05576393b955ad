//! Takes one received file from the request to a stored object and a
//! metadata row.

use log::{debug, o, warn};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::config::{AppendPolicy, SHEET_ID};
use crate::environment::Environment;
use crate::errors::UploadError;
use crate::fields::{RawFields, UploadFields};
use crate::rkg::{self, RecordDate};
use crate::upload::UploadedFile;

/// The outcome of a successful upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadResult {
    /// The identifier the storage service assigned, if it returned one.
    pub file_id: Option<String>,

    /// The name the file was stored under.
    pub filename: String,

    /// A link to view the file, empty without an identifier.
    pub link: String,

    /// The date embedded in an RKG record, if there was one.
    pub date: Option<RecordDate>,

    pub processed_at: OffsetDateTime,
}

/// One metadata row, in column order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataRow {
    pub timestamp: String,
    pub filename: String,
    pub file_id: String,
    pub link: String,
    pub track: String,
    pub time: String,
    pub date: String,
}

impl MetadataRow {
    pub fn into_values(self) -> Vec<String> {
        vec![
            self.timestamp,
            self.filename,
            self.file_id,
            self.link,
            self.track,
            self.time,
            self.date,
        ]
    }
}

/// Runs the upload pipeline: decode, store, record, respond. Every step
/// runs at most once and the first failure ends the request; a file that
/// was already stored is not removed again. The file's temporary content
/// is released when this returns.
pub async fn process(
    environment: &Environment,
    file: Option<UploadedFile>,
    fields: &RawFields,
) -> Result<UploadResult, UploadError> {
    let Environment {
        logger,
        store,
        table,
        decoder,
        links,
        config,
    } = environment;

    let file = file.ok_or(UploadError::NoFileReceived)?;
    let filename = file.resolved_name().to_owned();
    let logger = logger.new(o!("filename" => filename.clone()));

    let sheet_id = match (config.append_policy.is_enabled(), &config.sheet_id) {
        (false, _) => None,
        (true, Some(id)) => Some(id.as_str()),
        (true, None) => return Err(UploadError::MissingConfiguration { name: SHEET_ID }),
    };

    let date = if rkg::is_record_name(&filename) {
        debug!(logger, "Decoding record date...");
        let content = file.read().await.map_err(UploadError::TemporaryFile)?;
        decoder(&content)
    } else {
        None
    };

    debug!(logger, "Saving file to store..."; "size" => file.size(), "media_type" => file.media_type());
    let stored = store
        .save(&filename, &config.drive_folder_id, file.media_type(), &file)
        .await
        .map_err(|source| UploadError::StorageUploadFailed { source })?;
    drop(file);

    let file_id = stored.id;
    let link = links.link(file_id.as_deref());
    let logger = logger.new(o!("file_id" => file_id.clone()));
    let processed_at = OffsetDateTime::now_utc();

    if let Some(sheet_id) = sheet_id {
        let UploadFields { track, time } = UploadFields::from(fields);
        let row = MetadataRow {
            timestamp: format_timestamp(processed_at),
            filename: filename.clone(),
            file_id: file_id.clone().unwrap_or_default(),
            link: link.clone(),
            track,
            time,
            date: date.map(|d| d.to_string()).unwrap_or_default(),
        };

        debug!(logger, "Appending metadata row...");
        let appended = table
            .append_row(sheet_id, &config.sheet_range, row.into_values())
            .await;

        match (appended, config.append_policy) {
            (Ok(()), _) => {}
            (Err(e), AppendPolicy::BestEffort) => {
                warn!(logger, "Failed to append metadata row"; "error" => %e);
            }
            (Err(source), _) => return Err(UploadError::MetadataAppendFailed { source }),
        }
    }

    Ok(UploadResult {
        file_id,
        filename,
        link,
        date,
        processed_at,
    })
}

/// ISO 8601, as `2025-06-15T18:04:05.123Z`.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(&Rfc3339)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}
