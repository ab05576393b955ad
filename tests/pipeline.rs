mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use uploader::config::AppendPolicy;
use uploader::errors::UploadError;
use uploader::fields::RawFields;
use uploader::pipeline::process;
use uploader::upload::UploadedFile;

use common::{config, environment, record_bytes, MockStore, MockTable, FOLDER_ID, SHEET_ID, SHEET_RANGE};

fn fields() -> RawFields {
    let mut fields = RawFields::new();
    fields.insert("track", "Luigi Circuit");
    fields.insert("time", "1:08.734");
    fields
}

fn file(name: Option<&str>, media_type: Option<&str>, bytes: &[u8]) -> UploadedFile {
    UploadedFile::from_bytes(name.map(str::to_owned), media_type.map(str::to_owned), bytes)
        .expect("spool upload")
}

#[tokio::test]
async fn record_is_decoded_stored_and_recorded() {
    let store = Arc::new(MockStore::returning(Some("1AbC")));
    let table = Arc::new(MockTable::default());
    let (environment, decodes) = environment(
        store.clone(),
        table.clone(),
        config(AppendPolicy::Required, Some(SHEET_ID)),
    );

    let upload = file(Some("01m08s7340000 Luigi.RKG"), None, &record_bytes());
    let result = process(&environment, Some(upload), &fields())
        .await
        .expect("process upload");

    assert_eq!(result.file_id.as_deref(), Some("1AbC"));
    assert_eq!(result.filename, "01m08s7340000 Luigi.RKG");
    assert_eq!(result.link, "https://drive.google.com/file/d/1AbC/view");
    assert_eq!(result.date.map(|d| d.to_string()).as_deref(), Some("15.06.2025"));
    assert_eq!(decodes.load(Ordering::SeqCst), 1);

    let saved = store.saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].name, "01m08s7340000 Luigi.RKG");
    assert_eq!(saved[0].parent, FOLDER_ID);
    assert_eq!(saved[0].media_type, "application/octet-stream");
    assert_eq!(saved[0].content, record_bytes());

    let rows = table.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].destination, SHEET_ID);
    assert_eq!(rows[0].range, SHEET_RANGE);

    let values = &rows[0].values;
    assert_eq!(values.len(), 7);
    assert!(values[0].starts_with("20") && values[0].ends_with('Z'), "{}", values[0]);
    assert_eq!(
        &values[1..],
        &[
            "01m08s7340000 Luigi.RKG",
            "1AbC",
            "https://drive.google.com/file/d/1AbC/view",
            "Luigi Circuit",
            "1:08.734",
            "15.06.2025",
        ]
    );
}

#[tokio::test]
async fn other_files_are_never_decoded() {
    let store = Arc::new(MockStore::returning(Some("img")));
    let table = Arc::new(MockTable::default());
    let (environment, decodes) = environment(
        store.clone(),
        table.clone(),
        config(AppendPolicy::Required, Some(SHEET_ID)),
    );

    // Looks like a record inside, but the name says otherwise.
    let upload = file(Some("ghost.rkg.png"), Some("image/png"), &record_bytes());
    let result = process(&environment, Some(upload), &RawFields::new())
        .await
        .expect("process upload");

    assert_eq!(result.date, None);
    assert_eq!(decodes.load(Ordering::SeqCst), 0);
    assert_eq!(store.saved.lock().unwrap()[0].media_type, "image/png");

    let rows = table.rows.lock().unwrap();
    assert_eq!(&rows[0].values[4..], &["", "", ""]);
}

#[tokio::test]
async fn truncated_record_has_no_date() {
    let store = Arc::new(MockStore::returning(Some("x")));
    let (environment, decodes) = environment(
        store,
        Arc::new(MockTable::default()),
        config(AppendPolicy::Disabled, None),
    );

    let upload = file(Some("short.rkg"), None, b"RKGD");
    let result = process(&environment, Some(upload), &RawFields::new())
        .await
        .expect("process upload");

    assert_eq!(decodes.load(Ordering::SeqCst), 1);
    assert_eq!(result.date, None);
}

#[tokio::test]
async fn missing_file_makes_no_remote_calls() {
    let store = Arc::new(MockStore::returning(Some("x")));
    let table = Arc::new(MockTable::default());
    let (environment, _) = environment(
        store.clone(),
        table.clone(),
        config(AppendPolicy::Required, Some(SHEET_ID)),
    );

    let error = process(&environment, None, &fields())
        .await
        .expect_err("reject missing file");

    assert!(matches!(error, UploadError::NoFileReceived), "{:?}", error);
    assert_eq!(store.calls(), 0);
    assert_eq!(table.calls(), 0);
}

#[tokio::test]
async fn storage_failure_skips_the_row_and_releases_the_file() {
    let store = Arc::new(MockStore::failing("The user's Drive storage quota has been exceeded."));
    let table = Arc::new(MockTable::default());
    let (environment, _) = environment(
        store.clone(),
        table.clone(),
        config(AppendPolicy::Required, Some(SHEET_ID)),
    );

    let upload = file(Some("ghost.rkg"), None, &record_bytes());
    let path = upload.path().to_owned();

    let error = process(&environment, Some(upload), &fields())
        .await
        .expect_err("fail on storage error");

    assert!(matches!(error, UploadError::StorageUploadFailed { .. }), "{:?}", error);
    assert_eq!(
        error.details().as_deref(),
        Some("The user's Drive storage quota has been exceeded.")
    );
    assert_eq!(store.calls(), 1);
    assert_eq!(table.calls(), 0);
    assert!(!path.exists());
}

#[tokio::test]
async fn unconfigured_sheet_fails_before_any_remote_call() {
    let store = Arc::new(MockStore::returning(Some("x")));
    let table = Arc::new(MockTable::default());
    let (environment, _) = environment(
        store.clone(),
        table.clone(),
        config(AppendPolicy::Required, None),
    );

    let error = process(&environment, Some(file(Some("ghost.rkg"), None, &record_bytes())), &fields())
        .await
        .expect_err("fail without sheet");

    assert!(
        matches!(error, UploadError::MissingConfiguration { name: "SHEET_ID" }),
        "{:?}",
        error
    );
    assert_eq!(store.calls(), 0);
    assert_eq!(table.calls(), 0);
}

#[tokio::test]
async fn append_failure_fails_the_request_after_upload() {
    let store = Arc::new(MockStore::returning(Some("x")));
    let table = Arc::new(MockTable::failing("Requested entity was not found."));
    let (environment, _) = environment(
        store.clone(),
        table.clone(),
        config(AppendPolicy::Required, Some(SHEET_ID)),
    );

    let error = process(&environment, Some(file(Some("a.txt"), None, b"a")), &fields())
        .await
        .expect_err("fail on append error");

    assert!(matches!(error, UploadError::MetadataAppendFailed { .. }), "{:?}", error);
    assert_eq!(error.details().as_deref(), Some("Requested entity was not found."));
    assert_eq!(store.calls(), 1);
    assert_eq!(table.calls(), 1);
}

#[tokio::test]
async fn best_effort_append_failure_still_succeeds() {
    let store = Arc::new(MockStore::returning(Some("x")));
    let table = Arc::new(MockTable::failing("Internal error encountered."));
    let (environment, _) = environment(
        store,
        table.clone(),
        config(AppendPolicy::BestEffort, Some(SHEET_ID)),
    );

    let result = process(&environment, Some(file(Some("a.txt"), None, b"a")), &fields())
        .await
        .expect("succeed despite append failure");

    assert_eq!(result.file_id.as_deref(), Some("x"));
    assert_eq!(table.calls(), 1);
}

#[tokio::test]
async fn disabled_append_ignores_the_sheet() {
    let table = Arc::new(MockTable::default());
    let (environment, _) = environment(
        Arc::new(MockStore::returning(Some("x"))),
        table.clone(),
        config(AppendPolicy::Disabled, Some(SHEET_ID)),
    );

    process(&environment, Some(file(Some("a.txt"), None, b"a")), &fields())
        .await
        .expect("process upload");

    assert_eq!(table.calls(), 0);
}

#[tokio::test]
async fn missing_id_gives_empty_link() {
    let table = Arc::new(MockTable::default());
    let (environment, _) = environment(
        Arc::new(MockStore::returning(None)),
        table.clone(),
        config(AppendPolicy::Required, Some(SHEET_ID)),
    );

    let result = process(&environment, Some(file(None, None, b"a")), &fields())
        .await
        .expect("process upload");

    assert_eq!(result.file_id, None);
    assert_eq!(result.filename, "(unknown)");
    assert_eq!(result.link, "");
    assert_eq!(&table.rows.lock().unwrap()[0].values[1..4], &["(unknown)", "", ""]);
}

#[tokio::test]
async fn repeated_uploads_are_not_deduplicated() {
    let store = Arc::new(MockStore::returning(Some("x")));
    let table = Arc::new(MockTable::default());
    let (environment, _) = environment(
        store.clone(),
        table.clone(),
        config(AppendPolicy::Required, Some(SHEET_ID)),
    );

    for _ in 0..2 {
        process(&environment, Some(file(Some("ghost.rkg"), None, &record_bytes())), &fields())
            .await
            .expect("process upload");
    }

    assert_eq!(store.calls(), 2);
    assert_eq!(table.calls(), 2);
}
