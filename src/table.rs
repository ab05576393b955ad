use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::errors::RemoteError;
use crate::google::{check_response, GoogleAuth};

const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub trait Table: Send + Sync {
    /// Appends one row of values after the last row of `range` in the
    /// table `destination`.
    fn append_row<'a>(
        &'a self,
        destination: &'a str,
        range: &'a str,
        values: Vec<String>,
    ) -> BoxFuture<'a, Result<(), RemoteError>>;
}

/// A table backed by a Google Sheets spreadsheet.
pub struct SheetsTable {
    client: Client,
    auth: Arc<GoogleAuth>,
    base: Url,
}

impl SheetsTable {
    pub fn new(client: Client, auth: Arc<GoogleAuth>) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            auth,
            base: Url::parse(SHEETS_ENDPOINT)?,
        })
    }
}

impl Table for SheetsTable {
    fn append_row<'a>(
        &'a self,
        destination: &'a str,
        range: &'a str,
        values: Vec<String>,
    ) -> BoxFuture<'a, Result<(), RemoteError>> {
        append(self, destination, range, values).boxed()
    }
}

#[derive(Serialize)]
struct ValueRange {
    values: Vec<Vec<String>>,
}

async fn append(
    table: &SheetsTable,
    destination: &str,
    range: &str,
    values: Vec<String>,
) -> Result<(), RemoteError> {
    let url = append_url(&table.base, destination, range)?;
    let token = table.auth.access_token().await?;

    let response = table
        .client
        .post(url)
        .bearer_auth(token)
        .json(&ValueRange {
            values: vec![values],
        })
        .send()
        .await?;

    check_response(response).await?;

    Ok(())
}

/// `…/spreadsheets/{id}/values/{range}:append`, with values stored as
/// given rather than parsed as if typed in.
fn append_url(base: &Url, destination: &str, range: &str) -> Result<Url, RemoteError> {
    let mut url = base.clone();
    let target = format!("{}:append", range);

    url.path_segments_mut()
        .map_err(|_| RemoteError::InvalidEndpoint)?
        .extend(&[destination, "values", target.as_str()]);

    url.query_pairs_mut()
        .append_pair("valueInputOption", "RAW")
        .append_pair("insertDataOption", "INSERT_ROWS");

    Ok(url)
}
