use serde::Serialize;

use crate::pipeline::UploadResult;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Upload {
        success: bool,
        file_id: Option<String>,
        filename: String,
        drive_link: String,
        rkg_date: String,
    },
}

impl From<UploadResult> for SuccessResponse<'_> {
    fn from(result: UploadResult) -> Self {
        SuccessResponse::Upload {
            success: true,
            file_id: result.file_id,
            filename: result.filename,
            drive_link: result.link,
            rkg_date: result.date.map(|d| d.to_string()).unwrap_or_default(),
        }
    }
}
