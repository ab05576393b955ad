use serde::Serialize;
use warp::reject;

use crate::errors::UploadError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: UploadError,
}

impl Rejection {
    pub fn new(context: Context, error: UploadError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        flatten(&self.error)
    }
}

impl reject::Reject for Rejection {}

/// The error body sent to the caller.
#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    pub(crate) error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) details: Option<String>,
}

pub fn flatten(error: &UploadError) -> FlattenedRejection {
    FlattenedRejection {
        error: error.to_string(),
        details: error.details(),
    }
}

/// What the request was doing when it failed. Only logged.
#[derive(Clone, Debug)]
pub enum Context {
    Upload { filename: Option<String> },
}

impl Context {
    pub fn upload(filename: Option<String>) -> Context {
        Context::Upload { filename }
    }
}
