use std::sync::Arc;

use log::{error, Logger};
use warp::http::header::{HeaderMap, HeaderValue};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, WithStatus};

use crate::errors::UploadError;

pub mod admin;
mod handlers;
mod rejection;
mod response;

pub use internal::*;

/// The maximum form data size to accept. This should be enforced by
/// the HTTP gateway, so on the Rust side it’s set to an unreasonably
/// large number.
const MAX_CONTENT_LENGTH: u64 = 2 * 1024 * 1024 * 1024;

/// Turns pipeline failures and the relevant warp rejections into JSON
/// error bodies. Anything else (such as unknown paths) is passed on.
pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        let status = status_code_for(e);
        let rejection::Context::Upload { filename } = &r.context;
        error!(logger, "Upload error"; "filename" => ?filename, "error" => ?e, "status" => %status, "message" => %e);

        return Ok(with_status(json(&r.flatten()), status));
    }

    let e = if let Some(details) = form_failure(&rej) {
        UploadError::FormParseFailed { details }
    } else if rej.find::<reject::MethodNotAllowed>().is_some() {
        UploadError::MethodNotAllowed
    } else {
        return Err(rej);
    };

    let status = status_code_for(&e);
    error!(logger, "Request rejected"; "rejection" => ?rej, "status" => %status, "message" => %e);

    Ok(with_status(json(&rejection::flatten(&e)), status))
}

/// Rejections warp raises while reading a multipart body.
fn form_failure(rej: &reject::Rejection) -> Option<String> {
    if let Some(e) = rej.find::<reject::MissingHeader>() {
        Some(e.to_string())
    } else if let Some(e) = rej.find::<reject::InvalidHeader>() {
        Some(e.to_string())
    } else if let Some(e) = rej.find::<reject::PayloadTooLarge>() {
        Some(e.to_string())
    } else {
        rej.find::<reject::LengthRequired>().map(|e| e.to_string())
    }
}

fn status_code_for(e: &UploadError) -> StatusCode {
    use UploadError::*;

    match e {
        NoFileReceived => StatusCode::BAD_REQUEST,
        MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        FormParseFailed { .. }
        | StorageUploadFailed { .. }
        | MetadataAppendFailed { .. }
        | MissingConfiguration { .. }
        | TemporaryFile(..) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Headers every reply from the upload routes carries.
pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("Content-Type"),
    );

    headers
}

mod internal {
    use warp::filters::multipart::form;
    use warp::filters::BoxedFilter;
    use warp::{Filter, Reply};

    use super::{cors_headers, format_rejection, handlers, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    /// `POST /api/upload`.
    pub fn make_upload_route(environment: Environment) -> Route {
        warp::any()
            .map(move || environment.clone())
            .and(warp::path!("api" / "upload"))
            .and(warp::post())
            .and(form().max_length(MAX_CONTENT_LENGTH))
            .and_then(handlers::upload)
            .boxed()
    }

    /// `OPTIONS /api/upload`.
    pub fn make_preflight_route() -> Route {
        warp::path!("api" / "upload")
            .and(warp::options())
            .and_then(handlers::preflight)
            .map(|status| Box::new(status) as Box<dyn Reply>)
            .boxed()
    }

    /// The public API: upload and preflight, with errors rendered as
    /// JSON and CORS headers on every reply.
    pub fn make_routes(environment: Environment) -> BoxedFilter<(impl Reply,)> {
        let logger = environment.logger.clone();

        make_preflight_route()
            .or(make_upload_route(environment))
            .unify()
            .recover(move |r| format_rejection(logger.clone(), r))
            .with(warp::reply::with::headers(cors_headers()))
            .boxed()
    }
}
