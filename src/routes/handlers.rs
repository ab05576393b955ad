use std::convert::Infallible;
use std::time::{Duration, Instant};

use log::debug;
use warp::{
    filters::multipart::FormData,
    http::StatusCode,
    reject,
    reply::{json, with_header, Reply},
};

use crate::environment::Environment;
use crate::pipeline;
use crate::routes::{
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::upload::parse_submission;

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($body:block) => {{
        let start = Instant::now();

        let result = $body;

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    }};
}

pub async fn upload(environment: Environment, content: FormData) -> RouteResult {
    timed!({
        let logger = environment.logger.clone();

        debug!(logger, "Parsing submission...");
        let submission = parse_submission(content)
            .await
            .map_err(|e| Rejection::new(Context::upload(None), e))?;

        let filename = submission.file.as_ref().and_then(|f| f.filename().map(str::to_owned));
        let error_handler = |e| Rejection::new(Context::upload(filename.clone()), e);

        let result = pipeline::process(&environment, submission.file, &submission.fields)
            .await
            .map_err(error_handler)?;

        debug!(logger, "Sending response..."; "file_id" => ?result.file_id);
        json(&SuccessResponse::from(result))
    })
}

/// Answers CORS preflight requests.
pub async fn preflight() -> Result<StatusCode, Infallible> {
    Ok(StatusCode::NO_CONTENT)
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
