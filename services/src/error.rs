//! The services-crate error model: wraps the operator pipeline's
//! `gt_operators::Error` and adds the HTTP-only faults the pipeline itself
//! never sees, such as malformed query strings or config load failures.
//! `ResponseError` maps every variant to the `{status, statusCode, message}`
//! JSON body, or, for genuinely unexpected faults, a bodyless 500.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use snafu::Snafu;
use strum::IntoStaticStr;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu, IntoStaticStr)]
#[snafu(visibility(pub(crate)))]
#[snafu(context(suffix(false)))]
pub enum Error {
    /// Wraps every error the pipeline itself can produce: `BadRequest`,
    /// `UnsupportedCrs`, `LayerNotFound`, `DimensionMismatch`,
    /// `UnableToCompute`, and the pipeline's own `Internal` catch-all.
    #[snafu(display("{}", source))]
    Pipeline { source: gt_operators::Error },

    #[snafu(display("internal error: {}", reason))]
    Internal { reason: String },

    #[snafu(display("internal error: {}", source))]
    Config { source: config::ConfigError },

    #[snafu(display("internal error: the worker pool task panicked or was cancelled"))]
    WorkerPoolJoin,
}

impl From<gt_operators::Error> for Error {
    fn from(source: gt_operators::Error) -> Self {
        Self::Pipeline { source }
    }
}

impl From<config::ConfigError> for Error {
    fn from(source: config::ConfigError) -> Self {
        Self::Config { source }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    #[serde(rename = "statusCode")]
    status_code: u16,
    message: String,
}

impl ResponseError for Error {
    /// Every variant maps to `500`; what varies is whether the body carries
    /// the domain-error JSON shape or is empty.
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        if !self.is_domain_fault() {
            return HttpResponse::build(self.status_code()).finish();
        }

        let status: &'static str = self.into();
        HttpResponse::build(self.status_code()).json(ErrorBody {
            status,
            status_code: self.status_code().as_u16(),
            message: self.to_string(),
        })
    }
}

/// Builds a `BadRequest` domain fault directly from the HTTP boundary:
/// malformed `bbox`, non-integer weights, mismatched `layers`/`weights`
/// lengths, and the like, caught before the pipeline is ever invoked.
pub fn bad_request(reason: impl Into<String>) -> Error {
    Error::Pipeline {
        source: gt_operators::Error::BadRequest {
            reason: reason.into(),
        },
    }
}

impl Error {
    /// `true` for the domain-fault kinds (`BadRequest`, `UnsupportedCrs`,
    /// `LayerNotFound`, `DimensionMismatch`, `UnableToCompute`), which get a
    /// JSON body; `false` for everything genuinely unexpected (I/O, encoder,
    /// config faults), which get a bodyless 500.
    fn is_domain_fault(&self) -> bool {
        matches!(
            self,
            Error::Pipeline {
                source: gt_operators::Error::BadRequest { .. }
                    | gt_operators::Error::UnsupportedCrs { .. }
                    | gt_operators::Error::LayerNotFound { .. }
                    | gt_operators::Error::DimensionMismatch { .. }
                    | gt_operators::Error::UnableToCompute,
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unable_to_compute_renders_its_message() {
        let error: Error = gt_operators::Error::UnableToCompute.into();
        let response = error.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
