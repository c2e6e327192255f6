//! REST error mapping
//!
//! Every failure leaves the boundary in the same body shape as a failed
//! capability response: `{success: false, error, error_kind}`.

use crate::response::log_failure;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use incidentx_core::{Capability, Error, ErrorKind};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub error_kind: ErrorKind,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, error_kind: ErrorKind) -> Self {
        Self {
            success: false,
            error: error.into(),
            error_kind,
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Scoring | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A core error raised while serving one capability
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct ApiError {
    pub capability: Option<Capability>,
    #[source]
    pub source: Error,
}

impl ApiError {
    pub fn new(capability: Capability, source: Error) -> Self {
        Self {
            capability: Some(capability),
            source,
        }
    }
}

impl From<Error> for ApiError {
    fn from(source: Error) -> Self {
        Self {
            capability: None,
            source,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(self.source.kind())
    }

    fn error_response(&self) -> HttpResponse {
        match self.capability {
            Some(capability) => log_failure(capability, &self.source),
            None => tracing::warn!(
                status = self.status_code().as_u16(),
                message = %self.source,
                "API error"
            ),
        }
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.source.to_string(), self.source.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incidentx_core::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::from(ValidationError::InvalidThreshold(f64::NAN)), StatusCode::BAD_REQUEST),
            (Error::UnknownCapability("weather".into()), StatusCode::BAD_REQUEST),
            (Error::ModelUnavailable(Capability::Risk), StatusCode::SERVICE_UNAVAILABLE),
            (Error::CorpusUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (Error::Scoring("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::InternalConsistency { expected: 19, actual: 18 }, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }
}
