use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<LunarError> for AppError {
    fn from(err: LunarError) -> Self {
        Self::bad_gateway(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Failure of a remote lunar lookup, either month batch or day detail.
#[derive(Debug, Error)]
pub enum LunarError {
    #[error("lunar request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("lunar service answered with status {0}")]
    Status(u16),
    #[error("lunar response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("lunar response carried no data")]
    MissingData,
    #[error("lunar request timed out")]
    Timeout,
}
