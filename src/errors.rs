use axum::http::StatusCode;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input rejected before any request was made.
    Validation,
    /// The backend has no staff member for the code.
    LookupMiss,
    /// Any other refusal the backend explained with a message.
    Rejected,
    Auth,
    Network,
    Internal,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn lookup_miss(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LookupMiss, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Rejected, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    pub fn network(err: impl std::error::Error) -> Self {
        Self::new(ErrorKind::Network, err.to_string())
    }

    pub fn network_message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self::new(ErrorKind::Internal, err.to_string())
    }

    /// Inline errors belong to a form; the rest surface as toasts.
    pub fn is_inline(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Validation | ErrorKind::LookupMiss | ErrorKind::Rejected
        )
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::LookupMiss => StatusCode::NOT_FOUND,
            ErrorKind::Rejected => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Auth => StatusCode::UNAUTHORIZED,
            ErrorKind::Network => StatusCode::BAD_GATEWAY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::internal(err);
        }
        Self::network(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = axum::Json(serde_json::json!({ "error": self.message }));
        (self.status(), body).into_response()
    }
}
