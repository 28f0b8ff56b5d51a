use crate::backend::BackendError;
use axum::http::StatusCode;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Sign in to continue".to_string(),
        }
    }

    /// A backend failure that takes the whole response down, reported with a
    /// fixed message for the widget that asked.
    pub fn backend(message: impl Into<String>, err: BackendError) -> Self {
        tracing::warn!("backend error: {err}");
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
