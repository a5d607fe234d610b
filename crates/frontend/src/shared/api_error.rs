//! Error taxonomy for backend communication.

use thiserror::Error;

/// Error of a dashboard API request.
///
/// `Http` keeps the status code so callers can dispatch on it — a 404 from a
/// specialized endpoint switches the client to the combined fallback endpoint,
/// everything else is a genuine failure and propagates unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("сетевая ошибка: {0}")]
    Network(String),
    #[error("не удалось разобрать ответ: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for responses that mean "this endpoint/resource does not exist".
    /// Some proxies rewrite the status code but keep the body text, so the
    /// message is checked as well.
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::Http { status: 404, .. } => true,
            ApiError::Http { message, .. } => message.contains("Not Found"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_by_status() {
        let err = ApiError::Http {
            status: 404,
            message: "no such route".into(),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn not_found_by_body_text() {
        let err = ApiError::Http {
            status: 500,
            message: "Not Found".into(),
        };
        assert!(err.is_not_found());
    }

    #[test]
    fn server_error_is_not_fallback() {
        let err = ApiError::Http {
            status: 502,
            message: "bad gateway".into(),
        };
        assert!(!err.is_not_found());
        assert!(!ApiError::Network("timeout".into()).is_not_found());
    }
}
