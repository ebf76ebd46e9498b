use thiserror::Error;

/// Failure taxonomy for every call that goes through the envelope client.
///
/// `Business` means the server understood the request and rejected it
/// (envelope `code != 0`). `Transport` means no valid response was obtained:
/// non-2xx status, timeout, network failure, or an undecodable body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{msg}")]
    Business { code: i64, msg: String },
    #[error("{msg}")]
    Transport { msg: String },
}

impl ApiError {
    pub fn message(&self) -> &str {
        match self {
            ApiError::Business { msg, .. } => msg,
            ApiError::Transport { msg } => msg,
        }
    }

    pub fn is_business(&self) -> bool {
        matches!(self, ApiError::Business { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_displayed() {
        let err = ApiError::Business { code: 5, msg: "bad".into() };
        assert_eq!(err.to_string(), "bad");
        assert!(err.is_business());

        let err = ApiError::Transport { msg: "network connection failed".into() };
        assert_eq!(err.message(), "network connection failed");
        assert!(!err.is_business());
    }
}
