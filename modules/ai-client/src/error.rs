use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeminiError>;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Empty response: no candidate text returned")]
    EmptyResponse,
}

impl GeminiError {
    /// Auth and quota failures warrant rotating to the next API key
    /// before the caller retries.
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            GeminiError::Api {
                status: 401 | 403 | 429,
                ..
            }
        )
    }
}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        GeminiError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_and_auth_errors_are_credential_errors() {
        for status in [401, 403, 429] {
            let err = GeminiError::Api {
                status,
                message: String::new(),
            };
            assert!(err.is_credential_error(), "status {status}");
        }
    }

    #[test]
    fn server_errors_are_not_credential_errors() {
        let err = GeminiError::Api {
            status: 500,
            message: String::new(),
        };
        assert!(!err.is_credential_error());
        assert!(!GeminiError::Network("reset".into()).is_credential_error());
    }
}
