use thiserror::Error;

/// How a single request failed. Never raised into rendering code: every
/// remote call hands one of these back as a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("server rejected request ({status}): {message}")]
    ServerRejected { status: u16, message: String },

    #[error("could not decode response: {0}")]
    DecodeFailed(String),
}

impl HttpError {
    pub fn kind(&self) -> String {
        match self {
            HttpError::NetworkUnavailable(_) => "network".to_string(),
            HttpError::ServerRejected { status, .. } => format!("status:{status}"),
            HttpError::DecodeFailed(_) => "decode".to_string(),
        }
    }

    /// The text a notification should show.
    pub fn user_message(&self) -> String {
        match self {
            HttpError::ServerRejected { message, .. } => message.clone(),
            HttpError::NetworkUnavailable(_) => "Could not reach the server.".to_string(),
            HttpError::DecodeFailed(_) => "The server sent an unexpected response.".to_string(),
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            HttpError::DecodeFailed(err.to_string())
        } else {
            HttpError::NetworkUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::DecodeFailed(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("No club selected.")]
    NoClubSelected,

    #[error("No fiscal year selected.")]
    NoFiscalYearSelected,

    #[error("{0} not found.")]
    NotFound(String),

    #[error("{0}")]
    Invalid(String),
}

impl DashboardError {
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Http(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;
