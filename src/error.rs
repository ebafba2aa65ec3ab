use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API rate limit exceeded! Wait a few minutes, and try again.")]
    RateLimited,

    #[error("API key was unauthorized (probably expired)")]
    Unauthorized,

    #[error("API error: status {status}")]
    Api { status: u16 },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON parsing error: {0}")]
    Json(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("fetching match details failed after saving {saved} matches")]
    PartialFetch {
        saved: usize,
        #[source]
        source: Box<AppError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Map a non-2xx status code to the error the caller sees.
    /// `what` names the requested resource for the not-found message.
    pub fn from_status(status: u16, what: &str) -> Self {
        match status {
            403 => AppError::Unauthorized,
            404 => AppError::NotFound(what.to_string()),
            429 => AppError::RateLimited,
            _ => AppError::Api { status },
        }
    }
}
