/// Error types surfaced by the session, fetch and configuration layers.
///
/// Translation itself never fails; dictionary loading swallows its own
/// problems into the [`LoadReport`](crate::report::LoadReport).
#[derive(Debug)]
pub enum Error {
    /// Filesystem error while reading configuration or writing a download
    Io(std::io::Error),
    /// HTTP failure while fetching a dictionary file
    Network(String),
    /// Download destination is not a plain relative path
    InvalidDestination(String),
    /// Language code other than `en` / `zh`
    UnknownLanguage(String),
    /// Invalid configuration value
    Config(String),
    /// A newer load request finished or started before this one completed
    Superseded(String),
    /// Background load task panicked or was cancelled
    Task(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::InvalidDestination(name) => {
                write!(f, "Invalid download destination: {}", name)
            }
            Error::UnknownLanguage(code) => write!(f, "Unknown language code: {}", code),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Superseded(code) => {
                write!(f, "Load of '{}' was superseded by a newer request", code)
            }
            Error::Task(msg) => write!(f, "Load task failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

/// Result type for fallible vietphrase operations
pub type Result<T> = std::result::Result<T, Error>;
