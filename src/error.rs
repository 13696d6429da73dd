use thiserror::Error;

/// Failure of a whole fetch. Any of these yields an empty list from
/// [`crate::fetcher::CatalogFetcher::fetch_ranking`].
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("upstream returned an empty body")]
    EmptyBody,
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("payload has no `{0}` array")]
    MissingResults(&'static str),
}

impl FetchError {
    /// True for connection, status and empty-body failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Status(_) | FetchError::EmptyBody)
    }

    /// True when the body arrived but could not be read as a ranking payload.
    pub fn is_malformed_payload(&self) -> bool {
        matches!(self, FetchError::MalformedPayload(_) | FetchError::MissingResults(_))
    }
}

/// Why a single `results` element was skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    #[error("element is not an object")]
    NotAnObject,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` has wrong type, expected {expected}")]
    WrongType { field: &'static str, expected: &'static str },
    #[error("field `original_title` is empty")]
    EmptyTitle,
    #[error("unparseable release date `{value}`")]
    InvalidDate { value: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no API credential configured (set CINEGRID_API_KEY or `api_key` in the config file)")]
    MissingCredential,
    #[error("failed to read config {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
    #[error("invalid base url `{value}`: {source}")]
    InvalidBaseUrl { value: String, source: url::ParseError },
    #[error("invalid {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}
