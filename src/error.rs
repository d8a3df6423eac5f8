use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;
pub type SignResult<T> = std::result::Result<T, SignError>;
pub type TokenReaderResult<T> = std::result::Result<T, TokenReaderError>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("token acquisition failed : {0}")]
    TokenReader(#[from] TokenReaderError),
    #[error("OAuth sign failed : {0}")]
    Signer(#[from] SignError),
    #[error("request failed : {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("invalid url : {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid header : {0}")]
    Http(#[from] http::Error),
    #[error("parameters could not be form-encoded : {0}")]
    Serialize(#[from] serde_urlencoded::ser::Error),
    #[error("invalid configuration : {0}")]
    Config(#[from] ConfigError),
    /// The API answered with a response recognized as a failure.
    #[error("{kind} (status {status}) : {body}")]
    Api {
        kind: ApiErrorKind,
        status: StatusCode,
        body: String,
    },
    /// Returned by `ApiResponse::error_for_status` for unclassified non-2xx responses.
    #[error("unexpected status {status} : {body}")]
    Status { status: StatusCode, body: String },
    #[error("no request token is set, fetch or set one first")]
    MissingRequestToken,
}

impl Error {
    /// The classified API failure, if this error is one.
    pub fn api_kind(&self) -> Option<ApiErrorKind> {
        match self {
            Error::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Failures the API reports through status code and body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    InvalidConsumer,
    RequestTokenExpired,
    AccessDenied,
    InvalidVerifier,
    AccessTokenExpired,
    /// The server answered a token request with something that is not a token.
    ApiServerError,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApiErrorKind::InvalidConsumer => "invalid consumer",
            ApiErrorKind::RequestTokenExpired => "request token expired",
            ApiErrorKind::AccessDenied => "access denied",
            ApiErrorKind::InvalidVerifier => "invalid verifier",
            ApiErrorKind::AccessTokenExpired => "access token expired",
            ApiErrorKind::ApiServerError => "api server error",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone)]
pub enum SignError {
    #[error("unknown oauth parameter : {0}")]
    UnknownParameter(String),
    #[error("invalid oauth_timestamp, must be u64, but {0} is not compatible.")]
    InvalidTimestamp(String),
    #[error("invalid oauth_version, must be 1.0 or just empty, but specified {0}.")]
    InvalidVersion(String),
}

#[derive(Error, Debug, Clone)]
pub enum TokenReaderError {
    #[error("response has malformed format: not found {0} in {1}")]
    TokenKeyNotFound(&'static str, String),
}

#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("{0} is not a valid base url : {1}")]
    BaseUrl(String, url::ParseError),
    #[error("base url {0} cannot carry a path")]
    CannotBeABase(String),
    #[error("unknown response format {0}, expected json, xml, yaml or pickle")]
    UnknownFormat(String),
    #[error("{0} must be a number of seconds, got {1}")]
    InvalidTimeout(&'static str, String),
}
