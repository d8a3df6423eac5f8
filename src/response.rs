use reqwest::{header::HeaderMap, header::WWW_AUTHENTICATE, Response, StatusCode};
use tracing::warn;

use crate::www_authenticate::parse_www_authenticate;
use crate::{ApiErrorKind, Error, Result};

const OAUTH_SCHEME: &str = "OAuth";

/// Status, headers and body text of an API call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub content: String,
}

impl ApiResponse {
    pub(crate) async fn read(response: Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let content = response.text().await?;
        Ok(ApiResponse {
            status,
            headers,
            content,
        })
    }

    /// Turn any non-2xx status into [`Error::Status`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(Error::Status {
                status: self.status,
                body: self.content,
            })
        }
    }

    pub(crate) fn into_error(self, kind: ApiErrorKind) -> Error {
        Error::Api {
            kind,
            status: self.status,
            body: self.content,
        }
    }

    /// Fail with the matching [`ApiErrorKind`] if the API reported one.
    pub(crate) fn detect_errors(self, realm: &str) -> Result<Self> {
        match classify(self.status, &self.headers, &self.content, realm) {
            Some(kind) => {
                warn!(status = %self.status, %kind, "api reported an error");
                Err(self.into_error(kind))
            }
            None => Ok(self),
        }
    }
}

fn classify(
    status: StatusCode,
    headers: &HeaderMap,
    content: &str,
    realm: &str,
) -> Option<ApiErrorKind> {
    match status {
        StatusCode::BAD_REQUEST => {
            let lower = content.to_lowercase();
            if lower.contains("invalid consumer") {
                Some(ApiErrorKind::InvalidConsumer)
            } else if lower.contains("invalid request token") {
                Some(ApiErrorKind::RequestTokenExpired)
            } else if lower.contains("could not verify") {
                Some(ApiErrorKind::AccessDenied)
            } else if lower.contains("invalid oauth verifier") {
                Some(ApiErrorKind::InvalidVerifier)
            } else {
                None
            }
        }
        StatusCode::UNAUTHORIZED => {
            let challenge = headers.get(WWW_AUTHENTICATE)?.to_str().ok()?;
            let (scheme, params) = parse_www_authenticate(challenge);
            if scheme == OAUTH_SCHEME && params.get("realm").map(String::as_str) == Some(realm) {
                Some(ApiErrorKind::AccessTokenExpired)
            } else {
                None
            }
        }
        _ => None,
    }
}
