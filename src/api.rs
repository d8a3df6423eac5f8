//! The Mobile Vikings API client.

use std::time::{SystemTime, UNIX_EPOCH};

use http::{header::CONTENT_TYPE, HeaderMap, Method};
use rand::{distr::Alphanumeric, Rng};
use reqwest::Response;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::config::{ApiConfig, Format};
use crate::response::ApiResponse;
use crate::token_reader::read_oauth_token;
use crate::{
    ApiErrorKind, Consumer, Error, OAuthClientProvider, OAuthParameters, Result, Secrets, Token,
    OAUTH_CONSUMER_KEY, OAUTH_NONCE_KEY, OAUTH_TIMESTAMP_KEY, OAUTH_TOKEN_KEY, OAUTH_VERIFIER_KEY,
    OAUTH_VERSION_KEY,
};

/// Callback telling the provider to show the verifier to the user instead of redirecting.
pub const OOB_CALLBACK: &str = "oob";

/// Arguments for methods that take none.
pub const NO_ARGS: &[(&str, &str)] = &[];

const NONCE_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveToken {
    None,
    Request,
    Access,
}

/// OAuth client for the Mobile Vikings API.
///
/// Acquiring an access token takes three steps: fetch a request token, send
/// the user to the authorization URL, then exchange the verified request
/// token for an access token.
///
/// ```no_run
/// # async fn run() -> mvoauthapi::Result<()> {
/// use mvoauthapi::{ApiClient, NO_ARGS};
///
/// let mut api = ApiClient::new("consumer-key", "consumer-secret")?;
/// api.fetch_request_token(Some("http://my-app.com/access_granted")).await?;
/// let url = api.make_authorization_url()?;
/// // redirect the user to `url`, read `oauth_verifier` from the callback
/// api.set_request_verifier("verifier")?;
/// let access_token = api.fetch_access_token().await?;
///
/// let balance = api.get("sim_balance", NO_ARGS).await?;
/// # Ok(())
/// # }
/// ```
///
/// An access token stays valid until the user revokes it, so it can be
/// stored and handed to a new client with [`ApiClient::set_access_token`],
/// skipping the handshake.
#[derive(Debug, Clone)]
pub struct ApiClient {
    consumer: Consumer,
    request_token: Option<Token>,
    access_token: Option<Token>,
    active: ActiveToken,
    config: ApiConfig,
    http: reqwest::Client,
}

impl ApiClient {
    /// A client for the production API.
    pub fn new<K, S>(consumer_key: K, consumer_secret: S) -> Result<Self>
    where
        K: Into<String>,
        S: Into<String>,
    {
        ApiClient::with_config(Consumer::new(consumer_key, consumer_secret), ApiConfig::default())
    }

    pub fn with_config(consumer: Consumer, config: ApiConfig) -> Result<Self> {
        let http = config.http_client()?;
        Ok(ApiClient::with_http_client(consumer, config, http))
    }

    /// Use a preconfigured `reqwest::Client`. Timeout and user agent from
    /// `config` are not applied to it.
    pub fn with_http_client(consumer: Consumer, config: ApiConfig, http: reqwest::Client) -> Self {
        ApiClient {
            consumer,
            request_token: None,
            access_token: None,
            active: ActiveToken::None,
            config,
            http,
        }
    }

    pub fn consumer(&self) -> &Consumer {
        &self.consumer
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn request_token(&self) -> Option<&Token> {
        self.request_token.as_ref()
    }

    pub fn access_token(&self) -> Option<&Token> {
        self.access_token.as_ref()
    }

    /// Fetch a request token and make it the active one.
    ///
    /// `callback` is where the user is sent once access is granted; `None`
    /// asks the API to display the verifier instead.
    pub async fn fetch_request_token(&mut self, callback: Option<&str>) -> Result<Token> {
        let url = self.config.request_token_url()?;
        let params = OAuthParameters::new().callback(callback.unwrap_or(OOB_CALLBACK));
        let secrets = Secrets::borrowed(&self.consumer, None);
        let response = self
            .http
            .clone()
            .oauth1_with_params(&secrets, params)
            .get(url)
            .send()
            .await?;
        let token = read_token(self.complete(response).await?)?;
        info!("obtained request token");
        self.set_request_token(token.clone());
        Ok(token)
    }

    /// Make the client use the given request token for its calls.
    pub fn set_request_token(&mut self, token: Token) {
        self.request_token = Some(token);
        self.active = ActiveToken::Request;
    }

    /// The page on which the user grants this application access.
    ///
    /// The URL carries the consumer key and request token but no signature;
    /// it is meant for a browser redirect.
    pub fn make_authorization_url(&self) -> Result<Url> {
        let token = self
            .request_token
            .as_ref()
            .ok_or(Error::MissingRequestToken)?;
        let mut url = self.config.authorize_url()?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair(OAUTH_CONSUMER_KEY, &self.consumer.key)
                .append_pair(OAUTH_NONCE_KEY, &generate_nonce())
                .append_pair(OAUTH_TIMESTAMP_KEY, &unix_timestamp().to_string())
                .append_pair(OAUTH_TOKEN_KEY, &token.key);
            if let Some(ref verifier) = token.verifier {
                query.append_pair(OAUTH_VERIFIER_KEY, verifier);
            }
            query.append_pair(OAUTH_VERSION_KEY, "1.0");
        }
        Ok(url)
    }

    /// Set the verifier on the request token and make that token active.
    pub fn set_request_verifier<V: Into<String>>(&mut self, verifier: V) -> Result<()> {
        self.request_token
            .as_mut()
            .ok_or(Error::MissingRequestToken)?
            .set_verifier(verifier);
        self.active = ActiveToken::Request;
        Ok(())
    }

    /// Exchange the verified request token for an access token and make the
    /// latter the active one.
    pub async fn fetch_access_token(&mut self) -> Result<Token> {
        let request_token = self
            .request_token
            .as_ref()
            .ok_or(Error::MissingRequestToken)?;
        let url = self.config.access_token_url()?;
        let mut params = OAuthParameters::new();
        if let Some(ref verifier) = request_token.verifier {
            params = params.verifier(verifier.as_str());
        }
        let secrets = Secrets::borrowed(&self.consumer, Some(request_token));
        let response = self
            .http
            .clone()
            .oauth1_with_params(&secrets, params)
            .get(url)
            .send()
            .await?;
        let token = read_token(self.complete(response).await?)?;
        info!("obtained access token");
        self.set_access_token(token.clone());
        Ok(token)
    }

    /// Make the client use the given access token for its calls.
    pub fn set_access_token(&mut self, token: Token) {
        self.access_token = Some(token);
        self.active = ActiveToken::Access;
    }

    /// Call an API method, e.g. `sim_balance`.
    ///
    /// `args` become the query string. A non-empty `body` is sent form
    /// encoded, and signed, unless `headers` name another content type.
    /// `format` overrides the configured output format.
    ///
    /// Requests are signed with the token set most recently; API methods
    /// only succeed once that is an access token.
    pub async fn call<A>(
        &self,
        method: Method,
        path: &str,
        args: &A,
        body: &str,
        headers: HeaderMap,
        format: Option<Format>,
    ) -> Result<ApiResponse>
    where
        A: Serialize + ?Sized,
    {
        let url = self.config.method_url(path, format)?;
        debug!(%method, path, "calling api method");
        let form_body = match headers.get(CONTENT_TYPE) {
            None => true,
            Some(value) => value
                .to_str()
                .map(|v| v.starts_with("application/x-www-form-urlencoded"))
                .unwrap_or(false),
        };
        let secrets = Secrets::borrowed(&self.consumer, self.active_token());
        let mut request = self
            .http
            .clone()
            .oauth1(&secrets)
            .request(method, url)
            .query(args)
            .headers(headers);
        if !body.is_empty() {
            request = if form_body {
                request.form_encoded(body)
            } else {
                request.body(body.to_string())
            };
        }
        let response = request.send().await?;
        self.complete(response).await
    }

    /// Shortcut for [`ApiClient::call`] with `GET`.
    pub async fn get<A>(&self, path: &str, args: &A) -> Result<ApiResponse>
    where
        A: Serialize + ?Sized,
    {
        self.call(Method::GET, path, args, "", HeaderMap::new(), None)
            .await
    }

    /// Shortcut for [`ApiClient::call`] with `POST`.
    pub async fn post<A>(&self, path: &str, args: &A, body: &str) -> Result<ApiResponse>
    where
        A: Serialize + ?Sized,
    {
        self.call(Method::POST, path, args, body, HeaderMap::new(), None)
            .await
    }

    fn active_token(&self) -> Option<&Token> {
        match self.active {
            ActiveToken::None => None,
            ActiveToken::Request => self.request_token.as_ref(),
            ActiveToken::Access => self.access_token.as_ref(),
        }
    }

    async fn complete(&self, response: Response) -> Result<ApiResponse> {
        ApiResponse::read(response)
            .await?
            .detect_errors(self.config.get_realm())
    }
}

fn read_token(response: ApiResponse) -> Result<Token> {
    match read_oauth_token(response.content.clone()) {
        Ok(token) => Ok(token.into_token()),
        Err(_) => Err(response.into_error(ApiErrorKind::ApiServerError)),
    }
}

fn generate_nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
