use std::{env, fmt, str::FromStr, time::Duration};

use url::Url;

use crate::{ConfigError, Result};

/// Production API root; every endpoint is resolved against it.
pub const DEFAULT_BASE_URL: &str = "https://mobilevikings.com:443/api/2.0/oauth/";
/// Realm the API names in its `WWW-Authenticate` challenges.
pub const DEFAULT_REALM: &str = "Mobile Vikings";

pub const BASE_URL_ENV: &str = "MVOAUTHAPI_BASE_URL";
pub const FORMAT_ENV: &str = "MVOAUTHAPI_FORMAT";
pub const TIMEOUT_ENV: &str = "MVOAUTHAPI_TIMEOUT_SECS";

const REQUEST_TOKEN_PATH: &str = "request_token/";
const AUTHORIZE_PATH: &str = "authorize/";
const ACCESS_TOKEN_PATH: &str = "access_token/";

/// Output format requested from the API, used as the method path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
    Yaml,
    Pickle,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Yaml => "yaml",
            Format::Pickle => "pickle",
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::Json
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            "yaml" => Ok(Format::Yaml),
            "pickle" => Ok(Format::Pickle),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Where the API lives and how the client talks to it.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: Url,
    format: Format,
    realm: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            format: Format::default(),
            realm: DEFAULT_REALM.to_string(),
            timeout: None,
            user_agent: None,
        }
    }
}

impl ApiConfig {
    pub fn new() -> Self {
        Default::default()
    }

    /// Defaults overridden by `MVOAUTHAPI_BASE_URL`, `MVOAUTHAPI_FORMAT`
    /// and `MVOAUTHAPI_TIMEOUT_SECS` when they are set.
    pub fn from_env() -> Result<Self> {
        let mut config = ApiConfig::default();
        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            config = config.base_url(&base_url)?;
        }
        if let Ok(format) = env::var(FORMAT_ENV) {
            config = config.format(format.parse()?);
        }
        if let Ok(timeout) = env::var(TIMEOUT_ENV) {
            let secs = timeout
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(TIMEOUT_ENV, timeout.clone()))?;
            config = config.timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Point the client at another API root. A missing trailing slash is added.
    pub fn base_url(mut self, base_url: &str) -> Result<Self> {
        let mut url =
            Url::parse(base_url).map_err(|e| ConfigError::BaseUrl(base_url.to_string(), e))?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::CannotBeABase(base_url.to_string()).into());
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        Ok(self)
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn realm<R: Into<String>>(mut self, realm: R) -> Self {
        self.realm = realm.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent<U: Into<String>>(mut self, user_agent: U) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn get_base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn get_format(&self) -> Format {
        self.format
    }

    pub fn get_realm(&self) -> &str {
        &self.realm
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn get_user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn request_token_url(&self) -> Result<Url> {
        Ok(self.base_url.join(REQUEST_TOKEN_PATH)?)
    }

    pub fn authorize_url(&self) -> Result<Url> {
        Ok(self.base_url.join(AUTHORIZE_PATH)?)
    }

    pub fn access_token_url(&self) -> Result<Url> {
        Ok(self.base_url.join(ACCESS_TOKEN_PATH)?)
    }

    /// URL of an API method, e.g. `sim_balance` → `.../sim_balance.json`.
    pub fn method_url(&self, path: &str, format: Option<Format>) -> Result<Url> {
        let format = format.unwrap_or(self.format);
        let path = path.trim_start_matches('/');
        Ok(self.base_url.join(&format!("{}.{}", path, format))?)
    }

    /// The HTTP client these settings call for.
    pub(crate) fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(ref user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn default_endpoints() {
        let config = ApiConfig::default();
        assert_eq!(
            config.request_token_url().unwrap().as_str(),
            "https://mobilevikings.com/api/2.0/oauth/request_token/"
        );
        assert_eq!(
            config.authorize_url().unwrap().as_str(),
            "https://mobilevikings.com/api/2.0/oauth/authorize/"
        );
        assert_eq!(
            config.access_token_url().unwrap().as_str(),
            "https://mobilevikings.com/api/2.0/oauth/access_token/"
        );
        assert_eq!(config.get_realm(), DEFAULT_REALM);
    }

    #[test]
    fn method_url_uses_format() {
        let config = ApiConfig::default();
        assert_eq!(
            config.method_url("sim_balance", None).unwrap().as_str(),
            "https://mobilevikings.com/api/2.0/oauth/sim_balance.json"
        );
        assert_eq!(
            config
                .method_url("/top_up_history", Some(Format::Xml))
                .unwrap()
                .as_str(),
            "https://mobilevikings.com/api/2.0/oauth/top_up_history.xml"
        );
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = ApiConfig::new()
            .base_url("http://127.0.0.1:8080/api/2.0/oauth")
            .unwrap();
        assert_eq!(
            config.method_url("msisdn_list", None).unwrap().as_str(),
            "http://127.0.0.1:8080/api/2.0/oauth/msisdn_list.json"
        );
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(matches!(
            ApiConfig::new().base_url("not a url"),
            Err(Error::Config(ConfigError::BaseUrl(_, _)))
        ));
        assert!(matches!(
            ApiConfig::new().base_url("mailto:info@mobilevikings.com"),
            Err(Error::Config(ConfigError::CannotBeABase(_)))
        ));
    }

    #[test]
    fn parse_format() {
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("pickle".parse::<Format>().unwrap(), Format::Pickle);
        assert!(matches!(
            "csv".parse::<Format>(),
            Err(ConfigError::UnknownFormat(_))
        ));
    }
}
