use std::borrow::Cow;

use http::Method;
use oauth1_request::signature_method::SignatureMethod;
use oauth1_request::signer::Signer as OAuthSigner;
use oauth1_request::{HmacSha1, Options};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::{
    SecretsProvider, SignError, SignResult, OAUTH_CALLBACK_KEY, OAUTH_KEY_PREFIX,
    OAUTH_NONCE_KEY, OAUTH_TIMESTAMP_KEY, OAUTH_VERIFIER_KEY, OAUTH_VERSION_KEY, REALM_KEY,
};

/// Everything but the RFC 3986 unreserved characters.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

#[derive(Debug, Clone)]
pub struct Signer<'a, TSecretsProvider, TSignatureMethod>
where
    TSecretsProvider: SecretsProvider,
    TSignatureMethod: SignatureMethod + Clone,
{
    secrets: &'a TSecretsProvider,
    parameters: OAuthParameters<'a, TSignatureMethod>,
}

impl<'a, TSecretsProvider, TSignatureMethod> Signer<'a, TSecretsProvider, TSignatureMethod>
where
    TSecretsProvider: SecretsProvider,
    TSignatureMethod: SignatureMethod + Clone,
{
    pub fn new(
        secrets: &'a TSecretsProvider,
        parameters: OAuthParameters<'a, TSignatureMethod>,
    ) -> Self {
        Signer {
            secrets,
            parameters,
        }
    }

    /// Take over an `oauth_*` pair found among the request parameters.
    pub fn absorb(self, key: &str, value: &str) -> SignResult<Self> {
        Ok(Signer {
            secrets: self.secrets,
            parameters: self.parameters.absorb(key, value)?,
        })
    }

    /// Build the `Authorization` header value for a request.
    ///
    /// `url` must not carry a query; its parameters, together with any
    /// form-encoded body parameters, are passed in `parameters`. None of them
    /// may start with `oauth_`, those belong in [`OAuthParameters`].
    pub fn generate_signature(
        self,
        method: &Method,
        url: Url,
        parameters: &[(String, String)],
    ) -> String {
        let (consumer_key, consumer_secret) = self.secrets.get_consumer_key_pair();
        let (token, token_secret) = self.secrets.get_token_option_pair();
        let options = self.parameters.build_options(token);

        // the base string orders by encoded key, then encoded value; the
        // underlying signer encodes values itself but writes keys verbatim
        let mut sorted: Vec<(String, String, &str)> = parameters
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v), v.as_str()))
            .collect();
        sorted.sort();
        // oauth_* parameters are emitted between the keys sorting before and after them
        let split = sorted.partition_point(|(k, _, _)| k.as_str() < OAUTH_KEY_PREFIX);
        let (before_oauth, after_oauth) = sorted.split_at(split);

        let mut signer = OAuthSigner::with_signature_method(
            self.parameters.signature_method.clone(),
            method.as_str(),
            url,
            consumer_secret,
            token_secret,
        );
        for (key, _, value) in before_oauth {
            signer.parameter(key, value);
        }
        let mut signer = signer.oauth_parameters(consumer_key, &options);
        for (key, _, value) in after_oauth {
            signer.parameter(key, value);
        }
        let sign = signer.finish().authorization;

        match self.parameters.realm {
            Some(ref realm) => format!("{},{}=\"{}\"", sign, REALM_KEY, realm),
            None => sign,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OAuthParameters<'a, TSignatureMethod>
where
    TSignatureMethod: SignatureMethod + Clone,
{
    callback: Option<Cow<'a, str>>,
    nonce: Option<Cow<'a, str>>,
    realm: Option<Cow<'a, str>>,
    signature_method: TSignatureMethod,
    timestamp: Option<u64>,
    verifier: Option<Cow<'a, str>>,
    version: bool,
}

impl Default for OAuthParameters<'static, HmacSha1> {
    fn default() -> Self {
        OAuthParameters {
            callback: None,
            nonce: None,
            realm: None,
            signature_method: HmacSha1,
            timestamp: None,
            verifier: None,
            version: false,
        }
    }
}

impl<'a> OAuthParameters<'a, HmacSha1> {
    pub fn new() -> Self {
        Default::default()
    }
}

impl<'a, T> OAuthParameters<'a, T>
where
    T: SignatureMethod + Clone,
{
    pub fn callback<C>(self, callback: C) -> Self
    where
        C: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            callback: Some(callback.into()),
            ..self
        }
    }

    /// set the oauth_nonce value
    pub fn nonce<N>(self, nonce: N) -> Self
    where
        N: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            nonce: Some(nonce.into()),
            ..self
        }
    }

    /// set the realm value
    pub fn realm<R>(self, realm: R) -> Self
    where
        R: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            realm: Some(realm.into()),
            ..self
        }
    }

    /// set the oauth_timestamp value
    pub fn timestamp<S>(self, timestamp: S) -> Self
    where
        S: Into<u64>,
    {
        OAuthParameters {
            timestamp: Some(timestamp.into()),
            ..self
        }
    }

    /// set the oauth_verifier value
    pub fn verifier<V>(self, verifier: V) -> Self
    where
        V: Into<Cow<'a, str>>,
    {
        OAuthParameters {
            verifier: Some(verifier.into()),
            ..self
        }
    }

    /// set the oauth_version value (boolean)
    ///
    /// # Note
    /// When the version has value `true`, oauth_version will be set with "1.0".
    /// Otherwise, oauth_version will not be included in your request.
    /// In oauth1, oauth_version value must be "1.0" or not specified.
    pub fn version<V>(self, version: V) -> Self
    where
        V: Into<bool>,
    {
        OAuthParameters {
            version: version.into(),
            ..self
        }
    }

    pub fn signature_method<TSignatureMethod>(
        self,
        signature_method: TSignatureMethod,
    ) -> OAuthParameters<'a, TSignatureMethod>
    where
        TSignatureMethod: SignatureMethod + Clone,
    {
        OAuthParameters {
            signature_method,
            callback: self.callback,
            nonce: self.nonce,
            realm: self.realm,
            timestamp: self.timestamp,
            verifier: self.verifier,
            version: self.version,
        }
    }

    /// Set the field named by an `oauth_*` request parameter.
    pub fn absorb(self, key: &str, value: &str) -> SignResult<Self> {
        let value = value.to_string();
        match key {
            OAUTH_CALLBACK_KEY => Ok(self.callback(value)),
            OAUTH_NONCE_KEY => Ok(self.nonce(value)),
            OAUTH_VERIFIER_KEY => Ok(self.verifier(value)),
            OAUTH_TIMESTAMP_KEY => match value.parse::<u64>() {
                Ok(timestamp) => Ok(self.timestamp(timestamp)),
                Err(_) => Err(SignError::InvalidTimestamp(value)),
            },
            OAUTH_VERSION_KEY => match value.as_str() {
                "1.0" => Ok(self.version(true)),
                "" => Ok(self.version(false)),
                _ => Err(SignError::InvalidVersion(value)),
            },
            _ => Err(SignError::UnknownParameter(key.to_string())),
        }
    }

    fn build_options(&'a self, token: Option<&'a str>) -> Options<'a> {
        let mut opt = Options::new();

        if let Some(ref callback) = self.callback {
            opt.callback(callback.as_ref());
        }
        if let Some(ref nonce) = self.nonce {
            opt.nonce(nonce.as_ref());
        }
        if let Some(timestamp) = self.timestamp {
            opt.timestamp(timestamp);
        }
        if let Some(token) = token {
            opt.token(token);
        }
        if let Some(ref verifier) = self.verifier {
            opt.verifier(verifier.as_ref());
        }
        opt.version(self.version);

        opt
    }
}

/// True for keys the signer must take as OAuth protocol parameters.
pub(crate) fn is_oauth_key(key: &str) -> bool {
    key.starts_with(OAUTH_KEY_PREFIX)
}
