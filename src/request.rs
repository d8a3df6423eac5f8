// ----------------------------------------------------------------------------
// This source code contains derived artifacts from seanmonstar's `reqwest`.
// for further information(including license information),
// please visit their repository: https://github.com/seanmonstar/reqwest .
// ----------------------------------------------------------------------------
use std::{convert::TryFrom, time::Duration};

use http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use oauth1_request::signature_method::SignatureMethod;
use reqwest::{
    header::HeaderMap, header::HeaderName, header::HeaderValue, Body, Client as ReqwestClient,
    Request, Response, Url,
};
use serde::Serialize;
use tracing::debug;
use url::form_urlencoded;

use crate::signer::is_oauth_key;
use crate::{Error, Result, SecretsProvider, Signer};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Builds a request while keeping a copy of everything that takes part in
/// the OAuth signature: the URL with its query and the form body.
pub struct RequestBuilder<TSigner>
where
    TSigner: Clone,
{
    client: ReqwestClient,
    method: Method,
    url: Result<Url>,
    headers: HeaderMap,
    form: Option<String>,
    body: Option<Body>,
    timeout: Option<Duration>,
    signer: TSigner,
}

impl<'a, TSecretsProvider, TSignatureMethod>
    RequestBuilder<Signer<'a, TSecretsProvider, TSignatureMethod>>
where
    TSecretsProvider: SecretsProvider + Clone,
    TSignatureMethod: SignatureMethod + Clone,
{
    /// Constructs the signed Request and sends it to the target URL.
    ///
    /// # Errors
    ///
    /// This method fails if the request could not be built or signed, if
    /// there was an error while sending request, redirect loop was detected
    /// or redirect limit was exhausted.
    pub async fn send(self) -> Result<Response> {
        let (client, request) = self.prepare()?;
        debug!(method = %request.method(), url = %request.url(), "sending signed request");
        let response = client.execute(request).await?;
        debug!(status = %response.status(), "received response");
        Ok(response)
    }

    /// Build the request with its `Authorization` header without sending it.
    pub fn build(self) -> Result<Request> {
        self.prepare().map(|(_, request)| request)
    }

    fn prepare(self) -> Result<(ReqwestClient, Request)> {
        let mut url = self.url?;
        let mut signer = self.signer;
        let mut parameters = Vec::new();

        // oauth_* pairs move from the query into the Authorization header
        let mut query = Vec::new();
        for (key, value) in url.query_pairs().into_owned() {
            if is_oauth_key(&key) {
                signer = signer.absorb(&key, &value)?;
            } else {
                parameters.push((key.clone(), value.clone()));
                query.push((key, value));
            }
        }
        url.set_query(None);
        let base_url = url.clone();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(&query);
        }

        let form = match self.form {
            Some(ref raw) => {
                let mut body = form_urlencoded::Serializer::new(String::new());
                for (key, value) in form_urlencoded::parse(raw.as_bytes()).into_owned() {
                    if is_oauth_key(&key) {
                        signer = signer.absorb(&key, &value)?;
                    } else {
                        body.append_pair(&key, &value);
                        parameters.push((key, value));
                    }
                }
                Some(body.finish())
            }
            None => None,
        };

        let authorization = signer.generate_signature(&self.method, base_url, &parameters);

        let mut builder = self
            .client
            .request(self.method, url)
            .headers(self.headers.clone())
            .header(AUTHORIZATION, authorization);
        if let Some(form) = form {
            if !self.headers.contains_key(CONTENT_TYPE) {
                builder = builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE);
            }
            builder = builder.body(form);
        } else if let Some(body) = self.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let request = builder.build()?;
        Ok((self.client, request))
    }
}

impl<TSigner> RequestBuilder<TSigner>
where
    TSigner: Clone,
{
    pub(crate) fn new(
        client: ReqwestClient,
        method: Method,
        url: reqwest::Result<Url>,
        signer: TSigner,
    ) -> Self {
        RequestBuilder {
            client,
            method,
            url: url.map_err(Error::from),
            headers: HeaderMap::new(),
            form: None,
            body: None,
            timeout: None,
            signer,
        }
    }

    /// Modify the query string of the URL.
    ///
    /// Modifies the URL of this request, adding the parameters provided.
    /// This method appends and does not overwrite. This means that it can
    /// be called multiple times and that existing query parameters are not
    /// overwritten if the same key is used. The key will simply show up
    /// twice in the query string.
    /// Calling `.query(&[("foo", "a"), ("foo", "b")])` gives `"foo=a&foo=b"`.
    ///
    /// `oauth_*` keys are not sent in the query, they configure the signature
    /// instead.
    ///
    /// # Errors
    /// The request fails to build if the object you provide cannot be
    /// serialized into a query string.
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        if let Ok(ref mut url) = self.url {
            let result = {
                let mut pairs = url.query_pairs_mut();
                let serializer = serde_urlencoded::Serializer::new(&mut pairs);
                query.serialize(serializer).map(|_| ())
            };
            if let Some("") = url.query() {
                url.set_query(None);
            }
            if let Err(err) = result {
                self.url = Err(err.into());
            }
        }
        self
    }

    /// Send a form body. Its parameters take part in the signature.
    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Self {
        match serde_urlencoded::to_string(form) {
            Ok(body) => self.form_encoded(body),
            Err(err) => {
                self.url = Err(err.into());
                self
            }
        }
    }

    /// Send an already form-encoded body. Its parameters take part in the signature.
    pub fn form_encoded<B: Into<String>>(mut self, body: B) -> Self {
        self.form = Some(body.into());
        self.body = None;
        self
    }

    /// Add a `Header` to this Request.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        let header: std::result::Result<(HeaderName, HeaderValue), http::Error> =
            HeaderName::try_from(key)
                .map_err(Into::into)
                .and_then(|k| {
                    HeaderValue::try_from(value)
                        .map(|v| (k, v))
                        .map_err(Into::into)
                });
        match header {
            Ok((key, value)) => {
                self.headers.append(key, value);
            }
            Err(err) => self.url = Err(Error::Http(err)),
        }
        self
    }

    /// Add a set of Headers to the existing ones on this Request.
    ///
    /// The headers will be merged in to any already set.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set a raw request body. It is sent as is and not signed.
    pub fn body<T: Into<Body>>(mut self, body: T) -> Self {
        self.body = Some(body.into());
        self.form = None;
        self
    }

    /// Enables a request timeout.
    ///
    /// The timeout is applied from the when the request starts connecting
    /// until the response body has finished. It affects only this request
    /// and overrides the timeout configured using `ClientBuilder::timeout()`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use http::header::{AUTHORIZATION, CONTENT_TYPE};

    use crate::{Error, OAuthClientProvider, OAuthParameters, Secrets, SignError};

    fn extract_signature(auth_header: &str) -> String {
        extract_param(auth_header, "oauth_signature").unwrap()
    }

    fn extract_param(auth_header: &str, name: &str) -> Option<String> {
        let content = auth_header.strip_prefix("OAuth ").unwrap();
        content
            .split(',')
            .map(|item| item.splitn(2, '=').collect::<Vec<&str>>())
            .filter(|v| v.len() == 2)
            .find(|v| v[0] == name)
            .map(|v| {
                percent_encoding::percent_decode_str(v[1].trim_matches('"'))
                    .decode_utf8_lossy()
                    .to_string()
            })
    }

    #[test]
    fn sign_post_query() {
        // https://tools.ietf.org/html/rfc5849
        let endpoint = "https://photos.example.net/initiate";
        let secrets = Secrets::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44");
        let params = OAuthParameters::new()
            .nonce("wIjqoS")
            .timestamp(137_131_200u64)
            .callback("http://printer.example.com/ready")
            .realm("photos");

        let req = reqwest::Client::new()
            .oauth1_with_params(&secrets, params)
            .post(endpoint)
            .build()
            .unwrap();

        let sign = req.headers().get(AUTHORIZATION).unwrap().to_str().unwrap();
        assert_eq!(extract_signature(sign), "74KNZJeDHnMBp0EMJ9ZHt/XKycU=");
    }

    #[test]
    fn sign_get_query() {
        // https://tools.ietf.org/html/rfc5849
        let endpoint = "http://photos.example.net/photos?file=vacation.jpg&size=original";
        let secrets = Secrets::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44")
            .token("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");
        let params = OAuthParameters::new()
            .nonce("chapoH")
            .timestamp(137_131_202u64)
            .realm("Photos");

        let req = reqwest::Client::new()
            .oauth1_with_params(&secrets, params)
            .get(endpoint)
            .build()
            .unwrap();

        assert_eq!(req.url().query(), Some("file=vacation.jpg&size=original"));
        let sign = req.headers().get(AUTHORIZATION).unwrap().to_str().unwrap();
        assert_eq!(extract_signature(sign), "MdpQcU8iPSUjWoN/UDMsK2sui9I=");
    }

    #[test]
    fn sign_get_with_added_query() {
        let endpoint = "http://photos.example.net/photos";
        let secrets = Secrets::new("dpf43f3p2l4k3l03", "kd94hf93k423kf44")
            .token("nnch734d00sl2jdk", "pfkkdhi9sl3r4s00");
        let params = OAuthParameters::new()
            .nonce("chapoH")
            .timestamp(137_131_202u64)
            .realm("Photos");

        let req = reqwest::Client::new()
            .oauth1_with_params(&secrets, params)
            .get(endpoint)
            .query(&[("size", "original"), ("file", "vacation.jpg")])
            .build()
            .unwrap();

        let sign = req.headers().get(AUTHORIZATION).unwrap().to_str().unwrap();
        assert_eq!(extract_signature(sign), "MdpQcU8iPSUjWoN/UDMsK2sui9I=");
    }

    #[test]
    fn sign_post_body() {
        // https://developer.twitter.com/ja/docs/basics/authentication/guides/creating-a-signature
        let endpoint = url::Url::parse("https://api.twitter.com/1.1/statuses/update.json").unwrap();
        let secrets = Secrets::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
        )
        .token(
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        );
        let params = OAuthParameters::new()
            .nonce("kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg")
            .timestamp(1_318_622_958u64)
            .version(true);

        let req = reqwest::Client::new()
            .oauth1_with_params(&secrets, params)
            .post(endpoint)
            .form(&[
                ("include_entities", "true"),
                (
                    "status",
                    "Hello Ladies + Gentlemen, a signed OAuth request!",
                ),
            ])
            .build()
            .unwrap();

        assert_eq!(
            req.headers().get(CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        let body = req.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(
            body,
            &b"include_entities=true&status=Hello+Ladies+%2B+Gentlemen%2C+a+signed+OAuth+request%21"[..]
        );
        let sign = req.headers().get(AUTHORIZATION).unwrap().to_str().unwrap();
        assert_eq!(extract_signature(sign), "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn oauth_query_parameters_move_to_header() {
        let secrets = Secrets::new("key", "secret");
        let req = reqwest::Client::new()
            .oauth1(&secrets)
            .get("https://mobilevikings.com/api/2.0/oauth/request_token/")
            .query(&[("oauth_callback", "oob"), ("lang", "nl")])
            .build()
            .unwrap();

        assert_eq!(req.url().query(), Some("lang=nl"));
        let auth = req.headers().get(AUTHORIZATION).unwrap().to_str().unwrap();
        assert_eq!(extract_param(auth, "oauth_callback").as_deref(), Some("oob"));
    }

    #[test]
    fn unknown_oauth_parameter_fails_build() {
        let secrets = Secrets::new("key", "secret");
        let result = reqwest::Client::new()
            .oauth1(&secrets)
            .post("https://mobilevikings.com/api/2.0/oauth/sim_balance.json")
            .form_encoded("oauth_signature=forged")
            .build();

        match result {
            Err(Error::Signer(SignError::UnknownParameter(key))) => {
                assert_eq!(key, "oauth_signature")
            }
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn invalid_url_fails_build() {
        let secrets = Secrets::new("key", "secret");
        let result = reqwest::Client::new()
            .oauth1(&secrets)
            .get("not a url")
            .build();
        assert!(matches!(result, Err(Error::Reqwest(_))));
    }
}
