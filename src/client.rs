// ----------------------------------------------------------------------------
// This source code contains derived artifacts from seanmonstar's `reqwest`.
// for further information(including license information),
// please visit their repository: https://github.com/seanmonstar/reqwest .
// ----------------------------------------------------------------------------
use oauth1_request::signature_method::HmacSha1 as DefaultSignatureMethod;
use oauth1_request::signature_method::SignatureMethod;
use reqwest::{Client as ReqwestClient, IntoUrl, Method};

use crate::{OAuthParameters, SecretsProvider, Signer};

use super::request::RequestBuilder;

pub trait OAuthClientProvider {
    fn oauth1<'a, T>(self, secrets: &'a T) -> Client<Signer<'a, T, DefaultSignatureMethod>>
    where
        Self: Sized,
        T: SecretsProvider + Clone,
    {
        self.oauth1_with_params(secrets, OAuthParameters::new())
    }

    fn oauth1_with_params<'a, TSecrets, TSignatureMethod>(
        self,
        secrets: &'a TSecrets,
        params: OAuthParameters<'a, TSignatureMethod>,
    ) -> Client<Signer<'a, TSecrets, TSignatureMethod>>
    where
        Self: Sized,
        TSecrets: SecretsProvider + Clone,
        TSignatureMethod: SignatureMethod + Clone;
}

/// A `reqwest::Client` paired with the signer applied to every request it builds.
#[derive(Debug)]
pub struct Client<TSigner> {
    inner: ReqwestClient,
    signer: TSigner,
}

impl OAuthClientProvider for ReqwestClient {
    fn oauth1_with_params<'a, TSecrets, TSignatureMethod>(
        self,
        secrets: &'a TSecrets,
        parameters: OAuthParameters<'a, TSignatureMethod>,
    ) -> Client<Signer<'a, TSecrets, TSignatureMethod>>
    where
        Self: Sized,
        TSecrets: SecretsProvider + Clone,
        TSignatureMethod: SignatureMethod + Clone,
    {
        Client {
            inner: self,
            signer: Signer::new(secrets, parameters),
        }
    }
}

impl<T> Client<T>
where
    T: Clone,
{
    /// Convenience method to make a `GET` request to a URL.
    pub fn get<U: IntoUrl>(&self, url: U) -> RequestBuilder<T> {
        self.request(Method::GET, url)
    }

    /// Convenience method to make a `POST` request to a URL.
    pub fn post<U: IntoUrl>(&self, url: U) -> RequestBuilder<T> {
        self.request(Method::POST, url)
    }

    /// Start building a `Request` with the `Method` and `Url`.
    ///
    /// Returns a `RequestBuilder<T>`, which will allow setting headers and
    /// request body before sending.
    ///
    /// # Errors
    ///
    /// An unparsable `Url` is reported when the request is built or sent.
    pub fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder<T> {
        RequestBuilder::new(
            self.inner.clone(),
            method,
            url.into_url(),
            self.signer.clone(),
        )
    }
}
