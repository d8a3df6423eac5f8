/*!
mvoauthapi: OAuth 1.0a client for the Mobile Vikings API.

# Overview

The Mobile Vikings API lets applications read a user's account data (SIM
balance, top-up history, ...) without knowing the user's credentials. Access
is granted through the OAuth 1.0a three-legged handshake, after which every
API call is signed with the resulting access token.

[`ApiClient`] drives the handshake and the calls. Underneath it sits a small
signing layer over [reqwest](https://crates.io/crates/reqwest), built with
[oauth1-request](https://crates.io/crates/oauth1-request), which can be used
on its own against any OAuth 1.0a provider.

# Acquiring an access token

Register your application with `info@mobilevikings.com` to get a consumer key
and secret. Then:

```no_run
# async fn run() -> mvoauthapi::Result<()> {
use mvoauthapi::{ApiClient, Token};

let mut api = ApiClient::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")?;

// step 1: request token, `None` shows the verifier to the user
let request_token = api.fetch_request_token(Some("http://my-app.com/access_granted")).await?;

// step 2: send the user here
let url = api.make_authorization_url()?;
println!("please grant access at: {}", url);

// step 3: the callback receives `oauth_token` and `oauth_verifier`;
// a fresh client can pick up where this one stopped
let mut api = ApiClient::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")?;
api.set_request_token(Token::new(request_token.key, request_token.secret));
api.set_request_verifier("[VERIFIER]")?;
let access_token = api.fetch_access_token().await?;
# Ok(())
# }
```

# Re-using an access token

An access token stays valid until the user revokes it:

```no_run
# async fn run() -> mvoauthapi::Result<()> {
use mvoauthapi::{ApiClient, Token, NO_ARGS};

let mut api = ApiClient::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]")?;
api.set_access_token(Token::new("[ACCESS_TOKEN]", "[TOKEN_SECRET]"));
let balance = api.get("sim_balance", NO_ARGS).await?;
println!("{}", balance.content);
# Ok(())
# }
```

# Signing arbitrary requests

```no_run
# async fn run() -> mvoauthapi::Result<()> {
use mvoauthapi::{OAuthClientProvider, Secrets, TokenReaderFuture};

let secrets = Secrets::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]");
let resp = reqwest::Client::new()
    .oauth1(&secrets)
    .get("https://mobilevikings.com/api/2.0/oauth/request_token/")
    .query(&[("oauth_callback", "oob")])
    .send()
    .parse_oauth_token()
    .await?;
println!("token: {}", resp.oauth_token);
# Ok(())
# }
```
*/
mod api;
mod client;
mod config;
mod error;
mod request;
mod response;
mod secrets;
mod signer;
mod token_reader;
mod www_authenticate;

// exposed to external program
pub use api::{ApiClient, NO_ARGS, OOB_CALLBACK};
pub use client::{Client, OAuthClientProvider};
pub use config::{ApiConfig, Format, DEFAULT_BASE_URL, DEFAULT_REALM};
pub use error::{
    ApiErrorKind, ConfigError, Error, Result, SignError, SignResult, TokenReaderError,
    TokenReaderResult,
};
pub use request::RequestBuilder;
pub use response::ApiResponse;
pub use secrets::{Consumer, Secrets, SecretsProvider, Token};
pub use signer::{OAuthParameters, Signer};
pub use token_reader::{read_oauth_token, TokenReader, TokenReaderFuture, TokenResponse};
pub use www_authenticate::parse_www_authenticate;

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_verifier`.
pub const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";
/// Represents `realm`.
pub const REALM_KEY: &str = "realm";

// crate-private constant variables
pub(crate) const OAUTH_KEY_PREFIX: &str = "oauth_";
pub(crate) const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub(crate) const OAUTH_TOKEN_KEY: &str = "oauth_token";
