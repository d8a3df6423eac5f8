use std::borrow::Cow;

pub trait SecretsProvider {
    fn get_consumer_key_pair<'a>(&'a self) -> (&'a str, &'a str);

    fn get_token_pair_option<'a>(&'a self) -> Option<(&'a str, &'a str)>;

    fn get_token_option_pair<'a>(&'a self) -> (Option<&'a str>, Option<&'a str>) {
        self.get_token_pair_option()
            .map(|s| (Some(s.0), Some(s.1)))
            .unwrap_or_else(|| (None, None))
    }
}

/// Key and secret identifying the application that consumes the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consumer {
    pub key: String,
    pub secret: String,
}

impl Consumer {
    pub fn new<K, S>(key: K, secret: S) -> Self
    where
        K: Into<String>,
        S: Into<String>,
    {
        Consumer {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

/// A request or access token.
///
/// A request token picks up a verifier once the user has granted access;
/// the verifier is sent along when the token is exchanged for an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub key: String,
    pub secret: String,
    pub verifier: Option<String>,
}

impl Token {
    pub fn new<K, S>(key: K, secret: S) -> Self
    where
        K: Into<String>,
        S: Into<String>,
    {
        Token {
            key: key.into(),
            secret: secret.into(),
            verifier: None,
        }
    }

    pub fn set_verifier<V: Into<String>>(&mut self, verifier: V) {
        self.verifier = Some(verifier.into());
    }

    pub fn with_verifier<V: Into<String>>(mut self, verifier: V) -> Self {
        self.set_verifier(verifier);
        self
    }
}

/// Credentials handed to the signer: the consumer pair and, once one is
/// known, a token pair.
#[derive(Debug, Clone)]
pub struct Secrets<'a> {
    consumer_key: Cow<'a, str>,
    consumer_secret: Cow<'a, str>,
    token: Option<(Cow<'a, str>, Cow<'a, str>)>,
}

impl<'a> Secrets<'a> {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        Secrets {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: None,
        }
    }

    pub fn token<TKey, TSecret>(self, token: TKey, token_secret: TSecret) -> Self
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        Secrets {
            token: Some((token.into(), token_secret.into())),
            ..self
        }
    }

    /// Borrow a consumer and an optional token without copying them.
    pub fn borrowed(consumer: &'a Consumer, token: Option<&'a Token>) -> Self {
        let secrets = Secrets::new(consumer.key.as_str(), consumer.secret.as_str());
        match token {
            Some(t) => secrets.token(t.key.as_str(), t.secret.as_str()),
            None => secrets,
        }
    }
}

impl SecretsProvider for Secrets<'_> {
    fn get_consumer_key_pair<'a>(&'a self) -> (&'a str, &'a str) {
        (&self.consumer_key, &self.consumer_secret)
    }

    fn get_token_pair_option<'a>(&'a self) -> Option<(&'a str, &'a str)> {
        self.token.as_ref().map(|(t, s)| (t.as_ref(), s.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static CONSUMER_KEY: &str = "<CONSUMER_KEY>";
    static CONSUMER_SECRET: &str = "<CONSUMER_SECRET>";
    static TOKEN: &str = "<ACCESS_TOKEN>";
    static TOKEN_SECRET: &str = "<ACCESS_TOKEN_SECRET>";

    #[test]
    fn consumer_only() {
        let secrets = Secrets::new(CONSUMER_KEY, CONSUMER_SECRET);
        assert_eq!(
            secrets.get_consumer_key_pair(),
            (CONSUMER_KEY, CONSUMER_SECRET)
        );
        assert_eq!(secrets.get_token_option_pair(), (None, None));
    }

    #[test]
    fn with_token() {
        let secrets = Secrets::new(CONSUMER_KEY, CONSUMER_SECRET).token(TOKEN, TOKEN_SECRET);
        assert_eq!(secrets.get_token_pair_option(), Some((TOKEN, TOKEN_SECRET)));
    }

    #[test]
    fn borrowed_from_owned_credentials() {
        let consumer = Consumer::new(CONSUMER_KEY, CONSUMER_SECRET);
        let token = Token::new(TOKEN, TOKEN_SECRET).with_verifier("1234");

        let secrets = Secrets::borrowed(&consumer, Some(&token));
        assert_eq!(secrets.get_token_pair_option(), Some((TOKEN, TOKEN_SECRET)));

        let secrets = Secrets::borrowed(&consumer, None);
        assert!(secrets.get_token_pair_option().is_none());
        assert_eq!(token.verifier.as_deref(), Some("1234"));
    }
}
