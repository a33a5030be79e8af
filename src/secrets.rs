use std::fmt;

use serde::Deserialize;

/// Callback value for clients that cannot receive a redirect.
pub const OUT_OF_BAND: &str = "oob";

/// A token and its secret, either a request token or an access token.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct TokenPair {
    pub key: String,
    pub secret: String,
}

impl TokenPair {
    pub fn new<TKey, TSecret>(key: TKey, secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        TokenPair {
            key: key.into(),
            secret: secret.into(),
        }
    }

    pub fn as_pair(&self) -> (&str, &str) {
        (&self.key, &self.secret)
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// The application's identity towards a provider.
///
/// Shared read-only by every user authenticating against the same
/// [`Service`](crate::Service).
#[derive(Clone)]
pub struct ClientConfig {
    consumer_key: String,
    consumer_secret: String,
    callback_url: Option<String>,
    realm: Option<String>,
}

impl ClientConfig {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        ClientConfig {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            callback_url: None,
            realm: None,
        }
    }

    /// Set the URL the provider redirects to after authorization.
    pub fn callback<T>(self, callback_url: T) -> Self
    where
        T: Into<String>,
    {
        ClientConfig {
            callback_url: Some(callback_url.into()),
            ..self
        }
    }

    /// Set the `realm` sent in the `Authorization` header.
    ///
    /// # Note
    /// The realm is never part of the signature base string.
    pub fn realm<T>(self, realm: T) -> Self
    where
        T: Into<String>,
    {
        ClientConfig {
            realm: Some(realm.into()),
            ..self
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }

    /// The configured callback URL, or `"oob"` when none was set.
    pub fn callback_url(&self) -> &str {
        self.callback_url.as_deref().unwrap_or(OUT_OF_BAND)
    }

    pub fn realm_value(&self) -> Option<&str> {
        self.realm.as_deref()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .field("realm", &self.realm)
            .finish()
    }
}

/// A named credential bundle as handed over by an external credential store.
#[derive(Deserialize, Clone, Default)]
pub struct Credentials {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub secret: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    #[serde(default)]
    pub username: String,
}

impl Credentials {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.consumer_key.as_str(), self.consumer_secret.as_str())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.token)
            .field("username", &self.username)
            .field("consumer_key", &self.consumer_key)
            .finish_non_exhaustive()
    }
}
