use std::collections::btree_map::{BTreeMap, Iter};

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use url::{form_urlencoded, Url};

use crate::{
    percent_encode, ClientConfig, Error, Result, SignableRequest, TokenPair, OAUTH_CONSUMER_KEY,
    OAUTH_NONCE_KEY, OAUTH_SIGNATURE_KEY, OAUTH_SIGNATURE_METHOD_KEY, OAUTH_TIMESTAMP_KEY,
    OAUTH_TOKEN_KEY, OAUTH_VERSION_KEY, REALM_KEY,
};

const OAUTH_VERSION: &str = "1.0";

/// Produces the OAuth protocol parameters for a request.
///
/// Implementors only decide how a signature base string is turned into a
/// signature; parameter collection and normalization are shared.
pub trait Signer {
    /// Value of `oauth_signature_method`, e.g. `HMAC-SHA1`.
    fn signature_method(&self) -> &'static str;

    /// Sign `base_string` with the consumer secret and token secret.
    fn sign(&self, consumer_secret: &str, token_secret: &str, base_string: &str) -> String;

    /// Compute the full `oauth_*` parameter set, `oauth_signature` included.
    ///
    /// The output only depends on the arguments, so a fixed `nonce` and
    /// `timestamp` always yield the same signature.
    fn oauth_params<R>(
        &self,
        request: &R,
        client: &ClientConfig,
        token: Option<&TokenPair>,
        nonce: &str,
        timestamp: &str,
    ) -> Result<OAuthParameters>
    where
        R: SignableRequest + ?Sized,
    {
        let mut params = OAuthParameters::default();
        params.insert(OAUTH_CONSUMER_KEY, client.consumer_key());
        if let Some(token) = token {
            params.insert(OAUTH_TOKEN_KEY, &token.key);
        }
        params.insert(OAUTH_SIGNATURE_METHOD_KEY, self.signature_method());
        params.insert(OAUTH_TIMESTAMP_KEY, timestamp);
        params.insert(OAUTH_NONCE_KEY, nonce);
        params.insert(OAUTH_VERSION_KEY, OAUTH_VERSION);

        let url = request.url();
        let mut signing_params: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        signing_params.extend(url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())));
        if let Some(body) = request.form_body() {
            signing_params.extend(
                form_urlencoded::parse(body).map(|(k, v)| (k.into_owned(), v.into_owned())),
            );
        }

        let base_string = signature_base_string(
            request.method().as_str(),
            &base_url(url)?,
            &normalize_parameters(&signing_params),
        );
        tracing::trace!(%base_string, "computed signature base string");

        let token_secret = token.map(|t| t.secret.as_str()).unwrap_or_default();
        let signature = self.sign(client.consumer_secret(), token_secret, &base_string);
        params.insert(OAUTH_SIGNATURE_KEY, signature);
        Ok(params)
    }
}

/// The `HMAC-SHA1` signature method (RFC 5849 section 3.4.2).
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha1Signer;

impl Signer for HmacSha1Signer {
    fn signature_method(&self) -> &'static str {
        "HMAC-SHA1"
    }

    fn sign(&self, consumer_secret: &str, token_secret: &str, base_string: &str) -> String {
        let key = signing_key(consumer_secret, token_secret);
        // HMAC accepts keys of any length
        let mut mac = match Hmac::<Sha1>::new_from_slice(key.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC can take key of any size"),
        };
        mac.update(base_string.as_bytes());
        BASE64_STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// `enc(consumer_secret)&enc(token_secret)`; the token secret is empty
/// until a request token has been issued.
pub fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    )
}

/// The base string URI: scheme, authority and path only.
///
/// `Url` already lowercases the scheme and host and drops default ports.
pub fn base_url(url: &Url) -> Result<String> {
    if url.cannot_be_a_base() || !url.has_host() {
        return Err(Error::MalformedRequest(format!(
            "{} has no authority to sign",
            url
        )));
    }
    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);
    // infallible for URLs with a host
    let _ = base.set_username("");
    let _ = base.set_password(None);
    Ok(base.into())
}

/// Encode every pair, sort by encoded key then encoded value and join them.
pub fn normalize_parameters<K, V>(params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k.as_ref()), percent_encode(v.as_ref())))
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// `METHOD&enc(base_url)&enc(normalized_parameters)`.
pub fn signature_base_string(method: &str, base_url: &str, normalized_parameters: &str) -> String {
    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(base_url),
        percent_encode(normalized_parameters)
    )
}

/// The `oauth_*` parameters of one signed request, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthParameters {
    params: BTreeMap<String, String>,
}

impl OAuthParameters {
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn signature(&self) -> Option<&str> {
        self.get(OAUTH_SIGNATURE_KEY)
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Render as an `Authorization` header value (RFC 5849 section 3.5.1).
    ///
    /// `realm` goes first and is not percent-encoded.
    pub fn to_authorization_header(&self, realm: Option<&str>) -> String {
        let mut parts = Vec::with_capacity(self.params.len() + 1);
        if let Some(realm) = realm {
            parts.push(format!("{}=\"{}\"", REALM_KEY, realm));
        }
        parts.extend(
            self.params
                .iter()
                .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v))),
        );
        format!("OAuth {}", parts.join(", "))
    }
}

impl<'a> IntoIterator for &'a OAuthParameters {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
