use std::time::{SystemTime, UNIX_EPOCH};

use http::HeaderValue;
use rand::distr::Alphanumeric;
use rand::Rng;

use crate::{
    percent_encode, ClientConfig, Error, HmacSha1Signer, OAuthParameters, Result,
    SignableRequest, Signer, UserConfig, OAUTH_TOKEN_KEY,
};

const NONCE_LEN: usize = 32;

/// An OAuth 1.0a provider: its three endpoints, the application
/// credentials registered with it and the signature method in use.
///
/// A `Service` is immutable and meant to be shared by every user of the
/// provider.
#[derive(Debug, Clone)]
pub struct Service<TSigner = HmacSha1Signer>
where
    TSigner: Signer,
{
    pub request_url: String,
    pub authorize_url: String,
    pub access_url: String,
    pub client_config: ClientConfig,
    pub signer: TSigner,
}

impl Service<HmacSha1Signer> {
    /// Constructs a `Service` signing with `HMAC-SHA1`.
    pub fn new<TRequest, TAuthorize, TAccess>(
        request_url: TRequest,
        authorize_url: TAuthorize,
        access_url: TAccess,
        client_config: ClientConfig,
    ) -> Self
    where
        TRequest: Into<String>,
        TAuthorize: Into<String>,
        TAccess: Into<String>,
    {
        Service::with_signer(
            request_url,
            authorize_url,
            access_url,
            client_config,
            HmacSha1Signer,
        )
    }
}

impl<TSigner> Service<TSigner>
where
    TSigner: Signer,
{
    pub fn with_signer<TRequest, TAuthorize, TAccess>(
        request_url: TRequest,
        authorize_url: TAuthorize,
        access_url: TAccess,
        client_config: ClientConfig,
        signer: TSigner,
    ) -> Self
    where
        TRequest: Into<String>,
        TAuthorize: Into<String>,
        TAccess: Into<String>,
    {
        Service {
            request_url: request_url.into(),
            authorize_url: authorize_url.into(),
            access_url: access_url.into(),
            client_config,
            signer,
        }
    }

    /// Sign `request` on behalf of `user`, setting its `Authorization` header.
    ///
    /// A fresh nonce and the current time are used on every call.
    ///
    /// # Errors
    ///
    /// This method fails if the request URL has no authority or the header
    /// value cannot be built.
    pub fn sign<R>(&self, request: &mut R, user: &UserConfig) -> Result<()>
    where
        R: SignableRequest + ?Sized,
    {
        self.sign_with(request, user, &generate_nonce(), &generate_timestamp())
    }

    /// Like [`sign`](Self::sign), with a caller supplied nonce and timestamp.
    pub fn sign_with<R>(
        &self,
        request: &mut R,
        user: &UserConfig,
        nonce: &str,
        timestamp: &str,
    ) -> Result<()>
    where
        R: SignableRequest + ?Sized,
    {
        let params = self.oauth_params(request, user, nonce, timestamp)?;
        let header = params.to_authorization_header(self.client_config.realm_value());
        let value = HeaderValue::from_str(&header)
            .map_err(|e| Error::MalformedRequest(format!("invalid Authorization header: {}", e)))?;
        request.set_authorization(value);
        Ok(())
    }

    /// The parameters [`sign_with`](Self::sign_with) would attach.
    pub fn oauth_params<R>(
        &self,
        request: &R,
        user: &UserConfig,
        nonce: &str,
        timestamp: &str,
    ) -> Result<OAuthParameters>
    where
        R: SignableRequest + ?Sized,
    {
        self.signer
            .oauth_params(request, &self.client_config, user.token(), nonce, timestamp)
    }

    /// The URL a user visits to authorize `request_token`.
    pub fn authorize_url_for(&self, request_token: &str) -> String {
        let separator = if self.authorize_url.contains('?') {
            '&'
        } else {
            '?'
        };
        format!(
            "{}{}{}={}",
            self.authorize_url,
            separator,
            OAUTH_TOKEN_KEY,
            percent_encode(request_token)
        )
    }
}

fn generate_nonce() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

fn generate_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string()
}
