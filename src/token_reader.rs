use std::collections::BTreeMap;

use reqwest::blocking::Response;
use reqwest::StatusCode;

use crate::{Error, Result, TokenPair, OAUTH_TOKEN_KEY, OAUTH_TOKEN_SECRET_KEY};

/// Represents response of token acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: String,
    /// Other contents, e.g. `oauth_callback_confirmed` or `screen_name`
    pub remain: BTreeMap<String, String>,
}

impl TokenResponse {
    pub fn token_pair(&self) -> TokenPair {
        TokenPair::new(self.oauth_token.as_str(), self.oauth_token_secret.as_str())
    }
}

/// Add parse_oauth_token feature to reqwest::blocking::Response.
// this trait is sealed
pub trait TokenReader: private::Sealed {
    fn parse_oauth_token(self) -> Result<TokenResponse>;
}

impl TokenReader for Response {
    fn parse_oauth_token(self) -> Result<TokenResponse> {
        let status = self.status();
        let text = self.text()?;
        if status != StatusCode::OK {
            return Err(Error::Endpoint { status, body: text });
        }
        read_oauth_token(&text)
    }
}

impl<E> TokenReader for std::result::Result<Response, E>
where
    E: Into<Error>,
{
    fn parse_oauth_token(self) -> Result<TokenResponse> {
        match self {
            Ok(resp) => resp.parse_oauth_token(),
            Err(err) => Err(err.into()),
        }
    }
}

/// Parse an `application/x-www-form-urlencoded` token response.
///
/// Empty token values are treated as missing. For repeated keys the first
/// occurrence wins.
pub fn read_oauth_token(text: &str) -> Result<TokenResponse> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(text)
        .map_err(|e| Error::TokenExchange(format!("response is not form encoded: {}", e)))?;
    let mut destructured = BTreeMap::new();
    for (key, value) in pairs {
        destructured.entry(key).or_insert(value);
    }
    let oauth_token = take_non_empty(&mut destructured, OAUTH_TOKEN_KEY, text)?;
    let oauth_token_secret = take_non_empty(&mut destructured, OAUTH_TOKEN_SECRET_KEY, text)?;
    Ok(TokenResponse {
        oauth_token,
        oauth_token_secret,
        remain: destructured,
    })
}

fn take_non_empty(
    destructured: &mut BTreeMap<String, String>,
    key: &'static str,
    text: &str,
) -> Result<String> {
    match destructured.remove(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::TokenExchange(format!(
            "response has malformed format: not found {} in {}",
            key, text
        ))),
    }
}

mod private {
    use reqwest::blocking::Response;

    use crate::Error;

    pub trait Sealed {}
    impl Sealed for Response {}
    impl<E> Sealed for std::result::Result<Response, E> where E: Into<Error> {}
}
