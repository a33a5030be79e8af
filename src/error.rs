use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed request : {0}")]
    MalformedRequest(String),
    #[error("endpoint responded with {status} : {body}")]
    Endpoint { status: StatusCode, body: String },
    #[error("token exchange failed : {0}")]
    TokenExchange(String),
    #[error("returned token {returned} did not match request token {expected}")]
    TokenMismatch { expected: String, returned: String },
    #[error("no request token has been obtained yet")]
    MissingToken,
    #[error("credentials are missing {0}")]
    IncompleteCredentials(&'static str),
    #[error("request failed : {0}")]
    Transport(#[from] reqwest::Error),
}

impl Error {
    /// `true` if the error means the flow was tampered with or mixed up,
    /// and must not be retried with the same inputs.
    pub fn is_token_mismatch(&self) -> bool {
        matches!(self, Error::TokenMismatch { .. })
    }
}
