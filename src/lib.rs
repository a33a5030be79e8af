/*!
reqwest-oauth1a: OAuth 1.0a client for reqwest.

# Overview

This library signs [reqwest](https://crates.io/crates/reqwest) requests with
OAuth 1.0a `HMAC-SHA1` signatures ([RFC 5849](https://tools.ietf.org/html/rfc5849))
and walks a user through the three-legged token exchange.

A [`Service`] describes one provider: its request-token, authorize and
access-token endpoints, the application's [`ClientConfig`] and the
[`Signer`] in use. A [`UserConfig`] holds one user's tokens and knows where
that user stands in the flow.

# How to use

## Basic usecase 1 - Acquiring OAuth token & secret

```no_run
use std::io;
use reqwest_oauth1a::{ClientConfig, Service, UserConfig};

# fn run() -> Result<(), Box<dyn std::error::Error>> {
let service = Service::new(
    "https://api.twitter.com/oauth/request_token",
    "https://api.twitter.com/oauth/authorize",
    "https://api.twitter.com/oauth/access_token",
    ClientConfig::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]"),
);
let client = reqwest::blocking::Client::new();
let mut user = UserConfig::new();

// step 1: acquire request token & token secret
user.get_request_token(&service, &client)?;

// step 2: acquire user pin
println!("please access to: {}", user.authorize_url(&service)?);
println!("input pin: ");
let mut user_input = String::new();
io::stdin().read_line(&mut user_input)?;
let pin = user_input.trim();

// step 3: acquire access token
let request_token = user.token_pair().0.to_string();
user.get_access_token(&request_token, pin, &service, &client)?;
let (token, secret) = user.token_pair();
println!("your token and secret is: \n token: {}\n secret: {}", token, secret);
println!("other attributes: {:#?}", user.access_values());
# Ok(())
# }
```

## Basic usecase 2 - sending the tweet

```no_run
use reqwest_oauth1a::{ClientConfig, Service, UserConfig};

# fn run() -> Result<(), Box<dyn std::error::Error>> {
# let service = Service::new("", "", "", ClientConfig::new("[CONSUMER_KEY]", "[CONSUMER_SECRET]"));
let user = UserConfig::authorized("[ACCESS_TOKEN]", "[TOKEN_SECRET]");

let client = reqwest::blocking::Client::new();
let mut request = client
    .post("https://api.twitter.com/1.1/statuses/update.json")
    .form(&[("status", "Hello, Twitter!")])
    .build()?;
service.sign(&mut request, &user)?;
let resp = client.execute(request)?;
# Ok(())
# }
```

Async `reqwest::Request`s are signed the same way.
*/
mod encode;
mod error;
mod request;
mod secrets;
mod service;
mod signer;
mod token_reader;
mod user;

// exposed to external program
pub use encode::percent_encode;
pub use error::{Error, Result};
pub use request::SignableRequest;
pub use secrets::{ClientConfig, Credentials, TokenPair, OUT_OF_BAND};
pub use service::Service;
pub use signer::{
    base_url, normalize_parameters, signature_base_string, signing_key, HmacSha1Signer,
    OAuthParameters, Signer,
};
pub use token_reader::{read_oauth_token, TokenReader, TokenResponse};
pub use user::{AuthState, UserConfig};

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_callback_confirmed`.
pub const OAUTH_CALLBACK_CONFIRMED_KEY: &str = "oauth_callback_confirmed";
/// Represents `oauth_consumer_key`.
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_signature`.
pub const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";
/// Represents `oauth_signature_method`.
pub const OAUTH_SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_token`.
pub const OAUTH_TOKEN_KEY: &str = "oauth_token";
/// Represents `oauth_token_secret`.
pub const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";
/// Represents `oauth_verifier`.
pub const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";
/// Represents `realm`.
pub const REALM_KEY: &str = "realm";
