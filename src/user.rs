use std::collections::BTreeMap;

use reqwest::blocking::{Client, Response};
use tracing::debug;

use crate::{
    Credentials, Error, Result, Service, Signer, TokenPair, TokenReader,
    OAUTH_CALLBACK_CONFIRMED_KEY, OAUTH_CALLBACK_KEY, OAUTH_VERIFIER_KEY,
};

const SCREEN_NAME_KEY: &str = "screen_name";

/// Where a user stands in the three-legged flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No token of any kind.
    #[default]
    Unauthenticated,
    /// A request token was issued and awaits the user's authorization.
    RequestToken(TokenPair),
    /// An access token is available. `request` is the superseded request
    /// token, absent when the access token was obtained out of band.
    Authorized {
        request: Option<TokenPair>,
        access: TokenPair,
    },
}

/// Per-user OAuth state.
///
/// The token exchange methods take `&mut self`; a `UserConfig` shared
/// between threads has to be wrapped in a lock by the caller.
#[derive(Debug, Clone, Default)]
pub struct UserConfig {
    state: AuthState,
    verifier: Option<String>,
    access_values: BTreeMap<String, String>,
}

impl UserConfig {
    /// A user who has not started the flow yet.
    pub fn new() -> Self {
        Default::default()
    }

    /// A user whose access token was obtained by other means.
    pub fn authorized<TKey, TSecret>(token: TKey, secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        AuthState::Authorized {
            request: None,
            access: TokenPair::new(token, secret),
        }
        .into()
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self.state, AuthState::Authorized { .. })
    }

    pub fn request_token(&self) -> Option<&TokenPair> {
        match &self.state {
            AuthState::Unauthenticated => None,
            AuthState::RequestToken(request) => Some(request),
            AuthState::Authorized { request, .. } => request.as_ref(),
        }
    }

    pub fn access_token(&self) -> Option<&TokenPair> {
        match &self.state {
            AuthState::Authorized { access, .. } => Some(access),
            _ => None,
        }
    }

    pub fn verifier(&self) -> Option<&str> {
        self.verifier.as_deref()
    }

    /// Fields returned alongside the access token, e.g. `screen_name`.
    pub fn access_values(&self) -> &BTreeMap<String, String> {
        &self.access_values
    }

    /// The credential to sign with: the access token if present, else the
    /// request token.
    pub fn token(&self) -> Option<&TokenPair> {
        self.access_token().or_else(|| self.request_token())
    }

    /// Like [`token`](Self::token), with empty strings when no token exists.
    pub fn token_pair(&self) -> (&str, &str) {
        self.token().map(TokenPair::as_pair).unwrap_or(("", ""))
    }

    /// Step 1: obtain a request token from `service.request_url`.
    ///
    /// May be called again before the flow completes; when called on an
    /// authorized user the flow restarts from scratch.
    ///
    /// # Errors
    ///
    /// `Endpoint` on a non-200 response, `TokenExchange` when the token
    /// fields are missing or the callback was not confirmed.
    pub fn get_request_token<TSigner>(
        &mut self,
        service: &Service<TSigner>,
        client: &Client,
    ) -> Result<()>
    where
        TSigner: Signer,
    {
        // the request token step is always signed without a token
        let anonymous = UserConfig::new();
        let form = [(OAUTH_CALLBACK_KEY, service.client_config.callback_url())];
        let response = anonymous
            .send(client, service, &service.request_url, &form)?
            .parse_oauth_token()?;

        if response
            .remain
            .get(OAUTH_CALLBACK_CONFIRMED_KEY)
            .map(String::as_str)
            == Some("false")
        {
            return Err(Error::TokenExchange("OAuth callback not confirmed".into()));
        }

        debug!(url = %service.request_url, "obtained request token");
        self.state = AuthState::RequestToken(response.token_pair());
        self.verifier = None;
        self.access_values.clear();
        Ok(())
    }

    /// Step 2: the URL the user visits to authorize the request token.
    ///
    /// # Errors
    ///
    /// `MissingToken` if no request token has been obtained.
    pub fn authorize_url<TSigner>(&self, service: &Service<TSigner>) -> Result<String>
    where
        TSigner: Signer,
    {
        let request = self.pending_request_token().ok_or(Error::MissingToken)?;
        Ok(service.authorize_url_for(&request.key))
    }

    /// Step 3: exchange the authorized request token and `verifier` for an
    /// access token.
    ///
    /// `returned_token` is the `oauth_token` the provider passed back to the
    /// callback; it must equal the stored request token.
    ///
    /// # Errors
    ///
    /// `MissingToken` without a request token, `TokenMismatch` when
    /// `returned_token` differs, `Endpoint` on a non-200 response and
    /// `TokenExchange` when the token fields are missing.
    pub fn get_access_token<TSigner>(
        &mut self,
        returned_token: &str,
        verifier: &str,
        service: &Service<TSigner>,
        client: &Client,
    ) -> Result<()>
    where
        TSigner: Signer,
    {
        let request = self.pending_request_token().ok_or(Error::MissingToken)?.clone();
        if request.key != returned_token {
            return Err(Error::TokenMismatch {
                expected: request.key,
                returned: returned_token.to_string(),
            });
        }
        self.verifier = Some(verifier.to_string());

        let form = [(OAUTH_VERIFIER_KEY, verifier)];
        let response = self
            .send(client, service, &service.access_url, &form)?
            .parse_oauth_token()?;

        debug!(url = %service.access_url, "obtained access token");
        self.state = AuthState::Authorized {
            request: Some(request),
            access: response.token_pair(),
        };
        self.access_values = response.remain;
        Ok(())
    }

    fn pending_request_token(&self) -> Option<&TokenPair> {
        match &self.state {
            AuthState::RequestToken(request) => Some(request),
            _ => None,
        }
    }

    /// Sign and send a form POST using the current token.
    fn send<TSigner>(
        &self,
        client: &Client,
        service: &Service<TSigner>,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<Response>
    where
        TSigner: Signer,
    {
        let mut request = client
            .post(url)
            .form(form)
            .build()
            .map_err(|e| Error::MalformedRequest(e.to_string()))?;
        service.sign(&mut request, self)?;
        Ok(client.execute(request)?)
    }
}

impl From<AuthState> for UserConfig {
    fn from(state: AuthState) -> Self {
        UserConfig {
            state,
            ..Default::default()
        }
    }
}

impl TryFrom<&Credentials> for UserConfig {
    type Error = Error;

    fn try_from(credentials: &Credentials) -> Result<Self> {
        if credentials.token.is_empty() {
            return Err(Error::IncompleteCredentials("token"));
        }
        if credentials.secret.is_empty() {
            return Err(Error::IncompleteCredentials("secret"));
        }
        let mut user =
            UserConfig::authorized(credentials.token.as_str(), credentials.secret.as_str());
        if !credentials.username.is_empty() {
            user.access_values
                .insert(SCREEN_NAME_KEY.to_string(), credentials.username.clone());
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ClientConfig;

    fn service(base: &str) -> Service {
        let endpoint = format!("{}/request_token", base);
        Service::new(
            endpoint.as_str(),
            endpoint.as_str(),
            endpoint.as_str(),
            ClientConfig::new("consumer_key", "consumer_secret")
                .callback("https://example.com/callback"),
        )
    }

    #[test]
    fn token_precedence() {
        let user = UserConfig::new();
        assert_eq!(user.token(), None);
        assert_eq!(user.token_pair(), ("", ""));

        let user = UserConfig::from(AuthState::RequestToken(TokenPair::new("rt", "rts")));
        assert_eq!(user.token_pair(), ("rt", "rts"));

        let user = UserConfig::from(AuthState::Authorized {
            request: Some(TokenPair::new("rt", "rts")),
            access: TokenPair::new("at", "ats"),
        });
        assert_eq!(user.token_pair(), ("at", "ats"));
        assert_eq!(user.request_token(), Some(&TokenPair::new("rt", "rts")));

        let user = UserConfig::authorized("token", "secret");
        assert!(user.is_authorized());
        assert_eq!(user.token_pair(), ("token", "secret"));
        assert_eq!(user.request_token(), None);
    }

    #[test]
    fn three_legged_flow() {
        let mut server = Server::new();
        let request_mock = server
            .mock("POST", "/request_token")
            .match_header(
                "authorization",
                Matcher::Regex(
                    r#"^OAuth oauth_consumer_key="consumer_key", oauth_nonce="[A-Za-z0-9]{32}", oauth_signature="[^"]+", oauth_signature_method="HMAC-SHA1", oauth_timestamp="\d+", oauth_version="1.0"$"#
                        .into(),
                ),
            )
            .match_body(Matcher::UrlEncoded(
                "oauth_callback".into(),
                "https://example.com/callback".into(),
            ))
            .with_status(200)
            .with_body("oauth_token=rt&oauth_token_secret=rts&oauth_callback_confirmed=true")
            .create();
        let access_mock = server
            .mock("POST", "/request_token")
            .match_header("authorization", Matcher::Regex(r#"oauth_token="rt""#.into()))
            .match_body(Matcher::UrlEncoded("oauth_verifier".into(), "v123".into()))
            .with_status(200)
            .with_body("oauth_token=at&oauth_token_secret=ats&screen_name=alice")
            .create();

        let service = service(&server.url());
        let client = Client::new();
        let mut user = UserConfig::new();

        user.get_request_token(&service, &client).unwrap();
        request_mock.assert();
        assert_eq!(
            user.state(),
            &AuthState::RequestToken(TokenPair::new("rt", "rts"))
        );
        assert_eq!(
            user.authorize_url(&service).unwrap(),
            format!("{}/request_token?oauth_token=rt", server.url())
        );

        user.get_access_token("rt", "v123", &service, &client).unwrap();
        access_mock.assert();
        assert_eq!(user.access_token(), Some(&TokenPair::new("at", "ats")));
        assert_eq!(user.token_pair(), ("at", "ats"));
        assert_eq!(user.request_token(), Some(&TokenPair::new("rt", "rts")));
        assert_eq!(user.verifier(), Some("v123"));
        assert_eq!(
            user.access_values().get("screen_name").map(String::as_str),
            Some("alice")
        );
        assert!(!user.access_values().contains_key("oauth_token"));
    }

    #[test]
    fn request_token_without_token_field() {
        let mut server = Server::new();
        server
            .mock("POST", "/request_token")
            .with_status(200)
            .with_body("oauth_token_secret=rts&oauth_callback_confirmed=true")
            .create();
        let service = service(&server.url());
        let mut user = UserConfig::new();

        let err = user.get_request_token(&service, &Client::new()).unwrap_err();
        assert!(matches!(err, Error::TokenExchange(_)));
        assert!(matches!(user.authorize_url(&service), Err(Error::MissingToken)));
        assert_eq!(user.state(), &AuthState::Unauthenticated);
    }

    #[test]
    fn request_token_callback_not_confirmed() {
        let mut server = Server::new();
        server
            .mock("POST", "/request_token")
            .with_status(200)
            .with_body("oauth_token=rt&oauth_token_secret=rts&oauth_callback_confirmed=false")
            .create();
        let service = service(&server.url());
        let mut user = UserConfig::new();

        let err = user.get_request_token(&service, &Client::new()).unwrap_err();
        assert!(matches!(err, Error::TokenExchange(_)));
        assert_eq!(user.token(), None);
    }

    #[test]
    fn request_token_endpoint_error() {
        let mut server = Server::new();
        server
            .mock("POST", "/request_token")
            .with_status(401)
            .with_body("Failed to validate oauth signature and token")
            .create();
        let service = service(&server.url());
        let mut user = UserConfig::new();

        match user.get_request_token(&service, &Client::new()) {
            Err(Error::Endpoint { status, body }) => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(body, "Failed to validate oauth signature and token");
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(user.state(), &AuthState::Unauthenticated);
    }

    #[test]
    fn access_token_mismatch_aborts_before_request() {
        let mut server = Server::new();
        let mock = server
            .mock("POST", "/request_token")
            .with_status(200)
            .with_body("oauth_token=at&oauth_token_secret=ats")
            .expect(0)
            .create();
        let service = service(&server.url());
        let mut user = UserConfig::from(AuthState::RequestToken(TokenPair::new("rt", "rts")));

        let err = user
            .get_access_token("forged", "v123", &service, &Client::new())
            .unwrap_err();
        assert!(err.is_token_mismatch());
        mock.assert();
        assert_eq!(user.verifier(), None);
        assert!(!user.is_authorized());
    }

    #[test]
    fn access_token_requires_request_token() {
        let service = service("https://example.com");
        let mut user = UserConfig::new();
        assert!(matches!(
            user.get_access_token("rt", "v123", &service, &Client::new()),
            Err(Error::MissingToken)
        ));

        let mut user = UserConfig::authorized("at", "ats");
        assert!(matches!(user.authorize_url(&service), Err(Error::MissingToken)));
        assert!(matches!(
            user.get_access_token("at", "v123", &service, &Client::new()),
            Err(Error::MissingToken)
        ));
    }

    #[test]
    fn access_token_missing_secret() {
        let mut server = Server::new();
        server
            .mock("POST", "/request_token")
            .with_status(200)
            .with_body("oauth_token=at&screen_name=alice")
            .create();
        let service = service(&server.url());
        let mut user = UserConfig::from(AuthState::RequestToken(TokenPair::new("rt", "rts")));

        let err = user
            .get_access_token("rt", "v123", &service, &Client::new())
            .unwrap_err();
        assert!(matches!(err, Error::TokenExchange(_)));
        assert_eq!(user.token_pair(), ("rt", "rts"));
        assert!(user.access_values().is_empty());
    }

    #[test]
    fn from_credentials() {
        let credentials = Credentials {
            token: "token".into(),
            secret: "secret".into(),
            consumer_key: "consumer_key".into(),
            consumer_secret: "consumer_secret".into(),
            username: "alice".into(),
        };
        let user = UserConfig::try_from(&credentials).unwrap();
        assert_eq!(user.token_pair(), ("token", "secret"));
        assert_eq!(user.access_values()["screen_name"], "alice");

        let incomplete = Credentials {
            secret: String::new(),
            ..credentials
        };
        assert!(matches!(
            UserConfig::try_from(&incomplete),
            Err(Error::IncompleteCredentials("secret"))
        ));
    }
}
