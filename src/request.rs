use http::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use url::Url;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// A request that can carry an OAuth signature.
///
/// Implemented for both `reqwest::Request` and `reqwest::blocking::Request`.
pub trait SignableRequest {
    fn method(&self) -> &Method;

    fn url(&self) -> &Url;

    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Raw body bytes, if the body is buffered in memory.
    fn body_bytes(&self) -> Option<&[u8]>;

    /// The body, only when it is `application/x-www-form-urlencoded`.
    ///
    /// Bodies of any other content type do not take part in the signature.
    fn form_body(&self) -> Option<&[u8]> {
        if is_form_urlencoded(self.headers()) {
            self.body_bytes()
        } else {
            None
        }
    }

    fn set_authorization(&mut self, value: HeaderValue) {
        self.headers_mut().insert(AUTHORIZATION, value);
    }
}

fn is_form_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().eq_ignore_ascii_case(FORM_URLENCODED))
        .unwrap_or(false)
}

impl SignableRequest for reqwest::Request {
    fn method(&self) -> &Method {
        reqwest::Request::method(self)
    }

    fn url(&self) -> &Url {
        reqwest::Request::url(self)
    }

    fn headers(&self) -> &HeaderMap {
        reqwest::Request::headers(self)
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        reqwest::Request::headers_mut(self)
    }

    fn body_bytes(&self) -> Option<&[u8]> {
        self.body().and_then(|b| b.as_bytes())
    }
}

impl SignableRequest for reqwest::blocking::Request {
    fn method(&self) -> &Method {
        reqwest::blocking::Request::method(self)
    }

    fn url(&self) -> &Url {
        reqwest::blocking::Request::url(self)
    }

    fn headers(&self) -> &HeaderMap {
        reqwest::blocking::Request::headers(self)
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        reqwest::blocking::Request::headers_mut(self)
    }

    fn body_bytes(&self) -> Option<&[u8]> {
        self.body().and_then(|b| b.as_bytes())
    }
}
