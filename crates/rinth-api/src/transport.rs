use std::fmt;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use rinth_model::MultipartPayload;
use serde_json::Value;
use url::Url;

use crate::auth::AuthToken;

/// What goes into the body of a [`Request`].
#[derive(Clone, PartialEq, Debug, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartPayload),
    Bytes {
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// A request against the API, relative to the transport's base URL.
#[derive(Clone, PartialEq, Debug)]
#[must_use]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
    pub auth: Option<AuthToken>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: vec![],
            body: Body::Empty,
            auth: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn queries(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn auth(mut self, token: AuthToken) -> Self {
        self.auth = Some(token);
        self
    }
}

/// The status and raw body of a response. Status mapping happens in
/// [`Modrinth`](crate::Modrinth), not in the transport.
#[derive(Clone, PartialEq, Eq, Debug)]
#[must_use]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// The body as text, for error reports.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("Failed to set up the HTTP client")]
    Setup(#[source] reqwest::Error),

    #[error("Could not build a request URL")]
    Url(#[from] url::ParseError),

    #[error("The HTTP request failed")]
    Http(#[from] reqwest::Error),
}

/// Something that can carry [`Request`]s to the API and bring back responses.
pub trait Transport: fmt::Debug {
    /// Sends a request relative to the API's base URL.
    ///
    /// # Errors
    ///
    /// Fails only if no response could be obtained. Non-2xx responses are not
    /// errors at this level.
    fn send(&self, request: &Request) -> Result<RawResponse, TransportError>;

    /// Downloads an absolute URL, like a file on the CDN.
    ///
    /// # Errors
    ///
    /// Same as [`Transport::send`].
    fn fetch(&self, url: &Url) -> Result<RawResponse, TransportError>;
}

/// The [`reqwest`]-backed [`Transport`].
#[derive(Debug)]
#[must_use]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl HttpTransport {
    pub const USER_AGENT: &str = concat!(
        env!("CARGO_PKG_REPOSITORY"),
        '/',
        env!("CARGO_PKG_VERSION"),
        ' ',
        '(',
        env!("CARGO_PKG_AUTHORS"),
        ')',
    );

    pub const DEFAULT_BASE_URL: &str = "https://api.modrinth.com/v2/";

    /// # Errors
    ///
    /// Fails if the underlying client cannot be built, like when the user agent
    /// is not a valid header value.
    pub fn new(
        base_url: Url,
        user_agent: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent.unwrap_or(Self::USER_AGENT))
            .timeout(timeout)
            .build()
            .map_err(TransportError::Setup)?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, request: &Request) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.join(request.path.trim_start_matches('/'))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(request)?);
        if let Some(token) = &request.auth {
            builder = builder.header(AUTHORIZATION, token.expose());
        }
        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart(payload) => builder
                .header(CONTENT_TYPE, payload.content_type())
                .body(payload.encode()),
            Body::Bytes {
                content_type,
                bytes,
            } => builder
                .header(CONTENT_TYPE, content_type.as_str())
                .body(bytes.clone()),
        };

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok(RawResponse { status, body })
    }

    fn fetch(&self, url: &Url) -> Result<RawResponse, TransportError> {
        let response = self.client.get(url.clone()).send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok(RawResponse { status, body })
    }
}

/// [`Url::join`] drops the last path segment of a base without a trailing
/// slash, which would eat the `/v2` of the API URL.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_joined_under_the_version_prefix() {
        let base = Url::parse("https://api.modrinth.com/v2").unwrap();
        let transport = HttpTransport::new(base, None, None).unwrap();
        let request = Request::get("/project/sodium/version")
            .query("loaders", r#"["fabric"]"#)
            .query("featured", "true");
        assert_eq!(
            transport.url(&request).unwrap().as_str(),
            "https://api.modrinth.com/v2/project/sodium/version?loaders=%5B%22fabric%22%5D&featured=true"
        );
    }

    #[test]
    fn success_range() {
        let response = |status| RawResponse {
            status,
            body: vec![],
        };
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(302).is_success());
        assert!(!response(404).is_success());
    }
}
