//! GitLab REST client.
//!
//! Everything funnels through [`GitLab::call`]: one request against
//! `{base_url}/api/{version}/{endpoint}` with a `PRIVATE-TOKEN` header.
//! The resource groups (`users`, `projects`, ...) are free functions that
//! validate their inputs, build a path plus optional body and delegate here.
//!
//! Local validation failures are not errors: they come back as a
//! [`Response`] without a status code whose body is a literal JSON
//! `{"error": ...}` object, exactly like an API error body would.

pub mod api;
pub mod branches;
pub mod commits;
pub mod files;
mod http;
pub mod projects;
pub mod repository;
#[cfg(test)]
pub mod testing;
pub mod users;

pub use http::HttpTransport;

use std::fmt;

use serde_json::{Value, json};
use thiserror::Error;
use url::Url;
use url::form_urlencoded;

use crate::config::Config;
use crate::utils::mask_token;

/// Body returned, unsent, for any verb outside [`Method`].
pub const METHOD_NOT_SUPPORTED: &str =
    r#"[{"error":"Method not supported", "function":"core.call()"}]"#;

/// Supported HTTP verbs. Anything else is rejected before a request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Case-insensitive verb lookup; `None` for unsupported verbs.
    pub fn parse(verb: &str) -> Option<Self> {
        match verb.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "DELETE" => Some(Method::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Only POST and PUT send a request body.
    pub fn carries_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Form(Vec<(String, String)>),
}

impl Body {
    pub fn is_form(&self) -> bool {
        matches!(self, Body::Form(_))
    }
}

/// A fully resolved request, ready for a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub token: String,
    /// Form-encoded requests omit the JSON content type.
    pub form: bool,
    pub body: Option<Body>,
}

/// Opaque response: the status is `None` when the payload was produced locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Option<u16>,
    pub body: String,
}

impl Response {
    /// Locally produced payload (validation error, unsupported verb).
    pub fn local(value: Value) -> Self {
        Response {
            status: None,
            body: value.to_string(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.status.is_none()
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Pretty-printed body. Non-JSON bodies yield the parse error message instead.
    pub fn pretty(&self) -> String {
        match self.json() {
            Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
            Err(e) => e.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid request URL '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to start HTTP runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("{method} {url} failed: {source}")]
    Http {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Sends one prepared request and returns whatever came back.
pub trait Transport {
    fn send(&self, request: &PreparedRequest) -> Result<Response, TransportError>;
}

/// Client handle, built once at startup and passed by reference.
pub struct GitLab {
    base_url: Url,
    token: String,
    api_version: String,
    debug: bool,
    transport: Box<dyn Transport>,
}

impl GitLab {
    pub fn new(config: &Config, transport: Box<dyn Transport>) -> Self {
        GitLab {
            base_url: config.base_url.clone(),
            token: config.token.clone(),
            api_version: config.api_version.clone(),
            debug: config.debug,
            transport,
        }
    }

    /// Client backed by the real HTTP transport.
    pub fn connect(config: &Config) -> Result<Self, TransportError> {
        Ok(Self::new(config, Box::new(HttpTransport::new()?)))
    }

    /// Issue one request with the configured token.
    pub fn call(
        &self,
        verb: &str,
        endpoint: &str,
        body: Option<Body>,
    ) -> Result<Response, TransportError> {
        self.call_as(verb, endpoint, body, None)
    }

    /// Issue one request, optionally overriding the token for this call only.
    pub fn call_as(
        &self,
        verb: &str,
        endpoint: &str,
        body: Option<Body>,
        token: Option<&str>,
    ) -> Result<Response, TransportError> {
        let Some(method) = Method::parse(verb) else {
            tracing::debug!(verb, endpoint, "unsupported method, request not sent");
            return Ok(Response {
                status: None,
                body: METHOD_NOT_SUPPORTED.to_string(),
            });
        };

        let url = self.endpoint_url(endpoint)?;
        let token = token
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.token)
            .to_string();
        // Only POST sends form data; PUT always goes out as JSON.
        let body = match (method, body) {
            (Method::Put, Some(Body::Form(pairs))) => Some(Body::Json(Value::Object(
                pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
            ))),
            (m, body) if m.carries_body() => body,
            _ => None,
        };
        let form = body.as_ref().is_some_and(Body::is_form);

        let request = PreparedRequest {
            method,
            url,
            token,
            form,
            body,
        };
        tracing::debug!(method = %request.method, url = %request.url, form, "sending request");

        let result = self.transport.send(&request);

        if self.debug {
            let status = result.as_ref().ok().and_then(|r| r.status);
            let error = result.as_ref().err().map(ToString::to_string);
            tracing::info!(
                target: "gitlab::call",
                method = %request.method,
                url = %request.url,
                status = ?status,
                error = ?error,
                token = %mask_token(&request.token),
                payload = ?request.body,
                "call"
            );
        }
        result
    }

    /// `{base}/api/{version}/{endpoint}`; slashes at the seams are normalized.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, TransportError> {
        let raw = format!(
            "{}/api/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.api_version,
            endpoint.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|source| TransportError::Url { url: raw, source })
    }
}

/* ---- helpers shared by the resource groups ---- */

/// Treat empty strings as absent.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Literal `{"error": message}` payload; no request is issued.
pub(crate) fn reject(message: &str) -> Result<Response, TransportError> {
    Ok(Response::local(json!({ "error": message })))
}

/// Percent-encode a single path segment (`lib/class.rb` -> `lib%2Fclass.rb`).
pub(crate) fn encode_segment(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Append `?k=v&...` for the given pairs; the path is returned as-is when empty.
pub(crate) fn with_query(path: &str, pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{path}?{query}")
}

/// Body object holding only the supplied fields.
pub(crate) fn object(fields: &[(&str, Option<&str>)]) -> serde_json::Map<String, Value> {
    fields
        .iter()
        .filter_map(|(k, v)| present(*v).map(|v| (k.to_string(), Value::String(v.to_string()))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::testing::{Captured, FailingTransport, RecordingTransport, recording_client, test_config};
    use super::*;

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!(Method::parse("get"), Some(Method::Get));
        assert_eq!(Method::parse(" Delete "), Some(Method::Delete));
        assert_eq!(Method::parse("PATCH"), None);
    }

    #[test]
    fn unsupported_verbs_never_reach_the_transport() {
        let (api, sent) = recording_client();
        for verb in ["PATCH", "HEAD", "OPTIONS", ""] {
            let resp = api.call(verb, "projects", None).unwrap();
            assert!(resp.is_local());
            assert_eq!(
                resp.body,
                r#"[{"error":"Method not supported", "function":"core.call()"}]"#
            );
        }
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn url_joins_base_version_and_endpoint() {
        let (api, sent) = recording_client();
        api.call("GET", "/projects/7", None).unwrap();
        let reqs = sent.borrow();
        assert_eq!(reqs[0].url.as_str(), "http://gitlab.test/api/v4/projects/7");
        assert_eq!(reqs[0].token, "root-token");
    }

    #[test]
    fn override_token_wins_for_one_call() {
        let (api, sent) = recording_client();
        api.call_as("GET", "users", None, Some("other")).unwrap();
        api.call("GET", "users", None).unwrap();
        let reqs = sent.borrow();
        assert_eq!(reqs[0].token, "other");
        assert_eq!(reqs[1].token, "root-token");
    }

    #[test]
    fn get_and_delete_drop_the_body() {
        let (api, sent) = recording_client();
        let body = Some(Body::Json(json!({"a": 1})));
        api.call("DELETE", "users/1", body.clone()).unwrap();
        api.call("PUT", "users/1", body).unwrap();
        let reqs = sent.borrow();
        assert!(reqs[0].body.is_none());
        assert_eq!(reqs[1].body, Some(Body::Json(json!({"a": 1}))));
    }

    #[test]
    fn form_flag_follows_body_kind() {
        let (api, sent) = recording_client();
        let form = Body::Form(vec![("name".into(), "x".into())]);
        api.call("POST", "projects", Some(form)).unwrap();
        api.call("POST", "projects", Some(Body::Json(json!({})))).unwrap();
        let reqs = sent.borrow();
        assert!(reqs[0].form);
        assert!(!reqs[1].form);
    }

    #[test]
    fn put_form_body_is_sent_as_json() {
        let (api, sent) = recording_client();
        let form = Body::Form(vec![("name".into(), "x".into())]);
        api.call("PUT", "projects/1", Some(form)).unwrap();
        let reqs = sent.borrow();
        assert!(!reqs[0].form);
        assert_eq!(reqs[0].body, Some(Body::Json(json!({"name": "x"}))));
    }

    fn debug_client(transport: Box<dyn Transport>) -> GitLab {
        let mut config = test_config();
        config.debug = true;
        GitLab::new(&config, transport)
    }

    fn capture_events(f: impl FnOnce()) -> String {
        let buf = Captured::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        buf.contents()
    }

    #[test]
    fn debug_event_is_emitted_for_successful_calls() {
        let (recorder, sent) = RecordingTransport::new();
        let api = debug_client(Box::new(recorder));
        let mut result = None;
        let out = capture_events(|| result = Some(api.call("GET", "users", None)));
        let resp = result.unwrap().unwrap();
        assert_eq!(resp.status, Some(200));
        assert_eq!(sent.borrow().len(), 1);
        assert!(out.contains("http://gitlab.test/api/v4/users"));
        assert!(out.contains("status=Some(200)"));
        assert!(out.contains("root******"));
        assert!(!out.contains("root-token"));
    }

    #[test]
    fn debug_event_is_emitted_when_the_transport_fails() {
        let api = debug_client(Box::new(FailingTransport));
        let mut result = None;
        let out = capture_events(|| result = Some(api.call("POST", "projects", None)));
        let err = result.unwrap().unwrap_err();
        assert!(matches!(err, TransportError::Runtime(_)));
        assert!(out.contains("http://gitlab.test/api/v4/projects"));
        assert!(out.contains("status=None"));
        assert!(out.contains("connection refused"));
    }

    #[test]
    fn no_debug_event_without_the_flag() {
        let (api, _) = recording_client();
        let out = capture_events(|| {
            api.call("GET", "users", None).unwrap();
        });
        assert!(!out.contains("gitlab.test"));
    }

    #[test]
    fn pretty_falls_back_to_parse_error() {
        let resp = Response {
            status: Some(502),
            body: "<html>bad gateway</html>".into(),
        };
        assert!(resp.pretty().contains("expected value"));
        let ok = Response {
            status: Some(200),
            body: r#"{"id":1}"#.into(),
        };
        assert_eq!(ok.pretty(), "{\n  \"id\": 1\n}");
    }

    #[test]
    fn segment_encoding_escapes_slashes_and_spaces() {
        assert_eq!(encode_segment("lib/class.rb"), "lib%2Fclass.rb");
        assert_eq!(encode_segment("a b+c"), "a%20b%2Bc");
    }

    #[test]
    fn query_is_omitted_when_empty() {
        assert_eq!(with_query("users", &[]), "users");
        assert_eq!(with_query("users", &[("search", "a b")]), "users?search=a+b");
    }
}
