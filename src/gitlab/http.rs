//! Real transport: `reqwest` on a private current-thread Tokio runtime.
//!
//! Callers stay synchronous; each `send` blocks until the response (or the
//! transport failure) is available. No retries, no timeout override.

use reqwest::header::{CONTENT_TYPE, HeaderValue};

use super::{Body, Method, PreparedRequest, Response, Transport, TransportError};

const PRIVATE_TOKEN: &str = "PRIVATE-TOKEN";

pub struct HttpTransport {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(TransportError::Runtime)?;

        // The connection pool binds to the runtime it is created in.
        let guard = runtime.enter();
        let client = reqwest::Client::builder()
            .user_agent(concat!("gitlab-devtools/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TransportError::Client)?;
        drop(guard);

        Ok(HttpTransport { client, runtime })
    }

    async fn send_async(&self, request: &PreparedRequest) -> Result<Response, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, request.url.clone())
            .header(PRIVATE_TOKEN, request.token.as_str());

        if !request.form {
            builder = builder.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        match &request.body {
            Some(Body::Json(value)) => {
                let bytes = serde_json::to_vec(value).map_err(TransportError::Encode)?;
                builder = builder.body(bytes);
            }
            Some(Body::Form(pairs)) => builder = builder.form(pairs),
            None => {}
        }

        let http_err = |source| TransportError::Http {
            method: request.method,
            url: request.url.to_string(),
            source,
        };

        let resp = builder.send().await.map_err(http_err)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(http_err)?;
        Ok(Response {
            status: Some(status),
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &PreparedRequest) -> Result<Response, TransportError> {
        self.runtime.block_on(self.send_async(request))
    }
}
