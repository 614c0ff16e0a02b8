//! Recording transport for unit tests. Nothing leaves the process.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use url::Url;

use super::{GitLab, PreparedRequest, Response, Transport, TransportError};
use crate::config::Config;

pub type Sent = Rc<RefCell<Vec<PreparedRequest>>>;

pub struct RecordingTransport {
    sent: Sent,
}

impl RecordingTransport {
    pub fn new() -> (Self, Sent) {
        let sent: Sent = Rc::default();
        (RecordingTransport { sent: sent.clone() }, sent)
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: &PreparedRequest) -> Result<Response, TransportError> {
        self.sent.borrow_mut().push(request.clone());
        Ok(Response {
            status: Some(200),
            body: r#"{"ok":true}"#.to_string(),
        })
    }
}

pub fn test_config() -> Config {
    Config {
        base_url: Url::parse("http://gitlab.test").unwrap(),
        token: "root-token".to_string(),
        api_version: "v4".to_string(),
        debug: false,
    }
}

/// Client wired to a [`RecordingTransport`] plus the shared request log.
pub fn recording_client() -> (GitLab, Sent) {
    let (transport, sent) = RecordingTransport::new();
    (GitLab::new(&test_config(), Box::new(transport)), sent)
}

/// Fails every request as if the connection was refused.
pub struct FailingTransport;

impl Transport for FailingTransport {
    fn send(&self, _: &PreparedRequest) -> Result<Response, TransportError> {
        Err(TransportError::Runtime(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "connection refused",
        )))
    }
}

/// In-memory log sink for a `tracing_subscriber::fmt` writer.
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut b) = self.0.lock() {
            b.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Path and query of the only request sent so far.
pub fn only_path(sent: &Sent) -> String {
    let reqs = sent.borrow();
    assert_eq!(reqs.len(), 1, "expected exactly one request");
    let url = &reqs[0].url;
    match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    }
}
