//! In-memory transport for testing.

use anyhow::bail;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;

use super::Transport;

/// Transport that serves canned bodies and records every request.
///
/// URLs without a body fail as if the host were unreachable.
///
/// # Example
///
/// ```
/// use croppass_setup::fetch::{MemoryTransport, Transport};
///
/// let transport = MemoryTransport::new().with("https://example.com/a", b"abc");
/// let mut body = Vec::new();
/// transport.download("https://example.com/a", &mut body).unwrap();
/// assert!(transport.download("https://example.com/b", &mut body).is_err());
/// assert_eq!(transport.request_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MemoryTransport {
    bodies: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl MemoryTransport {
    /// Create a transport that serves nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`.
    pub fn with(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// Number of requests made so far.
    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for MemoryTransport {
    fn download(&self, url: &str, sink: &mut dyn Write) -> anyhow::Result<u64> {
        self.requests.borrow_mut().push(url.to_string());
        match self.bodies.get(url) {
            Some(body) => {
                sink.write_all(body)?;
                Ok(body.len() as u64)
            }
            None => bail!("could not connect to {}", url),
        }
    }
}
