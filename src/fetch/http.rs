//! HTTP transport.
//!
//! Streams response bodies from HTTP/HTTPS URLs using a blocking client.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use std::io::Write;
use std::time::Duration;

use super::Transport;
use crate::config::Settings;

/// Downloads over HTTP/HTTPS.
pub struct HttpTransport {
    client: Client,
    connect_timeout: Duration,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Create a transport with a 30-second connect timeout and no overall limit.
    pub fn new() -> Result<Self> {
        Self::with_timeouts(Duration::from_secs(30), None)
    }

    /// Create a transport from manifest settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::with_timeouts(
            Duration::from_secs(settings.connect_timeout_secs),
            settings.download_timeout_secs.map(Duration::from_secs),
        )
    }

    /// Create a transport with explicit timeouts.
    ///
    /// `timeout` bounds a whole transfer; `None` lets large downloads run
    /// as long as data keeps arriving.
    pub fn with_timeouts(connect_timeout: Duration, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("croppass-setup/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connect_timeout);

        // The blocking client defaults to a 30s total timeout; a download of
        // a large asset must be allowed to outlive that.
        builder = builder.timeout(timeout);

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            connect_timeout,
            timeout,
        })
    }

    /// Get the configured connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Get the configured overall timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Transport for HttpTransport {
    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        let mut response = self.client.get(url).send()?;

        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }

        let written = response.copy_to(sink)?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn default_connect_timeout_is_30_seconds() {
        let transport = HttpTransport::new().unwrap();
        assert_eq!(transport.connect_timeout(), Duration::from_secs(30));
        assert!(transport.timeout().is_none());
    }

    #[test]
    fn settings_control_timeouts() {
        let settings = Settings {
            connect_timeout_secs: 5,
            download_timeout_secs: Some(600),
        };
        let transport = HttpTransport::from_settings(&settings).unwrap();
        assert_eq!(transport.connect_timeout(), Duration::from_secs(5));
        assert_eq!(transport.timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn download_streams_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/weights.h5");
            then.status(200).body("weights");
        });

        let transport = HttpTransport::new().unwrap();
        let mut body = Vec::new();
        let written = transport
            .download(&server.url("/weights.h5"), &mut body)
            .unwrap();

        mock.assert();
        assert_eq!(written, 7);
        assert_eq!(body, b"weights");
    }

    #[test]
    fn download_fails_on_http_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let transport = HttpTransport::new().unwrap();
        let mut body = Vec::new();
        let err = transport
            .download(&server.url("/missing"), &mut body)
            .unwrap_err();

        assert!(err.to_string().contains("404"));
        assert!(body.is_empty());
    }
}
