//! Remote resource acquisition.
//!
//! This module provides:
//! - [`Transport`] - the network seam, implemented by [`HttpTransport`]
//! - [`Fetcher`] - presence-checked, atomic downloads to a destination
//! - [`RemoteAsset`] - a large external file fetched once and cached by presence

pub mod fetcher;
pub mod http;
pub mod memory;

pub use fetcher::{remove_asset, Fetcher, TempDownload};
pub use http::HttpTransport;
pub use memory::MemoryTransport;

use std::io::Write;
use std::path::PathBuf;

/// Moves bytes from a URL into a writer.
///
/// Implementations block until the transfer finishes or fails. Nothing is
/// retried; a failed transfer is reported as-is.
pub trait Transport {
    /// Stream the body at `url` into `sink`, returning the bytes written.
    fn download(&self, url: &str, sink: &mut dyn Write) -> anyhow::Result<u64>;
}

/// A large external file the application needs, fetched at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAsset {
    /// Name for progress output.
    pub name: String,
    /// Source URL.
    pub url: String,
    /// Where the file lives once fetched.
    pub local_path: PathBuf,
    /// Expected SHA-256, lowercase hex.
    pub sha256: Option<String>,
    /// Whether a failed fetch halts the install.
    pub required: bool,
}
