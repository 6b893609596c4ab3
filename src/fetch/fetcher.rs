//! Presence-checked, atomic downloads.
//!
//! A download is written to a temporary file in the destination directory
//! and renamed into place only once it is complete (and matches its pinned
//! digest, when one is configured). The temporary file is deleted when it
//! goes out of scope, so an interrupted or failed transfer never leaves a
//! partial file at the destination.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

use super::{RemoteAsset, Transport};
use crate::config::validator::is_plain_file_name;
use crate::detection::asset_present;
use crate::error::{ProvisionError, Result};
use crate::steps::StepOutcome;

/// Downloads remote resources through a [`Transport`].
pub struct Fetcher<'a> {
    transport: &'a dyn Transport,
}

/// A download placed in its own temporary directory.
///
/// The directory and the file are deleted when this value is dropped.
#[derive(Debug)]
pub struct TempDownload {
    _dir: TempDir,
    path: PathBuf,
}

impl TempDownload {
    /// Location of the downloaded file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<'a> Fetcher<'a> {
    /// Create a fetcher over the given transport.
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Fetch an asset unless it is already present.
    pub fn fetch(&self, asset: &RemoteAsset) -> Result<StepOutcome> {
        if asset_present(&asset.local_path) {
            tracing::debug!("{} already at {}", asset.name, asset.local_path.display());
            return Ok(StepOutcome::skipped(format!(
                "already at {}",
                asset.local_path.display()
            )));
        }

        tracing::info!("Downloading {} from {}", asset.name, asset.url);
        let bytes = self.download_to(&asset.url, &asset.local_path, asset.sha256.as_deref())?;

        Ok(StepOutcome::done(format!(
            "{} saved to {}",
            format_bytes(bytes),
            asset.local_path.display()
        )))
    }

    /// Download `url` to `dest`, creating parent directories as needed.
    ///
    /// Returns the number of bytes written. `dest` is only ever replaced by
    /// a complete, verified file.
    pub fn download_to(&self, url: &str, dest: &Path, sha256: Option<&str>) -> Result<u64> {
        let parent = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| ProvisionError::filesystem(&parent, e))?;

        let temp =
            NamedTempFile::new_in(&parent).map_err(|e| ProvisionError::filesystem(&parent, e))?;
        let mut writer = HashingWriter::new(temp);

        let bytes = self
            .transport
            .download(url, &mut writer)
            .map_err(|e| ProvisionError::NetworkError {
                url: url.to_string(),
                message: format!("{:#}", e),
            })?;

        let (mut temp, digest) = writer.finish();
        temp.flush()
            .map_err(|e| ProvisionError::filesystem(temp.path(), e))?;

        if let Some(expected) = sha256 {
            if !digest.eq_ignore_ascii_case(expected) {
                return Err(ProvisionError::IntegrityError {
                    url: url.to_string(),
                    expected: expected.to_string(),
                    actual: digest,
                });
            }
        }

        temp.persist(dest)
            .map_err(|e| ProvisionError::filesystem(dest, e.error))?;

        tracing::debug!("Wrote {} bytes to {}", bytes, dest.display());
        Ok(bytes)
    }

    /// Download `url` into a fresh temporary directory as `file_name`.
    ///
    /// Used for installers and bootstrap scripts that are discarded after use.
    ///
    /// # Errors
    ///
    /// Rejects a `file_name` that is not a bare file name, then fails like
    /// [`Fetcher::download_to`].
    pub fn fetch_to_temp(&self, url: &str, file_name: &str) -> Result<TempDownload> {
        if !is_plain_file_name(file_name) {
            return Err(ProvisionError::ConfigValidationError {
                message: format!("download name '{}' must be a bare file name", file_name),
            });
        }

        let dir = tempfile::Builder::new()
            .prefix("croppass-setup-")
            .tempdir()?;
        let path = dir.path().join(file_name);

        tracing::info!("Downloading {}", url);
        self.download_to(url, &path, None)?;

        Ok(TempDownload { _dir: dir, path })
    }
}

/// Delete a fetched asset if it exists.
///
/// # Errors
///
/// Returns `FilesystemError` if the file exists but cannot be deleted.
pub fn remove_asset(asset: &RemoteAsset) -> Result<StepOutcome> {
    if !asset_present(&asset.local_path) {
        return Ok(StepOutcome::skipped(format!(
            "no file at {}",
            asset.local_path.display()
        )));
    }

    fs::remove_file(&asset.local_path)
        .map_err(|e| ProvisionError::filesystem(&asset.local_path, e))?;
    tracing::info!("Removed {}", asset.local_path.display());
    Ok(StepOutcome::done(format!(
        "removed {}",
        asset.local_path.display()
    )))
}

/// Writer that hashes everything passing through it.
struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    fn finish(self) -> (W, String) {
        (self.inner, hex::encode(self.hasher.finalize()))
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn format_bytes(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    const KIB: u64 = 1024;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Serves a fixed body, or fails after writing part of it.
    struct FakeTransport {
        body: Vec<u8>,
        fail_midway: bool,
        calls: Cell<usize>,
    }

    impl FakeTransport {
        fn serving(body: &[u8]) -> Self {
            Self {
                body: body.to_vec(),
                fail_midway: false,
                calls: Cell::new(0),
            }
        }

        fn failing(body: &[u8]) -> Self {
            Self {
                fail_midway: true,
                ..Self::serving(body)
            }
        }
    }

    impl Transport for FakeTransport {
        fn download(&self, _url: &str, sink: &mut dyn Write) -> anyhow::Result<u64> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_midway {
                sink.write_all(&self.body[..self.body.len() / 2])?;
                anyhow::bail!("connection reset by peer");
            }
            sink.write_all(&self.body)?;
            Ok(self.body.len() as u64)
        }
    }

    fn asset(dir: &Path, sha256: Option<&str>) -> RemoteAsset {
        RemoteAsset {
            name: "weights".to_string(),
            url: "https://example.com/retinaface.h5".to_string(),
            local_path: dir.join("weights").join("retinaface.h5"),
            sha256: sha256.map(str::to_string),
            required: false,
        }
    }

    #[test]
    fn fetch_downloads_missing_asset_and_creates_parents() {
        let temp = TempDir::new().unwrap();
        let transport = FakeTransport::serving(b"model-bytes");
        let asset = asset(temp.path(), None);

        let outcome = Fetcher::new(&transport).fetch(&asset).unwrap();

        assert!(!outcome.is_skipped());
        assert_eq!(fs::read(&asset.local_path).unwrap(), b"model-bytes");
    }

    #[test]
    fn fetch_skips_present_asset_without_network() {
        let temp = TempDir::new().unwrap();
        let transport = FakeTransport::serving(b"new");
        let asset = asset(temp.path(), None);
        fs::create_dir_all(asset.local_path.parent().unwrap()).unwrap();
        fs::write(&asset.local_path, b"old").unwrap();

        let outcome = Fetcher::new(&transport).fetch(&asset).unwrap();

        assert!(outcome.is_skipped());
        assert_eq!(transport.calls.get(), 0);
        assert_eq!(fs::read(&asset.local_path).unwrap(), b"old");
    }

    #[test]
    fn failed_transfer_leaves_no_file_behind() {
        let temp = TempDir::new().unwrap();
        let transport = FakeTransport::failing(b"0123456789");
        let asset = asset(temp.path(), None);

        let err = Fetcher::new(&transport).fetch(&asset).unwrap_err();

        assert!(matches!(err, ProvisionError::NetworkError { .. }));
        assert!(!asset.local_path.exists());
        let leftovers: Vec<_> = fs::read_dir(asset.local_path.parent().unwrap())
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn matching_digest_is_accepted() {
        let temp = TempDir::new().unwrap();
        let transport = FakeTransport::serving(b"abc");
        // SHA-256 of "abc"
        let digest = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
        let asset = asset(temp.path(), Some(digest));

        Fetcher::new(&transport).fetch(&asset).unwrap();

        assert!(asset.local_path.exists());
    }

    #[test]
    fn mismatched_digest_is_rejected_and_discarded() {
        let temp = TempDir::new().unwrap();
        let transport = FakeTransport::serving(b"tampered");
        let asset = asset(temp.path(), Some(&"0".repeat(64)));

        let err = Fetcher::new(&transport).fetch(&asset).unwrap_err();

        assert!(matches!(err, ProvisionError::IntegrityError { .. }));
        assert!(!asset.local_path.exists());
    }

    #[test]
    fn temp_download_is_removed_on_drop() {
        let transport = FakeTransport::serving(b"#!/usr/bin/env python\n");

        let download = Fetcher::new(&transport)
            .fetch_to_temp("https://bootstrap.pypa.io/get-pip.py", "get-pip.py")
            .unwrap();
        let path = download.path().to_path_buf();
        assert!(path.exists());
        assert!(path.ends_with("get-pip.py"));

        drop(download);
        assert!(!path.exists());
    }

    #[test]
    fn temp_download_name_cannot_escape_its_directory() {
        let transport = FakeTransport::serving(b"installer");

        let err = Fetcher::new(&transport)
            .fetch_to_temp("https://example.com/python.pkg", "../escaped-installer.pkg")
            .unwrap_err();

        assert!(matches!(err, ProvisionError::ConfigValidationError { .. }));
        assert!(!std::env::temp_dir().join("escaped-installer.pkg").exists());
    }

    #[test]
    fn remove_asset_deletes_then_skips() {
        let temp = TempDir::new().unwrap();
        let asset = asset(temp.path(), None);
        fs::create_dir_all(asset.local_path.parent().unwrap()).unwrap();
        fs::write(&asset.local_path, b"weights").unwrap();

        assert!(!remove_asset(&asset).unwrap().is_skipped());
        assert!(!asset.local_path.exists());
        assert!(remove_asset(&asset).unwrap().is_skipped());
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(12), "12 B");
        assert_eq!(format_bytes(2048), "2.0 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
    }
}
