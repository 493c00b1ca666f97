//! Streaming download of the update asset with progress reporting.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::LauncherConfig;
use crate::error::{LaunchError, Result};

/// Read buffer size for the download loop.
const CHUNK_SIZE: usize = 64 * 1024;

/// Progress of a running transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes received so far.
    pub bytes_done: u64,
    /// Total size reported by the server.
    pub bytes_total: u64,
}

impl TransferProgress {
    /// Creates a progress value.
    #[must_use]
    pub const fn new(bytes_done: u64, bytes_total: u64) -> Self {
        Self {
            bytes_done,
            bytes_total,
        }
    }

    /// Progress as a fraction in `0.0..=1.0`, or `None` when the total is unknown.
    #[must_use]
    pub fn fraction(&self) -> Option<f64> {
        if self.bytes_total == 0 {
            return None;
        }
        Some((self.bytes_done as f64 / self.bytes_total as f64).min(1.0))
    }

    /// Progress as a whole percentage, or `None` when the total is unknown.
    #[must_use]
    pub fn percentage(&self) -> Option<u8> {
        self.fraction().map(|f| (f * 100.0) as u8)
    }
}

/// Consumer of transfer progress, such as a console bar or a taskbar indicator.
///
/// Sinks are optional; a transfer without one behaves the same.
pub trait ProgressSink {
    /// Called after every received chunk when the total size is known.
    fn update(&self, progress: TransferProgress);

    /// Called once when the transfer ends, successfully or not.
    fn finish(&self) {}
}

/// Sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&self, _progress: TransferProgress) {}
}

impl<T: ProgressSink + ?Sized> ProgressSink for Box<T> {
    fn update(&self, progress: TransferProgress) {
        (**self).update(progress);
    }

    fn finish(&self) {
        (**self).finish();
    }
}

/// Forwards progress to several sinks.
#[derive(Default)]
pub struct FanOut {
    sinks: Vec<Box<dyn ProgressSink>>,
}

impl FanOut {
    /// Creates an empty fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    #[must_use]
    pub fn with(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Number of attached sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether no sinks are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ProgressSink for FanOut {
    fn update(&self, progress: TransferProgress) {
        for sink in &self.sinks {
            sink.update(progress);
        }
    }

    fn finish(&self) {
        for sink in &self.sinks {
            sink.finish();
        }
    }
}

/// Treats a missing or zero content length as unknown.
fn known_total(content_length: Option<u64>) -> Option<u64> {
    content_length.filter(|&total| total > 0)
}

/// Downloads files to disk.
pub struct FileTransferer {
    client: Client,
    sink: Box<dyn ProgressSink>,
}

impl FileTransferer {
    /// Creates a transferer using the user agent and timeouts from `config`.
    pub fn new(config: &LauncherConfig) -> Result<Self> {
        let user_agent = HeaderValue::from_str(&config.user_agent).map_err(|e| {
            LaunchError::Config(format!("invalid user agent '{}': {e}", config.user_agent))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, user_agent);

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout())
            .timeout(config.download_timeout())
            .build()
            .map_err(|e| LaunchError::Transfer(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            sink: Box::new(NoProgress),
        })
    }

    /// Attaches a progress sink that mirrors every progress callback.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Downloads `url` to `destination`, truncating any existing file.
    ///
    /// `on_progress` is invoked after every chunk with cumulative progress,
    /// but only when the server reported a non-zero content length. Returns
    /// the number of bytes written. On failure the partial file is removed.
    pub fn download<F>(&self, url: &str, destination: &Path, mut on_progress: F) -> Result<u64>
    where
        F: FnMut(TransferProgress),
    {
        tracing::info!("Downloading {} to {}", url, destination.display());

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(destination)
            .map_err(|e| {
                LaunchError::Transfer(format!("failed to open {}: {e}", destination.display()))
            })?;

        let result = self.transfer(url, &mut file, &mut on_progress);
        self.sink.finish();
        drop(file);

        match result {
            Ok(written) => {
                mark_executable(destination)?;
                tracing::info!("Download complete: {} bytes", written);
                Ok(written)
            }
            Err(err) => {
                if let Err(e) = fs::remove_file(destination) {
                    tracing::warn!(
                        "Failed to remove incomplete download {}: {}",
                        destination.display(),
                        e
                    );
                }
                Err(err)
            }
        }
    }

    fn transfer(
        &self,
        url: &str,
        file: &mut File,
        on_progress: &mut dyn FnMut(TransferProgress),
    ) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| LaunchError::Transfer(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LaunchError::Transfer(format!(
                "download failed with status {status}"
            )));
        }

        let total = known_total(response.content_length());
        if total.is_none() {
            tracing::debug!("Server did not report a content length, progress disabled");
        }

        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut done: u64 = 0;

        loop {
            let read = match response.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(LaunchError::Transfer(format!(
                        "connection error after {done} bytes: {e}"
                    )));
                }
            };

            file.write_all(&buf[..read])
                .map_err(|e| LaunchError::Transfer(format!("failed to write file: {e}")))?;
            done += read as u64;

            if let Some(total) = total {
                let progress = TransferProgress::new(done, total);
                on_progress(progress);
                self.sink.update(progress);
                tracing::trace!("Downloaded {} / {} bytes", done, total);
            }
        }

        file.flush()
            .map_err(|e| LaunchError::Transfer(format!("failed to flush file: {e}")))?;

        if let Some(total) = total
            && done != total
        {
            return Err(LaunchError::Transfer(format!(
                "incomplete download: received {done} of {total} bytes"
            )));
        }

        Ok(done)
    }
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = fs::Permissions::from_mode(0o755);
    fs::set_permissions(path, perms)
        .map_err(|e| LaunchError::Transfer(format!("failed to set permissions: {e}")))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_progress_fraction() {
        let progress = TransferProgress::new(250, 1000);
        assert!((progress.fraction().unwrap() - 0.25).abs() < f64::EPSILON);
        assert_eq!(progress.percentage(), Some(25));
        assert_eq!(TransferProgress::new(1000, 1000).percentage(), Some(100));
    }

    #[test]
    fn test_progress_zero_total() {
        let progress = TransferProgress::new(100, 0);
        assert_eq!(progress.fraction(), None);
        assert_eq!(progress.percentage(), None);
    }

    #[test]
    fn test_known_total() {
        assert_eq!(known_total(None), None);
        assert_eq!(known_total(Some(0)), None);
        assert_eq!(known_total(Some(12)), Some(12));
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<TransferProgress>>);

    impl ProgressSink for std::sync::Arc<Recorder> {
        fn update(&self, progress: TransferProgress) {
            self.0.lock().unwrap().push(progress);
        }
    }

    #[test]
    fn test_fan_out_forwards_to_all() {
        let a = std::sync::Arc::new(Recorder::default());
        let b = std::sync::Arc::new(Recorder::default());
        let fan = FanOut::new().with(a.clone()).with(b.clone()).with(NoProgress);
        assert_eq!(fan.len(), 3);

        fan.update(TransferProgress::new(1, 2));
        fan.finish();

        assert_eq!(a.0.lock().unwrap().len(), 1);
        assert_eq!(b.0.lock().unwrap()[0], TransferProgress::new(1, 2));
    }
}
