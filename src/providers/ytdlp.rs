use std::path::Path;
use async_trait::async_trait;
use log::{debug, error};
use tokio::process::Command;

use crate::errors::AcquisitionError;
use crate::media::VideoHandle;
use crate::providers::{VideoAcquirer, youtube};

// @module: Source video acquisition via the yt-dlp downloader

/// Filename the downloader writes inside the run workdir
const SOURCE_FILENAME: &str = "source.mp4";

/// Acquirer shelling out to yt-dlp
#[derive(Debug, Clone)]
pub struct YtDlpAcquirer {
    /// yt-dlp binary to invoke
    binary: String,

    /// Download timeout in seconds
    timeout_secs: u64,
}

impl YtDlpAcquirer {
    /// Create an acquirer with an explicit binary path and timeout
    pub fn new(binary: impl Into<String>, timeout_secs: u64) -> Self {
        YtDlpAcquirer {
            binary: binary.into(),
            timeout_secs,
        }
    }
}

#[async_trait]
impl VideoAcquirer for YtDlpAcquirer {
    async fn acquire(&self, url: &str, workdir: &Path) -> Result<VideoHandle, AcquisitionError> {
        if !youtube::is_video_url(url) {
            return Err(AcquisitionError::InvalidUrl(url.to_string()));
        }

        let output_path = workdir.join(SOURCE_FILENAME);

        debug!("Downloading {} to {:?}", url, output_path);

        let download_future = Command::new(&self.binary)
            .args([
                "--no-playlist",
                "-f",
                "mp4",
                "-o",
                output_path.to_str().unwrap_or_default(),
                url,
            ])
            .output();

        let timeout = std::time::Duration::from_secs(self.timeout_secs);
        let output = tokio::select! {
            result = download_future => {
                result.map_err(|e| {
                    AcquisitionError::LaunchFailed(format!(
                        "Failed to execute {}: {}", self.binary, e
                    ))
                })?
            },
            _ = tokio::time::sleep(timeout) => {
                return Err(AcquisitionError::TimedOut(self.timeout_secs));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("Download failed: {}", stderr.trim());
            return Err(AcquisitionError::DownloadFailed(stderr.trim().to_string()));
        }

        let file_size = std::fs::metadata(&output_path).map(|m| m.len()).unwrap_or(0);
        if file_size == 0 {
            return Err(AcquisitionError::MissingOutput(output_path));
        }

        Ok(VideoHandle { path: output_path })
    }
}
