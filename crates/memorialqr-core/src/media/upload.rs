use std::future::Future;
use std::path::PathBuf;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};

/// Outcome of a batch of uploads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub successful: usize,
    pub failed: usize,
}

impl UploadSummary {
    pub fn total(&self) -> usize {
        self.successful + self.failed
    }

    pub fn all_failed(&self) -> bool {
        self.successful == 0 && self.failed > 0
    }

    /// One-line result shown to the user once every upload has finished.
    pub fn message(&self) -> String {
        match (self.successful, self.failed) {
            (0, 0) => "No files selected".to_string(),
            (0, _) => "Upload failed".to_string(),
            (ok, 0) => format!("{} file(s) uploaded", ok),
            (ok, failed) => format!("{} file(s) uploaded, {} failed", ok, failed),
        }
    }
}

/// Upload files one after another, counting successes and failures.
///
/// A failed upload is logged and does not stop the rest of the batch.
pub async fn upload_all<F, Fut>(files: Vec<PathBuf>, upload: F) -> UploadSummary
where
    F: FnMut(PathBuf) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let total = files.len();
    let names: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();

    let results: Vec<Result<()>> = stream::iter(files).then(upload).collect().await;

    let mut summary = UploadSummary::default();
    for (index, (name, result)) in names.iter().zip(results).enumerate() {
        match result {
            Ok(()) => {
                debug!(file = %name, n = index + 1, total, "Upload finished");
                summary.successful += 1;
            }
            Err(e) => {
                warn!(file = %name, n = index + 1, total, error = %e, "Upload failed");
                summary.failed += 1;
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_summary_message() {
        assert_eq!(UploadSummary { successful: 0, failed: 0 }.message(), "No files selected");
        assert_eq!(UploadSummary { successful: 3, failed: 0 }.message(), "3 file(s) uploaded");
        assert_eq!(UploadSummary { successful: 2, failed: 1 }.message(), "2 file(s) uploaded, 1 failed");
        assert_eq!(UploadSummary { successful: 0, failed: 2 }.message(), "Upload failed");
        assert!(UploadSummary { successful: 0, failed: 2 }.all_failed());
    }

    #[tokio::test]
    async fn test_upload_all_counts_and_keeps_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let files = vec![
            PathBuf::from("a.jpg"),
            PathBuf::from("broken.jpg"),
            PathBuf::from("c.mp4"),
        ];

        let log = seen.clone();
        let summary = upload_all(files, move |path| {
            let log = log.clone();
            async move {
                let name = path.display().to_string();
                log.lock().unwrap().push(name.clone());
                if name.starts_with("broken") {
                    anyhow::bail!("server rejected {}", name);
                }
                Ok(())
            }
        })
        .await;

        assert_eq!(summary, UploadSummary { successful: 2, failed: 1 });
        assert_eq!(summary.total(), 3);
        assert_eq!(*seen.lock().unwrap(), vec!["a.jpg", "broken.jpg", "c.mp4"]);
    }

    #[tokio::test]
    async fn test_upload_all_empty() {
        let summary = upload_all(Vec::new(), |_| async { Ok::<(), anyhow::Error>(()) }).await;
        assert_eq!(summary, UploadSummary::default());
    }
}
