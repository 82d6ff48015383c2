//! Photo and video media attached to persons and companies.
//!
//! Files live on the remote service; this module only classifies file
//! names, picks MIME types for uploads, and drives batches of uploads.

pub mod upload;

use serde::Serialize;

pub use upload::{upload_all, UploadSummary};

/// Extensions the profile pages play as video.
const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "avi", "mkv", "webm"];

/// Fallback video type when the extension is unknown.
const DEFAULT_VIDEO_MIME: &str = "video/mp4";

const DEFAULT_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Lowercased extension after the last dot, or "" when there is none.
fn extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

pub fn is_video(filename: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&extension(filename).as_str())
}

impl MediaKind {
    pub fn of(filename: &str) -> Self {
        if is_video(filename) {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

/// MIME type for a video file; unknown extensions fall back to `video/mp4`.
pub fn video_mime_type(filename: &str) -> &'static str {
    match extension(filename).as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        _ => DEFAULT_VIDEO_MIME,
    }
}

/// MIME type sent with an upload.
pub fn upload_mime_type(filename: &str) -> &'static str {
    if is_video(filename) {
        return video_mime_type(filename);
    }
    match extension(filename).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => DEFAULT_MIME,
    }
}

/// A media file listed for a person or company, resolved to its public URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaFile {
    pub url: String,
    pub filename: String,
    pub kind: MediaKind,
}

impl MediaFile {
    pub fn new(url: String, filename: String) -> Self {
        let kind = MediaKind::of(&filename);
        Self { url, filename, kind }
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}
