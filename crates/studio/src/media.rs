//! Local files as `data:` URLs.

use crate::PanelError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::Path;

pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// A file read into memory, base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub mime_type: String,
    pub data: String,
}

impl MediaFile {
    pub async fn read(path: &Path) -> Result<Self, PanelError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| PanelError::Media {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_bytes(name, mime_from_path(path), &bytes))
    }

    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Parses a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(name: impl Into<String>, url: &str) -> Option<Self> {
        let (mime_type, data) = split_data_url(url)?;
        Some(Self {
            name: name.into(),
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video")
    }

    pub fn is_audio(&self) -> bool {
        self.mime_type.starts_with("audio")
    }
}

/// `(mime, base64)` halves of a base64 data URL.
pub fn split_data_url(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (header, data) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    Some((mime, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_guess_is_case_insensitive() {
        assert_eq!(mime_from_path(Path::new("a/Hero.PNG")), "image/png");
        assert_eq!(mime_from_path(Path::new("clip.webm")), "video/webm");
        assert_eq!(mime_from_path(Path::new("theme.mp3")), "audio/mpeg");
        assert_eq!(mime_from_path(Path::new("notes")), "application/octet-stream");
    }

    #[test]
    fn split_rejects_non_base64_urls() {
        assert_eq!(
            split_data_url("data:image/png;base64,AAAA"),
            Some(("image/png", "AAAA"))
        );
        assert_eq!(split_data_url("data:text/plain,hello"), None);
        assert_eq!(split_data_url("https://example.com/a.png"), None);
    }

    #[tokio::test]
    async fn reads_file_into_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let file = MediaFile::read(&path).await.unwrap();
        assert_eq!(file.name, "dot.png");
        assert!(file.is_image());
        assert_eq!(file.data_url(), "data:image/png;base64,AQID");

        let missing = MediaFile::read(&dir.path().join("nope.png")).await;
        assert!(matches!(missing, Err(PanelError::Media { .. })));
    }
}
