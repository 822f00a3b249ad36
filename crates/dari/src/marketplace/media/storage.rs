use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use mime::Mime;

/// One uploaded file as received from a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<&str>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.map(str::to_string),
            bytes: bytes.into(),
        }
    }

    /// Declared content type when it parses, otherwise a guess from the file
    /// extension.
    pub fn mime(&self) -> Option<Mime> {
        self.content_type
            .as_deref()
            .and_then(|raw| raw.parse::<Mime>().ok())
            .filter(|declared| declared.essence_str() != "application/octet-stream")
            .or_else(|| mime_guess::from_path(&self.file_name).first())
    }

    pub fn is_image(&self) -> bool {
        self.mime().is_some_and(|mime| mime.type_() == mime::IMAGE)
    }

    pub fn is_video(&self) -> bool {
        self.mime().is_some_and(|mime| mime.type_() == mime::VIDEO)
    }

    /// File name reduced to characters safe inside an object key.
    pub fn safe_name(&self) -> String {
        let name: String = self
            .file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        if name.trim_matches(['-', '.']).is_empty() {
            "upload".to_string()
        } else {
            name
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("object storage rejected {key}: {reason}")]
    Rejected { key: String, reason: String },
    #[error("media backend unavailable: {0}")]
    Unavailable(String),
}

/// Object storage for listing photos. Returns the public URL of the stored
/// object.
pub trait ImageStore: Send + Sync {
    fn store_image(&self, key: &str, file: &MediaFile) -> Result<String, MediaError>;
    /// Drops an object that never made it onto a listing.
    fn remove_image(&self, key: &str) -> Result<(), MediaError>;
}

/// Archival storage for listing videos, written through a signed PUT.
pub trait VideoArchive: Send + Sync {
    fn put_video(&self, identifier: &str, file: &MediaFile) -> Result<String, MediaError>;
}

/// Public download location of an archived item.
pub fn archive_download_url(base: &str, identifier: &str, file_name: &str) -> String {
    format!(
        "{}/download/{identifier}/{file_name}",
        base.trim_end_matches('/')
    )
}

/// In-process image bucket serving objects under `base_url`.
#[derive(Debug)]
pub struct PublicImageStore {
    base_url: String,
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl PublicImageStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().map_or(0, |objects| objects.len())
    }

    fn objects(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>, MediaError> {
        self.objects
            .lock()
            .map_err(|_| MediaError::Unavailable("image bucket lock poisoned".to_string()))
    }
}

impl ImageStore for PublicImageStore {
    fn store_image(&self, key: &str, file: &MediaFile) -> Result<String, MediaError> {
        self.objects()?.insert(key.to_string(), file.bytes.clone());
        Ok(format!("{}/{key}", self.base_url))
    }

    fn remove_image(&self, key: &str) -> Result<(), MediaError> {
        self.objects()?.remove(key);
        Ok(())
    }
}

/// In-process stand-in for the video archive. Items are keyed by identifier
/// and file name the way the archive lays out downloads.
#[derive(Debug)]
pub struct ArchiveVideoStore {
    base_url: String,
    items: Mutex<HashMap<(String, String), usize>>,
}

impl ArchiveVideoStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            items: Mutex::new(HashMap::new()),
        }
    }

    pub fn stored_bytes(&self, identifier: &str, file_name: &str) -> Option<usize> {
        self.items
            .lock()
            .ok()?
            .get(&(identifier.to_string(), file_name.to_string()))
            .copied()
    }
}

impl VideoArchive for ArchiveVideoStore {
    fn put_video(&self, identifier: &str, file: &MediaFile) -> Result<String, MediaError> {
        let file_name = file.safe_name();
        let mut items = self
            .items
            .lock()
            .map_err(|_| MediaError::Unavailable("video archive lock poisoned".to_string()))?;
        items.insert((identifier.to_string(), file_name.clone()), file.bytes.len());
        Ok(archive_download_url(&self.base_url, identifier, &file_name))
    }
}
