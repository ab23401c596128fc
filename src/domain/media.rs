use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::ComposerError;

/// 5 MiB.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub enum PayloadSource {
    Memory(Bytes),
    File(PathBuf),
}

/// A file as delivered by a file input: declared size plus a lazily read payload.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub content_type: String,
    pub size: u64,
    pub source: PayloadSource,
}

impl RawFile {
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size: data.len() as u64,
            source: PayloadSource::Memory(data),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            name,
            content_type: content_type_from_path(path).to_string(),
            size: metadata.len(),
            source: PayloadSource::File(path.to_path_buf()),
        })
    }

    pub fn mime(&self) -> &str {
        if self.content_type.is_empty() {
            FALLBACK_CONTENT_TYPE
        } else {
            &self.content_type
        }
    }

    /// Largest of the declared size and, for path-backed files, the size on disk now.
    pub async fn current_size(&self) -> u64 {
        match &self.source {
            PayloadSource::Memory(data) => self.size.max(data.len() as u64),
            PayloadSource::File(path) => match tokio::fs::metadata(path).await {
                Ok(metadata) => self.size.max(metadata.len()),
                Err(_) => self.size,
            },
        }
    }

    pub async fn read(&self) -> std::io::Result<Bytes> {
        match &self.source {
            PayloadSource::Memory(data) => Ok(data.clone()),
            PayloadSource::File(path) => tokio::fs::read(path).await.map(Bytes::from),
        }
    }
}

pub fn content_type_from_path(path: &Path) -> &'static str {
    match image::ImageFormat::from_path(path) {
        Ok(format) => format.to_mime_type(),
        Err(_) => FALLBACK_CONTENT_TYPE,
    }
}

pub fn data_uri(mime: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}

pub fn check_image_size(size: u64, max_bytes: u64) -> Result<(), ComposerError> {
    if size > max_bytes {
        return Err(ComposerError::size_limit(max_bytes));
    }
    Ok(())
}

/// An image payload that passed the size limit when it entered the draft.
#[derive(Debug, Clone)]
pub struct DraftImage {
    id: Uuid,
    file: RawFile,
}

impl DraftImage {
    pub fn validated(file: RawFile, max_bytes: u64) -> Result<Self, ComposerError> {
        check_image_size(file.size, max_bytes)?;
        Ok(Self {
            id: Uuid::new_v4(),
            file,
        })
    }

    /// Re-asserts the size limit against the payload as it is now.
    pub async fn revalidate(&self, max_bytes: u64) -> Result<(), ComposerError> {
        check_image_size(self.file.current_size().await, max_bytes)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn file(&self) -> &RawFile {
        &self.file
    }
}

/// Display-ready reference to an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview(String);

impl Preview {
    pub fn object_url() -> Self {
        Self(format!("blob:tweetbox/{}", Uuid::new_v4()))
    }

    pub fn data_uri(mime: &str, data: &[u8]) -> Self {
        Self(data_uri(mime, data))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
