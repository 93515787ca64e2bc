//! Conversion of locally selected image files into inline data urls

use std::fmt::{Display, Formatter};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use futures::future::join_all;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The default upper bound for a single image: 5 MiB
pub const DEFAULT_MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// A file as it was selected by the organizer
#[derive(Clone, Debug)]
pub struct SelectedFile {
    /// The original filename
    pub name: String,
    /// Raw content of the file
    pub bytes: Bytes,
}

impl SelectedFile {
    /// Read a file from disk
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            bytes: Bytes::from(bytes),
        })
    }
}

/// An image that was accepted into the selection
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq)]
pub struct IngestedImage {
    /// The original filename
    pub name: String,
    /// `data:<mime>;base64,<content>`
    pub data_url: String,
}

/// A file that was skipped because it exceeds the size limit
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, Eq, PartialEq)]
pub struct OversizedFileWarning {
    /// The original filename
    #[schema(example = "holiday.png")]
    pub name: String,
    /// Size of the file in bytes
    pub size: usize,
    /// The limit that was exceeded
    pub limit: usize,
}

impl Display for OversizedFileWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Image {} is too large ({} bytes). Maximum is {} bytes.",
            self.name, self.size, self.limit
        )
    }
}

/// The outcome of a single ingestion batch
#[derive(Serialize, Deserialize, Clone, Debug, Default, Eq, PartialEq)]
pub struct IngestReport {
    /// Accepted images
    pub images: Vec<IngestedImage>,
    /// One warning per skipped file
    pub warnings: Vec<OversizedFileWarning>,
}

/// Turns selected files into inline images while enforcing a per-file size limit
#[derive(Clone, Copy, Debug)]
pub struct ImageIngestor {
    max_size: usize,
}

impl Default for ImageIngestor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IMAGE_SIZE)
    }
}

impl ImageIngestor {
    /// Create an ingestor that accepts files up to `max_size` bytes
    pub fn new(max_size: usize) -> Self {
        Self { max_size }
    }

    /// The per-file limit in bytes
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Ingest a batch of files.
    ///
    /// Every file is encoded on its own, an oversized file only produces a warning
    /// and never aborts the batch.
    pub async fn ingest(&self, files: Vec<SelectedFile>) -> IngestReport {
        let results = join_all(files.into_iter().map(|file| self.ingest_one(file))).await;

        let mut report = IngestReport::default();
        for result in results {
            match result {
                Ok(image) => report.images.push(image),
                Err(warning) => report.warnings.push(warning),
            }
        }
        report
    }

    async fn ingest_one(&self, file: SelectedFile) -> Result<IngestedImage, OversizedFileWarning> {
        let size = file.bytes.len();
        if size > self.max_size {
            warn!("Skipping {}: {size} bytes exceeds {}", file.name, self.max_size);
            return Err(OversizedFileWarning {
                name: file.name,
                size,
                limit: self.max_size,
            });
        }

        let encoded = STANDARD.encode(&file.bytes);

        debug!("Ingested {} ({size} bytes)", file.name);

        Ok(IngestedImage {
            data_url: format!("data:{};base64,{encoded}", mime_type(&file.name)),
            name: file.name,
        })
    }
}

/// Guess the mime type of an image by its file extension
pub fn mime_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// The images currently selected for a draft
#[derive(Serialize, Deserialize, Clone, Debug, Default, Eq, PartialEq)]
pub struct Selection {
    images: Vec<IngestedImage>,
}

impl Selection {
    /// Append newly ingested images
    pub fn extend(&mut self, images: impl IntoIterator<Item = IngestedImage>) {
        self.images.extend(images);
    }

    /// Remove the image at `index`.
    ///
    /// Returns the removed image, the order of the remaining ones is kept.
    pub fn remove(&mut self, index: usize) -> Option<IngestedImage> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    /// Drop all images
    pub fn clear(&mut self) {
        self.images.clear();
    }

    /// The selected images in selection order
    pub fn images(&self) -> &[IngestedImage] {
        &self.images
    }

    /// The data urls of the selected images, as stored with an invitation
    pub fn data_urls(&self) -> Vec<String> {
        self.images.iter().map(|i| i.data_url.clone()).collect()
    }

    /// Number of selected images
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether no image is selected
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: usize) -> SelectedFile {
        SelectedFile {
            name: name.to_string(),
            bytes: Bytes::from(vec![0u8; size]),
        }
    }

    #[tokio::test]
    async fn encodes_as_data_url() {
        let report = ImageIngestor::default()
            .ingest(vec![SelectedFile {
                name: "dot.PNG".to_string(),
                bytes: Bytes::from_static(b"hello"),
            }])
            .await;

        assert!(report.warnings.is_empty());
        assert_eq!(
            report.images,
            vec![IngestedImage {
                name: "dot.PNG".to_string(),
                data_url: "data:image/png;base64,aGVsbG8=".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn oversized_file_is_reported_and_skipped() {
        let report = ImageIngestor::default()
            .ingest(vec![
                file("a.jpg", 10),
                file("huge.jpg", DEFAULT_MAX_IMAGE_SIZE + 1),
                file("b.gif", DEFAULT_MAX_IMAGE_SIZE),
            ])
            .await;

        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].name, "huge.jpg");
        assert_eq!(report.warnings[0].limit, DEFAULT_MAX_IMAGE_SIZE);
        assert!(report.warnings[0].to_string().contains("huge.jpg"));

        let names: Vec<_> = report.images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["a.jpg", "b.gif"]);
    }

    #[test]
    fn mime_types() {
        assert_eq!(mime_type("x.jpeg"), "image/jpeg");
        assert_eq!(mime_type("logo.svg"), "image/svg+xml");
        assert_eq!(mime_type("README"), "application/octet-stream");
    }

    #[test]
    fn removing_keeps_the_others() {
        let image = |name: &str| IngestedImage {
            name: name.to_string(),
            data_url: format!("data:image/png;base64,{name}"),
        };

        let mut selection = Selection::default();
        selection.extend([image("a"), image("b"), image("c")]);

        assert_eq!(selection.remove(1), Some(image("b")));
        assert_eq!(selection.remove(7), None);
        assert_eq!(selection.images(), [image("a"), image("c")]);
        assert_eq!(
            selection.data_urls(),
            ["data:image/png;base64,a", "data:image/png;base64,c"]
        );
    }
}
