use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::first_matching_file;

/// Size of generated thumbnails (square)
pub const THUMBNAIL_SIZE: u32 = 120;

/// JPEG quality for cached thumbnails
const THUMBNAIL_QUALITY: u8 = 85;

/// Extensions picked as thumbnail sources
pub const THUMBNAIL_SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif"];

/// What happened when generating a thumbnail.
///
/// Only `Created` carries a usable path; callers treat the rest as
/// "no thumbnail".
#[derive(Debug, Clone, PartialEq)]
pub enum ThumbnailOutcome {
    Created(PathBuf),
    /// Folder missing, unreadable, or without any image
    NotFound,
    DecodeError(String),
    WriteError(String),
}

impl ThumbnailOutcome {
    /// Value stored in the `thumbnail_path` column
    pub fn into_stored(self) -> String {
        match self {
            ThumbnailOutcome::Created(path) => path.to_string_lossy().to_string(),
            _ => String::new(),
        }
    }
}

/// Directory of generated client thumbnails
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    dir: PathBuf,
}

impl ThumbnailCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Build a thumbnail from the first image directly inside `folder`.
    ///
    /// Never fails; every problem is reported through the outcome.
    pub fn generate(&self, folder: &Path, client_name: &str) -> ThumbnailOutcome {
        let Some(source) = first_matching_file(folder, THUMBNAIL_SOURCE_EXTENSIONS) else {
            debug!(folder = ?folder, "No thumbnail source image");
            return ThumbnailOutcome::NotFound;
        };

        let img = match decode(&source) {
            Ok(img) => img,
            Err(e) => return ThumbnailOutcome::DecodeError(format!("{}: {}", source.display(), e)),
        };

        let rgb = img.to_rgb8();
        let thumbnail = imageops::resize(&rgb, THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);

        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let thumbnail_path = self.path_for(client_name, &file_name);

        if let Err(e) = fs::create_dir_all(&self.dir) {
            return ThumbnailOutcome::WriteError(format!("{}: {}", self.dir.display(), e));
        }

        let file = match File::create(&thumbnail_path) {
            Ok(file) => file,
            Err(e) => return ThumbnailOutcome::WriteError(format!("{}: {}", thumbnail_path.display(), e)),
        };

        // The whole thumbnail fits in the buffer, so disk errors only show up on flush
        let mut writer = BufWriter::new(file);
        let encoded = JpegEncoder::new_with_quality(&mut writer, THUMBNAIL_QUALITY).encode_image(&thumbnail);
        let written = encoded
            .map_err(|e| e.to_string())
            .and_then(|()| writer.flush().map_err(|e| e.to_string()));
        drop(writer);

        if let Err(e) = written {
            let _ = fs::remove_file(&thumbnail_path);
            return ThumbnailOutcome::WriteError(format!("{}: {}", thumbnail_path.display(), e));
        }

        info!(source = ?source, thumbnail = ?thumbnail_path, "Generated thumbnail");
        ThumbnailOutcome::Created(thumbnail_path)
    }

    /// Same as `generate`, on tokio's blocking pool.
    pub async fn generate_async(&self, folder: PathBuf, client_name: String) -> ThumbnailOutcome {
        let cache = self.clone();
        tokio::task::spawn_blocking(move || cache.generate(&folder, &client_name))
            .await
            .unwrap_or_else(|e| ThumbnailOutcome::DecodeError(format!("Task join error: {}", e)))
    }

    /// Cache file for a client, keyed on a hash of the source file name
    pub fn path_for(&self, client_name: &str, source_file_name: &str) -> PathBuf {
        let digest = format!("{:x}", Sha256::digest(source_file_name.as_bytes()));
        self.dir.join(format!(
            "avatar_{}_{}.jpg",
            sanitize_file_stem(client_name),
            &digest[..12]
        ))
    }
}

/// Decode by content, falling back to the extension when the header is unknown.
fn decode(source: &Path) -> Result<DynamicImage, String> {
    ImageReader::open(source)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| e.to_string())?
        .decode()
        .map_err(|e| e.to_string())
}

/// Keep letters, digits, '-' and '_'; replace everything else.
fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    if stem.is_empty() {
        "client".to_string()
    } else {
        stem
    }
}
