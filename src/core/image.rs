//! Image ingestion - shrink uploads into inline JPEG data URLs.
//!
//! Menu photos and logos are stored inside their documents, so every upload is
//! downscaled and recompressed along a fixed ladder of (max width, quality) steps
//! until the encoded data URL fits the document size limit.

use crate::errors::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, codecs::jpeg::JpegEncoder, imageops::FilterType};
use std::io::Cursor;

/// (max width in pixels, JPEG quality 1-100), tried in order.
pub const LADDER: [(u32, u8); 8] = [
    (500, 60),
    (400, 50),
    (300, 40),
    (250, 35),
    (200, 30),
    (150, 25),
    (120, 20),
    (100, 15),
];

/// Longest data URL that is accepted without trying a smaller step.
pub const MAX_ENCODED_LEN: usize = 400_000;

const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    /// `data:image/jpeg;base64,...`
    pub data_url: String,
    /// Index into [`LADDER`] of the step that produced `data_url`
    pub attempt: usize,
    /// False when even the last step was over the limit
    pub within_limit: bool,
}

impl CompressedImage {
    /// Size in KiB, rounded, as reported to the admin.
    #[must_use]
    pub fn size_kb(&self) -> usize {
        (self.data_url.len() + 512) / 1024
    }
}

/// Decodes `bytes` and compresses them against [`MAX_ENCODED_LEN`].
pub fn compress_image(bytes: &[u8]) -> Result<CompressedImage> {
    compress_with_limit(bytes, MAX_ENCODED_LEN)
}

/// Returns the first ladder step whose data URL is at most `limit` bytes long.
///
/// When no step fits, the last (smallest) step is returned with
/// `within_limit == false` instead of an error.
pub fn compress_with_limit(bytes: &[u8], limit: usize) -> Result<CompressedImage> {
    let img = image::load_from_memory(bytes).map_err(|e| Error::Image {
        message: format!("Unreadable image: {e}"),
    })?;

    let mut last = None;
    for (attempt, &(max_width, quality)) in LADDER.iter().enumerate() {
        let data_url = encode_attempt(&img, max_width, quality)?;
        if data_url.len() <= limit {
            return Ok(CompressedImage {
                data_url,
                attempt,
                within_limit: true,
            });
        }
        tracing::debug!(
            "Ladder step {attempt} ({max_width}px, q{quality}) gave {} bytes, limit {limit}",
            data_url.len()
        );
        last = Some(CompressedImage {
            data_url,
            attempt,
            within_limit: false,
        });
    }

    last.ok_or_else(|| Error::Image {
        message: "No compression steps configured".to_string(),
    })
}

/// Scales `img` down to at most `max_width` (never up) and encodes it as a JPEG data URL.
pub fn encode_attempt(img: &DynamicImage, max_width: u32, quality: u8) -> Result<String> {
    let scaled = if img.width() > max_width {
        let scale = f64::from(max_width) / f64::from(img.width());
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let height = ((f64::from(img.height()) * scale).floor() as u32).max(1);
        img.resize_exact(max_width, height, FilterType::Triangle)
    } else {
        img.clone()
    };

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buffer), quality);
    scaled
        .to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| Error::Image {
            message: format!("Failed to encode JPEG: {e}"),
        })?;

    Ok(format!("{DATA_URL_PREFIX}{}", STANDARD.encode(&buffer)))
}

/// Runs [`compress_image`] on the blocking pool.
pub async fn compress_image_async(bytes: Vec<u8>) -> Result<CompressedImage> {
    tokio::task::spawn_blocking(move || compress_image(&bytes))
        .await
        .map_err(|e| Error::Image {
            message: format!("Image worker failed: {e}"),
        })?
}

/// Decodes the payload of a `data:` URL back into raw bytes.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let (_, payload) = data_url
        .split_once(";base64,")
        .ok_or_else(|| Error::Image {
            message: "Not a base64 data URL".to_string(),
        })?;
    STANDARD.decode(payload).map_err(|e| Error::Image {
        message: format!("Invalid base64 image data: {e}"),
    })
}
