//! Snapshot payload helpers: data-URL encoding, the file-like export payload,
//! and quality-controlled transcoding for export.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;

use crate::errors::SnapshotError;

pub const MIME_PNG: &str = "image/png";
pub const MIME_JPEG: &str = "image/jpeg";

/// Wrap raw encoded image bytes in a `data:` URL.
pub fn encode_data_url(mime: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(data))
}

/// Split a `data:` URL into its MIME type and decoded payload.
pub fn decode_data_url(url: &str) -> Result<(String, Bytes), SnapshotError> {
    let rest = url.strip_prefix("data:").ok_or(SnapshotError::InvalidDataUrl)?;
    let (mime, payload) = rest.split_once(";base64,").ok_or(SnapshotError::InvalidDataUrl)?;
    if mime.is_empty() {
        return Err(SnapshotError::InvalidDataUrl);
    }
    let data = BASE64
        .decode(payload)
        .map_err(|e| SnapshotError::Decode { reason: e.to_string() })?;
    Ok((mime.to_owned(), Bytes::from(data)))
}

// ── SnapshotFile ──────────────────────────────────────────────────────────────

/// A file-like binary payload produced from a snapshot. Purely in-memory;
/// persisting it anywhere is the embedder's business.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotFile {
    pub file_name: String,
    pub mime: String,
    pub data: Bytes,
}

impl SnapshotFile {
    /// Convert an encoded-string snapshot into a file payload. The MIME type
    /// is taken from the URL itself.
    pub fn from_data_url(url: &str, file_name: impl Into<String>) -> Result<Self, SnapshotError> {
        let (mime, data) = decode_data_url(url)?;
        Ok(Self { file_name: file_name.into(), mime, data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// ── Export ────────────────────────────────────────────────────────────────────

/// Caller-chosen export parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Encoder quality in `0.0..=1.0`; only meaningful for lossy targets.
    pub quality: f32,
    pub mime: String,
    pub file_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            quality: 0.95,
            mime: MIME_JPEG.to_owned(),
            file_name: "image.jpg".to_owned(),
        }
    }
}

/// Produce a file payload from a lossless snapshot data-URL, transcoding to
/// the requested MIME type when it differs from the source encoding.
pub fn export_file(data_url: &str, opts: &ExportOptions) -> Result<SnapshotFile, SnapshotError> {
    let source = SnapshotFile::from_data_url(data_url, opts.file_name.clone())?;
    if source.mime == opts.mime {
        return Ok(source);
    }

    match opts.mime.as_str() {
        MIME_JPEG | "image/jpg" => {
            let img = image::load_from_memory(&source.data)
                .map_err(|e| SnapshotError::Decode { reason: e.to_string() })?;
            let quality = (opts.quality.clamp(0.01, 1.0) * 100.0).round() as u8;
            let mut buf = Cursor::new(Vec::new());
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
            // JPEG has no alpha channel.
            img.to_rgb8()
                .write_with_encoder(encoder)
                .map_err(|e| SnapshotError::Encode { reason: e.to_string() })?;
            Ok(SnapshotFile {
                file_name: opts.file_name.clone(),
                mime: MIME_JPEG.to_owned(),
                data: Bytes::from(buf.into_inner()),
            })
        }
        MIME_PNG => Ok(SnapshotFile { mime: MIME_PNG.to_owned(), ..source }),
        other => Err(SnapshotError::UnsupportedMime { mime: other.to_owned() }),
    }
}
