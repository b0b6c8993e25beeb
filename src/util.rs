//! Data URI helpers.
//!
//! Generated media is carried around as `data:<mime>;base64,<payload>` so a
//! finished item is self-contained and needs no file or network handle.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Encode raw bytes as a base64 data URI.
pub fn data_uri(mime_type: &str, bytes: &[u8]) -> String {
    data_uri_from_base64(mime_type, &BASE64.encode(bytes))
}

/// Wrap an already base64-encoded payload as a data URI.
pub fn data_uri_from_base64(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// A decoded `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    /// Parse a base64 data URI. Returns `None` for anything else.
    pub fn parse(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix("data:")?;
        let (mime_type, payload) = rest.split_once(";base64,")?;
        let bytes = BASE64.decode(payload.trim()).ok()?;
        Some(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

    /// File extension conventionally used for this MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "video/mp4" => "mp4",
            "audio/wav" | "audio/x-wav" => "wav",
            _ => "bin",
        }
    }
}
