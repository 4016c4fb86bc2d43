pub mod html_out;
pub mod zip_out;

pub use image::DynamicImage;

use anyhow::{anyhow, Result};
use base64::{prelude::BASE64_STANDARD, Engine};

/// Decodes the bytes carried by a tile payload.
///
/// Accepts a base64 `data:` URI (`data:image/png;base64,...`) or a bare
/// base64 string.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    let encoded = match payload.strip_prefix("data:") {
        Some(uri) => {
            let (meta, data) = uri
                .split_once(',')
                .ok_or_else(|| anyhow!("Malformed data URI: missing ','"))?;
            if !meta.ends_with(";base64") {
                return Err(anyhow!("Unsupported data URI encoding: {}", meta));
            }
            data
        }
        None => payload,
    };
    BASE64_STANDARD
        .decode(encoded.trim())
        .map_err(|e| anyhow!("Base64 decoding error: {}", e))
}
