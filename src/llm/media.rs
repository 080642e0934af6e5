use base64::{engine::general_purpose, Engine as _};

use crate::config::CONFIG;

/// A decoded, validated image payload ready for the vision call.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ImagePayloadError {
    #[error("imageBase64 is not valid base64")]
    InvalidBase64,
    #[error("image exceeds the maximum size of {0} bytes")]
    TooLarge(usize),
    #[error("payload is not a supported image type")]
    UnsupportedType,
}

pub fn detect_mime_type(data: &[u8]) -> Option<String> {
    if data.len() > 12 {
        let ftyp = &data[4..12];
        if ftyp.starts_with(b"ftyp") {
            let brand = &ftyp[4..8];
            if brand == b"heic" || brand == b"heif" || brand == b"hevc" {
                return Some("image/heic".to_string());
            }
        }
    }

    infer::get(data).map(|kind| kind.mime_type().to_string())
}

fn is_supported_image(mime_type: &str) -> bool {
    matches!(
        mime_type,
        "image/png" | "image/jpeg" | "image/webp" | "image/heic" | "image/heif"
    )
}

/// Decodes and validates the request's base64 image field. The front end
/// sends raw base64 without a data-URL prefix, but one is stripped if
/// present anyway.
pub fn decode_image_payload(image_base64: &str) -> Result<ImagePayload, ImagePayloadError> {
    let trimmed = image_base64.trim();
    let raw = match trimmed.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => trimmed,
    };

    let bytes = general_purpose::STANDARD
        .decode(raw)
        .map_err(|_| ImagePayloadError::InvalidBase64)?;

    if bytes.len() > CONFIG.max_image_bytes {
        return Err(ImagePayloadError::TooLarge(CONFIG.max_image_bytes));
    }

    let mime_type = detect_mime_type(&bytes).ok_or(ImagePayloadError::UnsupportedType)?;
    if !is_supported_image(&mime_type) {
        return Err(ImagePayloadError::UnsupportedType);
    }

    Ok(ImagePayload { bytes, mime_type })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine as _};

    // Smallest valid PNG header plus IHDR start; enough for `infer`.
    const PNG_BYTES: [u8; 16] = [
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
        b'R',
    ];

    #[test]
    fn decodes_a_png_payload() {
        let encoded = general_purpose::STANDARD.encode(PNG_BYTES);
        let payload = decode_image_payload(&encoded).unwrap();
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.bytes, PNG_BYTES);
    }

    #[test]
    fn strips_a_data_url_prefix() {
        let encoded = format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(PNG_BYTES)
        );
        assert!(decode_image_payload(&encoded).is_ok());
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            decode_image_payload("!!! not base64 !!!"),
            Err(ImagePayloadError::InvalidBase64)
        ));
    }

    #[test]
    fn rejects_non_image_bytes() {
        let encoded = general_purpose::STANDARD.encode(b"plain text, not an image");
        assert!(matches!(
            decode_image_payload(&encoded),
            Err(ImagePayloadError::UnsupportedType)
        ));
    }
}
