use crate::{Error, Result};
use std::path::Path;

pub fn detect_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        [_, _, _, _, b'f', b't', b'y', b'p', brand @ ..] if brand.len() >= 4 => {
            match &brand[..4] {
                b"heic" | b"heix" | b"hevc" | b"hevx" => Some("image/heic"),
                b"mif1" | b"msf1" | b"heif" => Some("image/heif"),
                _ => None,
            }
        }
        _ => None,
    }
}

pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// MIME type of the image content; bytes that are not a supported image are rejected.
///
/// The extension only feeds a warning when it disagrees with the content.
pub fn resolve_mime(path: &Path, bytes: &[u8]) -> Result<&'static str> {
    let Some(detected) = detect_image_mime(bytes) else {
        return Err(Error::InvalidInput(format!(
            "{} is not a recognized image (first 4 bytes: {:02X?}); supported: JPEG, PNG, WebP, GIF, HEIC/HEIF, or set the MIME type explicitly",
            path.display(),
            &bytes[..bytes.len().min(4)]
        )));
    };

    if let Some(by_extension) = mime_from_extension(path) {
        if by_extension != detected {
            tracing::warn!(
                "{} has a {} extension but {} content; sending {}",
                path.display(),
                by_extension,
                detected,
                detected
            );
        }
    }
    Ok(detected)
}
