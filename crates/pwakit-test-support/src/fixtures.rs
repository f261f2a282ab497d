//! Manifest and image fixtures.

use std::io::Cursor;

use image::{DynamicImage, ImageError, ImageFormat, Rgba, RgbaImage};
use pwakit_bundle::{ManifestIcon, WebAppManifest};

/// Site URL used by the sample requests.
pub const SITE_URL: &str = "https://app.example.com/";

/// Encode a solid, half-transparent square PNG of the given edge length.
///
/// # Errors
///
/// Returns the encoder error if the PNG cannot be written.
pub fn png_bytes(edge: u32) -> Result<Vec<u8>, ImageError> {
    let image = RgbaImage::from_pixel(edge, edge, Rgba([32, 96, 160, 128]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image).write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Icon declaration with a single `WxH` size token.
#[must_use]
pub fn icon(src: &str, edge: u32) -> ManifestIcon {
    ManifestIcon {
        src: src.to_string(),
        sizes: Some(format!("{edge}x{edge}")),
        mime_type: Some("image/png".to_string()),
        ..ManifestIcon::default()
    }
}

/// Manifest named `App` declaring the given icons.
#[must_use]
pub fn manifest_with_icons(icons: Vec<ManifestIcon>) -> WebAppManifest {
    WebAppManifest {
        name: Some("App".to_string()),
        short_name: Some("App".to_string()),
        start_url: Some("/".to_string()),
        display: Some("standalone".to_string()),
        background_color: Some("#ffffff".to_string()),
        icons: Some(icons),
        ..WebAppManifest::default()
    }
}

/// Manifest with three distinct icons served from [`SITE_URL`].
#[must_use]
pub fn sample_manifest() -> WebAppManifest {
    manifest_with_icons(vec![
        icon("icons/icon-192.png", 192),
        icon("icons/icon-152.png", 152),
        icon("icons/icon-120.png", 120),
    ])
}
