//! Image asset producer: one resized PNG per declared icon and platform family.
//!
//! # Design
//! - Variants are planned up front so their paths are unique within a family.
//! - Each variant is independent; one failure never stops the others.
//! - At most `concurrency` variants are in flight; outcomes keep plan order.
//! - Decoding, resampling and encoding run on the blocking pool.

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::stream::{self, StreamExt};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use pwakit_config::{DEFAULT_IMAGE_CONCURRENCY, PlatformFamily};
use tracing::{debug, warn};
use url::Url;

use crate::archive::Archive;
use crate::error::AssetError;
use crate::fetch::SourceFetcher;
use crate::manifest::ManifestIcon;
use crate::request::BundleRequest;
use crate::task::{Producer, TaskOutcome};

/// Largest edge, in pixels, a variant may request.
pub const MAX_EDGE: u32 = 4096;

const WHITE: [u8; 3] = [0xff, 0xff, 0xff];

/// Producer for the icons of one platform family.
pub struct ImageProducer {
    id: String,
    family: PlatformFamily,
    fetcher: Arc<dyn SourceFetcher>,
    concurrency: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Variant {
    path: String,
    src: String,
    width: u32,
    height: u32,
}

impl ImageProducer {
    /// Producer for `family`, fetching remote sources through `fetcher`.
    #[must_use]
    pub fn new(family: PlatformFamily, fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self {
            id: format!("images/{}", family.as_str()),
            family,
            fetcher,
            concurrency: DEFAULT_IMAGE_CONCURRENCY,
        }
    }

    /// Cap on variants fetched and rendered at once. Zero is treated as one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Target platform family.
    #[must_use]
    pub const fn family(&self) -> PlatformFamily {
        self.family
    }

    async fn process(
        &self,
        archive: &Archive,
        base: &Url,
        background: Option<[u8; 3]>,
        variant: &Variant,
    ) -> TaskOutcome {
        match self.render(base, background, variant).await {
            Ok(bytes) => {
                debug!(path = %variant.path, bytes = bytes.len(), "image variant rendered");
                archive.insert(variant.path.clone(), bytes);
                TaskOutcome::succeeded(variant.path.clone())
            }
            Err(err) => {
                warn!(path = %variant.path, src = %variant.src, error = %err, "image variant failed");
                TaskOutcome::failed(variant.path.clone(), err)
            }
        }
    }

    async fn render(
        &self,
        base: &Url,
        background: Option<[u8; 3]>,
        variant: &Variant,
    ) -> Result<Vec<u8>, AssetError> {
        if variant.width > MAX_EDGE || variant.height > MAX_EDGE {
            return Err(AssetError::InvalidSize {
                path: variant.path.clone(),
                width: variant.width,
                height: variant.height,
            });
        }

        let source = self.acquire(base, variant).await?;
        let path = variant.path.clone();
        let (width, height) = (variant.width, variant.height);
        tokio::task::spawn_blocking(move || transform(&source, width, height, background, &path))
            .await
            .map_err(|source| AssetError::Blocking {
                operation: "render_image",
                source: Arc::new(source),
            })?
    }

    async fn acquire(&self, base: &Url, variant: &Variant) -> Result<Vec<u8>, AssetError> {
        let bytes = if variant.src.starts_with("data:") {
            decode_data_uri(&variant.src)?
        } else {
            let url = base
                .join(&variant.src)
                .map_err(|_| AssetError::invalid_source(&variant.src, "unresolvable icon src"))?;
            self.fetcher
                .fetch(&url)
                .await
                .map_err(|source| AssetError::fetch(&url, source))?
        };
        if bytes.is_empty() {
            return Err(AssetError::EmptyContent {
                path: variant.path.clone(),
            });
        }
        Ok(bytes)
    }
}

#[async_trait]
impl Producer for ImageProducer {
    fn id(&self) -> &str {
        &self.id
    }

    async fn produce(
        &self,
        archive: &Archive,
        request: &BundleRequest,
    ) -> Result<Vec<TaskOutcome>, AssetError> {
        let icons = request
            .manifest
            .icons
            .as_deref()
            .filter(|icons| !icons.is_empty())
            .ok_or_else(|| AssetError::producer_fatal(&self.id, "manifest declares no icons"))?;
        let base = Url::parse(&request.site_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| AssetError::producer_fatal(&self.id, "site url is not absolute"))?;

        let background = self.family.flattens_alpha().then(|| {
            request
                .manifest
                .background_color
                .as_deref()
                .and_then(parse_hex_color)
                .unwrap_or(WHITE)
        });

        let variants = plan_variants(self.family, icons);
        debug!(
            producer = %self.id,
            variants = variants.len(),
            concurrency = self.concurrency,
            "planned image variants"
        );
        let outcomes = stream::iter(0..variants.len())
            .map(|index| self.process(archive, &base, background, &variants[index]))
            .buffered(self.concurrency)
            .collect()
            .await;
        Ok(outcomes)
    }
}

fn plan_variants(family: PlatformFamily, icons: &[ManifestIcon]) -> Vec<Variant> {
    let fallback = family.default_edge();
    let mut seen = HashSet::new();
    icons
        .iter()
        .filter_map(|icon| {
            let (width, height) = icon.largest_size().unwrap_or((fallback, fallback));
            let path = format!("{}/{width}x{height}.png", family.directory());
            seen.insert(path.clone()).then(|| Variant {
                path,
                src: icon.src.clone(),
                width,
                height,
            })
        })
        .collect()
}

fn decode_data_uri(src: &str) -> Result<Vec<u8>, AssetError> {
    let (meta, payload) = src
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| AssetError::invalid_source(src, "malformed data uri"))?;
    if !meta.ends_with(";base64") {
        return Err(AssetError::invalid_source(
            src,
            "only base64 data uris are supported",
        ));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|_| AssetError::invalid_source(src, "invalid base64 payload"))
}

fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0_u8; 3];
            for (slot, digit) in rgb.iter_mut().zip(hex.chars()) {
                *slot = channel(&format!("{digit}{digit}"))?;
            }
            Some(rgb)
        }
        6 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ]),
        _ => None,
    }
}

fn transform(
    bytes: &[u8],
    width: u32,
    height: u32,
    background: Option<[u8; 3]>,
    path: &str,
) -> Result<Vec<u8>, AssetError> {
    let decoded = image::load_from_memory(bytes).map_err(|source| AssetError::decode(path, source))?;
    let resized = decoded.resize_exact(width, height, FilterType::Lanczos3);
    let output = match background {
        Some(rgb) => DynamicImage::ImageRgb8(flatten(&resized.to_rgba8(), rgb)),
        None => resized,
    };

    let mut buffer = Cursor::new(Vec::new());
    output
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|source| AssetError::encode(path, source))?;
    Ok(buffer.into_inner())
}

fn flatten(image: &RgbaImage, background: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgba([r, g, b, a]) = *image.get_pixel(x, y);
        Rgb([
            blend(r, background[0], a),
            blend(g, background[1], a),
            blend(b, background[2], a),
        ])
    })
}

fn blend(foreground: u8, background: u8, alpha: u8) -> u8 {
    let alpha = u16::from(alpha);
    let mixed = (u16::from(foreground) * alpha + u16::from(background) * (255 - alpha) + 127) / 255;
    u8::try_from(mixed).unwrap_or(u8::MAX)
}
