//! Web app manifest model consumed read-only by every producer.
//!
//! # Design
//! - Well-known members are typed; everything else is kept in `extra` so a
//!   re-encoded manifest never drops caller data.
//! - An explicit `null` on a typed member reads as absent and is omitted on
//!   re-encode, matching how user agents ignore null manifest members.
//!   Nulls on untyped members stay in `extra` untouched.
//! - Validation happens at the boundary; this module only parses declared sizes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Web application manifest as supplied by the caller.
///
/// `{"display": null}` and `{}` decode to the same value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebAppManifest {
    /// Full application name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Short name for space-constrained launchers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// URL loaded when the app launches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
    /// Navigation scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Preferred display mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Default orientation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    /// Theme colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
    /// Background colour, also used to flatten transparent icons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Primary language tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Text direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Icon declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icons: Option<Vec<ManifestIcon>>,
    /// Store categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Members without a typed field.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the manifest `icons` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestIcon {
    /// Image location, relative to the site URL or a `data:` URI.
    pub src: String,
    /// Space-separated `WxH` tokens or `any`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
    /// Declared MIME type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Declared purpose (`any`, `maskable`, `monochrome`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Members without a typed field.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ManifestIcon {
    /// Largest `WxH` declared in `sizes`, by area.
    ///
    /// Returns `None` for `any`, a missing member, or when no token parses.
    #[must_use]
    pub fn largest_size(&self) -> Option<(u32, u32)> {
        self.sizes
            .as_deref()?
            .split_whitespace()
            .filter_map(parse_size_token)
            .max_by_key(|(width, height)| u64::from(*width) * u64::from(*height))
    }
}

fn parse_size_token(token: &str) -> Option<(u32, u32)> {
    let (width, height) = token.split_once(['x', 'X'])?;
    let width = width.parse::<u32>().ok()?;
    let height = height.parse::<u32>().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}
