//! Per-device preview URL generation.
//!
//! The CMP expects one preview URL per delivery channel. The channel set is
//! closed; adding a channel is a protocol change coordinated with the CMP,
//! not a configuration knob.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Channel-name to preview-URL mapping reported back to the CMP.
pub type KeyedPreviews = BTreeMap<String, String>;

/// The closed set of preview channels the CMP knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewChannel {
    Default,
    Mobile,
    Desktop,
    Tablet,
    Signage,
}

impl PreviewChannel {
    /// All channels, in reporting order.
    pub const ALL: [PreviewChannel; 5] = [
        Self::Default,
        Self::Mobile,
        Self::Desktop,
        Self::Tablet,
        Self::Signage,
    ];

    /// Channel name as it appears in keyed previews and preview URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Mobile => "mobile",
            Self::Desktop => "desktop",
            Self::Tablet => "tablet",
            Self::Signage => "signage",
        }
    }
}

impl std::fmt::Display for PreviewChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the per-channel preview URLs for a content item.
///
/// Pure and deterministic: the same inputs always yield the same five-entry
/// mapping. URLs are keyed by the content identifier, not the preview
/// request identifier.
pub fn generate_preview_urls(preview_base_url: &str, content_id: &str) -> KeyedPreviews {
    let base = preview_base_url.trim_end_matches('/');

    PreviewChannel::ALL
        .iter()
        .map(|channel| {
            (
                channel.as_str().to_string(),
                format!("{}/preview/{}/{}", base, channel, content_id),
            )
        })
        .collect()
}

#[cfg(test)]
#[path = "preview_urls_tests.rs"]
mod tests;
