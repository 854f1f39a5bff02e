//! Relay URL derivation
//!
//! Maps a camera locator (`rtsp://host:port/path`) onto the relay address for
//! a delivery mode:
//! - Primary:  `<primary_base>/stream/<path>`
//! - Fallback: `<fallback_base>/<path>/index.m3u8`
//!
//! Malformed locators are an expected input. They derive the empty string,
//! which callers treat as "do not attempt playback".

use camview_common::events::DeliveryMode;
use url::Url;

/// Relay base addresses, one per delivery mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEndpoints {
    primary_base: String,
    fallback_base: String,
}

impl RelayEndpoints {
    /// Trailing slashes on the bases are dropped so joins never double them.
    pub fn new(primary_base: impl Into<String>, fallback_base: impl Into<String>) -> Self {
        Self {
            primary_base: primary_base.into().trim_end_matches('/').to_string(),
            fallback_base: fallback_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_for(&self, mode: DeliveryMode) -> &str {
        match mode {
            DeliveryMode::Primary => &self.primary_base,
            DeliveryMode::Fallback => &self.fallback_base,
        }
    }

    /// Derive the delivery URL for `locator` in `mode`
    ///
    /// Returns an empty string when the locator cannot be routed.
    ///
    /// ```
    /// use camview_common::events::DeliveryMode;
    /// use camview_player::negotiator::RelayEndpoints;
    ///
    /// let relay = RelayEndpoints::new("http://relay:8889", "http://relay:8888");
    /// assert_eq!(
    ///     relay.derive("rtsp://cam.local:554/front", DeliveryMode::Primary),
    ///     "http://relay:8889/stream/front"
    /// );
    /// assert_eq!(
    ///     relay.derive("rtsp://cam.local:554/front", DeliveryMode::Fallback),
    ///     "http://relay:8888/front/index.m3u8"
    /// );
    /// assert_eq!(relay.derive("not a url", DeliveryMode::Primary), "");
    /// ```
    pub fn derive(&self, locator: &str, mode: DeliveryMode) -> String {
        let Some(path) = stream_path(locator) else {
            return String::new();
        };

        let base = self.base_for(mode);
        match mode {
            DeliveryMode::Primary => format!("{}/stream/{}", base, path),
            DeliveryMode::Fallback => format!("{}/{}/index.m3u8", base, path),
        }
    }
}

/// Normalized relay path of a locator
///
/// Splits the URL path on `/` and drops empty segments, so leading, trailing
/// and doubled slashes collapse. None when the locator does not parse, has no
/// host, or has no path segments.
pub fn stream_path(locator: &str) -> Option<String> {
    let url = Url::parse(locator.trim()).ok()?;
    url.host_str().filter(|host| !host.is_empty())?;

    let segments: Vec<&str> = url.path().split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}
