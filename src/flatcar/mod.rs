//! OS image ("flatcar") extensions: which Flatcar Container Linux release the
//! nodes boot.

pub mod baremetal;
pub mod packet;

use crate::diagnostics::Diagnostics;
use crate::extension::Extension;

pub const CHANNELS: &[&str] = &["stable", "beta", "alpha", "edge"];
pub const DEFAULT_CHANNEL: &str = "stable";
pub const DEFAULT_VERSION: &str = "current";

/// Resolved OS image parameters, as consumed by platform rendering.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct OsImageSettings {
    pub channel: String,
    pub version: String,
    pub arch: Option<String>,
    pub ipxe_script_url: Option<String>,
}

pub trait OsImage: Extension {
    fn settings(&self) -> OsImageSettings;
}

pub(crate) fn check_channel(diags: &mut Diagnostics, channel: &str) {
    if !CHANNELS.contains(&channel) {
        diags.error(
            "Invalid Flatcar channel",
            format!("channel {channel:?} must be one of: {}", CHANNELS.join(", ")),
        );
    }
}

/// True for an absolute URL with both a scheme and a host.
pub fn is_valid_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(url) => !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://example.com/arm64.ipxe"));
        assert!(is_valid_url("http://10.0.0.1:8080/boot"));

        assert!(!is_valid_url(""));
        assert!(!is_valid_url("/relative/path"));
        assert!(!is_valid_url("example.com/boot"));
        assert!(!is_valid_url("file:///tmp/boot.ipxe"));
    }

    #[test]
    fn test_check_channel() {
        let mut diags = Diagnostics::new();
        check_channel(&mut diags, "beta");
        assert!(diags.is_empty());

        check_channel(&mut diags, "nightly");
        assert!(diags.has_errors());
    }
}
