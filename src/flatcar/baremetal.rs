use serde::Deserialize;

use super::{DEFAULT_CHANNEL, DEFAULT_VERSION, OsImage, OsImageSettings, check_channel};
use crate::diagnostics::Diagnostics;
use crate::extension::{Extension, decode_body};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
struct Config {
    channel: String,
    version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_string(),
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct BareMetalFlatcar {
    config: Config,
}

pub fn new() -> Box<dyn OsImage> {
    Box::new(BareMetalFlatcar::default())
}

impl Extension for BareMetalFlatcar {
    fn name(&self) -> &'static str {
        "bare-metal"
    }

    fn decode(&mut self, body: &serde_yaml::Value) -> Result<(), serde_yaml::Error> {
        if let Some(config) = decode_body(body)? {
            self.config = config;
        }
        Ok(())
    }

    fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        check_channel(&mut diags, &self.config.channel);
        diags
    }
}

impl OsImage for BareMetalFlatcar {
    fn settings(&self) -> OsImageSettings {
        OsImageSettings {
            channel: self.config.channel.clone(),
            version: self.config.version.clone(),
            arch: None,
            ipxe_script_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_override() {
        let mut flatcar = BareMetalFlatcar::default();
        flatcar
            .decode(&serde_yaml::from_str("channel: beta\nversion: 2605.5.0").unwrap())
            .unwrap();
        assert!(flatcar.validate().is_empty());
        assert_eq!(flatcar.settings().version, "2605.5.0");
    }
}
