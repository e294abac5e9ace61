use serde::Deserialize;

use super::{
    DEFAULT_CHANNEL, DEFAULT_VERSION, OsImage, OsImageSettings, check_channel, is_valid_url,
};
use crate::diagnostics::Diagnostics;
use crate::extension::{Extension, decode_body};

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
struct Config {
    channel: String,
    version: String,
    arch: String,
    ipxe_script_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_string(),
            version: DEFAULT_VERSION.to_string(),
            arch: "amd64".to_string(),
            ipxe_script_url: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct PacketFlatcar {
    config: Config,
}

pub fn new() -> Box<dyn OsImage> {
    Box::new(PacketFlatcar::default())
}

impl Extension for PacketFlatcar {
    fn name(&self) -> &'static str {
        "packet"
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

        if !matches!(self.config.arch.as_str(), "amd64" | "arm64") {
            diags.error(
                "Invalid architecture",
                format!("arch {:?} must be amd64 or arm64", self.config.arch),
            );
        }

        // arm64 machines boot through a custom iPXE script.
        if self.config.arch == "arm64" {
            let url = self.config.ipxe_script_url.as_deref().unwrap_or_default();
            if !is_valid_url(url) {
                diags.error(
                    "Invalid iPXE script URL",
                    format!("not a valid url: {url:?}"),
                );
            }
        }

        diags
    }
}

impl OsImage for PacketFlatcar {
    fn settings(&self) -> OsImageSettings {
        OsImageSettings {
            channel: self.config.channel.clone(),
            version: self.config.version.clone(),
            arch: Some(self.config.arch.clone()),
            ipxe_script_url: self.config.ipxe_script_url.clone(),
        }
    }
}
