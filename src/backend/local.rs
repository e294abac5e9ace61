use serde::Deserialize;

use super::{Backend, backend_block, hcl_string};
use crate::diagnostics::Diagnostics;
use crate::extension::{Extension, decode_body};

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
struct Config {
    path: Option<String>,
}

/// State kept on the local filesystem, next to the Terraform root.
#[derive(Debug, Default)]
pub struct LocalBackend {
    config: Config,
}

pub fn new() -> Box<dyn Backend> {
    Box::new(LocalBackend::default())
}

impl Extension for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    fn decode(&mut self, body: &serde_yaml::Value) -> Result<(), serde_yaml::Error> {
        if let Some(config) = decode_body(body)? {
            self.config = config;
        }
        Ok(())
    }

    fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if self.config.path.as_deref() == Some("") {
            diags.error("Invalid local backend path", "path must not be empty when set");
        }
        diags
    }
}

impl Backend for LocalBackend {
    fn render(&self) -> String {
        let attributes: Vec<(&str, String)> = self
            .config
            .path
            .iter()
            .map(|p| ("path", hcl_string(p)))
            .collect();
        backend_block("local", &attributes)
    }
}
