use serde::Deserialize;

use super::{Backend, backend_block, hcl_string};
use crate::diagnostics::Diagnostics;
use crate::extension::{Extension, decode_body};

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
struct Config {
    bucket: String,
    key: String,
    region: String,
    aws_creds_path: Option<String>,
    dynamodb_table: Option<String>,
}

/// State kept in an S3 bucket, optionally locked through DynamoDB.
#[derive(Debug, Default)]
pub struct S3Backend {
    config: Config,
}

pub fn new() -> Box<dyn Backend> {
    Box::new(S3Backend::default())
}

impl Extension for S3Backend {
    fn name(&self) -> &'static str {
        "s3"
    }

    fn decode(&mut self, body: &serde_yaml::Value) -> Result<(), serde_yaml::Error> {
        if let Some(config) = decode_body(body)? {
            self.config = config;
        }
        Ok(())
    }

    fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        for (field, value) in [
            ("bucket", &self.config.bucket),
            ("key", &self.config.key),
            ("region", &self.config.region),
        ] {
            if value.is_empty() {
                diags.error(
                    format!("S3 backend {field} is required"),
                    format!("Set backend.config.{field}"),
                );
            }
        }
        diags
    }
}

impl Backend for S3Backend {
    fn render(&self) -> String {
        let c = &self.config;
        let mut attributes = vec![
            ("bucket", hcl_string(&c.bucket)),
            ("key", hcl_string(&c.key)),
            ("region", hcl_string(&c.region)),
        ];
        if let Some(path) = &c.aws_creds_path {
            attributes.push(("shared_credentials_file", hcl_string(path)));
        }
        if let Some(table) = &c.dynamodb_table {
            attributes.push(("dynamodb_table", hcl_string(table)));
        }
        backend_block("s3", &attributes)
    }
}
