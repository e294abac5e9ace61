//! Terraform state backends.
//!
//! Each backend renders the `terraform { backend ... }` block written to
//! `terraform/backend.tf`.

pub mod local;
pub mod s3;

use crate::extension::Extension;

pub trait Backend: Extension {
    /// Render the backend block.
    fn render(&self) -> String;
}

/// Quote a value as an HCL string literal.
pub(crate) fn hcl_string(value: &str) -> String {
    // JSON string escaping is a subset of HCL's.
    serde_json::Value::String(value.to_string()).to_string()
}

/// Wrap `attributes` (name, quoted value) in a backend block.
pub(crate) fn backend_block(kind: &str, attributes: &[(&str, String)]) -> String {
    let width = attributes.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

    let mut lines = Vec::new();
    lines.push("terraform {".to_string());
    if attributes.is_empty() {
        lines.push(format!("  backend {} {{}}", hcl_string(kind)));
    } else {
        lines.push(format!("  backend {} {{", hcl_string(kind)));
        for (key, value) in attributes {
            lines.push(format!("    {key:<width$} = {value}"));
        }
        lines.push("  }".to_string());
    }
    lines.push("}".to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
