//! Configuration resolution.
//!
//! Turns a [`ClusterDocument`] into a [`ClusterDescriptor`] by looking up
//! every section's extension in the registry, decoding and validating it.
//! Resolution stops at the first failing section, before any engine runs.
//!
//! | Section    | Absent                      |
//! |------------|-----------------------------|
//! | cluster    | `ConfigurationIncomplete`   |
//! | backend    | built-in `local` backend    |
//! | flatcar    | [`Section::Absent`]         |
//! | network    | `Validation` error          |
//! | components | none configured             |

use std::collections::BTreeMap;

use crate::backend::{self, Backend};
use crate::components::Component;
use crate::config::{ClusterDocument, SectionConfig};
use crate::descriptor::ClusterDescriptor;
use crate::diagnostics::{Diagnostics, Severity};
use crate::error::{LokoError, Result};
use crate::extension::Extension;
use crate::flatcar::OsImage;
use crate::network::Network;
use crate::output::Output;
use crate::platform::Platform;
use crate::registry::ExtensionRegistry;

/// Outcome of resolving an optional section.
pub enum Section<T> {
    Present(T),
    Absent,
}

impl<T> Section<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Section::Present(value) => Some(value),
            Section::Absent => None,
        }
    }
}

/// Decode and validate a freshly looked-up extension.
fn load<E: Extension + ?Sized>(
    mut extension: Box<E>,
    section: &str,
    body: &serde_yaml::Value,
) -> Result<Box<E>> {
    extension
        .decode(body)
        .map_err(|e| LokoError::decode(section, &e))?;

    let diags = extension.validate();
    for warning in diags.iter().filter(|d| d.severity == Severity::Warning) {
        tracing::warn!(
            section,
            summary = %warning.summary,
            detail = %warning.detail,
            "configuration warning"
        );
        Output::warning(format!("{section}: {}; {}", warning.summary, warning.detail));
    }
    if diags.has_errors() {
        return Err(LokoError::validation(section, diags));
    }
    Ok(extension)
}

fn section_name<'a>(section: &'a SectionConfig, what: &str) -> Result<&'a str> {
    section
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| LokoError::ConfigurationIncomplete(format!("{what} section has no name")))
}

pub fn resolve_platform(
    doc: &ClusterDocument,
    registry: &ExtensionRegistry,
) -> Result<Box<dyn Platform>> {
    let Some(section) = &doc.cluster else {
        return Err(LokoError::ConfigurationIncomplete("no platform configured".to_string()));
    };
    let name = section_name(section, "cluster")?;
    let platform = registry.platform(name)?;
    load(platform, &format!("cluster {name}"), &section.config)
}

pub fn resolve_backend(
    doc: &ClusterDocument,
    registry: &ExtensionRegistry,
) -> Result<Box<dyn Backend>> {
    let Some(section) = &doc.backend else {
        tracing::debug!("no backend configured, using local");
        return Ok(backend::local::new());
    };
    let name = section_name(section, "backend")?;
    let backend = registry.backend(name)?;
    load(backend, &format!("backend {name}"), &section.config)
}

pub fn resolve_os_image(
    doc: &ClusterDocument,
    registry: &ExtensionRegistry,
    platform: &str,
) -> Result<Section<Box<dyn OsImage>>> {
    let Some(section) = &doc.flatcar else {
        return Ok(Section::Absent);
    };
    let name = section.name.as_deref().unwrap_or(platform);
    let image = registry.os_image(name)?;
    load(image, &format!("flatcar {name}"), &section.config).map(Section::Present)
}

pub fn resolve_network(
    doc: &ClusterDocument,
    registry: &ExtensionRegistry,
    platform: &str,
) -> Result<Box<dyn Network>> {
    let Some(section) = &doc.network else {
        let mut diags = Diagnostics::new();
        diags.error("Network not configured", "Add a network section to the configuration");
        return Err(LokoError::validation("network", diags));
    };
    let name = section.name.as_deref().unwrap_or(platform);
    let network = registry.network(name)?;
    load(network, &format!("network {name}"), &section.config)
}

pub fn resolve_components(
    doc: &ClusterDocument,
    registry: &ExtensionRegistry,
) -> Result<BTreeMap<String, Box<dyn Component>>> {
    let mut components = BTreeMap::new();
    for section in &doc.components {
        let name = section_name(section, "component")?;
        if components.contains_key(name) {
            let mut diags = Diagnostics::new();
            diags.error(
                "Component names should be unique",
                format!("Component {name:?} is configured more than once"),
            );
            return Err(LokoError::validation(format!("component {name}"), diags));
        }
        let component = registry.component(name)?;
        let component = load(component, &format!("component {name}"), &section.config)?;
        components.insert(name.to_string(), component);
    }
    Ok(components)
}

/// Resolve the whole document.
pub fn resolve(doc: &ClusterDocument, registry: &ExtensionRegistry) -> Result<ClusterDescriptor> {
    let platform = resolve_platform(doc, registry)?;
    let backend = resolve_backend(doc, registry)?;
    let os_image = resolve_os_image(doc, registry, platform.name())?;
    let network = resolve_network(doc, registry, platform.name())?;
    let components = resolve_components(doc, registry)?;

    let descriptor = ClusterDescriptor {
        platform,
        backend,
        network,
        os_image: os_image.into_option(),
        components,
    };
    tracing::debug!(?descriptor, "resolved cluster configuration");
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKET: &str = r#"
cluster:
  name: packet
  config:
    cluster_name: demo
    asset_dir: /tmp/demo
    project_id: p-1
    facility: ams1
    ssh_pubkeys: ["ssh-ed25519 AAAA"]
    dns:
      zone: example.com
      provider:
        route53:
          zone_id: Z1
    worker_pools:
      - name: general
        count: 2
network:
  config: {}
"#;

    fn resolve_str(yaml: &str) -> Result<ClusterDescriptor> {
        resolve(&ClusterDocument::parse(yaml).unwrap(), &ExtensionRegistry::builtin())
    }

    #[test]
    fn test_missing_platform() {
        let err = resolve_str("network:\n  config: {}\n").unwrap_err();
        assert!(matches!(
            err,
            LokoError::ConfigurationIncomplete(ref m) if m == "no platform configured"
        ));
    }

    #[test]
    fn test_unknown_platform() {
        let err = resolve_str("cluster:\n  name: aws\n").unwrap_err();
        assert!(matches!(err, LokoError::ExtensionNotFound { category: "platform", .. }));
    }

    #[test]
    fn test_defaults_for_optional_sections() {
        let descriptor = resolve_str(PACKET).unwrap();
        assert_eq!(descriptor.platform.name(), "packet");
        assert_eq!(descriptor.backend.name(), "local");
        assert_eq!(descriptor.network.name(), "packet");
        assert!(descriptor.os_image.is_none());
        assert!(descriptor.components.is_empty());
        assert_eq!(descriptor.platform.expected_nodes(), 3);
    }

    #[test]
    fn test_warnings_do_not_block_resolution() {
        let yaml = PACKET.replace("project_id: p-1", "project_id: p-1\n    controller_count: 2");
        let descriptor = resolve_str(&yaml).unwrap();
        assert_eq!(descriptor.platform.expected_nodes(), 4);
    }

    #[test]
    fn test_network_is_mandatory() {
        let yaml = PACKET.replace("network:\n  config: {}\n", "");
        let err = resolve_str(&yaml).unwrap_err();
        match err {
            LokoError::Validation { section, diagnostics } => {
                assert_eq!(section, "network");
                assert!(diagnostics.to_string().contains("Network not configured"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validation_error_names_section() {
        let yaml = PACKET.replace("count: 2", "count: 2\n      - name: general\n        count: 1");
        let err = resolve_str(&yaml).unwrap_err();
        match err {
            LokoError::Validation { section, diagnostics } => {
                assert_eq!(section, "cluster packet");
                assert!(diagnostics.to_string().contains("\"general\" is duplicated"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_error_names_section() {
        let yaml = format!("{PACKET}backend:\n  name: s3\n  config:\n    bucket: [1, 2]\n");
        let err = resolve_str(&yaml).unwrap_err();
        assert!(matches!(err, LokoError::Decode { ref section, .. } if section == "backend s3"));
    }

    #[test]
    fn test_flatcar_section_defaults_to_platform_name() {
        let yaml = format!("{PACKET}flatcar:\n  config:\n    channel: beta\n");
        let descriptor = resolve_str(&yaml).unwrap();
        let image = descriptor.os_image.unwrap();
        assert_eq!(image.name(), "packet");
        assert_eq!(image.settings().channel, "beta");
    }

    #[test]
    fn test_components_in_document_order() {
        let yaml = format!(
            "{PACKET}{}",
            r#"components:
  - name: contour
    config:
      install_mode: deployment
  - name: cert-manager
    config:
      email: ops@example.com
"#
        );
        let descriptor = resolve_str(&yaml).unwrap();
        assert_eq!(descriptor.components.len(), 2);
    }

    #[test]
    fn test_component_validation_aborts() {
        let yaml = format!("{PACKET}components:\n  - name: contour\n");
        let err = resolve_str(&yaml).unwrap_err();
        assert!(matches!(
            err,
            LokoError::Validation { ref section, .. } if section == "component contour"
        ));
    }

    #[test]
    fn test_section_outcome() {
        let present: Section<u8> = Section::Present(1);
        assert_eq!(present.into_option(), Some(1));
        assert!(Section::<u8>::Absent.into_option().is_none());
    }
}
