//! Platform extensions.
//!
//! A platform owns the cluster-level configuration (name, asset directory,
//! node groups) and renders the cluster's Terraform input. Worker pool and
//! hardware reservation rules shared by platforms live here.

pub mod baremetal;
pub mod packet;

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::diagnostics::Diagnostics;
use crate::dns::{DnsConfig, DnsMode};
use crate::error::Result;
use crate::extension::Extension;
use crate::flatcar::OsImageSettings;
use crate::network::NetworkSettings;

/// Everything a platform needs from the other resolved sections to render.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub network: NetworkSettings,
    pub os_image: Option<OsImageSettings>,
}

pub trait Platform: Extension {
    fn cluster_name(&self) -> &str;

    /// Asset directory with a leading `~` expanded.
    fn asset_dir(&self) -> PathBuf;

    /// Controllers plus every worker pool's node count.
    fn expected_nodes(&self) -> usize;

    fn dns(&self) -> Option<&DnsConfig> {
        None
    }

    fn dns_mode(&self) -> DnsMode {
        self.dns()
            .and_then(DnsConfig::mode)
            .unwrap_or(DnsMode::Unmanaged)
    }

    /// Engine targets that must exist before manual DNS can be configured.
    fn staged_targets(&self) -> Vec<String> {
        Vec::new()
    }

    /// Checks that need the environment rather than the configuration
    /// (credentials and the like). Runs before anything is rendered.
    fn preflight(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Render the cluster's Terraform configuration.
    fn render(&self, ctx: &RenderContext) -> Result<String>;
}

/// Flatten a tag map into the sorted `key:value` list the providers accept.
pub fn flatten_tags(tags: &HashMap<String, String>) -> Vec<String> {
    let mut list: Vec<String> = tags.iter().map(|(k, v)| format!("{k}:{v}")).collect();
    list.sort();
    list
}

/// Which kind of node group a reservation map belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Controller,
    Worker,
}

impl NodeRole {
    fn key_prefix(self) -> &'static str {
        match self {
            NodeRole::Controller => "controller-",
            NodeRole::Worker => "worker-",
        }
    }

    fn error_prefix(self) -> &'static str {
        match self {
            NodeRole::Controller => "Cluster",
            NodeRole::Worker => "Worker pool",
        }
    }
}

pub const NEXT_AVAILABLE: &str = "next-available";

/// True if `key` is `<role>-<int>`.
pub fn is_valid_reservation_key(key: &str, role: NodeRole) -> bool {
    if !key.starts_with(role.key_prefix()) {
        return false;
    }
    let parts: Vec<&str> = key.split('-').collect();
    if parts.len() != 2 {
        return false;
    }
    parts[1].parse::<i64>().is_ok()
}

/// Validate one node group's hardware reservations.
///
/// A group uses either specific reservation IDs or a shared default, never
/// both, and specific IDs never use the `next-available` sentinel.
pub fn check_reservations(
    reservation_ids: &BTreeMap<String, String>,
    reservation_ids_default: Option<&str>,
    name: &str,
    role: NodeRole,
) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let prefix = role.error_prefix();

    let has_default = reservation_ids_default.is_some_and(|d| !d.is_empty());
    if !reservation_ids.is_empty() && has_default {
        diags.error(
            format!("{prefix} can't set both: reservation_ids and reservation_ids_default"),
            format!(
                "{prefix}: {name:?} sets both, \
                 instead add an entry in reservation_ids for each node"
            ),
        );
    }

    for value in reservation_ids.values() {
        if value == NEXT_AVAILABLE {
            diags.error(
                format!("{prefix} reservation_ids entries can't use \"{NEXT_AVAILABLE}\""),
                format!(
                    "{prefix}: {name:?} uses it, use specific UUIDs or reservation_ids_default only"
                ),
            );
        }
    }

    for key in reservation_ids.keys() {
        if !is_valid_reservation_key(key, role) {
            diags.error(
                "Invalid reservation ID",
                format!(
                    "{prefix}: {name:?} used {key:?}, format should be \"{}<int>\"",
                    role.key_prefix()
                ),
            );
        }
    }

    diags
}

/// A node group as seen by the reservation ordering.
#[derive(Debug, Clone)]
pub struct ReservationGroup<'a> {
    /// Engine output that resolves once the group's nodes exist.
    pub target: String,
    pub reservation_ids: &'a BTreeMap<String, String>,
}

/// Dependency hints for every group, in input order.
///
/// Groups with specific reservation IDs are created first: every other group
/// depends on all of them. Groups with specific IDs get no hints.
pub fn nodes_depend_on(groups: &[ReservationGroup<'_>]) -> Vec<Vec<String>> {
    let specific: Vec<String> = groups
        .iter()
        .filter(|g| !g.reservation_ids.is_empty())
        .map(|g| g.target.clone())
        .collect();

    groups
        .iter()
        .map(|g| {
            if g.reservation_ids.is_empty() {
                specific.clone()
            } else {
                Vec::new()
            }
        })
        .collect()
}

/// Report every worker pool name that appears more than once.
pub fn check_unique_pool_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name) {
            diags.error(
                "Worker pools name should be unique",
                format!("Worker pool {name:?} is duplicated"),
            );
        }
    }
    diags
}
