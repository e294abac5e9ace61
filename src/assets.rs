//! Asset directory layout.
//!
//! ```text
//! <asset_dir>/
//! ├── terraform/                      engine working directory
//! │   ├── backend.tf
//! │   └── cluster.tf
//! ├── lokomotive-kubernetes/          module library
//! │   ├── bootkube/resources/charts/  control plane charts
//! │   └── components/                 add-on component charts
//! └── cluster-assets/auth/kubeconfig
//! ```

use directories::BaseDirs;
use std::path::{Path, PathBuf};

/// Expand a leading `~` or `~/` to the home directory.
///
/// Anything else (including `~user`) is returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path {
        "~" => "",
        p => match p.strip_prefix("~/") {
            Some(rest) => rest,
            None => return PathBuf::from(path),
        },
    };
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => PathBuf::from(path),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    root: PathBuf,
}

impl AssetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn terraform_dir(&self) -> PathBuf {
        self.root.join("terraform")
    }

    pub fn module_library(&self) -> PathBuf {
        self.root.join("lokomotive-kubernetes")
    }

    pub fn control_plane_chart(&self, name: &str) -> PathBuf {
        self.module_library()
            .join("bootkube")
            .join("resources")
            .join("charts")
            .join(name)
    }

    pub fn component_chart(&self, name: &str) -> PathBuf {
        self.module_library().join("components").join(name)
    }

    pub fn kubeconfig(&self) -> PathBuf {
        self.root
            .join("cluster-assets")
            .join("auth")
            .join("kubeconfig")
    }

    /// The explicit override if given, otherwise the cluster's own kubeconfig.
    pub fn resolve_kubeconfig(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => expand_home(&path.to_string_lossy()),
            None => self.kubeconfig(),
        }
    }
}
