//! The resolved cluster: one extension per section, fully decoded and
//! validated.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::assets::AssetLayout;
use crate::backend::Backend;
use crate::components::Component;
use crate::error::Result;
use crate::flatcar::OsImage;
use crate::network::Network;
use crate::platform::{Platform, RenderContext};
use crate::terraform::RenderedConfig;
use crate::verify::ClusterHandle;

pub struct ClusterDescriptor {
    pub platform: Box<dyn Platform>,
    pub backend: Box<dyn Backend>,
    pub network: Box<dyn Network>,
    pub os_image: Option<Box<dyn OsImage>>,
    pub components: BTreeMap<String, Box<dyn Component>>,
}

impl ClusterDescriptor {
    pub fn layout(&self) -> AssetLayout {
        AssetLayout::new(self.platform.asset_dir())
    }

    /// Render the backend block and the cluster configuration.
    pub fn render(&self) -> Result<RenderedConfig> {
        let ctx = RenderContext {
            network: self.network.settings(),
            os_image: self.os_image.as_ref().map(|image| image.settings()),
        };
        Ok(RenderedConfig {
            backend: self.backend.render(),
            cluster: self.platform.render(&ctx)?,
        })
    }

    pub fn cluster_handle(&self, kubeconfig: Option<&Path>) -> ClusterHandle {
        ClusterHandle {
            kubeconfig: self.layout().resolve_kubeconfig(kubeconfig),
            expected_nodes: self.platform.expected_nodes(),
        }
    }
}

impl fmt::Debug for ClusterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterDescriptor")
            .field("platform", &self.platform.name())
            .field("cluster_name", &self.platform.cluster_name())
            .field("backend", &self.backend.name())
            .field("network", &self.network.name())
            .field("os_image", &self.os_image.as_ref().map(|i| i.name()))
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish()
    }
}
