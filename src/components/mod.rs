//! Add-on components installed on top of the cluster through the release
//! engine.

pub mod apply;
pub mod cert_manager;
pub mod contour;

use crate::extension::Extension;

pub trait Component: Extension {
    /// Namespace the component's release lives in.
    fn namespace(&self) -> &str;

    /// Chart values for the release.
    fn values(&self) -> anyhow::Result<serde_yaml::Value>;
}
