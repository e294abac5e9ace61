//! The capability set shared by every extension category.
//!
//! Platforms, backends, networks, OS images and components all decode a
//! configuration fragment into their own typed shape and validate it. The
//! category traits in [`crate::platform`], [`crate::backend`],
//! [`crate::network`], [`crate::flatcar`] and [`crate::components`] build on
//! top of [`Extension`].

use serde::de::DeserializeOwned;

use crate::diagnostics::Diagnostics;

/// Decode + validate, implemented by every extension.
pub trait Extension: Send + Sync {
    /// Registry name of this extension (e.g. "packet").
    fn name(&self) -> &'static str;

    /// Decode the section body into this extension's typed configuration.
    ///
    /// A null body (the section exists but has no `config`) keeps the
    /// extension's defaults.
    fn decode(&mut self, body: &serde_yaml::Value) -> Result<(), serde_yaml::Error>;

    /// Semantic validation of the decoded configuration.
    ///
    /// Must report every problem found, not only the first.
    fn validate(&self) -> Diagnostics;
}

/// Decode `body` into `T`, or `None` when the body is null.
pub fn decode_body<T: DeserializeOwned>(
    body: &serde_yaml::Value,
) -> Result<Option<T>, serde_yaml::Error> {
    if body.is_null() {
        return Ok(None);
    }
    serde_yaml::from_value(body.clone()).map(Some)
}
