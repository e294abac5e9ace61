//! Extension registry.
//!
//! One name-keyed table per extension category, populated from an explicit
//! list of constructors in [`ExtensionRegistry::builtin`]. Later stages obtain
//! extensions only through the lookup methods here; nothing holds a concrete
//! extension type.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    ExtensionRegistry                      │
//! │  platform   backend   network   flatcar   component       │
//! │     │          │         │         │          │           │
//! │     ▼          ▼         ▼         ▼          ▼           │
//! │  name ──► constructor ──► fresh Box<dyn Category>          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Registering a name twice within a category panics: registration only
//! happens from build-time wiring, so a collision is a packaging bug.

use std::collections::BTreeMap;
use std::fmt;

use crate::backend::{self, Backend};
use crate::components::{self, Component};
use crate::error::{LokoError, Result};
use crate::flatcar::{self, OsImage};
use crate::network::{self, Network};
use crate::platform::{self, Platform};

/// Constructor for a fresh, undecoded extension instance.
pub type Constructor<T> = fn() -> Box<T>;

struct Category<T: ?Sized> {
    label: &'static str,
    constructors: BTreeMap<&'static str, Constructor<T>>,
}

impl<T: ?Sized> Category<T> {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            constructors: BTreeMap::new(),
        }
    }

    fn register(&mut self, name: &'static str, constructor: Constructor<T>) {
        if self.constructors.contains_key(name) {
            panic!("{} with name {:?} registered already", self.label, name);
        }
        self.constructors.insert(name, constructor);
    }

    fn get(&self, name: &str) -> Result<Box<T>> {
        match self.constructors.get(name) {
            Some(constructor) => Ok(constructor()),
            None => Err(LokoError::not_found(self.label, name, self.names())),
        }
    }

    fn names(&self) -> Vec<String> {
        self.constructors.keys().map(|k| k.to_string()).collect()
    }
}

/// Registry of all known extensions, one table per category.
pub struct ExtensionRegistry {
    platforms: Category<dyn Platform>,
    backends: Category<dyn Backend>,
    networks: Category<dyn Network>,
    os_images: Category<dyn OsImage>,
    components: Category<dyn Component>,
}

impl ExtensionRegistry {
    /// Create an empty registry (for testing).
    pub fn empty() -> Self {
        Self {
            platforms: Category::new("platform"),
            backends: Category::new("backend"),
            networks: Category::new("network"),
            os_images: Category::new("flatcar"),
            components: Category::new("component"),
        }
    }

    /// Create registry with all built-in extensions.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();

        registry.register_platform("packet", platform::packet::new);
        registry.register_platform("bare-metal", platform::baremetal::new);

        registry.register_backend("local", backend::local::new);
        registry.register_backend("s3", backend::s3::new);

        registry.register_network("packet", network::packet::new);
        registry.register_network("bare-metal", network::baremetal::new);

        registry.register_os_image("packet", flatcar::packet::new);
        registry.register_os_image("bare-metal", flatcar::baremetal::new);

        registry.register_component("contour", components::contour::new);
        registry.register_component("cert-manager", components::cert_manager::new);

        registry
    }

    pub fn register_platform(
        &mut self,
        name: &'static str,
        constructor: Constructor<dyn Platform>,
    ) {
        self.platforms.register(name, constructor);
    }

    pub fn register_backend(&mut self, name: &'static str, constructor: Constructor<dyn Backend>) {
        self.backends.register(name, constructor);
    }

    pub fn register_network(&mut self, name: &'static str, constructor: Constructor<dyn Network>) {
        self.networks.register(name, constructor);
    }

    pub fn register_os_image(&mut self, name: &'static str, constructor: Constructor<dyn OsImage>) {
        self.os_images.register(name, constructor);
    }

    pub fn register_component(
        &mut self,
        name: &'static str,
        constructor: Constructor<dyn Component>,
    ) {
        self.components.register(name, constructor);
    }

    pub fn platform(&self, name: &str) -> Result<Box<dyn Platform>> {
        self.platforms.get(name)
    }

    pub fn backend(&self, name: &str) -> Result<Box<dyn Backend>> {
        self.backends.get(name)
    }

    pub fn network(&self, name: &str) -> Result<Box<dyn Network>> {
        self.networks.get(name)
    }

    pub fn os_image(&self, name: &str) -> Result<Box<dyn OsImage>> {
        self.os_images.get(name)
    }

    pub fn component(&self, name: &str) -> Result<Box<dyn Component>> {
        self.components.get(name)
    }

    /// Registered names per category, in category order.
    pub fn catalog(&self) -> Vec<(&'static str, Vec<String>)> {
        vec![
            (self.platforms.label, self.platforms.names()),
            (self.backends.label, self.backends.names()),
            (self.networks.label, self.networks.names()),
            (self.os_images.label, self.os_images.names()),
            (self.components.label, self.components.names()),
        ]
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ExtensionRegistry");
        for (label, names) in self.catalog() {
            s.field(label, &names);
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let registry = ExtensionRegistry::builtin();
        let catalog = registry.catalog();

        assert_eq!(catalog.len(), 5);
        let platforms = &catalog[0].1;
        assert!(platforms.contains(&"packet".to_string()));
        assert!(platforms.contains(&"bare-metal".to_string()));

        let backends = &catalog[1].1;
        assert_eq!(backends, &vec!["local".to_string(), "s3".to_string()]);
    }

    #[test]
    fn test_lookup_returns_fresh_instances() {
        let registry = ExtensionRegistry::builtin();

        let a = registry.platform("packet").unwrap();
        let b = registry.platform("packet").unwrap();
        assert_eq!(a.name(), "packet");
        assert_eq!(b.name(), "packet");
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let registry = ExtensionRegistry::builtin();

        let err = registry.component("nonexistent").err().unwrap();
        match err {
            LokoError::ExtensionNotFound {
                category,
                name,
                available,
            } => {
                assert_eq!(category, "component");
                assert_eq!(name, "nonexistent");
                assert!(available.contains(&"contour".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[should_panic(expected = "registered already")]
    fn test_duplicate_registration_panics() {
        let mut registry = ExtensionRegistry::empty();
        registry.register_backend("local", backend::local::new);
        registry.register_backend("local", backend::local::new);
    }

    #[test]
    fn test_same_name_in_different_categories_is_allowed() {
        let mut registry = ExtensionRegistry::empty();
        registry.register_platform("packet", platform::packet::new);
        registry.register_network("packet", network::packet::new);

        assert!(registry.platform("packet").is_ok());
        assert!(registry.network("packet").is_ok());
        assert!(registry.os_image("packet").is_err());
    }
}
