//! Method registry: method identifier to implementation.
//!
//! The registry replaces a fixed dispatch table. Built-in methods are
//! registered once in [`MethodRegistry::global()`]; tools that need a
//! differently configured set build their own with [`MethodRegistry::new`]
//! and [`MethodRegistry::register`].
//!
//! # Example
//!
//! ```rust
//! use gamma_device::{MethodId, MethodRegistry};
//!
//! let registry = MethodRegistry::global();
//! assert!(registry.contains(MethodId::Dummy));
//!
//! let site = registry.open_site(MethodId::Dummy, None).unwrap();
//! assert_eq!(site.partitions_available(), 2);
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use gamma_core::{ErrorCode, Result};
use tracing::{debug, warn};

use crate::backend::Method;
use crate::dummy::{DummyConfig, DummyMethod};
use crate::{MethodId, Site};

/// Central registry of adjustment methods.
///
/// Iteration follows method identifier order.
#[derive(Clone, Default)]
pub struct MethodRegistry {
    methods: BTreeMap<MethodId, Arc<dyn Method>>,
}

impl MethodRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in methods, configuring the
    /// simulated method with `dummy`.
    pub fn with_builtin(dummy: DummyConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DummyMethod::new(dummy)));
        registry
    }

    /// Returns the global registry instance with built-in methods.
    ///
    /// The simulated method reads its configuration from the file named by
    /// [`crate::dummy::CONFIG_ENV`]; a file that fails to load is logged
    /// and replaced by the defaults.
    pub fn global() -> &'static MethodRegistry {
        static INSTANCE: OnceLock<MethodRegistry> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let config = DummyConfig::from_env().unwrap_or_else(|err| {
                warn!(error = %err, "ignoring dummy configuration");
                DummyConfig::default()
            });
            Self::with_builtin(config)
        })
    }

    /// Registers a method, returning the one it replaces.
    pub fn register(&mut self, method: Arc<dyn Method>) -> Option<Arc<dyn Method>> {
        let id = method.id();
        debug!(method = %id, "registering method");
        self.methods.insert(id, method)
    }

    /// Looks a method up.
    pub fn get(&self, id: MethodId) -> Option<&dyn Method> {
        self.methods.get(&id).map(|m| m.as_ref())
    }

    /// Whether a method is registered.
    pub fn contains(&self, id: MethodId) -> bool {
        self.methods.contains_key(&id)
    }

    /// Registered methods in identifier order.
    pub fn methods(&self) -> impl Iterator<Item = &dyn Method> + '_ {
        self.methods.values().map(|m| m.as_ref())
    }

    /// Identifiers of the registered methods.
    pub fn ids(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.methods.keys().copied()
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether no method is registered.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Opens a site of a registered method.
    ///
    /// Fails with [`ErrorCode::NoSuchAdjustmentMethod`] for methods that are
    /// not registered.
    pub fn open_site(&self, id: MethodId, identifier: Option<&str>) -> Result<Site> {
        let method = self.get(id).ok_or(ErrorCode::NoSuchAdjustmentMethod)?;
        Site::open(method, identifier)
    }
}

impl std::fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.methods.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let registry = MethodRegistry::new();
        assert!(registry.is_empty());
        let err = registry.open_site(MethodId::XRandr, None).unwrap_err();
        assert_eq!(err.library_code(), Some(ErrorCode::NoSuchAdjustmentMethod));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = MethodRegistry::with_builtin(DummyConfig::default());
        assert_eq!(registry.len(), 1);
        let previous = registry.register(Arc::new(DummyMethod::default()));
        assert!(previous.is_some());
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![MethodId::Dummy]);
    }

    #[test]
    fn test_global_has_dummy() {
        assert!(MethodRegistry::global().contains(MethodId::Dummy));
        assert!(MethodId::Dummy.is_available());
        assert!(!MethodId::QuartzCg.is_available());
    }
}
