//! Capability providers
//!
//! Rules that declare dependencies get them from a [`CapabilityProvider`]
//! supplied per validation call. Lookups are by normalized type name (the
//! last path segment) and, for keyed parameters, a [`DependencyKey`].
//!
//! [`ServiceRegistry`] is the stock map-backed provider:
//!
//! ```rust
//! use nebula_validator::prelude::*;
//!
//! struct Clock { now: i64 }
//!
//! let services = ServiceRegistry::builder()
//!     .typed(Clock { now: 0 })
//!     .keyed("Region", "eu", String::from("eu-west-1"))
//!     .build();
//!
//! assert!(services.resolve("Clock").is_ok());
//! assert!(services.resolve_keyed("Region", &DependencyKey::from("eu")).is_ok());
//! assert!(services.resolve_keyed("Region", &DependencyKey::from("us")).is_err());
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::compile::{DependencyKey, DependencyRef};
use crate::foundation::ResolveError;
use crate::model::TypeName;

/// A resolved dependency.
pub type Capability = Arc<dyn Any + Send + Sync>;

/// Source of dependencies for rule invocations.
pub trait CapabilityProvider: Send + Sync {
    /// Resolves an unkeyed dependency.
    ///
    /// # Errors
    ///
    /// [`ResolveError::ServiceNotFound`] when nothing is registered.
    fn resolve(&self, type_name: &str) -> Result<Capability, ResolveError>;

    /// Resolves a keyed dependency. Providers without keyed support keep
    /// the default, which reports [`ResolveError::Unsupported`].
    ///
    /// # Errors
    ///
    /// [`ResolveError::ServiceNotFound`] for unknown keys,
    /// [`ResolveError::Unsupported`] without keyed support.
    fn resolve_keyed(&self, type_name: &str, key: &DependencyKey) -> Result<Capability, ResolveError> {
        let _ = key;
        Err(ResolveError::Unsupported {
            type_name: type_name.to_string(),
        })
    }
}

impl<P: CapabilityProvider + ?Sized> CapabilityProvider for Arc<P> {
    fn resolve(&self, type_name: &str) -> Result<Capability, ResolveError> {
        (**self).resolve(type_name)
    }

    fn resolve_keyed(&self, type_name: &str, key: &DependencyKey) -> Result<Capability, ResolveError> {
        (**self).resolve_keyed(type_name, key)
    }
}

/// Resolves one dependency through `provider`.
pub(crate) fn resolve_ref(
    provider: &dyn CapabilityProvider,
    dependency: &DependencyRef,
) -> Result<Capability, ResolveError> {
    match &dependency.key {
        None => provider.resolve(&dependency.type_name),
        Some(key) => provider.resolve_keyed(&dependency.type_name, key),
    }
}

/// Provider with nothing registered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoServices;

impl CapabilityProvider for NoServices {
    fn resolve(&self, type_name: &str) -> Result<Capability, ResolveError> {
        Err(ResolveError::ServiceNotFound {
            type_name: type_name.to_string(),
            key: None,
        })
    }
}

// ============================================================================
// SERVICE REGISTRY
// ============================================================================

/// Map-backed [`CapabilityProvider`] with keyed support.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: HashMap<Arc<str>, Capability>,
    keyed: HashMap<(Arc<str>, DependencyKey), Capability>,
}

impl ServiceRegistry {
    /// Builder.
    #[must_use]
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::default()
    }

    /// Number of registrations, keyed ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len() + self.keyed.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CapabilityProvider for ServiceRegistry {
    fn resolve(&self, type_name: &str) -> Result<Capability, ResolveError> {
        self.services
            .get(type_name)
            .cloned()
            .ok_or_else(|| ResolveError::ServiceNotFound {
                type_name: type_name.to_string(),
                key: None,
            })
    }

    fn resolve_keyed(&self, type_name: &str, key: &DependencyKey) -> Result<Capability, ResolveError> {
        self.keyed
            .get(&(Arc::from(type_name), key.clone()))
            .cloned()
            .ok_or_else(|| ResolveError::ServiceNotFound {
                type_name: type_name.to_string(),
                key: Some(key.to_string()),
            })
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.services.keys().map(ToString::to_string).collect();
        names.extend(self.keyed.keys().map(|(ty, key)| format!("{ty}[{key}]")));
        names.sort_unstable();
        f.debug_struct("ServiceRegistry").field("services", &names).finish()
    }
}

/// Builder for [`ServiceRegistry`].
#[derive(Default)]
#[must_use = "builder methods must be chained or built"]
pub struct ServiceRegistryBuilder {
    registry: ServiceRegistry,
}

impl ServiceRegistryBuilder {
    /// Registers a service under an explicit type name.
    pub fn service<T: Any + Send + Sync>(mut self, type_name: &str, value: T) -> Self {
        self.registry
            .services
            .insert(normalized(type_name), Arc::new(value));
        self
    }

    /// Registers a service under its own (short) type name.
    pub fn typed<T: Any + Send + Sync>(self, value: T) -> Self {
        let name = std::any::type_name::<T>();
        self.service(name, value)
    }

    /// Registers a keyed service.
    pub fn keyed<T: Any + Send + Sync>(
        mut self,
        type_name: &str,
        key: impl Into<DependencyKey>,
        value: T,
    ) -> Self {
        self.registry
            .keyed
            .insert((normalized(type_name), key.into()), Arc::new(value));
        self
    }

    /// Finishes the registry.
    pub fn build(self) -> ServiceRegistry {
        self.registry
    }
}

fn normalized(type_name: &str) -> Arc<str> {
    Arc::from(TypeName::new(type_name).name())
}
