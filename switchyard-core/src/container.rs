// Dependency injection container

use crate::Error;
use crate::logging::{debug, trace};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

type Instance = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn(&Container) -> Instance + Send + Sync>;

#[derive(Clone)]
enum Entry {
    Instance(Instance),
    /// Built on first resolve, then shared
    Lazy {
        cell: Arc<OnceLock<Instance>>,
        factory: Factory,
    },
}

/// The dependency injection container.
///
/// Holds application-wide singletons: services, and the middleware instances
/// referenced by routes. Request-scoped values never live here; they travel
/// in the request's extensions.
#[derive(Clone)]
pub struct Container {
    providers: Arc<RwLock<HashMap<TypeId, Entry>>>,
}

impl Container {
    pub fn new() -> Self {
        debug!("Creating new DI container");
        Self {
            providers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a provider instance
    pub fn register<T: Send + Sync + 'static>(&self, instance: T) {
        self.register_arc(Arc::new(instance));
    }

    /// Register an already shared provider instance
    pub fn register_arc<T: Send + Sync + 'static>(&self, instance: Arc<T>) {
        let type_name = std::any::type_name::<T>();
        trace!(provider = type_name, "Acquiring write lock for registration");
        self.providers
            .write()
            .insert(TypeId::of::<T>(), Entry::Instance(instance as Instance));
        debug!(provider = type_name, "Provider registered in DI container");
    }

    /// Register a lazily built singleton.
    ///
    /// The factory runs at most once, on the first `resolve::<T>()`, and may
    /// itself resolve other providers from the container it is handed.
    pub fn singleton<T, F>(&self, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        let type_name = std::any::type_name::<T>();
        let factory: Factory =
            Arc::new(move |container: &Container| Arc::new(factory(container)) as Instance);
        self.providers.write().insert(
            TypeId::of::<T>(),
            Entry::Lazy {
                cell: Arc::new(OnceLock::new()),
                factory,
            },
        );
        debug!(provider = type_name, "Singleton factory registered");
    }

    /// Resolve a provider by type
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        let type_name = std::any::type_name::<T>();
        trace!(provider = type_name, "Attempting to resolve provider");

        // The lock is released before a lazy factory runs so it can resolve
        // its own dependencies.
        let entry = self.providers.read().get(&TypeId::of::<T>()).cloned();

        let instance = match entry {
            Some(Entry::Instance(instance)) => instance,
            Some(Entry::Lazy { cell, factory }) => cell.get_or_init(|| factory(self)).clone(),
            None => {
                debug!(provider = type_name, "Provider not found in container");
                return Err(Error::ProviderNotFound(type_name.to_string()));
            }
        };

        instance
            .downcast::<T>()
            .map_err(|_| Error::ProviderNotFound(type_name.to_string()))
    }

    /// Check if a provider is registered
    pub fn has<T: Send + Sync + 'static>(&self) -> bool {
        self.providers.read().contains_key(&TypeId::of::<T>())
    }

    /// Clear all providers
    pub fn clear(&self) {
        let mut providers = self.providers.write();
        let count = providers.len();
        providers.clear();
        debug!(provider_count = count, "Cleared all providers from container");
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("providers", &self.providers.read().len())
            .finish()
    }
}
