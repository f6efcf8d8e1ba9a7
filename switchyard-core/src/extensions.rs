//! Request-scoped typed state.
//!
//! Every dispatch stores the [`MatchedRoute`](crate::MatchedRoute) and the
//! resolved typed request in the request's `Extensions`. The map travels with
//! the request through the middleware chain into the handler and is dropped
//! with it, so two requests in flight never observe each other's state.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Typed values keyed by `TypeId`, one `Arc<T>` per type.
#[derive(Clone, Default)]
pub struct Extensions {
    map: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Extensions {
    #[inline]
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Insert a typed value, replacing any existing value of the same type.
    ///
    /// ```rust
    /// use switchyard_core::Extensions;
    ///
    /// let mut ext = Extensions::new();
    /// ext.insert(42i32);
    /// assert_eq!(ext.get::<i32>(), Some(&42));
    /// ```
    #[inline]
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) {
        self.insert_arc(Arc::new(value));
    }

    /// Insert an Arc-wrapped value directly.
    #[inline]
    pub fn insert_arc<T: Send + Sync + 'static>(&mut self, value: Arc<T>) {
        self.map
            .insert(TypeId::of::<T>(), value as Arc<dyn Any + Send + Sync>);
    }

    #[inline]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|arc| arc.downcast_ref::<T>())
    }

    /// Get an owned handle to a typed value, for use across `.await` points.
    #[inline]
    pub fn get_arc<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|arc| arc.clone().downcast::<T>().ok())
    }

    #[inline]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    /// Returns true if the value existed and was removed.
    #[inline]
    pub fn remove<T: Send + Sync + 'static>(&mut self) -> bool {
        self.map.remove(&TypeId::of::<T>()).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl std::fmt::Debug for Extensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extensions")
            .field("count", &self.map.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut ext = Extensions::new();
        ext.insert(42i32);
        ext.insert("hello".to_string());

        assert_eq!(ext.get::<i32>(), Some(&42));
        assert_eq!(ext.get::<String>(), Some(&"hello".to_string()));
        assert_eq!(ext.get::<f64>(), None);
        assert_eq!(ext.len(), 2);
    }

    #[test]
    fn test_insert_replaces() {
        let mut ext = Extensions::new();
        ext.insert(42i32);
        ext.insert(100i32);
        assert_eq!(ext.get::<i32>(), Some(&100));
    }

    #[test]
    fn test_remove() {
        let mut ext = Extensions::new();
        ext.insert(42i32);
        assert!(ext.remove::<i32>());
        assert!(!ext.contains::<i32>());
        assert!(ext.is_empty());
    }

    #[test]
    fn test_arc_roundtrip_shares_allocation() {
        let mut ext = Extensions::new();
        let arc = Arc::new(7u8);
        ext.insert_arc(arc.clone());

        let retrieved = ext.get_arc::<u8>().unwrap();
        assert!(Arc::ptr_eq(&arc, &retrieved));
    }

    #[test]
    fn test_clones_are_independent() {
        let mut ext = Extensions::new();
        ext.insert(1i32);

        let mut cloned = ext.clone();
        cloned.insert(2i32);

        assert_eq!(ext.get::<i32>(), Some(&1));
        assert_eq!(cloned.get::<i32>(), Some(&2));
    }
}
