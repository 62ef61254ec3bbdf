//! Parent-to-leaf wiring
//!
//! A widget root provides its handle in a [`ContextProvider`]; leaves created
//! under it look the handle up by type. A leaf created without its root gets
//! a [`CollectionError::MissingParent`] instead of a silently dead widget.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::{Arc, RwLock};

use crate::collection::CollectionError;

/// A type-erased value that can be stored in a context
pub trait ContextValue: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn debug_string(&self) -> String;
}

impl<T: Any + Clone + Send + Sync + Debug + 'static> ContextValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn debug_string(&self) -> String {
        format!("{:?}", self)
    }
}

type Values = HashMap<TypeId, Box<dyn ContextValue>>;

/// Typed values visible to everything created under one widget subtree
#[derive(Clone, Default)]
pub struct ContextProvider {
    parent: Option<Box<ContextProvider>>,
    values: Arc<RwLock<Values>>,
}

impl Debug for ContextProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = match self.values.read() {
            Ok(values) => values.values().map(|v| v.debug_string()).collect(),
            Err(_) => Vec::new(),
        };
        f.debug_struct("ContextProvider")
            .field("parent", &self.parent.is_some())
            .field("values", &values)
            .finish()
    }
}

impl ContextProvider {
    /// Create a root context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a nested context that falls back to `parent`
    pub fn with_parent(parent: ContextProvider) -> Self {
        Self {
            parent: Some(Box::new(parent)),
            values: Arc::default(),
        }
    }

    /// Make `value` visible to this context and its children, replacing a
    /// value of the same type
    pub fn provide<T: Clone + Send + Sync + Debug + 'static>(&self, value: T) {
        let mut values = match self.values.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a value, looking through the parent chain
    pub fn consume<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        let found = {
            let values = match self.values.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            values
                .get(&TypeId::of::<T>())
                .and_then(|value| value.as_any().downcast_ref::<T>().cloned())
        };
        match found {
            Some(value) => Some(value),
            None => self.parent.as_ref().and_then(|p| p.consume::<T>()),
        }
    }

    /// Like [`ContextProvider::consume`], but a missing value is a wiring
    /// error naming the leaf and the ancestor it needs
    pub fn require<T: Clone + Send + Sync + 'static>(
        &self,
        component: &'static str,
        parent: &'static str,
    ) -> Result<T, CollectionError> {
        self.consume::<T>()
            .ok_or(CollectionError::MissingParent { component, parent })
    }

    /// Check if a type exists in the context or its parents
    pub fn has<T: 'static>(&self) -> bool {
        let here = match self.values.read() {
            Ok(values) => values.contains_key(&TypeId::of::<T>()),
            Err(poisoned) => poisoned.into_inner().contains_key(&TypeId::of::<T>()),
        };
        here || self.parent.as_ref().is_some_and(|p| p.has::<T>())
    }

    /// Remove a value from this context only
    pub fn remove<T: 'static>(&self) -> bool {
        let mut values = match self.values.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        values.remove(&TypeId::of::<T>()).is_some()
    }
}

/// A shared callback passed in widget props
pub struct Callback<Args, Ret = ()> {
    func: Arc<dyn Fn(Args) -> Ret + Send + Sync>,
}

impl<Args, Ret> Clone for Callback<Args, Ret> {
    fn clone(&self) -> Self {
        Self {
            func: self.func.clone(),
        }
    }
}

impl<Args, Ret> Debug for Callback<Args, Ret> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

impl<Args, Ret> Callback<Args, Ret> {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(Args) -> Ret + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    pub fn call(&self, args: Args) -> Ret {
        (self.func)(args)
    }
}

/// Convenience function for creating a callback
pub fn callback<F, Args, Ret>(func: F) -> Callback<Args, Ret>
where
    F: Fn(Args) -> Ret + Send + Sync + 'static,
{
    Callback::new(func)
}
