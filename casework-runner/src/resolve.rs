// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolving type and method names back to live metadata.
//!
//! A [`TestCase`](crate::test_case::TestCase) constructed from a
//! [`TestCaseSummary`](casework_metadata::TestCaseSummary) only knows the names
//! of its type and method. Before it can run, a [`TypeResolver`] turns those
//! names back into descriptors.

use crate::{
    errors::ResolveError,
    metadata::{SharedMethod, SharedType},
};
use std::collections::BTreeMap;
use tracing::debug;

/// Resolves type and method names to descriptors.
pub trait TypeResolver: Send + Sync {
    /// Resolves the named type and method.
    fn resolve(
        &self,
        type_name: &str,
        method_name: &str,
    ) -> Result<(SharedType, SharedMethod), ResolveError>;
}

/// An in-memory [`TypeResolver`] keyed by type name.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, SharedType>,
}

impl TypeRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type under its own name, replacing any type previously
    /// registered under that name.
    pub fn register(&mut self, type_info: SharedType) -> &mut Self {
        let name = type_info.name().to_owned();
        if self.types.insert(name.clone(), type_info).is_some() {
            debug!(type_name = %name, "replaced previously registered type");
        }
        self
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TypeResolver for TypeRegistry {
    fn resolve(
        &self,
        type_name: &str,
        method_name: &str,
    ) -> Result<(SharedType, SharedMethod), ResolveError> {
        let type_info = self
            .types
            .get(type_name)
            .ok_or_else(|| ResolveError::TypeNotFound {
                type_name: type_name.to_owned(),
            })?;
        let method = type_info
            .method(method_name)
            .ok_or_else(|| ResolveError::MethodNotFound {
                type_name: type_name.to_owned(),
                method_name: method_name.to_owned(),
            })?;
        Ok((type_info.clone(), method))
    }
}
