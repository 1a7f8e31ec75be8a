// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The boundary between casework and whatever describes tests.
//!
//! casework doesn't know how tests are declared. A metadata provider exposes
//! each test's declaring type and method through the [`TypeInfo`] and
//! [`MethodInfo`] traits, and setup/teardown behavior through
//! [`BeforeAfterHook`].

use crate::errors::BoxError;
use casework_metadata::ArgValue;
use std::{any::Any, fmt, sync::Arc};

/// A shared reference to a type descriptor.
pub type SharedType = Arc<dyn TypeInfo>;

/// A shared reference to a method descriptor.
pub type SharedMethod = Arc<dyn MethodInfo>;

/// A shared reference to a hook.
pub type SharedHook = Arc<dyn BeforeAfterHook>;

/// Setup and teardown behavior attached to a test's declaring type or method.
///
/// For every hook whose `before` succeeds, `after` is called once the test
/// method has run (or been skipped because a later hook failed).
pub trait BeforeAfterHook: Send + Sync {
    /// A name for this hook, used in events.
    fn name(&self) -> &str;

    /// Called before the test method runs.
    fn before(&self, method: &dyn MethodInfo) -> Result<(), BoxError>;

    /// Called after the test method runs.
    fn after(&self, method: &dyn MethodInfo) -> Result<(), BoxError>;
}

/// Access to a value as [`Any`], implemented for every sized `'static` type.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &(dyn Any + 'static);

    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut (dyn Any + 'static);
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &(dyn Any + 'static) {
        self
    }

    fn as_any_mut(&mut self) -> &mut (dyn Any + 'static) {
        self
    }
}

/// An instance of a test's declaring type.
pub trait TestObject: AsAny + Send {
    /// Returns the disposal capability for this instance, if it has one.
    fn as_dispose(&mut self) -> Option<&mut dyn Dispose> {
        None
    }
}

impl dyn TestObject + '_ {
    /// Returns a reference to the concrete instance, if it is a `T`.
    pub fn downcast_ref<T: TestObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    /// Returns a mutable reference to the concrete instance, if it is a `T`.
    pub fn downcast_mut<T: TestObject>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

impl fmt::Debug for dyn TestObject + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestObject").finish_non_exhaustive()
    }
}

/// Releases resources held by a test instance.
pub trait Dispose {
    /// Disposes of the instance. Called at most once, after all hooks.
    fn dispose(&mut self) -> Result<(), BoxError>;
}

/// Describes a test's declaring type.
pub trait TypeInfo: Send + Sync {
    /// The name of the type.
    fn name(&self) -> &str;

    /// Hooks declared on the type, in declaration order.
    fn hooks(&self) -> Vec<SharedHook> {
        Vec::new()
    }

    /// Constructs a fresh instance using the type's default construction.
    fn create_instance(&self) -> Result<Box<dyn TestObject>, BoxError>;

    /// Looks up a method declared on this type.
    fn method(&self, _name: &str) -> Option<SharedMethod> {
        None
    }
}

/// Describes a test method.
pub trait MethodInfo: Send + Sync {
    /// The name of the method.
    fn name(&self) -> &str;

    /// Returns true if the method doesn't need an instance of its type.
    fn is_static(&self) -> bool {
        false
    }

    /// The method's declared parameter names, in order.
    fn parameter_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Hooks declared on the method, in declaration order.
    fn hooks(&self) -> Vec<SharedHook> {
        Vec::new()
    }

    /// Traits declared on the method, in declaration order.
    fn traits(&self) -> Vec<TraitDecl> {
        Vec::new()
    }

    /// The test declaration itself.
    fn fact(&self) -> FactMetadata {
        FactMetadata::default()
    }

    /// Invokes the method.
    ///
    /// `instance` is `None` for static methods.
    fn invoke(
        &self,
        instance: Option<&mut dyn TestObject>,
        arguments: &[ArgValue],
    ) -> Result<(), BoxError>;
}

/// The test declaration attached to a method.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FactMetadata {
    /// Overrides the base display name, which is otherwise `<type>.<method>`.
    pub display_name: Option<String>,

    /// If set and non-empty, the test is always skipped with this reason.
    pub skip: Option<String>,
}

impl FactMetadata {
    /// Returns the skip reason if the declaration marks the test as skipped.
    pub fn skip_reason(&self) -> Option<&str> {
        self.skip.as_deref().filter(|reason| !reason.is_empty())
    }
}

/// A trait declaration on a test method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraitDecl {
    /// The trait's name.
    pub name: String,

    /// The trait's value.
    pub value: String,
}

impl TraitDecl {
    /// Creates a new trait declaration.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Resolves the ordered list of hooks that apply to a method: type-level hooks
/// first, then method-level hooks.
pub(crate) fn resolve_hooks(type_info: &dyn TypeInfo, method: &dyn MethodInfo) -> Vec<SharedHook> {
    let mut hooks = type_info.hooks();
    hooks.extend(method.hooks());
    hooks
}
