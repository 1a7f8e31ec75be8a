// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test cases: the unit of work that the runner executes.

use crate::{
    display_name::{DisplayNameOptions, default_base_name, format_display_name},
    errors::{ResolveError, SourceInfoAlreadySet},
    metadata::{SharedMethod, SharedType},
    resolve::TypeResolver,
};
use casework_metadata::{ArgValue, SourceInfo, TestCaseSummary, TraitPair};
use std::{fmt, sync::OnceLock};

/// A described test, possibly bound to argument values.
///
/// The identity and display name of a case are fixed at construction. The
/// only thing that can change afterwards is its [`SourceInfo`], which can be
/// set exactly once.
pub struct TestCase {
    type_name: String,
    method_name: String,
    binding: Option<CaseBinding>,
    display_name: String,
    skip_reason: Option<String>,
    arguments: Vec<ArgValue>,
    traits: Traits,
    source: OnceLock<SourceInfo>,
}

#[derive(Clone)]
pub(crate) struct CaseBinding {
    pub(crate) type_info: SharedType,
    pub(crate) method: SharedMethod,
}

impl TestCase {
    /// Creates a case bound to live metadata.
    ///
    /// The display name is computed here, from the method's declaration, its
    /// parameter names and `arguments`.
    pub fn new(
        type_info: SharedType,
        method: SharedMethod,
        arguments: Vec<ArgValue>,
        options: &DisplayNameOptions,
    ) -> Self {
        let fact = method.fact();
        let base_name = fact
            .display_name
            .clone()
            .unwrap_or_else(|| default_base_name(type_info.name(), method.name()));
        let display_name =
            format_display_name(&base_name, &method.parameter_names(), &arguments, options);
        let traits = method
            .traits()
            .into_iter()
            .map(|decl| TraitPair::new(decl.name, decl.value))
            .collect();

        Self {
            type_name: type_info.name().to_owned(),
            method_name: method.name().to_owned(),
            skip_reason: fact.skip_reason().map(|reason| reason.to_owned()),
            binding: Some(CaseBinding { type_info, method }),
            display_name,
            arguments,
            traits: Traits(traits),
            source: OnceLock::new(),
        }
    }

    /// Creates an unbound case from a summary.
    ///
    /// The case's type and method are resolved when it is run.
    pub fn from_summary(summary: TestCaseSummary) -> Self {
        Self {
            type_name: summary.type_name,
            method_name: summary.method_name,
            binding: None,
            display_name: summary.display_name,
            skip_reason: summary.skip_reason.filter(|reason| !reason.is_empty()),
            arguments: summary.arguments,
            traits: Traits(summary.traits),
            source: summary.source.map(OnceLock::from).unwrap_or_default(),
        }
    }

    /// Returns a serializable summary of this case.
    pub fn to_summary(&self) -> TestCaseSummary {
        TestCaseSummary {
            type_name: self.type_name.clone(),
            method_name: self.method_name.clone(),
            display_name: self.display_name.clone(),
            skip_reason: self.skip_reason.clone(),
            arguments: self.arguments.clone(),
            traits: self.traits.0.clone(),
            source: self.source.get().cloned(),
        }
    }

    /// The name of the type declaring the test method.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The name of the test method.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// The display name for this case.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The reason this case is skipped, if it is.
    pub fn skip_reason(&self) -> Option<&str> {
        self.skip_reason.as_deref()
    }

    /// The values bound to the method's parameters.
    pub fn arguments(&self) -> &[ArgValue] {
        &self.arguments
    }

    /// The traits attached to this case.
    pub fn traits(&self) -> &Traits {
        &self.traits
    }

    /// Returns true if this case is bound to live metadata.
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Where this case was declared, if known.
    pub fn source_info(&self) -> Option<&SourceInfo> {
        self.source.get()
    }

    /// Sets where this case was declared.
    ///
    /// Returns an error if source information was already set.
    pub fn set_source_info(&self, info: SourceInfo) -> Result<(), SourceInfoAlreadySet> {
        self.source
            .set(info)
            .map_err(|_| SourceInfoAlreadySet::new(&self.display_name))
    }

    /// Returns the bound metadata, or resolves it through `resolver`.
    pub(crate) fn binding(
        &self,
        resolver: Option<&dyn TypeResolver>,
    ) -> Result<CaseBinding, ResolveError> {
        if let Some(binding) = &self.binding {
            return Ok(binding.clone());
        }
        let resolver = resolver.ok_or_else(|| ResolveError::NoResolver {
            display_name: self.display_name.clone(),
        })?;
        let (type_info, method) = resolver.resolve(&self.type_name, &self.method_name)?;
        Ok(CaseBinding { type_info, method })
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("display_name", &self.display_name)
            .field("bound", &self.binding.is_some())
            .field("skip_reason", &self.skip_reason)
            .field("arguments", &self.arguments)
            .field("traits", &self.traits)
            .field("source", &self.source.get())
            .finish()
    }
}

/// Traits attached to a test case: an ordered list of name/value pairs in
/// which names may repeat.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Traits(Vec<TraitPair>);

impl Traits {
    /// Iterates over every trait, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|pair| (pair.name.as_str(), pair.value.as_str()))
    }

    /// Iterates over the values declared for `name`, in declaration order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.0
            .iter()
            .filter(move |pair| pair.name == name)
            .map(|pair| pair.value.as_str())
    }

    /// Returns the number of traits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no traits.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
