// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by casework.

use camino::Utf8PathBuf;
use config::ConfigError;
use std::{any::Any, error, fmt, sync::Arc};
use thiserror::Error;

/// An error returned by code under test: a constructor, a hook, a test method
/// or a disposal routine.
pub type BoxError = Box<dyn error::Error + Send + Sync + 'static>;

/// A recorded failure.
///
/// Failures are shared so that events carrying them can be cloned freely.
pub type SharedError = Arc<dyn error::Error + Send + Sync + 'static>;

/// A failure wrapped by the dynamic invocation layer.
///
/// Metadata providers that invoke constructors, hooks or test methods
/// indirectly wrap the underlying failure in this type. The wrapper carries no
/// information about the test itself, so it is stripped by
/// [`unwrap_invocation`] before a failure is recorded.
#[derive(Debug, Error)]
#[error("error invoking `{target}`")]
pub struct InvocationError {
    target: String,
    #[source]
    source: BoxError,
}

impl InvocationError {
    /// Wraps `source` as a failure raised while invoking `target`.
    pub fn new(target: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            target: target.into(),
            source: source.into(),
        }
    }

    /// Returns the name of the invoked target.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the wrapped failure.
    pub fn into_inner(self) -> BoxError {
        self.source
    }
}

/// Strips every [`InvocationError`] layer from `error`, returning the innermost
/// failure.
pub fn unwrap_invocation(mut error: BoxError) -> BoxError {
    loop {
        match error.downcast::<InvocationError>() {
            Ok(invocation) => error = (*invocation).into_inner(),
            Err(other) => return other,
        }
    }
}

/// A panic that escaped code under test.
#[derive(Clone, Debug, Error)]
#[error("panicked: {message}")]
pub struct PanicError {
    message: String,
}

impl PanicError {
    /// Creates a new `PanicError` with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub(crate) fn from_payload(payload: Box<dyn Any + Send + 'static>) -> Self {
        Self::new(panic_payload_to_string(payload))
    }

    /// Returns the panic message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Extracts a string message from a panic payload.
pub(crate) fn panic_payload_to_string(payload: Box<dyn Any + Send + 'static>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "(unknown panic payload)".to_owned()
    }
}

/// A non-empty list of errors that occurred while doing one thing.
#[derive(Clone, Debug)]
pub struct ErrorList {
    // A description of what was being done, e.g. "while running test".
    description: &'static str,
    // Invariant: this list is non-empty.
    inner: Vec<SharedError>,
}

impl ErrorList {
    /// Creates a new `ErrorList`, or `None` if `errors` is empty.
    pub fn new(description: &'static str, errors: Vec<SharedError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self {
                description,
                inner: errors,
            })
        }
    }

    /// Returns the description of what was being done.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Returns the number of errors in the list. Always at least 1.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Always returns false: an `ErrorList` is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over the errors in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &SharedError> {
        self.inner.iter()
    }

    /// Returns the single error, if there is exactly one.
    pub fn as_one(&self) -> Option<&SharedError> {
        match self.inner.as_slice() {
            [one] => Some(one),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(one) = self.as_one() {
            return write!(f, "{}: {}", self.description, one);
        }

        write!(f, "{} errors occurred {}:", self.inner.len(), self.description)?;
        for error in &self.inner {
            let chain = DisplayErrorChain::new(error.as_ref()).to_string();
            let mut lines = chain.lines();
            if let Some(first) = lines.next() {
                write!(f, "\n  * {first}")?;
            }
            for line in lines {
                write!(f, "\n    {line}")?;
            }
        }
        Ok(())
    }
}

impl error::Error for ErrorList {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.as_one() {
            Some(one) => Some(one.as_ref()),
            None => None,
        }
    }
}

/// Displays an error along with the chain of errors that caused it.
pub struct DisplayErrorChain<E> {
    error: E,
}

impl<E: error::Error> DisplayErrorChain<E> {
    /// Creates a new `DisplayErrorChain`.
    pub fn new(error: E) -> Self {
        Self { error }
    }
}

impl<E: error::Error> fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        let mut source = self.error.source();
        while let Some(error) = source {
            write!(f, "\n  caused by: {error}")?;
            source = error.source();
        }
        Ok(())
    }
}

/// An error that occurred while parsing casework configuration.
#[derive(Debug, Error)]
#[error("failed to parse casework config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8PathBuf {
        &self.config_file
    }

    /// Returns the kind of error this is.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing casework configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config.
    #[error(transparent)]
    DeserializeError(Box<serde_path_to_error::Error<ConfigError>>),
}

/// An error returned when a test case's type or method could not be resolved.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The declaring type is not known to the resolver.
    #[error("type `{type_name}` not found")]
    TypeNotFound {
        /// The name of the type.
        type_name: String,
    },

    /// The type is known, but does not have the named method.
    #[error("method `{method_name}` not found on type `{type_name}`")]
    MethodNotFound {
        /// The name of the type.
        type_name: String,

        /// The name of the method.
        method_name: String,
    },

    /// The case is not bound to live metadata and no resolver was configured.
    #[error("test case `{display_name}` is unbound and no type resolver was provided")]
    NoResolver {
        /// The display name of the case.
        display_name: String,
    },
}

/// An error returned when a test case's source information is set twice.
#[derive(Clone, Debug, Error)]
#[error("source information for `{display_name}` was already set")]
pub struct SourceInfoAlreadySet {
    display_name: String,
}

impl SourceInfoAlreadySet {
    pub(crate) fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }
}

/// An error returned by [`BackgroundWorker::join`](crate::worker::BackgroundWorker::join).
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker thread could not be started.
    #[error("failed to spawn worker thread `{name}`")]
    Spawn {
        /// The name of the thread.
        name: String,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The work returned an error.
    #[error("background work failed")]
    Failed(#[source] SharedError),

    /// The work panicked.
    #[error("background work panicked: {message}")]
    Panicked {
        /// The panic message.
        message: String,
    },
}
