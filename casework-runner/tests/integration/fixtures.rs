// Copyright (c) The casework Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A small calculator test suite, described through the metadata traits.

use casework_metadata::ArgValue;
use casework_runner::{
    errors::{BoxError, InvocationError},
    metadata::{
        BeforeAfterHook, Dispose, FactMetadata, MethodInfo, SharedHook, SharedMethod, SharedType,
        TestObject, TraitDecl, TypeInfo,
    },
    reporter::{CaseEvent, MessageSink},
    resolve::TypeRegistry,
};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Everything the fixtures did, in order.
#[derive(Clone, Debug, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub(crate) fn record(&self, entry: impl Into<String>) {
        self.0.lock().expect("lock is not poisoned").push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().expect("lock is not poisoned").clone()
    }
}

/// A sink that keeps the name of every event it sees.
#[derive(Debug, Default)]
pub(crate) struct EventLog {
    pub(crate) names: Vec<&'static str>,
}

impl MessageSink for EventLog {
    fn handle_event(&mut self, event: CaseEvent<'_>) {
        self.names.push(event.kind.name());
    }
}

#[derive(Debug, Error)]
#[error("expected {expected}, got {actual}")]
pub(crate) struct AssertionFailed {
    pub(crate) expected: i64,
    pub(crate) actual: i64,
}

#[derive(Debug, Error)]
#[error("argument {index} must be an integer, got {kind}")]
struct BadArgument {
    index: usize,
    kind: &'static str,
}

fn int_arg(arguments: &[ArgValue], index: usize) -> Result<i64, BoxError> {
    match arguments.get(index) {
        Some(ArgValue::Int(value)) => Ok(*value),
        other => Err(Box::new(BadArgument {
            index,
            kind: other.map_or("nothing", ArgValue::kind_str),
        })),
    }
}

/// The instance every `Calc` test runs against.
pub(crate) struct Calculator {
    memory: i64,
    journal: Journal,
}

impl TestObject for Calculator {
    fn as_dispose(&mut self) -> Option<&mut dyn Dispose> {
        Some(self)
    }
}

impl Dispose for Calculator {
    fn dispose(&mut self) -> Result<(), BoxError> {
        self.journal
            .record(format!("dispose (memory = {})", self.memory));
        Ok(())
    }
}

pub(crate) struct CalcType {
    journal: Journal,
    hooks: Vec<SharedHook>,
    methods: Vec<SharedMethod>,
}

impl TypeInfo for CalcType {
    fn name(&self) -> &str {
        "Calc"
    }

    fn hooks(&self) -> Vec<SharedHook> {
        self.hooks.clone()
    }

    fn create_instance(&self) -> Result<Box<dyn TestObject>, BoxError> {
        self.journal.record("construct");
        Ok(Box::new(Calculator {
            memory: 0,
            journal: self.journal.clone(),
        }))
    }

    fn method(&self, name: &str) -> Option<SharedMethod> {
        self.methods
            .iter()
            .find(|method| method.name() == name)
            .cloned()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum CalcTest {
    /// `Add(a, b, expected)`: adds two numbers into memory.
    Add,
    /// `Divide(a, b)`: panics on division by zero.
    Divide,
    /// `Pi()`: static, always skipped.
    Pi,
    /// `Clear()`: static, needs no instance.
    Clear,
}

impl CalcTest {
    pub(crate) const ALL: [CalcTest; 4] =
        [CalcTest::Add, CalcTest::Divide, CalcTest::Pi, CalcTest::Clear];
}

pub(crate) struct CalcMethod {
    test: CalcTest,
    journal: Journal,
    hooks: Vec<SharedHook>,
}

impl MethodInfo for CalcMethod {
    fn name(&self) -> &str {
        match self.test {
            CalcTest::Add => "Add",
            CalcTest::Divide => "Divide",
            CalcTest::Pi => "Pi",
            CalcTest::Clear => "Clear",
        }
    }

    fn is_static(&self) -> bool {
        matches!(self.test, CalcTest::Pi | CalcTest::Clear)
    }

    fn parameter_names(&self) -> Vec<String> {
        let names: &[&str] = match self.test {
            CalcTest::Add => &["a", "b", "expected"],
            CalcTest::Divide => &["a", "b"],
            CalcTest::Pi | CalcTest::Clear => &[],
        };
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    fn hooks(&self) -> Vec<SharedHook> {
        self.hooks.clone()
    }

    fn traits(&self) -> Vec<TraitDecl> {
        match self.test {
            CalcTest::Add => vec![
                TraitDecl::new("category", "arithmetic"),
                TraitDecl::new("category", "fast"),
            ],
            _ => vec![TraitDecl::new("category", "arithmetic")],
        }
    }

    fn fact(&self) -> FactMetadata {
        match self.test {
            CalcTest::Pi => FactMetadata {
                display_name: Some("pi is exactly three".to_owned()),
                skip: Some("irrational".to_owned()),
            },
            _ => FactMetadata::default(),
        }
    }

    fn invoke(
        &self,
        instance: Option<&mut dyn TestObject>,
        arguments: &[ArgValue],
    ) -> Result<(), BoxError> {
        self.journal.record(format!("invoke {}", self.name()));
        match self.test {
            CalcTest::Add => {
                let calculator = instance
                    .and_then(|object| object.downcast_mut::<Calculator>())
                    .ok_or("Add needs a Calculator")?;
                let (a, b) = (int_arg(arguments, 0)?, int_arg(arguments, 1)?);
                let expected = int_arg(arguments, 2)?;
                calculator.memory = a + b;
                if calculator.memory != expected {
                    return Err(InvocationError::new(
                        "Calc.Add",
                        AssertionFailed {
                            expected,
                            actual: calculator.memory,
                        },
                    )
                    .into());
                }
                Ok(())
            }
            CalcTest::Divide => {
                let (a, b) = (int_arg(arguments, 0)?, int_arg(arguments, 1)?);
                if b == 0 {
                    panic!("attempt to divide {a} by zero");
                }
                Ok(())
            }
            CalcTest::Pi => unreachable!("Pi is always skipped"),
            CalcTest::Clear => Ok(()),
        }
    }
}

/// Records setup and teardown in the journal.
pub(crate) struct JournalHook {
    name: &'static str,
    journal: Journal,
}

impl BeforeAfterHook for JournalHook {
    fn name(&self) -> &str {
        self.name
    }

    fn before(&self, method: &dyn MethodInfo) -> Result<(), BoxError> {
        self.journal
            .record(format!("{} before {}", self.name, method.name()));
        Ok(())
    }

    fn after(&self, method: &dyn MethodInfo) -> Result<(), BoxError> {
        self.journal
            .record(format!("{} after {}", self.name, method.name()));
        Ok(())
    }
}

/// The `Calc` suite: a type-level `database` hook on every test, plus a
/// method-level `clock` hook on `Add`.
pub(crate) struct CalcSuite {
    pub(crate) journal: Journal,
    pub(crate) type_info: SharedType,
}

impl CalcSuite {
    pub(crate) fn new() -> Self {
        let journal = Journal::default();
        let hook = |name| -> SharedHook {
            Arc::new(JournalHook {
                name,
                journal: journal.clone(),
            })
        };

        let methods = CalcTest::ALL
            .into_iter()
            .map(|test| -> SharedMethod {
                let hooks = match test {
                    CalcTest::Add => vec![hook("clock")],
                    _ => Vec::new(),
                };
                Arc::new(CalcMethod {
                    test,
                    journal: journal.clone(),
                    hooks,
                })
            })
            .collect();
        let type_info: SharedType = Arc::new(CalcType {
            journal: journal.clone(),
            hooks: vec![hook("database")],
            methods,
        });

        Self { journal, type_info }
    }

    pub(crate) fn method(&self, name: &str) -> SharedMethod {
        self.type_info
            .method(name)
            .unwrap_or_else(|| panic!("Calc declares {name}"))
    }

    pub(crate) fn registry(&self) -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(self.type_info.clone());
        registry
    }
}

pub(crate) fn init_tracing() {
    // Several tests may race to install the subscriber; only the first wins.
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
