//! Primitive definition and value types shared by the compose and runtime
//! crates.
//!
//! Service values are dynamically typed: a constructed instance is a shared
//! [`Instance`] handle that consumers downcast to the concrete type they
//! expect. Everything here is `Rc`-based and single-threaded by design.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// A shared handle to a constructed service value.
pub type Instance = Rc<dyn Any>;

/// Factory signature: resolved dependency instances in (declared order),
/// service instance out. `None` signals that the factory failed to produce
/// an instance.
pub type FactoryFn = Rc<dyn Fn(&[Instance]) -> Option<Instance>>;

/// Decorator signature: the raw instance first, resolved dependency
/// instances after. `None` signals that the decorator failed to produce an
/// instance.
pub type DecoratorFn = Rc<dyn Fn(Instance, &[Instance]) -> Option<Instance>>;

/// The value kind produced by `type_factory` registrations.
///
/// Calling it constructs a fresh instance each time; the slice carries
/// call-time arguments that are appended after the dependencies captured at
/// resolution time.
pub type ServiceFactory = Rc<dyn Fn(&[Instance]) -> Instance>;

/// A registered service: its dependency names and the factory that builds
/// its instance.
#[derive(Clone)]
pub struct ServiceDefinition {
    /// Service names resolved, in order, before the factory runs.
    pub dependencies: Vec<String>,
    /// Builds the service instance from the resolved dependencies.
    pub factory: FactoryFn,
}

impl ServiceDefinition {
    /// Creates a definition from a dependency list and a factory.
    #[must_use]
    pub fn new(dependencies: Vec<String>, factory: FactoryFn) -> Self {
        Self {
            dependencies,
            factory,
        }
    }
}

impl fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// A registered decorator: wraps an already-constructed instance of the
/// service it is named after.
#[derive(Clone)]
pub struct DecoratorDefinition {
    /// Service names resolved, in order, after the raw instance.
    pub dependencies: Vec<String>,
    /// Transforms the raw instance into the decorated one.
    pub decorate: DecoratorFn,
}

impl DecoratorDefinition {
    /// Creates a definition from a dependency list and a decorator function.
    #[must_use]
    pub fn new(dependencies: Vec<String>, decorate: DecoratorFn) -> Self {
        Self {
            dependencies,
            decorate,
        }
    }
}

impl fmt::Debug for DecoratorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratorDefinition")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Service table keyed by name. Definitions are shared so snapshots can
/// rewrite entries copy-on-write without touching the source table.
pub type ServiceTable = BTreeMap<String, Rc<ServiceDefinition>>;

/// Decorator table keyed by the name of the service each entry decorates.
pub type DecoratorTable = BTreeMap<String, Rc<DecoratorDefinition>>;
