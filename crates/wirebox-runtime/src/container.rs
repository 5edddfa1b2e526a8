//! Core container struct and resolution operations.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use wirebox_common::constants::CONTAINER_SERVICE_NAME;
use wirebox_common::error::{Result, WireboxError};
use wirebox_common::types::{
    DecoratorTable, Instance, ServiceDefinition, ServiceTable,
};
use wirebox_compose::composer;
use wirebox_compose::module::Module;

struct ContainerInner {
    services: ServiceTable,
    decorators: DecoratorTable,
    /// Singleton cache; only ever grows.
    instances: RefCell<BTreeMap<String, Instance>>,
    /// Names currently mid-construction, oldest first.
    resolving: RefCell<Vec<String>>,
}

/// A dependency-injection container over a composed module graph.
///
/// Each service name resolves to at most one instance for the container's
/// lifetime; instances are constructed on first access and cached. The
/// reserved `$container` service always resolves to the container itself.
///
/// `Container` is a cheap-clone handle. It assumes one logical resolution at
/// a time: the resolution stack is shared mutable state across [`get`]
/// calls, so the type is `!Send` and any multi-threaded use requires
/// external locking — factories may carry arbitrary side effects of their
/// own.
///
/// [`get`]: Container::get
#[derive(Clone)]
pub struct Container {
    inner: Rc<ContainerInner>,
}

impl Container {
    /// Builds a container from one or more root modules.
    ///
    /// The module graph is flattened (dependents before self, first
    /// occurrence wins on duplicates) and every module's exported tables are
    /// merged left to right. The reserved `$container` definition is
    /// installed after the merge and cannot be overridden or decorated.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::NoModulesSpecified`] for an empty module
    /// collection and propagates [`WireboxError::ExportError`] from module
    /// export validation.
    pub fn new(modules: impl IntoIterator<Item = Module>) -> Result<Self> {
        let roots: Vec<Module> = modules.into_iter().collect();
        if roots.is_empty() {
            return Err(WireboxError::NoModulesSpecified);
        }

        let composition = composer::compose(&roots)?;
        let inner = Rc::new_cyclic(|weak: &Weak<ContainerInner>| {
            let mut services = composition.services;
            let mut decorators = composition.decorators;

            let self_reference = weak.clone();
            let _ = services.insert(
                CONTAINER_SERVICE_NAME.to_owned(),
                Rc::new(ServiceDefinition::new(
                    Vec::new(),
                    Rc::new(move |_| {
                        self_reference
                            .upgrade()
                            .map(|inner| Rc::new(Container { inner }) as Instance)
                    }),
                )),
            );
            // The self service is not decoratable.
            let _ = decorators.remove(CONTAINER_SERVICE_NAME);

            ContainerInner {
                services,
                decorators,
                instances: RefCell::new(BTreeMap::new()),
                resolving: RefCell::new(Vec::new()),
            }
        });

        tracing::debug!(
            services = inner.services.len(),
            decorators = inner.decorators.len(),
            "container created"
        );
        Ok(Self { inner })
    }

    /// Returns the instance for `name`, constructing it on first access.
    ///
    /// Construction resolves the declared dependencies (in order, through
    /// `get`), invokes the factory with the resolved instances, applies the
    /// decorator registered for `name` (if any), and caches the result.
    ///
    /// # Errors
    ///
    /// - [`WireboxError::UnknownService`] if no definition exists for
    ///   `name`.
    /// - [`WireboxError::CircularDependency`] if `name` is already
    ///   mid-construction; the message carries the resolution stack, oldest
    ///   first, and the stack is cleared so the container stays usable.
    /// - [`WireboxError::FactoryReturnedNothing`] /
    ///   [`WireboxError::DecoratorReturnedNothing`] on construction contract
    ///   violations. Nothing is cached on failure.
    pub fn get(&self, name: &str) -> Result<Instance> {
        if let Some(instance) = self.inner.instances.borrow().get(name) {
            return Ok(Rc::clone(instance));
        }

        let definition = self
            .inner
            .services
            .get(name)
            .map(Rc::clone)
            .ok_or_else(|| WireboxError::UnknownService {
                name: name.to_owned(),
            })?;

        {
            let mut resolving = self.inner.resolving.borrow_mut();
            if resolving.iter().any(|entry| entry == name) {
                let path = resolving.join(" -> ");
                resolving.clear();
                return Err(WireboxError::CircularDependency { path });
            }
            resolving.push(name.to_owned());
        }

        let constructed = self.construct(name, &definition);

        {
            let mut resolving = self.inner.resolving.borrow_mut();
            if let Some(position) = resolving.iter().rposition(|entry| entry == name) {
                let _ = resolving.remove(position);
            }
        }

        let instance = constructed?;
        let _ = self
            .inner
            .instances
            .borrow_mut()
            .insert(name.to_owned(), Rc::clone(&instance));
        Ok(instance)
    }

    /// Returns the instance for `name` downcast to `T`.
    ///
    /// # Errors
    ///
    /// Propagates every [`get`](Container::get) failure, and returns
    /// [`WireboxError::TypeMismatch`] if the instance is not a `T`.
    pub fn get_as<T: 'static>(&self, name: &str) -> Result<Rc<T>> {
        self.get(name)?
            .downcast::<T>()
            .map_err(|_| WireboxError::TypeMismatch {
                name: name.to_owned(),
            })
    }

    /// Resolves `dependencies` in order and calls `f` with the resolved
    /// instances, returning its value.
    ///
    /// # Errors
    ///
    /// Dependency resolution failures propagate unchanged; `f` does not run.
    pub fn invoke<R>(
        &self,
        dependencies: &[&str],
        f: impl FnOnce(&[Instance]) -> R,
    ) -> Result<R> {
        let resolved = dependencies
            .iter()
            .map(|name| self.get(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(f(&resolved))
    }

    /// Eagerly constructs every registered service, in table order.
    ///
    /// # Errors
    ///
    /// Fail-fast: the first construction failure aborts the remaining eager
    /// construction and propagates.
    pub fn load(&self) -> Result<()> {
        for name in self.inner.services.keys() {
            let _ = self.get(name)?;
        }
        Ok(())
    }

    /// Returns whether a definition exists for `name`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.inner.services.contains_key(name)
    }

    /// Returns every registered service name, in table order.
    #[must_use]
    pub fn service_names(&self) -> Vec<String> {
        self.inner.services.keys().cloned().collect()
    }

    fn construct(&self, name: &str, definition: &ServiceDefinition) -> Result<Instance> {
        tracing::trace!(name, "constructing service");
        let dependencies = self.resolve_all(&definition.dependencies)?;
        let instance = (definition.factory)(&dependencies).ok_or_else(|| {
            WireboxError::FactoryReturnedNothing {
                name: name.to_owned(),
            }
        })?;
        self.decorate(name, instance)
    }

    fn decorate(&self, name: &str, instance: Instance) -> Result<Instance> {
        let Some(decorator) = self.inner.decorators.get(name).map(Rc::clone) else {
            return Ok(instance);
        };

        let dependencies = self.resolve_all(&decorator.dependencies)?;
        (decorator.decorate)(instance, &dependencies).ok_or_else(|| {
            WireboxError::DecoratorReturnedNothing {
                name: name.to_owned(),
            }
        })
    }

    fn resolve_all(&self, names: &[String]) -> Result<Vec<Instance>> {
        names.iter().map(|name| self.get(name)).collect()
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Container {}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("services", &self.inner.services.len())
            .field("decorators", &self.inner.decorators.len())
            .field("instances", &self.inner.instances.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(instance: &Instance) -> i32 {
        *Rc::clone(instance).downcast::<i32>().expect("should be i32")
    }

    #[test]
    fn new_requires_at_least_one_module() {
        let result = Container::new(Vec::new());
        assert!(matches!(result, Err(WireboxError::NoModulesSpecified)));
    }

    #[test]
    fn get_returns_registered_value() {
        let module = Module::new();
        let _ = module.value("a", 1_i32).expect("should register");

        let container = Container::new([module]).expect("should build");
        assert_eq!(*container.get_as::<i32>("a").expect("a"), 1);
    }

    #[test]
    fn get_memoizes_the_first_instance() {
        let module = Module::new();
        let _ = module
            .factory("counter", &[], |_| {
                Some(Rc::new(String::from("built")) as Instance)
            })
            .expect("should register");

        let container = Container::new([module]).expect("should build");
        let first = container.get("counter").expect("first");
        let second = container.get("counter").expect("second");
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn dependencies_arrive_in_declared_order() {
        let module = Module::new();
        let _ = module.value("x", 1_i32).expect("should register");
        let _ = module.value("y", 2_i32).expect("should register");
        let _ = module
            .factory("sum", &["x", "y"], |resolved| {
                let ordered = (int(&resolved[0]), int(&resolved[1]));
                Some(Rc::new(ordered) as Instance)
            })
            .expect("should register");

        let container = Container::new([module]).expect("should build");
        let ordered = container
            .get_as::<(i32, i32)>("sum")
            .expect("should resolve");
        assert_eq!(*ordered, (1, 2));
    }

    #[test]
    fn unknown_service_reports_its_name() {
        let container = Container::new([Module::new()]).expect("should build");
        let error = container.get("ghost").expect_err("should fail");
        assert_eq!(
            error.to_string(),
            "no service or public service exists with the name ghost"
        );
    }

    #[test]
    fn factory_returning_none_fails_and_caches_nothing() {
        let module = Module::new();
        let _ = module.factory("a", &[], |_| None).expect("should register");

        let container = Container::new([module]).expect("should build");
        for _ in 0..2 {
            let error = container.get("a").expect_err("should fail");
            assert!(matches!(
                error,
                WireboxError::FactoryReturnedNothing { .. }
            ));
        }
    }

    #[test]
    fn failed_resolution_does_not_poison_the_stack() {
        let module = Module::new();
        let _ = module.factory("broken", &[], |_| None).expect("should register");
        let _ = module.value("fine", 1_i32).expect("should register");

        let container = Container::new([module]).expect("should build");
        let _ = container.get("broken").expect_err("should fail");
        assert_eq!(*container.get_as::<i32>("fine").expect("fine"), 1);
    }

    #[test]
    fn circular_dependency_clears_the_stack() {
        let module = Module::new();
        let _ = module
            .factory("a", &["b"], |_| Some(Rc::new(0_i32) as Instance))
            .expect("should register");
        let _ = module
            .factory("b", &["a"], |_| Some(Rc::new(0_i32) as Instance))
            .expect("should register");
        let _ = module.value("c", 3_i32).expect("should register");

        let container = Container::new([module]).expect("should build");
        let error = container.get("a").expect_err("should fail");
        assert_eq!(error.to_string(), "circular dependency detected: a -> b");
        assert_eq!(*container.get_as::<i32>("c").expect("c"), 3);
    }

    #[test]
    fn decorator_wraps_the_raw_instance() {
        let module = Module::new();
        let _ = module.value("a", 1_i32).expect("should register");
        let _ = module
            .decorator("a", &[], |instance, _| {
                let raw = *Rc::clone(&instance).downcast::<i32>().ok()?;
                Some(Rc::new(raw + 1) as Instance)
            })
            .expect("should register");

        let container = Container::new([module]).expect("should build");
        assert_eq!(*container.get_as::<i32>("a").expect("a"), 2);
    }

    #[test]
    fn self_service_is_not_decoratable() {
        let module = Module::new();
        let _ = module
            .decorator(CONTAINER_SERVICE_NAME, &[], |_, _| {
                Some(Rc::new(0_i32) as Instance)
            })
            .expect("should register");

        let container = Container::new([module]).expect("should build");
        let resolved = container
            .get_as::<Container>(CONTAINER_SERVICE_NAME)
            .expect("should resolve");
        assert_eq!(*resolved, container);
    }

    #[test]
    fn has_and_service_names_reflect_the_table() {
        let module = Module::new();
        let _ = module.value("a", 1_i32).expect("should register");

        let container = Container::new([module]).expect("should build");
        assert!(container.has("a"));
        assert!(container.has(CONTAINER_SERVICE_NAME));
        assert!(!container.has("ghost"));
        assert_eq!(
            container.service_names(),
            vec![CONTAINER_SERVICE_NAME.to_owned(), "a".to_owned()]
        );
    }

    #[test]
    fn get_as_rejects_the_wrong_type() {
        let module = Module::new();
        let _ = module.value("a", 1_i32).expect("should register");

        let container = Container::new([module]).expect("should build");
        let result = container.get_as::<String>("a");
        assert!(matches!(result, Err(WireboxError::TypeMismatch { .. })));
    }
}
