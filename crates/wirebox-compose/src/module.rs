//! Module registration surface.
//!
//! A module is a named bundle of service and decorator definitions together
//! with the modules it depends on and an optional export allow-list. Modules
//! are mutated by registration calls until they are handed to a container;
//! composition never writes back into a module.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use wirebox_common::constants::{CONFIG_DEPENDENCY_SENTINEL, CONFIG_SERVICE_PREFIX};
use wirebox_common::error::{Result, WireboxError};
use wirebox_common::types::{
    DecoratorDefinition, DecoratorTable, FactoryFn, Instance, ServiceDefinition, ServiceFactory,
    ServiceTable,
};

use crate::export;

/// A snapshot of a module's visible registrations, with the export privacy
/// transform applied to anything excluded from the allow-list.
#[derive(Debug, Clone)]
pub struct Exported {
    /// Services visible to the composer.
    pub services: ServiceTable,
    /// Decorators visible to the composer.
    pub decorators: DecoratorTable,
}

struct ModuleInner {
    dependent_modules: Vec<Module>,
    services: ServiceTable,
    decorators: DecoratorTable,
    export_names: Vec<String>,
}

/// A named bundle of service and decorator registrations.
///
/// `Module` is a cheap-clone handle; clones refer to the same underlying
/// registrations. Two modules compare equal only when they are the same
/// underlying module (pointer identity), which is what composition uses to
/// deduplicate a module reachable through multiple paths.
#[derive(Clone)]
pub struct Module {
    inner: Rc<RefCell<ModuleInner>>,
}

impl Module {
    /// Creates an empty module with no dependent modules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dependents(Vec::new())
    }

    /// Creates an empty module depending on `dependent_modules`.
    ///
    /// Services exported by dependent modules are visible to this module's
    /// services once composed, and this module's own registrations override
    /// colliding names inherited from its dependents.
    #[must_use]
    pub fn with_dependents(dependent_modules: impl IntoIterator<Item = Module>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ModuleInner {
                dependent_modules: dependent_modules.into_iter().collect(),
                services: ServiceTable::new(),
                decorators: DecoratorTable::new(),
                export_names: Vec::new(),
            })),
        }
    }

    /// Returns the ordered list of dependent modules.
    #[must_use]
    pub fn dependent_modules(&self) -> Vec<Module> {
        self.inner.borrow().dependent_modules.clone()
    }

    /// Registers a service factory under `name`.
    ///
    /// The named dependencies are resolved in order and passed to `factory`
    /// as one slice; the factory returns the service instance, or `None` to
    /// signal a construction failure. Registering the same name again
    /// replaces the previous definition.
    ///
    /// Any dependency equal to or prefixed by `$config` is rewritten to
    /// `config.<name>` at registration time.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::InvalidDefinition`] if `name` is empty.
    pub fn factory(
        &self,
        name: &str,
        dependencies: &[&str],
        factory: impl Fn(&[Instance]) -> Option<Instance> + 'static,
    ) -> Result<&Self> {
        self.register_service(name, dependencies, Rc::new(factory))
    }

    /// Registers `value` as a service. Every resolution returns a clone of
    /// the same shared handle.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::InvalidDefinition`] if `name` is empty.
    pub fn value<T: 'static>(&self, name: &str, value: T) -> Result<&Self> {
        let instance: Instance = Rc::new(value);
        self.factory(name, &[], move |_| Some(Rc::clone(&instance)))
    }

    /// Registers a constructor as a singleton service.
    ///
    /// `ctor` receives the resolved dependencies and produces the concrete
    /// value; the registered factory wraps it into an [`Instance`]. The
    /// constructor runs once, on first resolution.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::InvalidDefinition`] if `name` is empty.
    pub fn type_of<T: 'static>(
        &self,
        name: &str,
        dependencies: &[&str],
        ctor: impl Fn(&[Instance]) -> T + 'static,
    ) -> Result<&Self> {
        self.factory(name, dependencies, move |resolved| {
            Some(Rc::new(ctor(resolved)) as Instance)
        })
    }

    /// Registers a constructor factory: the service instance is a
    /// [`ServiceFactory`] that builds a fresh `T` on every call.
    ///
    /// The module dependencies are resolved once, when the service itself is
    /// resolved; each call of the returned factory appends its call-time
    /// arguments after those captured dependencies and invokes `ctor` with
    /// the combined slice.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::InvalidDefinition`] if `name` is empty.
    pub fn type_factory<T: 'static>(
        &self,
        name: &str,
        dependencies: &[&str],
        ctor: impl Fn(&[Instance]) -> T + 'static,
    ) -> Result<&Self> {
        let ctor = Rc::new(ctor);
        self.factory(name, dependencies, move |resolved| {
            let captured: Vec<Instance> = resolved.to_vec();
            let ctor = Rc::clone(&ctor);
            let produce: ServiceFactory = Rc::new(move |extra| {
                let mut arguments = captured.clone();
                arguments.extend(extra.iter().cloned());
                Rc::new(ctor(&arguments)) as Instance
            });
            Some(Rc::new(produce) as Instance)
        })
    }

    /// Registers the decorator for the service named `name`.
    ///
    /// The decorator receives the raw instance first and its resolved
    /// dependencies after, and returns the decorated instance (or `None` to
    /// signal failure). A service has at most one decorator in the final
    /// merged table; registering again replaces the previous one. The
    /// `$config` dependency rewrite applies here too, scoped to `name`.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::InvalidDefinition`] if `name` is empty.
    pub fn decorator(
        &self,
        name: &str,
        dependencies: &[&str],
        decorate: impl Fn(Instance, &[Instance]) -> Option<Instance> + 'static,
    ) -> Result<&Self> {
        if name.is_empty() {
            return Err(WireboxError::InvalidDefinition {
                message: "decorator requires a name".to_owned(),
            });
        }

        let dependencies = rewrite_config_dependencies(name, dependencies);
        let definition = DecoratorDefinition::new(dependencies, Rc::new(decorate));
        let _ = self
            .inner
            .borrow_mut()
            .decorators
            .insert(name.to_owned(), Rc::new(definition));
        Ok(self)
    }

    /// Registers the configuration for the service named `name`.
    ///
    /// Sugar for registering `value` under `config.<name>`; the owning
    /// service reaches it by declaring a `$config` dependency.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::InvalidDefinition`] if `name` is empty.
    pub fn config<T: 'static>(&self, name: &str, value: T) -> Result<&Self> {
        if name.is_empty() {
            return Err(WireboxError::InvalidDefinition {
                message: "config service requires a name".to_owned(),
            });
        }

        self.value(&format!("{CONFIG_SERVICE_PREFIX}{name}"), value)
    }

    /// Sets the export allow-list.
    ///
    /// Names not listed are private: usable as dependencies within this
    /// module but unresolvable from outside. An empty list means everything
    /// registered (now or later) is exported, which is the default.
    pub fn exports(&self, names: &[&str]) -> &Self {
        self.inner.borrow_mut().export_names = names.iter().map(|name| (*name).to_owned()).collect();
        self
    }

    /// Returns the current registrations with the export privacy transform
    /// applied.
    ///
    /// Definitions in the snapshot are shared with the module; only entries
    /// whose dependency lists had to be rewritten are cloned.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::ExportError`] if an allow-list name does not
    /// match any service registered on this module.
    pub fn exported(&self) -> Result<Exported> {
        let inner = self.inner.borrow();
        let mut services = inner.services.clone();
        let mut decorators = inner.decorators.clone();

        if !inner.export_names.is_empty() {
            export::apply_privacy_transform(&mut services, &mut decorators, &inner.export_names)?;
        }

        Ok(Exported {
            services,
            decorators,
        })
    }

    fn register_service(
        &self,
        name: &str,
        dependencies: &[&str],
        factory: FactoryFn,
    ) -> Result<&Self> {
        if name.is_empty() {
            return Err(WireboxError::InvalidDefinition {
                message: "service requires a name".to_owned(),
            });
        }

        let dependencies = rewrite_config_dependencies(name, dependencies);
        let definition = ServiceDefinition::new(dependencies, factory);
        let _ = self
            .inner
            .borrow_mut()
            .services
            .insert(name.to_owned(), Rc::new(definition));
        Ok(self)
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Module {}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Module")
            .field("services", &inner.services.len())
            .field("decorators", &inner.decorators.len())
            .field("dependent_modules", &inner.dependent_modules.len())
            .field("export_names", &inner.export_names)
            .finish()
    }
}

fn rewrite_config_dependencies(name: &str, dependencies: &[&str]) -> Vec<String> {
    dependencies
        .iter()
        .map(|dependency| {
            if dependency.starts_with(CONFIG_DEPENDENCY_SENTINEL) {
                format!("{CONFIG_SERVICE_PREFIX}{name}")
            } else {
                (*dependency).to_owned()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_registers_a_service() {
        let module = Module::new();
        let _ = module
            .factory("a", &[], |_| Some(Rc::new(1_i32) as Instance))
            .expect("should register");

        let exported = module.exported().expect("should export");
        assert!(exported.services.contains_key("a"));
    }

    #[test]
    fn factory_requires_a_name() {
        let module = Module::new();
        let result = module.factory("", &[], |_| None);
        assert!(matches!(
            result,
            Err(WireboxError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn factory_stores_dependency_order() {
        let module = Module::new();
        let _ = module
            .factory("c", &["a", "b"], |_| Some(Rc::new(0_i32) as Instance))
            .expect("should register");

        let exported = module.exported().expect("should export");
        let definition = exported.services.get("c").expect("c");
        assert_eq!(definition.dependencies, vec!["a", "b"]);
    }

    #[test]
    fn factory_overrides_previous_registration() {
        let module = Module::new();
        let _ = module
            .factory("a", &[], |_| Some(Rc::new(1_i32) as Instance))
            .expect("should register");
        let _ = module
            .factory("a", &["x"], |_| Some(Rc::new(2_i32) as Instance))
            .expect("should re-register");

        let exported = module.exported().expect("should export");
        let definition = exported.services.get("a").expect("a");
        assert_eq!(definition.dependencies, vec!["x"]);
    }

    #[test]
    fn value_registers_a_service() {
        let module = Module::new();
        let _ = module.value("a", 1_i32).expect("should register");
        assert!(
            module
                .exported()
                .expect("should export")
                .services
                .contains_key("a")
        );
    }

    #[test]
    fn type_of_registers_a_service() {
        struct Animal;
        let module = Module::new();
        let _ = module
            .type_of("animal", &[], |_| Animal)
            .expect("should register");
        assert!(
            module
                .exported()
                .expect("should export")
                .services
                .contains_key("animal")
        );
    }

    #[test]
    fn type_factory_registers_a_service() {
        struct Animal;
        let module = Module::new();
        let _ = module
            .type_factory("animal_factory", &[], |_| Animal)
            .expect("should register");
        assert!(
            module
                .exported()
                .expect("should export")
                .services
                .contains_key("animal_factory")
        );
    }

    #[test]
    fn config_prefixes_the_service_name() {
        let module = Module::new();
        let _ = module.config("log", 1_i32).expect("should register");

        let exported = module.exported().expect("should export");
        assert!(exported.services.contains_key("config.log"));
        assert!(!exported.services.contains_key("log"));
    }

    #[test]
    fn config_requires_a_name() {
        let module = Module::new();
        assert!(matches!(
            module.config("", 1_i32),
            Err(WireboxError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn decorator_registers_under_the_service_name() {
        let module = Module::new();
        let _ = module
            .decorator("a", &[], |instance, _| Some(instance))
            .expect("should register");
        assert!(
            module
                .exported()
                .expect("should export")
                .decorators
                .contains_key("a")
        );
    }

    #[test]
    fn decorator_requires_a_name() {
        let module = Module::new();
        assert!(matches!(
            module.decorator("", &[], |instance, _| Some(instance)),
            Err(WireboxError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn config_sentinel_dependency_is_rewritten() {
        let module = Module::new();
        let _ = module
            .factory("log", &["$config"], |_| Some(Rc::new(0_i32) as Instance))
            .expect("should register");

        let exported = module.exported().expect("should export");
        let definition = exported.services.get("log").expect("log");
        assert_eq!(definition.dependencies, vec!["config.log"]);
    }

    #[test]
    fn config_sentinel_matches_as_prefix() {
        let module = Module::new();
        let _ = module
            .decorator("log", &["$configAnything", "other"], |instance, _| {
                Some(instance)
            })
            .expect("should register");

        let exported = module.exported().expect("should export");
        let definition = exported.decorators.get("log").expect("log");
        assert_eq!(definition.dependencies, vec!["config.log", "other"]);
    }

    #[test]
    fn registration_chains_through_results() {
        let module = Module::new();
        let chained = module
            .value("a", 1_i32)
            .and_then(|module| module.value("b", 2_i32))
            .expect("should chain");
        assert!(
            chained
                .exported()
                .expect("should export")
                .services
                .contains_key("b")
        );
    }

    #[test]
    fn clones_share_identity_and_registrations() {
        let module = Module::new();
        let cloned = module.clone();
        let _ = cloned.value("a", 1_i32).expect("should register");

        assert_eq!(module, cloned);
        assert!(
            module
                .exported()
                .expect("should export")
                .services
                .contains_key("a")
        );
    }

    #[test]
    fn distinct_modules_are_not_equal() {
        assert_ne!(Module::new(), Module::new());
    }

    #[test]
    fn exported_snapshot_shares_untouched_definitions() {
        let module = Module::new();
        let _ = module.value("a", 1_i32).expect("should register");

        let first = module.exported().expect("should export");
        let second = module.exported().expect("should export");
        let lhs = first.services.get("a").expect("a");
        let rhs = second.services.get("a").expect("a");
        assert!(Rc::ptr_eq(lhs, rhs));
    }
}
