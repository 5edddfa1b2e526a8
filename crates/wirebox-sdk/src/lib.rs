//! # wirebox-sdk
//!
//! Public entry point for the wirebox dependency-injection container.
//!
//! Services are registered on [`Module`]s by name, composed into a
//! [`Container`], and constructed lazily on first access. Provides:
//! - [`ContainerBuilder`](builder::ContainerBuilder): fluent assembly of a
//!   container from root modules.
//! - [`GraphInspector`](inspect::GraphInspector): pre-flight structural
//!   checks without constructing services.
//! - Re-exports of the module and container surface.
//!
//! The container is single-threaded (`!Send`); resolution state is shared
//! across calls, so concurrent resolution requires external locking.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use wirebox_sdk::{Container, Module};
//!
//! # fn main() -> wirebox_sdk::Result<()> {
//! let module = Module::new();
//! module.value("greeting", String::from("hello"))?;
//! module.factory("banner", &["greeting"], |resolved| {
//!     let greeting = Rc::clone(&resolved[0]).downcast::<String>().ok()?;
//!     Some(Rc::new(format!("{greeting}, world")))
//! })?;
//!
//! let container = Container::new([module])?;
//! let banner = container.get_as::<String>("banner")?;
//! assert_eq!(banner.as_str(), "hello, world");
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod inspect;

pub use wirebox_common::constants::{
    CONFIG_DEPENDENCY_SENTINEL, CONFIG_SERVICE_PREFIX, CONTAINER_SERVICE_NAME,
};
pub use wirebox_common::error::{Result, WireboxError};
pub use wirebox_common::types::{
    DecoratorDefinition, Instance, ServiceDefinition, ServiceFactory,
};
pub use wirebox_compose::module::{Exported, Module};
pub use wirebox_runtime::container::Container;
