//! Fluent API for assembling a container from root modules.

use wirebox_common::error::Result;
use wirebox_compose::module::Module;
use wirebox_runtime::container::Container;

/// Builder accumulating root modules before container construction.
///
/// Root order matters: services exported by later modules override
/// colliding names from earlier ones.
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    modules: Vec<Module>,
}

impl ContainerBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Appends one root module.
    #[must_use]
    pub fn module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    /// Appends several root modules, preserving their order.
    #[must_use]
    pub fn modules(mut self, modules: impl IntoIterator<Item = Module>) -> Self {
        self.modules.extend(modules);
        self
    }

    /// Composes the accumulated modules and builds the container.
    ///
    /// # Errors
    ///
    /// Returns [`WireboxError::NoModulesSpecified`] when no module was
    /// added, and propagates composition failures such as
    /// [`WireboxError::ExportError`].
    ///
    /// [`WireboxError::NoModulesSpecified`]: wirebox_common::error::WireboxError::NoModulesSpecified
    /// [`WireboxError::ExportError`]: wirebox_common::error::WireboxError::ExportError
    pub fn build(self) -> Result<Container> {
        tracing::debug!(modules = self.modules.len(), "building container");
        Container::new(self.modules)
    }
}
