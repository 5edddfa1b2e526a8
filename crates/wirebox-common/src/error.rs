//! Unified error types for the wirebox workspace.
//!
//! Every fallible operation across the workspace returns [`Result`]; all
//! failures are immediate and fatal to the call that triggered them, with no
//! internal retry or partial results.

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum WireboxError {
    /// A container was constructed from an empty module collection.
    #[error("no modules specified for container")]
    NoModulesSpecified,

    /// A service or decorator registration was malformed.
    #[error("invalid definition: {message}")]
    InvalidDefinition {
        /// Description of the malformed registration.
        message: String,
    },

    /// An export allow-list name does not match any locally registered
    /// service.
    #[error("export name {name} doesn't map to a service")]
    ExportError {
        /// The allow-list entry with no matching service.
        name: String,
    },

    /// A service was requested under a name with no definition.
    #[error("no service or public service exists with the name {name}")]
    UnknownService {
        /// The requested service name.
        name: String,
    },

    /// A service was requested while already mid-resolution.
    #[error("circular dependency detected: {path}")]
    CircularDependency {
        /// The resolution stack at detection time, oldest first, joined by
        /// `" -> "`.
        path: String,
    },

    /// A factory produced no instance.
    #[error("factory {name} must return an instance")]
    FactoryReturnedNothing {
        /// Name of the service whose factory returned nothing.
        name: String,
    },

    /// A decorator produced no instance.
    #[error("decorator {name} must return an instance")]
    DecoratorReturnedNothing {
        /// Name of the decorated service.
        name: String,
    },

    /// A typed accessor requested a type the cached instance is not.
    #[error("service {name} cannot be downcast to the requested type")]
    TypeMismatch {
        /// Name of the service that failed to downcast.
        name: String,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, WireboxError>;
