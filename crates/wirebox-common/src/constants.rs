//! Reserved service names and naming conventions.

/// Name under which every container exposes itself as a service.
///
/// The definition registered under this name is installed by the container
/// itself and always wins over user registrations.
pub const CONTAINER_SERVICE_NAME: &str = "$container";

/// Dependency-name sentinel standing for "this service's own configuration".
///
/// Recognized as a prefix match at registration time and rewritten to
/// [`CONFIG_SERVICE_PREFIX`] followed by the registering service's name.
pub const CONFIG_DEPENDENCY_SENTINEL: &str = "$config";

/// Prefix under which configuration services are stored.
pub const CONFIG_SERVICE_PREFIX: &str = "config.";
