//! Export privacy transform.
//!
//! A module with a non-empty export allow-list keeps its remaining names
//! constructible but unresolvable from outside: each one is renamed to a
//! freshly generated token, and every in-module dependency reference to the
//! renamed name is rewritten to the same token. Only the definitions whose
//! dependency lists actually change are cloned; everything else stays shared
//! with the owning module.

use std::rc::Rc;

use wirebox_common::constants::CONFIG_SERVICE_PREFIX;
use wirebox_common::error::{Result, WireboxError};
use wirebox_common::types::{DecoratorTable, ServiceTable};

/// Applies the privacy transform for a non-empty `export_names` list.
///
/// # Errors
///
/// Returns [`WireboxError::ExportError`] if an allow-list name has no
/// matching service in `services`.
pub(crate) fn apply_privacy_transform(
    services: &mut ServiceTable,
    decorators: &mut DecoratorTable,
    export_names: &[String],
) -> Result<()> {
    for name in private_names(services, export_names)? {
        rename_for_export(&name, services, decorators);
    }
    Ok(())
}

/// Names to hide: every registered service name that is neither exported nor
/// the configuration of an exported service.
///
/// The allow-list is validated first: it may only reference services
/// registered on this module, never ones inherited from dependent modules.
fn private_names(services: &ServiceTable, export_names: &[String]) -> Result<Vec<String>> {
    for export_name in export_names {
        if !services.contains_key(export_name) {
            return Err(WireboxError::ExportError {
                name: export_name.clone(),
            });
        }
    }

    Ok(services
        .keys()
        .filter(|name| {
            let exported = export_names.iter().any(|export| export == *name);
            let config_of_exported = name
                .strip_prefix(CONFIG_SERVICE_PREFIX)
                .is_some_and(|base| export_names.iter().any(|export| export == base));
            !exported && !config_of_exported
        })
        .cloned()
        .collect())
}

/// Moves the entry for `old_name` to a fresh token and rewrites every
/// dependency reference pointing at it.
fn rename_for_export(old_name: &str, services: &mut ServiceTable, decorators: &mut DecoratorTable) {
    let new_name = private_token();

    if let Some(service) = services.remove(old_name) {
        let _ = services.insert(new_name.clone(), service);
    }
    if let Some(decorator) = decorators.remove(old_name) {
        let _ = decorators.insert(new_name.clone(), decorator);
    }

    for definition in services.values_mut() {
        if definition.dependencies.iter().any(|name| name == old_name) {
            // Clone the referencing definition so tables already exported
            // elsewhere keep their original dependency names.
            let mut rewritten = (**definition).clone();
            for dependency in &mut rewritten.dependencies {
                if dependency == old_name {
                    new_name.clone_into(dependency);
                }
            }
            *definition = Rc::new(rewritten);
        }
    }

    for definition in decorators.values_mut() {
        if definition.dependencies.iter().any(|name| name == old_name) {
            let mut rewritten = (**definition).clone();
            for dependency in &mut rewritten.dependencies {
                if dependency == old_name {
                    new_name.clone_into(dependency);
                }
            }
            *definition = Rc::new(rewritten);
        }
    }
}

/// Globally-unique token standing in for a private name. Unguessable, so the
/// renamed service cannot be requested from outside the module.
fn private_token() -> String {
    uuid::Uuid::new_v4().to_string()
}
