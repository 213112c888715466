//! Hook install and uninstall
//!
//! Applies a package's hook directives to the registry. Directives are
//! applied in declaration order; a `reverse` directive swaps the add
//! and remove actions, so an install can retract hooks an earlier
//! package version registered.

use tracing::{debug, info};

use modkit_core::{Result, SettingsStore};
use modkit_hooks::{HookReference, HookRegistry};

use crate::descriptor::HookDirective;

/// Register a package's hooks. Reversed directives are removed instead.
pub fn install_hooks<S: SettingsStore>(
    registry: &mut HookRegistry<S>,
    directives: &[HookDirective],
) -> Result<usize> {
    apply(registry, directives, false)
}

/// Retract a package's hooks. Reversed directives are re-added.
pub fn uninstall_hooks<S: SettingsStore>(
    registry: &mut HookRegistry<S>,
    directives: &[HookDirective],
) -> Result<usize> {
    apply(registry, directives, true)
}

fn apply<S: SettingsStore>(
    registry: &mut HookRegistry<S>,
    directives: &[HookDirective],
    uninstalling: bool,
) -> Result<usize> {
    let mut applied = 0;

    for directive in directives {
        let reference = HookReference::compose(
            &directive.callable,
            &directive.source_file,
            directive.is_method,
            true,
        );

        // reverse flips the action, and uninstall flips it again
        let removing = directive.reverse != uninstalling;
        if removing {
            debug!("Removing {} from {}", reference.raw(), directive.hook_name);
            registry.remove_reference(&directive.hook_name, reference.raw())?;
        } else {
            debug!("Adding {} to {}", reference.raw(), directive.hook_name);
            registry.add_reference(&directive.hook_name, reference.raw())?;
        }
        applied += 1;
    }

    registry.invalidate();
    info!(
        "{} {applied} hook directive(s)",
        if uninstalling { "Retracted" } else { "Applied" }
    );
    Ok(applied)
}
