//! Download filename derivation
//!
//! The descriptor may declare a `packaging.package_name` template with
//! version and customization-name tokens in dot, hyphen, and underscore
//! variants. Without a template the sanitized package directory name is
//! used.

use modkit_packages::{sanitize_package_name, PackageInfo};

/// Derive the archive's base filename (no extension) for a package.
pub fn target_file_name(info: &PackageInfo, dir_name: &str) -> String {
    let template = info
        .packaging
        .as_ref()
        .and_then(|p| p.package_name.as_deref());

    let Some(template) = template else {
        return sanitize_package_name(dir_name);
    };

    let substituted = substitute_tokens(template, &info.version, &info.name);
    sanitize_package_name(&substituted)
}

fn substitute_tokens(template: &str, version: &str, name: &str) -> String {
    template
        .replace("{VERSION}", version)
        .replace("{VERSION-}", &version.replace('.', "-"))
        .replace("{VERSION_}", &version.replace('.', "_"))
        .replace("{CUSTOMIZATION NAME}", name)
        .replace("{CUSTOMIZATION-NAME}", &name.replace(' ', "-"))
        .replace("{CUSTOMIZATION_NAME}", &name.replace(' ', "_"))
}
