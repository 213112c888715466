//! The hook reference mini-language
//!
//! Hook registrations live in the settings table as one comma-delimited
//! string per hook name. Each element is a callable reference:
//!
//! ```text
//! [!][file|]callable[#]
//! ```
//!
//! - a leading `!` marks the registration as disabled
//! - an optional source file precedes the callable, `|`-separated
//! - a trailing `#` marks an object-method reference
//!
//! Parsing never normalizes: the raw element is kept verbatim so that
//! re-serializing a record reproduces the settings value byte-for-byte.

use sha2::{Digest, Sha256};

/// Marker prefix meaning "registered but disabled".
pub const NEGATION_MARKER: char = '!';

/// Delimiter between references within one settings value.
pub const REFERENCE_DELIMITER: char = ',';

/// Namespace prefix every hook settings key carries.
pub const HOOK_PREFIX: &str = "integrate_";

/// Marker suffix for object-method references.
pub const METHOD_MARKER: char = '#';

/// Separator between a source file and the callable.
pub const FILE_SEPARATOR: char = '|';

/// One parsed element of a hook settings value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookReference {
    raw: String,
    callable: String,
    source_file: String,
    is_method: bool,
    enabled: bool,
}

impl HookReference {
    /// Parse a single raw element. The input is kept verbatim as the raw
    /// form; the structured fields are derived views.
    pub fn parse(raw: &str) -> Self {
        let enabled = !raw.starts_with(NEGATION_MARKER);
        let body = if enabled {
            raw
        } else {
            &raw[NEGATION_MARKER.len_utf8()..]
        };

        let (source_file, rest) = match body.split_once(FILE_SEPARATOR) {
            Some((file, rest)) => (file.to_string(), rest),
            None => (String::new(), body),
        };

        let is_method = rest.ends_with(METHOD_MARKER);
        let callable = if is_method {
            rest[..rest.len() - METHOD_MARKER.len_utf8()].to_string()
        } else {
            rest.to_string()
        };

        Self {
            raw: raw.to_string(),
            callable,
            source_file,
            is_method,
            enabled,
        }
    }

    /// Build a reference from structured parts, deriving the raw form.
    pub fn compose(callable: &str, source_file: &str, is_method: bool, enabled: bool) -> Self {
        let mut raw = String::new();
        if !enabled {
            raw.push(NEGATION_MARKER);
        }
        if !source_file.is_empty() {
            raw.push_str(source_file);
            raw.push(FILE_SEPARATOR);
        }
        raw.push_str(callable);
        if is_method {
            raw.push(METHOD_MARKER);
        }
        Self::parse(&raw)
    }

    /// The verbatim settings-value element.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The callable without markers or source file.
    pub fn callable(&self) -> &str {
        &self.callable
    }

    /// The source file, empty when the reference declares none.
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Whether this is an object-method reference.
    pub fn is_method(&self) -> bool {
        self.is_method
    }

    /// Whether the registration is active (no negation marker).
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The same reference with the negation marker flipped. Everything
    /// else in the raw form is preserved.
    pub fn toggled(&self) -> Self {
        if self.enabled {
            Self::parse(&format!("{NEGATION_MARKER}{}", self.raw))
        } else {
            Self::parse(&self.raw[NEGATION_MARKER.len_utf8()..])
        }
    }

    /// Content fingerprint of the raw form, used as the record's opaque
    /// row key. This is a fingerprint, not a stable primary key: editing
    /// a reference changes its identity.
    pub fn identity(&self) -> String {
        identity_of(&self.raw)
    }
}

/// Fingerprint a raw reference string.
pub fn identity_of(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Split a settings value into its raw elements, dropping empties.
pub fn split_value(value: &str) -> Vec<&str> {
    value
        .split(REFERENCE_DELIMITER)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Join raw elements back into a settings value.
pub fn join_value<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .collect::<Vec<_>>()
        .join(&REFERENCE_DELIMITER.to_string())
}
