//! Path token expansion
//!
//! Package descriptors reference install locations through symbolic
//! tokens (`$sourcedir`, `$themedir`, ...) rather than absolute paths.
//! [`PathTokens`] expands tokens when reading a descriptor and contracts
//! absolute paths back to tokens when rendering reports, so operator
//! output never leaks host filesystem layout.

use std::path::{Path, PathBuf};

/// Bidirectional mapping between path tokens and absolute directories.
#[derive(Debug, Clone, Default)]
pub struct PathTokens {
    /// Token → base directory, kept in insertion order. Contraction
    /// prefers earlier (more specific) entries.
    entries: Vec<(String, PathBuf)>,
}

impl PathTokens {
    /// Create an empty token table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard table for a platform rooted at `board_dir`.
    ///
    /// More specific directories come first so contraction picks the
    /// tightest token.
    pub fn standard(board_dir: &Path, packages_dir: &Path) -> Self {
        let themes = board_dir.join("Themes");
        let theme = themes.join("default");
        let mut tokens = Self::new();
        tokens.register("$imagesdir", theme.join("images"));
        tokens.register("$languagedir", theme.join("languages"));
        tokens.register("$themedir", theme);
        tokens.register("$themes_dir", themes);
        tokens.register("$sourcedir", board_dir.join("Sources"));
        tokens.register("$avatardir", board_dir.join("avatars"));
        tokens.register("$smileysdir", board_dir.join("Smileys"));
        tokens.register("$packagesdir", packages_dir.to_path_buf());
        tokens.register("$boarddir", board_dir.to_path_buf());
        tokens
    }

    /// Register a token. Tokens must start with `$`.
    pub fn register(&mut self, token: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.push((token.into(), path.into()));
    }

    /// Expand a leading token into its absolute directory.
    ///
    /// Paths without a known token pass through untouched.
    pub fn expand(&self, raw: &str) -> PathBuf {
        for (token, base) in &self.entries {
            if let Some(rest) = raw.strip_prefix(token.as_str()) {
                let rest = rest.trim_start_matches(['/', '\\']);
                return if rest.is_empty() {
                    base.clone()
                } else {
                    base.join(rest)
                };
            }
        }
        PathBuf::from(raw)
    }

    /// Replace the longest matching base directory with its token.
    pub fn contract(&self, path: &Path) -> String {
        let mut best: Option<(&str, &Path)> = None;
        for (token, base) in &self.entries {
            if path.starts_with(base) {
                let better = match best {
                    Some((_, b)) => base.components().count() > b.components().count(),
                    None => true,
                };
                if better {
                    best = Some((token, base));
                }
            }
        }

        match best {
            Some((token, base)) => {
                let rest = path.strip_prefix(base).unwrap_or(path);
                if rest.as_os_str().is_empty() {
                    token.to_string()
                } else {
                    format!("{token}/{}", rest.display())
                }
            }
            None => path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> PathTokens {
        PathTokens::standard(Path::new("/srv/forum"), Path::new("/srv/forum/Packages"))
    }

    #[test]
    fn expand_known_token() {
        assert_eq!(
            tokens().expand("$sourcedir/Subs-Example.php"),
            PathBuf::from("/srv/forum/Sources/Subs-Example.php")
        );
    }

    #[test]
    fn expand_bare_token() {
        assert_eq!(tokens().expand("$boarddir"), PathBuf::from("/srv/forum"));
    }

    #[test]
    fn expand_unknown_passes_through() {
        assert_eq!(
            tokens().expand("/tmp/elsewhere"),
            PathBuf::from("/tmp/elsewhere")
        );
    }

    #[test]
    fn contract_prefers_tightest_token() {
        let t = tokens();
        assert_eq!(
            t.contract(Path::new("/srv/forum/Themes/default/languages/Example.php")),
            "$languagedir/Example.php"
        );
        assert_eq!(
            t.contract(Path::new("/srv/forum/Sources/Example.php")),
            "$sourcedir/Example.php"
        );
    }

    #[test]
    fn contract_unknown_path_is_verbatim() {
        assert_eq!(tokens().contract(Path::new("/opt/other")), "/opt/other");
    }
}
