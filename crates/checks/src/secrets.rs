//! Secret scanning - detect hardcoded credentials in source files
//!
//! Suppression is per file: a file whose content mentions any suppression
//! marker ("test", "example" by default) anywhere is not reported at all.
//! This can hide a real secret in a large mixed-purpose file.

use once_cell::sync::Lazy;
use qualitygate_core::config::SecretsConfig;
use qualitygate_core::file_scanner::FileScanner;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Secret pattern definition
struct SecretPattern {
    name: &'static str,
    pattern: Regex,
}

/// Built-in secret patterns, checked in this order
static PATTERNS: Lazy<Vec<SecretPattern>> = Lazy::new(|| {
    vec![
        SecretPattern {
            name: "password",
            pattern: Regex::new(r#"(?i)password\s*=\s*["'][^"']+["']"#).unwrap(),
        },
        SecretPattern {
            name: "api_key",
            pattern: Regex::new(r#"(?i)api_key\s*=\s*["'][^"']+["']"#).unwrap(),
        },
        SecretPattern {
            name: "secret",
            pattern: Regex::new(r#"(?i)secret\s*=\s*["'][^"']+["']"#).unwrap(),
        },
        SecretPattern {
            name: "token",
            pattern: Regex::new(r#"(?i)token\s*=\s*["'][^"']+["']"#).unwrap(),
        },
    ]
});

/// A detected secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretMatch {
    /// File path relative to the project root
    pub file: PathBuf,
    /// Name of the pattern that matched
    pub pattern_name: &'static str,
    /// Masked matched text
    pub matched_text: String,
}

/// Scans a source directory for credential-like assignments
#[derive(Debug, Clone)]
pub struct SecretScanner {
    source_dir: PathBuf,
    extension: String,
    suppress_markers: Vec<String>,
}

impl Default for SecretScanner {
    fn default() -> Self {
        Self::new(&SecretsConfig::default())
    }
}

impl SecretScanner {
    pub fn new(config: &SecretsConfig) -> Self {
        Self {
            source_dir: PathBuf::from(&config.source_dir),
            extension: config.extension.clone(),
            suppress_markers: config
                .suppress_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
        }
    }

    /// Find the first unsuppressed match under `root`.
    ///
    /// Patterns are tried in declaration order and, for each pattern, files
    /// in sorted path order; the first hit ends the scan. A missing source
    /// directory yields no match. Unreadable files are skipped.
    pub fn scan(&self, root: &Path) -> Option<SecretMatch> {
        let dir = root.join(&self.source_dir);
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "no source directory to scan for secrets");
            return None;
        }

        let files = FileScanner::new(&dir)
            .with_extensions(&[self.extension.as_str()])
            .scan()
            .unwrap_or_default();

        // Files are read again for each pattern so that only one file's
        // content is held at a time.
        let mut excluded = vec![false; files.len()];
        for pattern in PATTERNS.iter() {
            for (path, dropped) in files.iter().zip(excluded.iter_mut()) {
                if *dropped {
                    continue;
                }
                let Some(content) = self.candidate(path) else {
                    *dropped = true;
                    continue;
                };
                if let Some(m) = pattern.pattern.find(&content) {
                    return Some(SecretMatch {
                        file: path.strip_prefix(root).unwrap_or(path).to_path_buf(),
                        pattern_name: pattern.name,
                        matched_text: mask_secret(m.as_str()),
                    });
                }
            }
        }

        None
    }

    /// Content of a file worth scanning, `None` when unreadable or suppressed
    fn candidate(&self, path: &Path) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(content) if self.is_suppressed(&content) => None,
            Ok(content) => Some(content),
            Err(e) => {
                tracing::debug!(file = %path.display(), error = %e, "skipping unreadable file");
                None
            }
        }
    }

    /// Name of the first pattern matching `content`, ignoring suppression
    pub fn scan_str(&self, content: &str) -> Option<&'static str> {
        PATTERNS
            .iter()
            .find(|p| p.pattern.is_match(content))
            .map(|p| p.name)
    }

    /// Whole-file suppression: any marker anywhere, case-insensitive
    pub fn is_suppressed(&self, content: &str) -> bool {
        let lowered = content.to_lowercase();
        self.suppress_markers.iter().any(|m| lowered.contains(m.as_str()))
    }
}

/// Mask a secret for display (show first/last few chars)
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project_with(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_mask_secret_short() {
        assert_eq!(mask_secret("abc"), "***");
    }

    #[test]
    fn test_mask_secret_long() {
        let masked = mask_secret("abcdefghijklmnop");
        assert!(masked.starts_with("abcd"));
        assert!(masked.ends_with("mnop"));
        assert!(masked.contains("..."));
    }

    #[test]
    fn test_patterns_are_case_insensitive() {
        let scanner = SecretScanner::default();
        assert_eq!(scanner.scan_str(r#"PASSWORD = "hunter2""#), Some("password"));
        assert_eq!(scanner.scan_str(r#"Api_Key='abc'"#), Some("api_key"));
        assert_eq!(scanner.scan_str("let token = read_env();"), None);
    }

    #[test]
    fn test_detects_password_in_plain_file() {
        let dir = project_with(&[("src/config.rs", "const P: &str = \"\";\nlet password = \"x\";\n")]);
        let found = SecretScanner::default().scan(dir.path()).unwrap();
        assert_eq!(found.pattern_name, "password");
        assert_eq!(found.file, PathBuf::from("src/config.rs"));
    }

    #[test]
    fn test_marker_anywhere_suppresses_whole_file() {
        let dir = project_with(&[(
            "src/config.rs",
            "let password = \"x\";\n// see the TEST harness far below\n",
        )]);
        assert!(SecretScanner::default().scan(dir.path()).is_none());

        let dir = project_with(&[("src/lib.rs", "// Example usage\nlet token = \"abc\";\n")]);
        assert!(SecretScanner::default().scan(dir.path()).is_none());
    }

    #[test]
    fn test_pattern_order_wins_over_file_order() {
        let dir = project_with(&[
            ("src/a.rs", "let token = \"abc\";\n"),
            ("src/b.rs", "let password = \"abc\";\n"),
        ]);
        let found = SecretScanner::default().scan(dir.path()).unwrap();
        assert_eq!(found.pattern_name, "password");
        assert_eq!(found.file, PathBuf::from("src/b.rs"));
    }

    #[test]
    fn test_only_source_extension_is_scanned() {
        let dir = project_with(&[("src/settings.toml", "password = \"x\"\n")]);
        assert!(SecretScanner::default().scan(dir.path()).is_none());
    }

    #[test]
    fn test_missing_source_dir_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SecretScanner::default().scan(dir.path()).is_none());
    }

    #[test]
    fn test_non_utf8_file_is_skipped() {
        let dir = project_with(&[("src/ok.rs", "fn main() {}\n")]);
        fs::write(dir.path().join("src/blob.rs"), [0xff, 0xfe, b'p']).unwrap();
        assert!(SecretScanner::default().scan(dir.path()).is_none());
    }

    #[test]
    fn test_candidate_excludes_suppressed_and_unreadable() {
        let dir = project_with(&[
            ("src/plain.rs", "let password = \"x\";\n"),
            ("src/fixture.rs", "// test fixture\nlet password = \"x\";\n"),
        ]);
        fs::write(dir.path().join("src/blob.rs"), [0xff, 0xfe]).unwrap();
        let scanner = SecretScanner::default();

        assert!(scanner.candidate(&dir.path().join("src/plain.rs")).is_some());
        assert!(scanner.candidate(&dir.path().join("src/fixture.rs")).is_none());
        assert!(scanner.candidate(&dir.path().join("src/blob.rs")).is_none());
        assert!(scanner.candidate(&dir.path().join("src/gone.rs")).is_none());
    }

    #[test]
    fn test_excluded_files_stay_excluded_across_patterns() {
        let dir = project_with(&[
            ("src/a.rs", "let password = \"x\";\n// example\n"),
            ("src/b.rs", "let secret = \"abc\";\n"),
            ("src/c.rs", "let token = \"abc\";\n"),
        ]);
        fs::write(dir.path().join("src/aa.rs"), [0xff, 0xfe]).unwrap();

        let found = SecretScanner::default().scan(dir.path()).unwrap();
        assert_eq!(found.pattern_name, "secret");
        assert_eq!(found.file, PathBuf::from("src/b.rs"));
    }
}
