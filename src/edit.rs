use crate::matcher::{locate, Locator, MatchSpan};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One field rewrite: which file, where the value lives, and what goes there.
#[derive(Debug, Clone)]
#[must_use = "RewriteRule does nothing until rewrite() is called"]
pub struct RewriteRule {
    /// Path to the target file
    pub file: PathBuf,
    /// Location of the current value
    pub locator: Locator,
    /// Replacement for every located span
    pub replacement: Replacement,
}

/// Rendered new value plus the escaping applied per match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub value: String,
    pub escape: Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Escape {
    /// Insert the value as-is
    #[default]
    None,
    /// Escape for a JS/TS string literal whose opening quote precedes the span
    QuotedLiteral,
}

impl Replacement {
    pub fn verbatim(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            escape: Escape::None,
        }
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            escape: Escape::QuotedLiteral,
        }
    }

    /// Render the replacement for a span of `text`.
    pub fn render(&self, text: &str, span: MatchSpan) -> String {
        match self.escape {
            Escape::None => self.value.clone(),
            Escape::QuotedLiteral => {
                let quote = text[..span.start].chars().next_back().unwrap_or('\'');
                escape_quoted(&self.value, quote)
            }
        }
    }
}

fn escape_quoted(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            // `${` would start an interpolation inside a template literal
            '$' if quote == '`' => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out
}

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("pattern not found in {}: {rule}", file.display())]
    PatternNotFound { file: PathBuf, rule: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RewriteError {
    pub fn file(&self) -> &Path {
        match self {
            RewriteError::PatternNotFound { file, .. } => file,
            RewriteError::Io { path, .. } => path,
        }
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        RewriteError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result of a rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "RewriteOutcome should be checked for updated/unchanged"]
pub enum RewriteOutcome {
    /// File content changed and was written
    Updated { file: PathBuf, matches: usize },
    /// Every match already held the new value; nothing was written
    Unchanged { file: PathBuf, matches: usize },
}

impl RewriteOutcome {
    pub fn matches(&self) -> usize {
        match self {
            RewriteOutcome::Updated { matches, .. } | RewriteOutcome::Unchanged { matches, .. } => {
                *matches
            }
        }
    }
}

/// Computed result of a rule against a file, without touching the disk.
#[derive(Debug, Clone)]
pub struct Preview {
    pub file: PathBuf,
    pub original: String,
    pub updated: String,
    pub matches: usize,
}

impl Preview {
    pub fn changed(&self) -> bool {
        self.original != self.updated
    }
}

/// Read the target file, locate the rule and compute the replaced text.
///
/// Fails with [`RewriteError::PatternNotFound`] when the rule matches nothing.
pub fn preview(rule: &RewriteRule) -> Result<Preview, RewriteError> {
    let original = fs::read_to_string(&rule.file).map_err(|e| RewriteError::io(&rule.file, e))?;
    let (updated, matches) = replace_all(&original, &rule.locator, &rule.replacement)
        .ok_or_else(|| RewriteError::PatternNotFound {
            file: rule.file.clone(),
            rule: rule.locator.to_string(),
        })?;
    Ok(Preview {
        file: rule.file.clone(),
        original,
        updated,
        matches,
    })
}

/// Apply a rule to its file: read whole, replace every match, write whole.
///
/// The file is left untouched on any error, and is not rewritten when the
/// result would be byte-identical.
pub fn rewrite(rule: &RewriteRule) -> Result<RewriteOutcome, RewriteError> {
    let preview = preview(rule)?;

    if !preview.changed() {
        tracing::debug!(file = %rule.file.display(), matches = preview.matches, "already up to date");
        return Ok(RewriteOutcome::Unchanged {
            file: preview.file,
            matches: preview.matches,
        });
    }

    atomic_write(&rule.file, preview.updated.as_bytes())
        .map_err(|e| RewriteError::io(&rule.file, e))?;
    tracing::info!(file = %rule.file.display(), matches = preview.matches, "updated");

    Ok(RewriteOutcome::Updated {
        file: preview.file,
        matches: preview.matches,
    })
}

/// Replace every located span. `None` when nothing matched.
pub fn replace_all(
    text: &str,
    locator: &Locator,
    replacement: &Replacement,
) -> Option<(String, usize)> {
    let spans = locate(text, locator);
    if spans.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(text.len() + replacement.value.len() * spans.len());
    let mut cursor = 0;
    for span in &spans {
        out.push_str(&text[cursor..span.start]);
        out.push_str(&replacement.render(text, *span));
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    Some((out, spans.len()))
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write lands or the previous content stays in place.
pub(crate) fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Tempfile in the same directory keeps the rename on one filesystem
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        Some(_) => Path::new("."),
        None => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        }
    };

    let permissions = fs::metadata(path).ok().map(|m| m.permissions());

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    if let Some(permissions) = permissions {
        temp.as_file().set_permissions(permissions)?;
    }
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(file: &Path, pattern: &str, replacement: Replacement) -> RewriteRule {
        RewriteRule {
            file: file.to_path_buf(),
            locator: Locator::pattern(pattern).unwrap(),
            replacement,
        }
    }

    #[test]
    fn test_quoted_escape_uses_opening_quote() {
        let text = r#"a: "x" b: 'y'"#;
        let r = Replacement::quoted(r#"Joe's "Diner""#);
        let dq = MatchSpan { start: 4, end: 5 };
        let sq = MatchSpan { start: 11, end: 12 };
        assert_eq!(r.render(text, dq), r#"Joe's \"Diner\""#);
        assert_eq!(r.render(text, sq), r#"Joe\'s "Diner""#);
    }

    #[test]
    fn test_quoted_escape_template_literal() {
        assert_eq!(escape_quoted("${x} `y`", '`'), "\\${x} \\`y\\`");
    }

    #[test]
    fn test_replace_all_no_match() {
        let loc = Locator::literal("zzz").unwrap();
        assert!(replace_all("abc", &loc, &Replacement::verbatim("q")).is_none());
    }

    #[test]
    fn test_rewrite_updates_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("build.gradle");
        fs::write(&file_path, "versionCode 3\nversionName \"1.0\"\n").unwrap();

        let r = rule(&file_path, r"versionCode\s+(?P<value>\d+)", Replacement::verbatim("7"));
        let outcome = rewrite(&r).unwrap();

        assert!(matches!(outcome, RewriteOutcome::Updated { matches: 1, .. }));
        let content = fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, "versionCode 7\nversionName \"1.0\"\n");
    }

    #[test]
    fn test_rewrite_second_application_unchanged() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("build.gradle");
        fs::write(&file_path, "versionCode 3\n").unwrap();

        let r = rule(&file_path, r"versionCode\s+(?P<value>\d+)", Replacement::verbatim("7"));
        let _ = rewrite(&r).unwrap();
        let first = fs::read(&file_path).unwrap();
        let outcome = rewrite(&r).unwrap();

        assert!(matches!(outcome, RewriteOutcome::Unchanged { .. }));
        assert_eq!(fs::read(&file_path).unwrap(), first);
    }

    #[test]
    fn test_rewrite_pattern_not_found_leaves_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("build.gradle");
        fs::write(&file_path, "versionName \"1.0\"\n").unwrap();

        let r = rule(&file_path, r"versionCode\s+(?P<value>\d+)", Replacement::verbatim("7"));
        let err = rewrite(&r).unwrap_err();

        assert!(matches!(err, RewriteError::PatternNotFound { .. }));
        assert_eq!(err.file(), file_path.as_path());
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "versionName \"1.0\"\n");
    }

    #[test]
    fn test_rewrite_missing_file_is_io() {
        let temp_dir = tempfile::tempdir().unwrap();
        let r = rule(
            &temp_dir.path().join("absent.ts"),
            "x",
            Replacement::verbatim("y"),
        );
        assert!(matches!(rewrite(&r), Err(RewriteError::Io { .. })));
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, b"original content").unwrap();

        atomic_write(&file_path, b"modified").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "modified");
    }
}
