use crate::config::schema::{RebrandConfig, ValidationError, ValidationIssue};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "rebrand.toml";

/// Why a `rebrand.toml` could not be used. `path` is filled in by
/// [`load_from_path`]; configs parsed from a string have none.
#[derive(Debug)]
pub enum ConfigError {
    /// The file exists in the discovery chain but cannot be read
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Not TOML, or a table such as `[targets]` or `[[rules]]` has the wrong shape
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    /// Parsed, but paths, environments or rules are unusable
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ConfigError {
    fn in_file(self, file: &Path) -> Self {
        match self {
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(file.to_path_buf()),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(file.to_path_buf()),
                source,
            },
            other => other,
        }
    }

    /// Every validation issue, empty for read and parse failures.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            ConfigError::Validation { source, .. } => &source.issues,
            _ => &[],
        }
    }
}

fn config_name(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => DEFAULT_CONFIG_FILE.to_string(),
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "cannot read rebrand config {}: {}", path.display(), source)
            }
            ConfigError::Toml { path, source } => write!(
                f,
                "{} is not a valid rebrand config (check the [project], [targets], [registry], [environments] and [[rules]] tables): {}",
                config_name(path),
                source.to_string().trim_end()
            ),
            ConfigError::Validation { path, source } => {
                let count = source.issues.len();
                write!(
                    f,
                    "{} rejected with {} issue{}:",
                    config_name(path),
                    count,
                    if count == 1 { "" } else { "s" }
                )?;
                for issue in &source.issues {
                    write!(f, "\n  - {issue}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
        }
    }
}

/// Parse and validate. Relative paths resolve against `base_dir`.
pub fn load_from_str(input: &str, base_dir: impl Into<PathBuf>) -> Result<RebrandConfig, ConfigError> {
    let mut config: RebrandConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    config.base_dir = base_dir.into();
    Ok(config)
}

/// Load a config file; relative paths resolve against its directory.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RebrandConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    load_from_str(&contents, base_dir).map_err(|error| error.in_file(path))
}

/// Load `path` when it exists, otherwise built-in defaults rooted at `base_dir`.
pub fn load_or_default(path: &Path, base_dir: &Path) -> Result<RebrandConfig, ConfigError> {
    if path.exists() {
        return load_from_path(path);
    }
    Ok(RebrandConfig {
        base_dir: base_dir.to_path_buf(),
        ..RebrandConfig::default()
    })
}
