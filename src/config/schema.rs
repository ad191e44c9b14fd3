use crate::edit::Escape;
use crate::matcher::{Locator, PatternError};
use crate::registry::Environment;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RebrandConfig {
    #[serde(default)]
    pub project: ProjectSection,
    #[serde(default)]
    pub targets: Targets,
    #[serde(default)]
    pub registry: RegistrySection,
    #[serde(default)]
    pub environments: Environments,
    #[serde(default)]
    pub rules: Vec<ExtraRule>,
    /// Directory relative paths resolve against; set by the loader
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProjectSection {
    #[serde(default = "default_project_root")]
    pub root: String,
    /// Name of the Xcode project and its app folder
    #[serde(default = "default_ios_project")]
    pub ios_project: String,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            root: default_project_root(),
            ios_project: default_ios_project(),
        }
    }
}

fn default_project_root() -> String {
    "bitesnbagsMainApp".to_string()
}

fn default_ios_project() -> String {
    "bitesnbags".to_string()
}

/// Per-file overrides, relative to the project root.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Targets {
    pub constants: Option<String>,
    pub apple_pay: Option<String>,
    pub google_pay: Option<String>,
    pub android_manifest: Option<String>,
    pub android_strings: Option<String>,
    pub ios_manifest: Option<String>,
    pub ios_info_plist: Option<String>,
    pub ios_assets: Option<String>,
    pub android_res: Option<String>,
    pub android_app: Option<String>,
}

impl Targets {
    fn entries(&self) -> [(&'static str, Option<&String>); 10] {
        [
            ("targets.constants", self.constants.as_ref()),
            ("targets.apple_pay", self.apple_pay.as_ref()),
            ("targets.google_pay", self.google_pay.as_ref()),
            ("targets.android_manifest", self.android_manifest.as_ref()),
            ("targets.android_strings", self.android_strings.as_ref()),
            ("targets.ios_manifest", self.ios_manifest.as_ref()),
            ("targets.ios_info_plist", self.ios_info_plist.as_ref()),
            ("targets.ios_assets", self.ios_assets.as_ref()),
            ("targets.android_res", self.android_res.as_ref()),
            ("targets.android_app", self.android_app.as_ref()),
        ]
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistrySection {
    #[serde(default = "default_registry_path")]
    pub path: String,
    #[serde(default = "default_assets_root")]
    pub assets_root: String,
    /// Logo set shared by every brand, copied into `Logo.imageset` last.
    /// Skipped when the directory does not exist; an empty string disables it.
    #[serde(default = "default_shared_ios_logo")]
    pub shared_ios_logo: String,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            path: default_registry_path(),
            assets_root: default_assets_root(),
            shared_ios_logo: default_shared_ios_logo(),
        }
    }
}

fn default_shared_ios_logo() -> String {
    "public/ios".to_string()
}

fn default_registry_path() -> String {
    "app/data/restaurants.json".to_string()
}

fn default_assets_root() -> String {
    "public/restaurants".to_string()
}

/// Base URL per deployment environment.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Environments {
    #[serde(default = "default_staging_url")]
    pub staging: String,
    #[serde(default = "default_live_url")]
    pub live: String,
}

impl Default for Environments {
    fn default() -> Self {
        Self {
            staging: default_staging_url(),
            live: default_live_url(),
        }
    }
}

fn default_staging_url() -> String {
    "https://stg.bitesnbags.com".to_string()
}

fn default_live_url() -> String {
    "https://bitesnbags.com".to_string()
}

impl Environments {
    /// Derived from the tag on every run, never read back from the tree.
    pub fn base_url(&self, environment: Environment) -> &str {
        match environment {
            Environment::Staging => &self.staging,
            Environment::Live => &self.live,
        }
    }
}

/// Additional rewrite declared in configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ExtraRule {
    pub id: String,
    /// Relative to the project root
    pub file: String,
    #[serde(default)]
    pub literal: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    /// May contain placeholders such as `{app_name}`
    pub replacement: String,
    #[serde(default)]
    pub escape: EscapeSetting,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EscapeSetting {
    #[default]
    None,
    QuotedLiteral,
}

impl From<EscapeSetting> for Escape {
    fn from(value: EscapeSetting) -> Self {
        match value {
            EscapeSetting::None => Escape::None,
            EscapeSetting::QuotedLiteral => Escape::QuotedLiteral,
        }
    }
}

impl ExtraRule {
    pub fn locator(&self) -> Result<Locator, PatternError> {
        match (&self.literal, &self.pattern) {
            (Some(text), None) => Locator::literal(text.clone()),
            (None, Some(pattern)) => Locator::parse(pattern),
            _ => Err(PatternError::Invalid {
                pattern: String::new(),
                message: "exactly one of 'literal' or 'pattern' is required".to_string(),
            }),
        }
    }
}

impl RebrandConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        for (field, value) in [
            ("project.root", &self.project.root),
            ("project.ios_project", &self.project.ios_project),
            ("registry.path", &self.registry.path),
            ("registry.assets_root", &self.registry.assets_root),
            ("environments.staging", &self.environments.staging),
            ("environments.live", &self.environments.live),
        ] {
            if value.trim().is_empty() {
                issues.push(ValidationIssue::MissingField { field });
            }
        }

        for (field, value) in self.targets.entries() {
            if let Some(path) = value {
                if !is_contained_relative(path) {
                    issues.push(ValidationIssue::UnsafePath {
                        field: field.to_string(),
                        path: path.clone(),
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                issues.push(ValidationIssue::InvalidRule {
                    rule_id: None,
                    message: "missing required field 'id'".to_string(),
                });
            } else if !seen.insert(rule.id.as_str()) {
                issues.push(ValidationIssue::DuplicateRule(rule.id.clone()));
            }
            if !is_contained_relative(&rule.file) {
                issues.push(ValidationIssue::UnsafePath {
                    field: format!("rules.{}.file", rule.id),
                    path: rule.file.clone(),
                });
            }
            if let Err(e) = rule.locator() {
                issues.push(ValidationIssue::InvalidRule {
                    rule_id: Some(rule.id.clone()),
                    message: e.to_string(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Resolve a configured path against the config's base directory.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn registry_path(&self) -> PathBuf {
        self.resolve(&self.registry.path)
    }

    pub fn assets_root(&self) -> PathBuf {
        self.resolve(&self.registry.assets_root)
    }

    pub fn shared_ios_logo(&self) -> Option<PathBuf> {
        let path = self.registry.shared_ios_logo.trim();
        (!path.is_empty()).then(|| self.resolve(path))
    }
}

/// Non-empty, relative, and free of `..` components.
fn is_contained_relative(path: &str) -> bool {
    let path = Path::new(path);
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    MissingField { field: &'static str },
    UnsafePath { field: String, path: String },
    InvalidRule {
        rule_id: Option<String>,
        message: String,
    },
    DuplicateRule(String),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "missing required field '{field}'")
            }
            ValidationIssue::UnsafePath { field, path } => write!(
                f,
                "'{field}' must be a relative path inside the project, got '{path}'"
            ),
            ValidationIssue::InvalidRule { rule_id, message } => match rule_id {
                Some(id) => write!(f, "rule '{id}' is invalid: {message}"),
                None => write!(f, "invalid rule: {message}"),
            },
            ValidationIssue::DuplicateRule(id) => write!(f, "duplicate rule id '{id}'"),
        }
    }
}
