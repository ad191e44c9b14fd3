//! Restaurant registry: the JSON file the configuration form maintains.
//!
//! The engine only reads one [`Restaurant`] per run and never mutates it. The
//! write side (`upsert`, `save`, `stage_asset_dirs`) exists so the CLI can
//! register a new restaurant the same way the form does.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Staged asset subdirectories created for every restaurant.
pub const STAGED_ASSET_DIRS: [&str; 5] = [
    "ios/AppIcon.appiconset",
    "ios/SplashScreen.imageset",
    "ios/Logo.imageset",
    "android/res",
    "android/json",
];

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read registry {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse registry {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("restaurant '{0}' not found in registry")]
    NotFound(String),

    #[error("duplicate refId '{0}'")]
    DuplicateRefId(String),

    #[error("restaurants '{first}' and '{second}' share the asset directory name '{normalized}'")]
    NameCollision {
        first: String,
        second: String,
        normalized: String,
    },

    #[error("invalid restaurant '{ref_id}': {issues}")]
    Invalid { ref_id: String, issues: FieldIssues },
}

/// Field-level validation problems for one restaurant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssues(pub Vec<String>);

impl fmt::Display for FieldIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Staging,
    Live,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Staging => write!(f, "staging"),
            Environment::Live => write!(f, "live"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    pub bundle_id: String,
    pub build_number: String,
    pub build_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub app_name: String,
    pub api_ref_id: String,
    pub pusher_id: String,
    #[serde(default)]
    pub facebook_id: String,
    pub apple_pay_label: String,
    pub google_pay_merchant: String,
    pub environment: Environment,
    pub ios: PlatformConfig,
    pub android: PlatformConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub ref_id: String,
    pub name: String,
    pub config: AppConfig,
}

/// Lower-case and strip everything that is not ASCII alphanumeric.
///
/// ```
/// use app_rebrander::registry::normalize_name;
/// assert_eq!(normalize_name("Ivy Shop!"), "ivyshop");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl Restaurant {
    /// Defaults for a freshly registered restaurant.
    pub fn scaffold(ref_id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let bundle_id = format!("com.bitesnbags.{}", normalize_name(&name));
        let label = format!("{name} (via biteME)");
        let platform = PlatformConfig {
            bundle_id,
            build_number: "1".to_string(),
            build_version: "1.0.0".to_string(),
        };
        Self {
            ref_id: ref_id.into(),
            config: AppConfig {
                app_name: name.clone(),
                api_ref_id: String::new(),
                pusher_id: String::new(),
                facebook_id: String::new(),
                apple_pay_label: label.clone(),
                google_pay_merchant: label,
                environment: Environment::Staging,
                ios: platform.clone(),
                android: platform,
            },
            name,
        }
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Staged asset directory for this restaurant under `assets_root`.
    pub fn asset_dir(&self, assets_root: &Path) -> PathBuf {
        assets_root.join(self.normalized_name())
    }

    /// Check that every value can be written and found again by the rewrite rules.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut issues = Vec::new();

        if self.ref_id.trim().is_empty() {
            issues.push("refId must not be empty".to_string());
        }
        if self.normalized_name().is_empty() {
            issues.push(format!(
                "name '{}' has no alphanumeric characters",
                self.name
            ));
        }

        let cfg = &self.config;
        if cfg.app_name.trim().is_empty() {
            issues.push("appName must not be empty".to_string());
        }
        for (field, value) in [
            ("appName", &cfg.app_name),
            ("apiRefId", &cfg.api_ref_id),
            ("pusherId", &cfg.pusher_id),
            ("applePayLabel", &cfg.apple_pay_label),
            ("googlePayMerchant", &cfg.google_pay_merchant),
        ] {
            if value.contains(['\n', '\r']) {
                issues.push(format!("{field} must be a single line"));
            }
        }

        for (platform, p) in [("ios", &cfg.ios), ("android", &cfg.android)] {
            if p.bundle_id.is_empty()
                || !p
                    .bundle_id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            {
                issues.push(format!(
                    "{platform}.bundleId '{}' must be non-empty and contain only [A-Za-z0-9._-]",
                    p.bundle_id
                ));
            }
            if p.build_number.is_empty() || !p.build_number.chars().all(|c| c.is_ascii_digit()) {
                issues.push(format!(
                    "{platform}.buildNumber '{}' must be a positive integer",
                    p.build_number
                ));
            }
            if parse_build_version(&p.build_version).is_none() {
                issues.push(format!(
                    "{platform}.buildVersion '{}' must be MAJOR.MINOR[.PATCH]",
                    p.build_version
                ));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::Invalid {
                ref_id: self.ref_id.clone(),
                issues: FieldIssues(issues),
            })
        }
    }
}

/// Parse `MAJOR.MINOR[.PATCH]`. Pre-release and build metadata are rejected.
pub fn parse_build_version(value: &str) -> Option<semver::Version> {
    let full = match value.matches('.').count() {
        1 => format!("{value}.0"),
        2 => value.to_string(),
        _ => return None,
    };
    let version = semver::Version::parse(&full).ok()?;
    (version.pre.is_empty() && version.build.is_empty()).then_some(version)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
}

impl Registry {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| RegistryError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load, or start empty when the file does not exist yet.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Write back as 2-space indented JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RegistryError> {
        let path = path.as_ref();
        let io_err = |source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|source| RegistryError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        crate::edit::atomic_write(path, json.as_bytes()).map_err(io_err)
    }

    pub fn find(&self, ref_id: &str) -> Result<&Restaurant, RegistryError> {
        self.restaurants
            .iter()
            .find(|r| r.ref_id == ref_id)
            .ok_or_else(|| RegistryError::NotFound(ref_id.to_string()))
    }

    /// Replace the entry with the same refId, or append.
    pub fn upsert(&mut self, restaurant: Restaurant) {
        match self
            .restaurants
            .iter_mut()
            .find(|r| r.ref_id == restaurant.ref_id)
        {
            Some(existing) => *existing = restaurant,
            None => self.restaurants.push(restaurant),
        }
    }

    /// Registry-wide invariants: unique refId, unique normalized name.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut ref_ids = HashSet::new();
        let mut names: HashMap<String, &str> = HashMap::new();

        for r in &self.restaurants {
            if !ref_ids.insert(r.ref_id.as_str()) {
                return Err(RegistryError::DuplicateRefId(r.ref_id.clone()));
            }
            let normalized = r.normalized_name();
            if let Some(first) = names.insert(normalized.clone(), r.name.as_str()) {
                return Err(RegistryError::NameCollision {
                    first: first.to_string(),
                    second: r.name.clone(),
                    normalized,
                });
            }
        }
        Ok(())
    }

    /// Create the staged upload directories for a restaurant.
    pub fn stage_asset_dirs(
        assets_root: &Path,
        restaurant: &Restaurant,
    ) -> Result<PathBuf, RegistryError> {
        let base = restaurant.asset_dir(assets_root);
        for sub in STAGED_ASSET_DIRS {
            let dir = base.join(sub);
            fs::create_dir_all(&dir).map_err(|source| RegistryError::Io { path: dir, source })?;
        }
        Ok(base)
    }
}
