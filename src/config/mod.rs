pub mod layout;
pub mod loader;
pub mod schema;

pub use layout::ProjectLayout;
pub use loader::{load_from_path, load_from_str, load_or_default, ConfigError, DEFAULT_CONFIG_FILE};
pub use schema::{
    Environments, EscapeSetting, ExtraRule, ProjectSection, RebrandConfig, RegistrySection,
    Targets, ValidationError, ValidationIssue,
};
