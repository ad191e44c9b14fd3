//! App Rebrander: turns the shared mobile app tree into one restaurant's build
//!
//! A run reads one restaurant record from the registry and rewrites every
//! brand-bearing field in the project (constants, payment labels, Android and
//! iOS manifests, string resources) before copying the restaurant's staged
//! artwork into place.
//!
//! # Architecture
//!
//! Every field rewrite compiles down to one primitive: a [`RewriteRule`]
//! (file, locator, replacement) applied by [`edit::rewrite`]. Locators are
//! field-anchored: they match the syntax surrounding a value, never the
//! value itself, so any previous brand is found and replaced. The
//! [`adapters`] module owns the per-file rules and the [`Rebrander`] runs
//! them in order and collects a [`RunReport`].
//!
//! # Safety
//!
//! - Zero matches is a failure and leaves the file untouched
//! - Atomic file writes (tempfile + fsync + rename)
//! - Files already holding the new values are not rewritten
//! - Asset writes and deletions stay inside the project root
//!
//! # Example
//!
//! ```no_run
//! use app_rebrander::{Rebrander, RebrandConfig, Registry};
//!
//! let config = RebrandConfig::default();
//! let registry = Registry::load(config.registry_path())?;
//! let restaurant = registry.find("42")?;
//!
//! let report = Rebrander::from_config(&config).apply(restaurant);
//! if let Some(failure) = report.first_failure() {
//!     eprintln!("rebrand failed: {failure}");
//! }
//! # Ok::<(), app_rebrander::RegistryError>(())
//! ```

pub mod adapters;
pub mod assets;
pub mod config;
pub mod edit;
pub mod logging;
pub mod matcher;
pub mod orchestrator;
pub mod registry;
pub mod safety;

// Re-exports
pub use adapters::{Adapter, Field, FieldRule};
pub use assets::{AssetBundle, AssetError, SyncReport};
pub use config::{load_from_path, load_from_str, ConfigError, ProjectLayout, RebrandConfig};
pub use edit::{Escape, Replacement, RewriteError, RewriteOutcome, RewriteRule};
pub use matcher::{Locator, MatchSpan, PatternError};
pub use orchestrator::{Rebrander, RunOptions, RunReport, StepRecord, StepStatus};
pub use registry::{AppConfig, Environment, PlatformConfig, Registry, RegistryError, Restaurant};
pub use safety::{ProjectGuard, SafetyError};
