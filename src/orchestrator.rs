//! Rewrite orchestrator: applies one restaurant to one project tree.
//!
//! A run is an explicit ordered list of independent commands, each returning
//! a [`StepStatus`]. Failures are recorded and later steps still run; nothing
//! already written is rolled back. The report is the contract handed back to
//! the caller, which must not claim success when [`RunReport::is_success`] is
//! false.

use crate::adapters::{render_template, Adapter, FieldRule};
use crate::assets::{self, AssetBundle, AssetError, SyncReport};
use crate::config::{Environments, ExtraRule, ProjectLayout, RebrandConfig};
use crate::edit::{self, Preview, Replacement, RewriteError, RewriteOutcome, RewriteRule};
use crate::registry::Restaurant;
use crate::safety::ProjectGuard;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Outcome of one field rewrite.
#[derive(Debug)]
pub enum StepStatus {
    Updated { matches: usize },
    Unchanged { matches: usize },
    Failed(RewriteError),
    /// A configured rule whose locator does not compile
    InvalidRule(String),
}

impl StepStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, StepStatus::Failed(_) | StepStatus::InvalidRule(_))
    }

    fn label(&self) -> &'static str {
        match self {
            StepStatus::Updated { .. } => "updated",
            StepStatus::Unchanged { .. } => "unchanged",
            StepStatus::Failed(RewriteError::PatternNotFound { .. }) => "pattern-not-found",
            StepStatus::Failed(RewriteError::Io { .. }) => "io-failure",
            StepStatus::InvalidRule(_) => "invalid-rule",
        }
    }
}

impl From<Result<RewriteOutcome, RewriteError>> for StepStatus {
    fn from(result: Result<RewriteOutcome, RewriteError>) -> Self {
        match result {
            Ok(RewriteOutcome::Updated { matches, .. }) => StepStatus::Updated { matches },
            Ok(RewriteOutcome::Unchanged { matches, .. }) => StepStatus::Unchanged { matches },
            Err(e) => StepStatus::Failed(e),
        }
    }
}

#[derive(Debug)]
pub struct StepRecord {
    /// Adapter name, or `rule:<id>` for configured rules
    pub step: String,
    pub field: String,
    pub file: PathBuf,
    pub status: StepStatus,
    /// Text before and after, kept only when requested for diffs
    pub diff: Option<(String, String)>,
}

#[derive(Debug)]
pub struct AssetRecord {
    pub bundle: &'static str,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub result: Result<SyncReport, AssetError>,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub restaurant: String,
    pub steps: Vec<StepRecord>,
    pub assets: Vec<AssetRecord>,
    /// True for read-only runs
    pub dry_run: bool,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|s| s.status.is_failure()).count()
            + self.assets.iter().filter(|a| a.result.is_err()).count()
    }

    pub fn updated(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Updated { .. }))
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Unchanged { .. }))
            .count()
    }

    /// Message of the first failure, in run order.
    pub fn first_failure(&self) -> Option<String> {
        self.steps
            .iter()
            .find_map(|s| match &s.status {
                StepStatus::Failed(e) => Some(format!("{} ({}): {}", s.step, s.field, e)),
                StepStatus::InvalidRule(message) => Some(format!("{}: {}", s.step, message)),
                _ => None,
            })
            .or_else(|| {
                self.assets.iter().find_map(|a| match &a.result {
                    Err(e) => Some(format!("asset {}: {}", a.bundle, e)),
                    Ok(_) => None,
                })
            })
    }

    /// Machine-consumable status used by `--json`.
    pub fn summary(&self) -> RunSummary<'_> {
        RunSummary {
            restaurant: &self.restaurant,
            success: self.is_success(),
            dry_run: self.dry_run,
            steps: self
                .steps
                .iter()
                .map(|s| StepSummary {
                    step: &s.step,
                    field: &s.field,
                    file: &s.file,
                    status: s.status.label(),
                    matches: match s.status {
                        StepStatus::Updated { matches } | StepStatus::Unchanged { matches } => {
                            matches
                        }
                        StepStatus::Failed(_) | StepStatus::InvalidRule(_) => 0,
                    },
                    error: match &s.status {
                        StepStatus::Failed(e) => Some(e.to_string()),
                        StepStatus::InvalidRule(message) => Some(message.clone()),
                        _ => None,
                    },
                })
                .collect(),
            assets: self
                .assets
                .iter()
                .map(|a| AssetSummary {
                    bundle: a.bundle,
                    source: &a.source,
                    destination: &a.destination,
                    status: match &a.result {
                        Ok(sync) if sync.source_absent => "source-absent",
                        Ok(_) => "synced",
                        Err(AssetError::SourceMissing(_)) => "source-missing",
                        Err(AssetError::Unsafe(_)) => "unsafe-destination",
                        Err(AssetError::Io { .. }) => "io-failure",
                    },
                    copied: a.result.as_ref().map(|r| r.copied.len()).unwrap_or(0),
                    skipped: a.result.as_ref().map(|r| r.skipped.len()).unwrap_or(0),
                    cleaned: a.result.as_ref().map(|r| r.cleaned).unwrap_or(false),
                    error: a.result.as_ref().err().map(|e| e.to_string()),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub restaurant: &'a str,
    pub success: bool,
    pub dry_run: bool,
    pub steps: Vec<StepSummary<'a>>,
    pub assets: Vec<AssetSummary<'a>>,
}

#[derive(Debug, Serialize)]
pub struct StepSummary<'a> {
    pub step: &'a str,
    pub field: &'a str,
    pub file: &'a Path,
    pub status: &'static str,
    pub matches: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssetSummary<'a> {
    pub bundle: &'a str,
    pub source: &'a Path,
    pub destination: &'a Path,
    pub status: &'static str,
    pub copied: usize,
    pub skipped: usize,
    pub cleaned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            StepStatus::Updated { matches } => write!(
                f,
                "{} {}: updated {} ({} match{})",
                self.step,
                self.field,
                self.file.display(),
                matches,
                if *matches == 1 { "" } else { "es" }
            ),
            StepStatus::Unchanged { .. } => write!(
                f,
                "{} {}: already up to date in {}",
                self.step,
                self.field,
                self.file.display()
            ),
            StepStatus::Failed(e) => write!(f, "{} {}: {}", self.step, self.field, e),
            StepStatus::InvalidRule(message) => write!(f, "{}: {}", self.step, message),
        }
    }
}

/// Options for a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Compute outcomes without writing or copying
    pub dry_run: bool,
    pub skip_assets: bool,
    /// Keep before/after text of changed files
    pub capture_diff: bool,
}

/// Applies restaurants to one project tree.
pub struct Rebrander {
    layout: ProjectLayout,
    environments: Environments,
    extra_rules: Vec<ExtraRule>,
    assets_root: PathBuf,
    shared_ios_logo: Option<PathBuf>,
}

impl Rebrander {
    pub fn new(layout: ProjectLayout, environments: Environments, assets_root: PathBuf) -> Self {
        Self {
            layout,
            environments,
            extra_rules: Vec::new(),
            assets_root,
            shared_ios_logo: None,
        }
    }

    pub fn from_config(config: &RebrandConfig) -> Self {
        Self {
            layout: ProjectLayout::from_config(config),
            environments: config.environments.clone(),
            extra_rules: config.rules.clone(),
            assets_root: config.assets_root(),
            shared_ios_logo: config.shared_ios_logo(),
        }
    }

    pub fn with_extra_rules(mut self, rules: Vec<ExtraRule>) -> Self {
        self.extra_rules = rules;
        self
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Apply every field rewrite, then sync assets.
    pub fn apply(&self, restaurant: &Restaurant) -> RunReport {
        self.run(restaurant, RunOptions::default())
    }

    /// Read-only evaluation of the same steps.
    pub fn check(&self, restaurant: &Restaurant) -> RunReport {
        self.run(
            restaurant,
            RunOptions {
                dry_run: true,
                ..RunOptions::default()
            },
        )
    }

    pub fn run(&self, restaurant: &Restaurant, options: RunOptions) -> RunReport {
        tracing::info!(
            restaurant = %restaurant.name,
            ref_id = %restaurant.ref_id,
            dry_run = options.dry_run,
            "starting rewrite run"
        );
        let mut report = RunReport {
            restaurant: restaurant.name.clone(),
            dry_run: options.dry_run,
            ..RunReport::default()
        };

        for adapter in Adapter::ORDER {
            let rules = adapter.rules(&self.layout, restaurant, &self.environments);
            for FieldRule { field, rule } in rules {
                let record = execute(adapter.name().to_string(), field.to_string(), &rule, options);
                report.steps.push(record);
            }
        }

        for extra in &self.extra_rules {
            let record = match self.compile_extra(extra, restaurant) {
                Ok(rule) => execute(
                    format!("rule:{}", extra.id),
                    "custom".to_string(),
                    &rule,
                    options,
                ),
                Err(status) => StepRecord {
                    step: format!("rule:{}", extra.id),
                    field: "custom".to_string(),
                    file: self.layout.join(&extra.file),
                    status,
                    diff: None,
                },
            };
            report.steps.push(record);
        }

        if !options.skip_assets {
            self.sync_assets(restaurant, options.dry_run, &mut report);
        }

        tracing::info!(
            updated = report.updated(),
            unchanged = report.unchanged(),
            failed = report.failures(),
            "rewrite run finished"
        );
        report
    }

    fn compile_extra(&self, extra: &ExtraRule, restaurant: &Restaurant) -> Result<RewriteRule, StepStatus> {
        let locator = extra
            .locator()
            .map_err(|e| StepStatus::InvalidRule(e.to_string()))?;
        Ok(RewriteRule {
            file: self.layout.join(&extra.file),
            locator,
            replacement: Replacement {
                value: render_template(&extra.replacement, restaurant, &self.environments),
                escape: extra.escape.into(),
            },
        })
    }

    /// Ordered asset bundles for a restaurant's staged directory.
    pub fn asset_plan(&self, restaurant: &Restaurant) -> Vec<AssetBundle> {
        let staged = restaurant.asset_dir(&self.assets_root);
        assets::plan(&staged, &self.layout, self.shared_ios_logo.as_deref())
    }

    fn sync_assets(&self, restaurant: &Restaurant, dry_run: bool, report: &mut RunReport) {
        for bundle in self.asset_plan(restaurant) {
            let result = ProjectGuard::new(&self.layout.root)
                .map_err(AssetError::from)
                .and_then(|guard| {
                    if dry_run {
                        bundle.check(&guard)
                    } else {
                        bundle.apply(&guard)
                    }
                });
            match &result {
                Ok(sync) => tracing::info!(
                    bundle = bundle.name,
                    copied = sync.copied.len(),
                    skipped = sync.skipped.len(),
                    cleaned = sync.cleaned,
                    "assets synced"
                ),
                Err(e) => tracing::warn!(bundle = bundle.name, error = %e, "asset sync failed"),
            }
            report.assets.push(AssetRecord {
                bundle: bundle.name,
                source: bundle.source,
                destination: bundle.destination,
                result,
            });
        }
    }
}

fn execute(step: String, field: String, rule: &RewriteRule, options: RunOptions) -> StepRecord {
    let (status, diff) = if options.dry_run {
        match edit::preview(rule) {
            Ok(preview) => {
                let status = preview_status(&preview);
                (status, capture(options, preview))
            }
            Err(e) => (StepStatus::Failed(e), None),
        }
    } else if options.capture_diff {
        match edit::preview(rule) {
            Ok(preview) => {
                let status = StepStatus::from(edit::rewrite(rule));
                (status, capture(options, preview))
            }
            Err(e) => (StepStatus::Failed(e), None),
        }
    } else {
        (StepStatus::from(edit::rewrite(rule)), None)
    };

    if let StepStatus::Failed(e) = &status {
        tracing::warn!(step = %step, field = %field, error = %e, "field rewrite failed");
    }

    StepRecord {
        step,
        field,
        file: rule.file.clone(),
        status,
        diff,
    }
}

fn preview_status(preview: &Preview) -> StepStatus {
    if preview.changed() {
        StepStatus::Updated {
            matches: preview.matches,
        }
    } else {
        StepStatus::Unchanged {
            matches: preview.matches,
        }
    }
}

fn capture(options: RunOptions, preview: Preview) -> Option<(String, String)> {
    (options.capture_diff && preview.changed()).then_some((preview.original, preview.updated))
}
