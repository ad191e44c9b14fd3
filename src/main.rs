use anyhow::{Context, Result};
use app_rebrander::config::{load_from_path, load_or_default, DEFAULT_CONFIG_FILE};
use app_rebrander::orchestrator::{RunOptions, RunReport, StepStatus};
use app_rebrander::{logging, AssetError, Rebrander, RebrandConfig, Registry, Restaurant, RewriteError};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "app-rebrander")]
#[command(about = "Re-brand the shared mobile app tree for one restaurant", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to rebrand.toml (otherwise REBRAND_CONFIG, then ./rebrand.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite the project tree for a restaurant and sync its assets
    Apply {
        /// refId of the restaurant in the registry
        #[arg(short, long)]
        restaurant: String,

        /// Only rewrite fields, leave asset directories alone
        #[arg(long)]
        skip_assets: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report what apply would change without touching the tree
    Check {
        /// refId of the restaurant in the registry
        #[arg(short, long)]
        restaurant: String,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered restaurants
    List,

    /// Register a restaurant with default settings and stage its asset directories
    Add {
        #[arg(long)]
        ref_id: String,

        #[arg(long)]
        name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose).map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))?;

    let config = resolve_config(cli.config)?;

    match cli.command {
        Commands::Apply {
            restaurant,
            skip_assets,
            diff,
            json,
        } => cmd_run(
            &config,
            &restaurant,
            RunOptions {
                dry_run: false,
                skip_assets,
                capture_diff: diff,
            },
            json,
        ),

        Commands::Check {
            restaurant,
            diff,
            json,
        } => cmd_run(
            &config,
            &restaurant,
            RunOptions {
                dry_run: true,
                skip_assets: false,
                capture_diff: diff,
            },
            json,
        ),

        Commands::List => cmd_list(&config),

        Commands::Add { ref_id, name } => cmd_add(&config, ref_id, name),
    }
}

/// Resolve the configuration file
///
/// Priority order:
/// 1. Explicit --config flag
/// 2. REBRAND_CONFIG environment variable
/// 3. rebrand.toml in the current directory
/// 4. Built-in defaults relative to the current directory
fn resolve_config(cli_config: Option<PathBuf>) -> Result<RebrandConfig> {
    // 1. Explicit flag (highest priority)
    if let Some(path) = cli_config {
        return Ok(load_from_path(&path)?);
    }

    // 2. Environment variable
    if let Ok(env_path) = env::var("REBRAND_CONFIG") {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(load_from_path(&path)?);
        }
        eprintln!(
            "{}",
            format!(
                "Warning: REBRAND_CONFIG is set but path doesn't exist: {}",
                env_path
            )
            .yellow()
        );
    }

    // 3 and 4. Working directory
    let cwd = env::current_dir().context("failed to read the current directory")?;
    Ok(load_or_default(&cwd.join(DEFAULT_CONFIG_FILE), &cwd)?)
}

fn load_registry(config: &RebrandConfig) -> Result<Registry> {
    let path = config.registry_path();
    let registry = Registry::load(&path)?;
    registry
        .validate()
        .with_context(|| format!("registry {} is inconsistent", path.display()))?;
    Ok(registry)
}

fn cmd_run(config: &RebrandConfig, ref_id: &str, options: RunOptions, json: bool) -> Result<()> {
    let registry = load_registry(config)?;
    let restaurant = registry.find(ref_id)?;
    restaurant.validate()?;

    let rebrander = Rebrander::from_config(config);

    if !json {
        print_header(&rebrander, restaurant, config);
        if options.dry_run {
            println!("{}", "[CHECK - nothing will be written]".cyan());
            println!();
        }
    }

    let report = rebrander.run(restaurant, options);

    if json {
        println!("{}", serde_json::to_string_pretty(&report.summary())?);
    } else {
        print_report(&report, options.capture_diff);
    }

    if !report.is_success() {
        if let Some(failure) = report.first_failure() {
            eprintln!();
            eprintln!("{} {}", "Error:".red().bold(), failure);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn print_header(rebrander: &Rebrander, restaurant: &Restaurant, config: &RebrandConfig) {
    let env = restaurant.config.environment;
    println!(
        "Restaurant: {} ({})",
        restaurant.name.bold(),
        restaurant.ref_id
    );
    println!("Project: {}", rebrander.layout().root.display());
    println!(
        "Environment: {} -> {}",
        env,
        config.environments.base_url(env)
    );
    println!();
}

fn print_report(report: &RunReport, show_diff: bool) {
    for step in &report.steps {
        match &step.status {
            StepStatus::Updated { .. } => {
                let verb = if report.dry_run { "Would update" } else { "Updated" };
                println!(
                    "{} {} {}: {} {}",
                    "✓".green(),
                    step.step,
                    step.field,
                    verb,
                    step.file.display()
                );
                if show_diff {
                    if let Some((before, after)) = &step.diff {
                        display_diff(&step.file, before, after);
                    }
                }
            }
            StepStatus::Unchanged { .. } => {
                println!(
                    "{} {} {}: Already up to date in {}",
                    "⊙".yellow(),
                    step.step,
                    step.field,
                    step.file.display()
                );
            }
            StepStatus::Failed(e) => {
                eprintln!("{} {} {}: Failed - {}", "✗".red(), step.step, step.field, e);
                if let RewriteError::PatternNotFound { file, .. } = e {
                    eprintln!("  {}", "CONFLICT: field location not found".red());
                    eprintln!("  File: {}", file.display());
                    eprintln!("  Possible causes:");
                    eprintln!("    - Template file was edited by hand");
                    eprintln!("    - Field was renamed or removed");
                    eprintln!("    - Wrong path in [targets]");
                }
            }
            StepStatus::InvalidRule(message) => {
                eprintln!("{} {}: Invalid rule - {}", "✗".red(), step.step, message);
            }
        }
    }

    if !report.assets.is_empty() {
        println!();
    }
    for asset in &report.assets {
        match &asset.result {
            Ok(sync) if sync.source_absent => {
                println!(
                    "{} asset {}: Skipped, {} does not exist",
                    "⊙".yellow(),
                    asset.bundle,
                    asset.source.display()
                );
            }
            Ok(sync) if report.dry_run => {
                let note = if sync.cleaned { " (cleaned first)" } else { "" };
                println!(
                    "{} asset {}: Would sync {} -> {}{}",
                    "✓".green(),
                    asset.bundle,
                    asset.source.display(),
                    asset.destination.display(),
                    note
                );
            }
            Ok(sync) => {
                println!(
                    "{} asset {}: {} copied, {} skipped -> {}{}",
                    "✓".green(),
                    asset.bundle,
                    sync.copied.len(),
                    sync.skipped.len(),
                    asset.destination.display(),
                    if sync.cleaned { " (cleaned first)" } else { "" }
                );
            }
            Err(e) => {
                eprintln!("{} asset {}: Failed - {}", "✗".red(), asset.bundle, e);
                if let AssetError::SourceMissing(source) = e {
                    eprintln!("  Upload the artwork into {}", source.display());
                }
            }
        }
    }

    let synced = report
        .assets
        .iter()
        .filter(|a| matches!(&a.result, Ok(sync) if !sync.source_absent))
        .count();
    println!();
    println!("{}", "Summary:".bold());
    println!("  {} updated", format!("{}", report.updated()).green());
    println!("  {} unchanged", format!("{}", report.unchanged()).yellow());
    println!("  {} assets synced", format!("{}", synced).cyan());
    println!("  {} failed", format!("{}", report.failures()).red());
}

/// Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (rebranded)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => continue,
        };
        print!("{}", sign);
    }
    println!();
}

fn cmd_list(config: &RebrandConfig) -> Result<()> {
    let path = config.registry_path();
    let registry = Registry::load_or_default(&path)?;
    let assets_root = config.assets_root();

    println!("{}", "Registered restaurants".bold());
    println!("Registry: {}", path.display());
    println!();

    if registry.restaurants.is_empty() {
        println!("{}", "  No restaurants registered".yellow());
        return Ok(());
    }

    for r in &registry.restaurants {
        let staged = r.asset_dir(&assets_root);
        let assets = if staged.is_dir() {
            "assets staged".green()
        } else {
            "no assets".yellow()
        };
        println!(
            "  {} {} ({}) [{}] {}",
            r.ref_id.bold(),
            r.name,
            r.normalized_name().dimmed(),
            r.config.environment,
            assets
        );
        if let Err(e) = r.validate() {
            println!("    {} {}", "✗".red(), e);
        }
    }

    if let Err(e) = registry.validate() {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_add(config: &RebrandConfig, ref_id: String, name: String) -> Result<()> {
    let path = config.registry_path();
    let mut registry = Registry::load_or_default(&path)?;

    if registry.find(&ref_id).is_ok() {
        anyhow::bail!(
            "restaurant '{}' is already registered in {}",
            ref_id,
            path.display()
        );
    }

    let restaurant = Restaurant::scaffold(ref_id, name);
    restaurant.validate()?;
    registry.upsert(restaurant.clone());
    registry.validate()?;
    registry.save(&path)?;

    let staged = Registry::stage_asset_dirs(&config.assets_root(), &restaurant)?;

    println!(
        "{} Registered {} ({})",
        "✓".green(),
        restaurant.name.bold(),
        restaurant.ref_id
    );
    println!("  Bundle id: {}", restaurant.config.ios.bundle_id);
    println!("  Upload artwork into {}", staged.display());

    Ok(())
}
