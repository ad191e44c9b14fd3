//! Integration tests: rebrand.toml loading, target overrides and configured rules

mod common;

use app_rebrander::config::{load_from_path, ConfigError, ValidationIssue};
use app_rebrander::orchestrator::{RunOptions, RunReport, StepStatus};
use app_rebrander::{Environment, ProjectLayout, Rebrander, Registry};
use common::{hash_burger, Fixture, CONSTANTS_TS};
use std::fs;

const FULL_CONFIG: &str = r#"
[project]
root = "bitesnbagsMainApp"
ios_project = "bitesnbags"

[targets]
constants = "src/config/constants.ts"

[registry]
path = "data/restaurants.json"
assets_root = "uploads"

[environments]
staging = "https://staging.example.test"
live = "https://example.test"

[[rules]]
id = "app-json-display-name"
file = "app.json"
pattern = '/"displayName":\s*"(?P<value>[^"]*)"/g'
replacement = "{app_name}"

[[rules]]
id = "splash-title"
file = "src/screens/Splash.tsx"
literal = "Welcome to Ivy Shop"
replacement = "Welcome to {name} ({environment})"
"#;

fn configured_fixture() -> Fixture {
    let fixture = Fixture::new();
    fixture.write("rebrand.toml", FULL_CONFIG);
    fixture.write_project_file("src/config/constants.ts", CONSTANTS_TS);
    fixture.write_project_file(
        "app.json",
        "{\n  \"name\": \"bitesnbags\",\n  \"displayName\": \"Ivy Shop\"\n}\n",
    );
    fixture.write_project_file(
        "src/screens/Splash.tsx",
        "<Text>Welcome to Ivy Shop</Text>\n",
    );
    fixture
}

#[test]
fn test_full_config_parses() {
    let fixture = configured_fixture();
    let config = load_from_path(fixture.base().join("rebrand.toml")).unwrap();

    assert_eq!(config.rules.len(), 2);
    assert_eq!(
        config.environments.base_url(Environment::Staging),
        "https://staging.example.test"
    );
    assert_eq!(
        config.registry_path(),
        fixture.base().join("data/restaurants.json")
    );
    assert_eq!(config.assets_root(), fixture.base().join("uploads"));

    let layout = ProjectLayout::from_config(&config);
    assert_eq!(
        layout.constants,
        fixture.project().join("src/config/constants.ts")
    );
    assert_eq!(
        layout.apple_pay,
        fixture.project().join("src/lib/hooks/useApplePay.ts")
    );
}

#[test]
fn test_overrides_and_rules_applied() {
    let fixture = configured_fixture();
    let config = fixture.config();

    let report = Rebrander::from_config(&config).run(
        &hash_burger(),
        RunOptions {
            skip_assets: true,
            ..RunOptions::default()
        },
    );

    assert!(report.is_success(), "{:?}", report.first_failure());
    assert_eq!(report.steps.len(), 16);

    // Overridden constants file gets the configured staging URL
    assert!(fixture
        .read_project_file("src/config/constants.ts")
        .contains("\nexport const DOMAIN_URL = 'https://staging.example.test';"));
    // Conventional location is no longer a target
    assert_eq!(
        fixture.read_project_file("src/lib/constants.ts"),
        CONSTANTS_TS
    );

    assert!(fixture
        .read_project_file("app.json")
        .contains("\"displayName\": \"Hash Burger\""));
    assert_eq!(
        fixture.read_project_file("src/screens/Splash.tsx"),
        "<Text>Welcome to Hash Burger (staging)</Text>\n"
    );
}

#[test]
fn test_literal_rule_is_not_idempotent_but_pattern_rule_is() {
    let fixture = configured_fixture();
    let rebrander = Rebrander::from_config(&fixture.config());
    let options = RunOptions {
        skip_assets: true,
        ..RunOptions::default()
    };
    rebrander.run(&hash_burger(), options);

    let report = rebrander.run(&hash_burger(), options);

    assert!(matches!(
        status_of(&report, "app-json-display-name"),
        StepStatus::Unchanged { .. }
    ));
    // A literal only finds the text it was written against
    assert!(status_of(&report, "splash-title").is_failure());
}

fn status_of<'a>(report: &'a RunReport, id: &str) -> &'a StepStatus {
    &report
        .steps
        .iter()
        .find(|s| s.step == format!("rule:{id}"))
        .unwrap()
        .status
}

#[test]
fn test_validation_reports_every_issue() {
    let fixture = Fixture::new();
    fixture.write(
        "rebrand.toml",
        r#"
[environments]
staging = ""

[targets]
ios_assets = "/Users/me/Images.xcassets"

[[rules]]
id = "broken"
file = "../outside.json"
pattern = "/(unclosed/"
replacement = "x"
"#,
    );

    let err = load_from_path(fixture.base().join("rebrand.toml")).unwrap_err();

    let ConfigError::Validation { path, source } = &err else {
        panic!("expected validation error, got {err}");
    };
    assert!(path.is_some());
    assert_eq!(source.issues.len(), 4);
    assert!(source
        .issues
        .iter()
        .any(|i| matches!(i, ValidationIssue::MissingField { field } if *field == "environments.staging")));
    assert!(err.to_string().contains("rule 'broken' is invalid"));
}

#[test]
fn test_unknown_key_types_rejected() {
    let fixture = Fixture::new();
    fixture.write("rebrand.toml", "[project]\nroot = 42\n");

    let err = load_from_path(fixture.base().join("rebrand.toml")).unwrap_err();

    assert!(matches!(err, ConfigError::Toml { .. }));
}

#[test]
fn test_registry_round_trip_and_staging() {
    let fixture = Fixture::new();
    let config = fixture.config();
    let restaurant = hash_burger();
    fixture.write_registry(vec![restaurant.clone()]);

    let registry = Registry::load(config.registry_path()).unwrap();
    assert_eq!(registry.find("hb-7").unwrap(), &restaurant);

    let json = fs::read_to_string(config.registry_path()).unwrap();
    assert!(json.contains("\"refId\": \"hb-7\""));
    assert!(json.contains("\"googlePayMerchant\": \"Hash Burger Ltd\""));

    let staged = Registry::stage_asset_dirs(&config.assets_root(), &restaurant).unwrap();
    assert_eq!(staged, fixture.base().join("public/restaurants/hashburger"));
    assert!(staged.join("ios/SplashScreen.imageset").is_dir());
    assert!(staged.join("android/json").is_dir());
}
