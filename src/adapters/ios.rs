//! `project.pbxproj` build settings. Values are written bare or quoted;
//! every build configuration carrying the key is rewritten.
//!
//! Values built from other settings (`$(PRODUCT_NAME:rfc1034identifier)` in
//! the React Native test target) belong to another target and never match.

use super::{builtin, Field, FieldRule};
use crate::edit::{Replacement, RewriteRule};
use crate::matcher::Locator;
use crate::registry::PlatformConfig;
use std::path::Path;
use std::sync::LazyLock;

fn build_setting(key: &str) -> String {
    format!(r#"\b{key}\s*=\s*(?:"(?P<value_dq>[^"\n$]*)"|(?P<value>[^\s;"$]+))\s*;"#)
}

static BUNDLE_IDENTIFIER: LazyLock<Locator> =
    LazyLock::new(|| builtin(&build_setting("PRODUCT_BUNDLE_IDENTIFIER")));
static BUILD_NUMBER: LazyLock<Locator> =
    LazyLock::new(|| builtin(&build_setting("CURRENT_PROJECT_VERSION")));
static MARKETING_VERSION: LazyLock<Locator> =
    LazyLock::new(|| builtin(&build_setting("MARKETING_VERSION")));

/// Home-screen name. The span covers the quotes so the value is always
/// written as a quoted string, whatever form it had before.
static DISPLAY_NAME: LazyLock<Locator> = LazyLock::new(|| {
    builtin(
        r#"\bINFOPLIST_KEY_CFBundleDisplayName\s*=\s*(?P<value>"(?:\\.|[^"\\\n])*"|[^\s;"]+)\s*;"#,
    )
});

/// Quoted pbxproj string.
pub fn quote_pbxproj(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn rules(file: &Path, ios: &PlatformConfig, app_name: &str) -> Vec<FieldRule> {
    [
        (
            Field::BundleIdentifier,
            &*BUNDLE_IDENTIFIER,
            ios.bundle_id.clone(),
        ),
        (Field::BuildNumber, &*BUILD_NUMBER, ios.build_number.clone()),
        (
            Field::MarketingVersion,
            &*MARKETING_VERSION,
            ios.build_version.clone(),
        ),
        (Field::DisplayName, &*DISPLAY_NAME, quote_pbxproj(app_name)),
    ]
    .into_iter()
    .map(|(field, locator, value)| FieldRule {
        field,
        rule: RewriteRule {
            file: file.to_path_buf(),
            locator: locator.clone(),
            replacement: Replacement::verbatim(value),
        },
    })
    .collect()
}
