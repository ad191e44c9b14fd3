//! `android/app/build.gradle`: application id and version.
//!
//! Groovy accepts `key value` and `key = value` and either quote style;
//! assignments are line-anchored so commented-out lines are skipped.

use super::{builtin, Field, FieldRule};
use crate::edit::{Replacement, RewriteRule};
use crate::matcher::Locator;
use crate::registry::PlatformConfig;
use std::path::Path;
use std::sync::LazyLock;

static APPLICATION_ID: LazyLock<Locator> = LazyLock::new(|| {
    builtin(r#"(?m)^[ \t]*applicationId\s*=?\s*(?:'(?P<value_sq>[^'\n]*)'|"(?P<value_dq>[^"\n]*)")"#)
});
static VERSION_CODE: LazyLock<Locator> =
    LazyLock::new(|| builtin(r"(?m)^[ \t]*versionCode\s*=?\s*(?P<value>\d+)"));
static VERSION_NAME: LazyLock<Locator> = LazyLock::new(|| {
    builtin(r#"(?m)^[ \t]*versionName\s*=?\s*(?:'(?P<value_sq>[^'\n]*)'|"(?P<value_dq>[^"\n]*)")"#)
});

pub fn rules(file: &Path, android: &PlatformConfig) -> Vec<FieldRule> {
    [
        (Field::ApplicationId, &*APPLICATION_ID, &android.bundle_id),
        (Field::VersionCode, &*VERSION_CODE, &android.build_number),
        (Field::VersionName, &*VERSION_NAME, &android.build_version),
    ]
    .into_iter()
    .map(|(field, locator, value)| FieldRule {
        field,
        rule: RewriteRule {
            file: file.to_path_buf(),
            locator: locator.clone(),
            replacement: Replacement::verbatim(value.as_str()),
        },
    })
    .collect()
}
