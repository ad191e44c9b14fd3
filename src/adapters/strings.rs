//! XML string resources: the Android app name and the iOS location-usage text.

use super::{builtin, escape_xml, Field, FieldRule};
use crate::edit::{Replacement, RewriteRule};
use crate::matcher::Locator;
use std::path::Path;
use std::sync::LazyLock;

static APP_NAME: LazyLock<Locator> = LazyLock::new(|| {
    builtin(r#"<string\s+name\s*=\s*["']app_name["'][^>]*>(?P<value>[^<]*)</string>"#)
});

/// The sentence after the requester is fixed; the value spans the requester
/// and its verb so `we require` becomes `<App> requires`.
static LOCATION_USAGE: LazyLock<Locator> = LazyLock::new(|| {
    builtin(
        r"<string>\s*(?P<value>[^<]*?\brequires?)\s+your\s+location\s+information\s+in\s+order\s+to\s+deliver\s+to\s+you\s+accurately\.\s*</string>",
    )
});

/// Android `strings.xml` escaping on top of XML entities.
pub fn escape_android(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (idx, c) in escape_xml(value).chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '@' | '?' if idx == 0 => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

pub fn app_name_rule(file: &Path, app_name: &str) -> FieldRule {
    FieldRule {
        field: Field::AppName,
        rule: RewriteRule {
            file: file.to_path_buf(),
            locator: APP_NAME.clone(),
            replacement: Replacement::verbatim(escape_android(app_name)),
        },
    }
}

pub fn location_usage_rule(file: &Path, app_name: &str) -> FieldRule {
    FieldRule {
        field: Field::LocationUsage,
        rule: RewriteRule {
            file: file.to_path_buf(),
            locator: LOCATION_USAGE.clone(),
            replacement: Replacement::verbatim(format!("{} requires", escape_xml(app_name))),
        },
    }
}
