//! Exported configuration constants in `src/lib/constants.ts`.

use super::{builtin, Field, FieldRule, JS_STRING};
use crate::edit::{Replacement, RewriteRule};
use crate::matcher::Locator;
use crate::registry::AppConfig;
use std::path::Path;
use std::sync::LazyLock;

/// `export const NAME = '<value>'`, line-anchored so commented-out
/// alternatives (`//export const DOMAIN_URL = ...`) are left alone.
fn exported_constant(name: &str) -> String {
    format!(r"(?m)^[ \t]*export\s+const\s+{name}\s*(?::[^=\n]+)?=\s*{JS_STRING}")
}

static API_REF_ID: LazyLock<Locator> = LazyLock::new(|| builtin(&exported_constant("API_REF_ID")));
static DOMAIN_URL: LazyLock<Locator> = LazyLock::new(|| builtin(&exported_constant("DOMAIN_URL")));
static PUSHER_INSTANCE_ID: LazyLock<Locator> =
    LazyLock::new(|| builtin(&exported_constant("PUSHER_INSTANCE_ID")));

pub fn rules(file: &Path, cfg: &AppConfig, base_url: &str) -> Vec<FieldRule> {
    [
        (Field::ApiRefId, &*API_REF_ID, cfg.api_ref_id.as_str()),
        (Field::DomainUrl, &*DOMAIN_URL, base_url),
        (
            Field::PusherInstanceId,
            &*PUSHER_INSTANCE_ID,
            cfg.pusher_id.as_str(),
        ),
    ]
    .into_iter()
    .map(|(field, locator, value)| FieldRule {
        field,
        rule: RewriteRule {
            file: file.to_path_buf(),
            locator: locator.clone(),
            replacement: Replacement::quoted(value),
        },
    })
    .collect()
}
