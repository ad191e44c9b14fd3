//! Merchant labels embedded in the payment hooks.
//!
//! Apple Pay requests list line items (subtotal, delivery, ...) before the
//! merchant summary item, and each carries its own `label`. Only the last
//! label in the hook belongs to the merchant.

use super::{builtin, Field, FieldRule, JS_STRING};
use crate::edit::{Replacement, RewriteRule};
use crate::matcher::Locator;
use std::path::Path;
use std::sync::LazyLock;

/// Object-literal key, bare or quoted, followed by a string value.
fn object_key(key: &str) -> String {
    format!(r#"(?:\b{key}|'{key}'|"{key}")\s*:\s*{JS_STRING}"#)
}

/// Last occurrence of `key` in the file. The greedy prefix makes the scan
/// report a single match: the final entry.
fn last_object_key(key: &str) -> String {
    format!(r"(?s)\A.*{}", object_key(key))
}

static APPLE_PAY_LABEL: LazyLock<Locator> =
    LazyLock::new(|| builtin(&last_object_key("label")));
static GOOGLE_PAY_MERCHANT: LazyLock<Locator> =
    LazyLock::new(|| builtin(&object_key("merchantName")));

pub fn apple_pay_rule(file: &Path, label: &str) -> FieldRule {
    FieldRule {
        field: Field::ApplePayLabel,
        rule: RewriteRule {
            file: file.to_path_buf(),
            locator: APPLE_PAY_LABEL.clone(),
            replacement: Replacement::quoted(label),
        },
    }
}

pub fn google_pay_rule(file: &Path, merchant: &str) -> FieldRule {
    FieldRule {
        field: Field::GooglePayMerchant,
        rule: RewriteRule {
            file: file.to_path_buf(),
            locator: GOOGLE_PAY_MERCHANT.clone(),
            replacement: Replacement::quoted(merchant),
        },
    }
}
