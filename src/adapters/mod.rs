//! File-type adapters: the fields each target file owns and where they live.
//!
//! Every rule is field-anchored (keyed to the syntax around the value, never
//! to the value itself) so a rewrite does not depend on what the previous
//! brand wrote. All fields are mandatory: a rule that matches nothing fails.

pub mod android;
pub mod constants;
pub mod ios;
pub mod payment;
pub mod strings;

use crate::config::{Environments, ProjectLayout};
use crate::edit::RewriteRule;
use crate::matcher::Locator;
use crate::registry::Restaurant;
use std::fmt;
use std::path::Path;

/// JS/TS string literal in any quote style, value captured without quotes.
pub(crate) const JS_STRING: &str = r#"(?:'(?P<value_sq>(?:\\.|[^'\\\n])*)'|"(?P<value_dq>(?:\\.|[^"\\\n])*)"|`(?P<value_bq>(?:\\.|[^`\\])*)`)"#;

/// Compile a built-in pattern. Built-in patterns are constants, so failure is a bug.
pub(crate) fn builtin(source: &str) -> Locator {
    match Locator::pattern(source) {
        Ok(locator) => locator,
        Err(e) => panic!("built-in pattern does not compile: {e}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ApiRefId,
    DomainUrl,
    PusherInstanceId,
    ApplePayLabel,
    GooglePayMerchant,
    ApplicationId,
    VersionCode,
    VersionName,
    AppName,
    BundleIdentifier,
    BuildNumber,
    MarketingVersion,
    DisplayName,
    LocationUsage,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::ApiRefId => "api-ref-id",
            Field::DomainUrl => "domain-url",
            Field::PusherInstanceId => "pusher-instance-id",
            Field::ApplePayLabel => "apple-pay-label",
            Field::GooglePayMerchant => "google-pay-merchant",
            Field::ApplicationId => "application-id",
            Field::VersionCode => "version-code",
            Field::VersionName => "version-name",
            Field::AppName => "app-name",
            Field::BundleIdentifier => "bundle-identifier",
            Field::BuildNumber => "build-number",
            Field::MarketingVersion => "marketing-version",
            Field::DisplayName => "display-name",
            Field::LocationUsage => "location-usage",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rewrite rule tagged with the field it owns.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: Field,
    pub rule: RewriteRule,
}

/// One adapter per target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    SourceConstants,
    ApplePay,
    GooglePay,
    AndroidManifest,
    ResourceStrings,
    IosManifest,
    PermissionString,
}

impl Adapter {
    /// Run order. Each adapter reads only the restaurant config, never the tree.
    pub const ORDER: [Adapter; 7] = [
        Adapter::SourceConstants,
        Adapter::ApplePay,
        Adapter::GooglePay,
        Adapter::AndroidManifest,
        Adapter::ResourceStrings,
        Adapter::IosManifest,
        Adapter::PermissionString,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Adapter::SourceConstants => "source-constants",
            Adapter::ApplePay => "payment-label-apple",
            Adapter::GooglePay => "payment-label-google",
            Adapter::AndroidManifest => "build-manifest-android",
            Adapter::ResourceStrings => "resource-strings",
            Adapter::IosManifest => "build-manifest-ios",
            Adapter::PermissionString => "permission-string",
        }
    }

    pub fn target<'a>(&self, layout: &'a ProjectLayout) -> &'a Path {
        match self {
            Adapter::SourceConstants => &layout.constants,
            Adapter::ApplePay => &layout.apple_pay,
            Adapter::GooglePay => &layout.google_pay,
            Adapter::AndroidManifest => &layout.android_manifest,
            Adapter::ResourceStrings => &layout.android_strings,
            Adapter::IosManifest => &layout.ios_manifest,
            Adapter::PermissionString => &layout.ios_info_plist,
        }
    }

    pub fn rules(
        &self,
        layout: &ProjectLayout,
        restaurant: &Restaurant,
        environments: &Environments,
    ) -> Vec<FieldRule> {
        let file = self.target(layout);
        let cfg = &restaurant.config;
        match self {
            Adapter::SourceConstants => constants::rules(
                file,
                cfg,
                environments.base_url(cfg.environment),
            ),
            Adapter::ApplePay => vec![payment::apple_pay_rule(file, &cfg.apple_pay_label)],
            Adapter::GooglePay => vec![payment::google_pay_rule(file, &cfg.google_pay_merchant)],
            Adapter::AndroidManifest => android::rules(file, &cfg.android),
            Adapter::ResourceStrings => vec![strings::app_name_rule(file, &cfg.app_name)],
            Adapter::IosManifest => ios::rules(file, &cfg.ios, &cfg.app_name),
            Adapter::PermissionString => vec![strings::location_usage_rule(file, &cfg.app_name)],
        }
    }
}

impl fmt::Display for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Placeholder names accepted in configured replacement templates.
pub const PLACEHOLDERS: [&str; 17] = [
    "app_name",
    "name",
    "normalized_name",
    "ref_id",
    "api_ref_id",
    "pusher_id",
    "facebook_id",
    "apple_pay_label",
    "google_pay_merchant",
    "environment",
    "base_url",
    "ios_bundle_id",
    "ios_build_number",
    "ios_build_version",
    "android_bundle_id",
    "android_build_number",
    "android_build_version",
];

/// Substitute `{placeholder}` tokens. Unknown braces are left as they are.
pub fn render_template(
    template: &str,
    restaurant: &Restaurant,
    environments: &Environments,
) -> String {
    let cfg = &restaurant.config;
    let environment = cfg.environment.to_string();
    let normalized = restaurant.normalized_name();
    let values: [&str; 17] = [
        &cfg.app_name,
        &restaurant.name,
        &normalized,
        &restaurant.ref_id,
        &cfg.api_ref_id,
        &cfg.pusher_id,
        &cfg.facebook_id,
        &cfg.apple_pay_label,
        &cfg.google_pay_merchant,
        &environment,
        environments.base_url(cfg.environment),
        &cfg.ios.bundle_id,
        &cfg.ios.build_number,
        &cfg.ios.build_version,
        &cfg.android.bundle_id,
        &cfg.android.build_number,
        &cfg.android.build_version,
    ];

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let hit = tail.find('}').and_then(|close| {
            let key = &tail[1..close];
            PLACEHOLDERS
                .iter()
                .position(|p| *p == key)
                .map(|idx| (values[idx], close))
        });
        match hit {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape text for an XML text node.
pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
