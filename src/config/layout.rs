//! Absolute locations of every target file and asset directory in one project tree.

use crate::config::schema::RebrandConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub constants: PathBuf,
    pub apple_pay: PathBuf,
    pub google_pay: PathBuf,
    pub android_manifest: PathBuf,
    pub android_strings: PathBuf,
    pub ios_manifest: PathBuf,
    pub ios_info_plist: PathBuf,
    /// Generated image set, deleted before every asset sync
    pub ios_assets: PathBuf,
    pub android_res: PathBuf,
    pub android_app: PathBuf,
}

impl ProjectLayout {
    /// Conventional layout of the shared app for a given Xcode project name.
    pub fn conventional(root: impl Into<PathBuf>, ios_project: &str) -> Self {
        let root = root.into();
        let join = |rel: &str| root.join(rel);
        Self {
            constants: join("src/lib/constants.ts"),
            apple_pay: join("src/lib/hooks/useApplePay.ts"),
            google_pay: join("src/lib/hooks/useGooglePay.ts"),
            android_manifest: join("android/app/build.gradle"),
            android_strings: join("android/app/src/main/res/values/strings.xml"),
            ios_manifest: join(&format!("ios/{ios_project}.xcodeproj/project.pbxproj")),
            ios_info_plist: join(&format!("ios/{ios_project}/info.plist")),
            ios_assets: join(&format!("ios/{ios_project}/Images.xcassets")),
            android_res: join("android/app/src/main/res"),
            android_app: join("android/app"),
            root,
        }
    }

    /// Conventional layout with the config's `[targets]` overrides applied.
    pub fn from_config(config: &RebrandConfig) -> Self {
        let mut layout = Self::conventional(
            config.resolve(&config.project.root),
            &config.project.ios_project,
        );
        let t = &config.targets;
        let root = layout.root.clone();
        let apply = |slot: &mut PathBuf, value: &Option<String>| {
            if let Some(rel) = value {
                *slot = root.join(rel);
            }
        };
        apply(&mut layout.constants, &t.constants);
        apply(&mut layout.apple_pay, &t.apple_pay);
        apply(&mut layout.google_pay, &t.google_pay);
        apply(&mut layout.android_manifest, &t.android_manifest);
        apply(&mut layout.android_strings, &t.android_strings);
        apply(&mut layout.ios_manifest, &t.ios_manifest);
        apply(&mut layout.ios_info_plist, &t.ios_info_plist);
        apply(&mut layout.ios_assets, &t.ios_assets);
        apply(&mut layout.android_res, &t.android_res);
        apply(&mut layout.android_app, &t.android_app);
        layout
    }

    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}
