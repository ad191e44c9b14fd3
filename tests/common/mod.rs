//! Shared fixture: a miniature copy of the app tree plus registry and staged assets.

#![allow(dead_code)]

use app_rebrander::config::load_or_default;
use app_rebrander::{RebrandConfig, Registry, Restaurant};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PROJECT_DIR: &str = "bitesnbagsMainApp";

pub const CONSTANTS_TS: &str = r#"import {Platform} from 'react-native';

export const API_REF_ID =
  'rhIWeN14';

//export const DOMAIN_URL = 'http://127.0.0.1:8000';
//export const DOMAIN_URL = 'https://stg.bitesnbags.com';
export const DOMAIN_URL = 'https://bitesnbags.com';

export const API_BASE_URL = `${DOMAIN_URL}/api/v3`;

export const PUSHER_INSTANCE_ID = 'da6ea109-6e22-4198-a1d2-bbd03dd523a6';
export const IS_IOS = Platform.OS === 'ios';
"#;

pub const APPLE_PAY_TS: &str = r#"export const useApplePay = () => {
  const paymentRequest = {
    countryCode: 'GB',
    currencyCode: 'GBP',
    items: [
      {
        label: 'Subtotal',
        amount: subtotal.toFixed(2),
      },
      {
        label: "Delivery",
        amount: deliveryFee.toFixed(2),
      },
      {
        label: 'Ivy Shop (via biteME)',
        amount: total.toFixed(2),
      },
    ],
  };
  return paymentRequest;
};
"#;

pub const GOOGLE_PAY_TS: &str = r#"export const useGooglePay = () => ({
  merchantInfo: {
    merchantId: 'BCR2DN4T',
    merchantName: "Ivy Shop (via biteME)",
  },
});
"#;

pub const BUILD_GRADLE: &str = r#"android {
    namespace "com.bitesnbags"
    defaultConfig {
        applicationId "com.bitesnbags.ivyshop"
        minSdkVersion rootProject.ext.minSdkVersion
        targetSdkVersion rootProject.ext.targetSdkVersion
        versionCode 12
        versionName "1.2.0"
    }
}
"#;

pub const STRINGS_XML: &str = r#"<resources>
    <string name="app_name">Ivy Shop</string>
    <string name="default_web_client_id">1234.apps.googleusercontent.com</string>
</resources>
"#;

pub const PROJECT_PBXPROJ: &str = r#"		00E356F61AD99517003FC87E /* Debug */ = {
			buildSettings = {
				BUNDLE_LOADER = "$(TEST_HOST)";
				INFOPLIST_FILE = bitesnbagsTests/Info.plist;
				PRODUCT_BUNDLE_IDENTIFIER = "org.reactjs.native.example.$(PRODUCT_NAME:rfc1034identifier)";
				PRODUCT_NAME = "$(TARGET_NAME)";
				TEST_HOST = "$(BUILT_PRODUCTS_DIR)/bitesnbags.app/bitesnbags";
			};
			name = Debug;
		};
		13B07F941A680F5B00A75B9A /* Debug */ = {
			buildSettings = {
				CURRENT_PROJECT_VERSION = 4;
				INFOPLIST_FILE = bitesnbags/Info.plist;
				INFOPLIST_KEY_CFBundleDisplayName = "Ivy Shop";
				MARKETING_VERSION = 1.2.0;
				PRODUCT_BUNDLE_IDENTIFIER = "com.bitesnbags.ivyshop";
				PRODUCT_NAME = bitesnbags;
			};
			name = Debug;
		};
		13B07F951A680F5B00A75B9A /* Release */ = {
			buildSettings = {
				CURRENT_PROJECT_VERSION = 4;
				INFOPLIST_FILE = bitesnbags/Info.plist;
				INFOPLIST_KEY_CFBundleDisplayName = "Ivy Shop";
				MARKETING_VERSION = 1.2.0;
				PRODUCT_BUNDLE_IDENTIFIER = "com.bitesnbags.ivyshop";
				PRODUCT_NAME = bitesnbags;
			};
			name = Release;
		};
"#;

pub const INFO_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
	<key>CFBundleDisplayName</key>
	<string>$(PRODUCT_NAME)</string>
	<key>NSLocationWhenInUseUsageDescription</key>
	<string>Ivy Shop requires your location information in order to deliver to you accurately.</string>
</dict>
</plist>
"#;

/// Fields the built-in adapters rewrite on every run.
pub const FIELD_COUNT: usize = 14;

/// Target files relative to the project root, with their template text.
pub const TEMPLATE_FILES: [(&str, &str); 7] = [
    ("src/lib/constants.ts", CONSTANTS_TS),
    ("src/lib/hooks/useApplePay.ts", APPLE_PAY_TS),
    ("src/lib/hooks/useGooglePay.ts", GOOGLE_PAY_TS),
    ("android/app/build.gradle", BUILD_GRADLE),
    ("android/app/src/main/res/values/strings.xml", STRINGS_XML),
    ("ios/bitesnbags.xcodeproj/project.pbxproj", PROJECT_PBXPROJ),
    ("ios/bitesnbags/info.plist", INFO_PLIST),
];

pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    /// Project tree with every template file, no registry and no assets.
    pub fn new() -> Self {
        let fixture = Self {
            dir: TempDir::new().unwrap(),
        };
        for (rel, content) in TEMPLATE_FILES {
            fixture.write_project_file(rel, content);
        }
        fixture
    }

    pub fn base(&self) -> &Path {
        self.dir.path()
    }

    pub fn project(&self) -> PathBuf {
        self.base().join(PROJECT_DIR)
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.base().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn write_project_file(&self, rel: &str, content: &str) {
        self.write(&format!("{PROJECT_DIR}/{rel}"), content);
    }

    pub fn read_project_file(&self, rel: &str) -> String {
        fs::read_to_string(self.project().join(rel)).unwrap()
    }

    /// Every template file's text, in template order.
    pub fn snapshot(&self) -> Vec<String> {
        TEMPLATE_FILES
            .iter()
            .map(|(rel, _)| self.read_project_file(rel))
            .collect()
    }

    /// Defaults rooted at the fixture directory.
    pub fn config(&self) -> RebrandConfig {
        load_or_default(&self.base().join("rebrand.toml"), self.base()).unwrap()
    }

    pub fn write_registry(&self, restaurants: Vec<Restaurant>) {
        let registry = Registry { restaurants };
        registry.save(self.config().registry_path()).unwrap();
    }

    /// Staged upload tree with one file per asset kind.
    pub fn stage_assets(&self, restaurant: &Restaurant, marker: &str) -> PathBuf {
        let staged = restaurant.asset_dir(&self.config().assets_root());
        for rel in [
            "ios/AppIcon.appiconset/icon-1024.png",
            "ios/AppIcon.appiconset/Contents.json",
            "ios/SplashScreen.imageset/splash.png",
            "ios/Logo.imageset/logo.png",
            "android/res/mipmap-hdpi/ic_launcher.png",
            "android/res/drawable/splash.png",
            "android/json/google-services.json",
        ] {
            let path = staged.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, format!("{marker}:{rel}")).unwrap();
        }
        staged
    }
}

/// A restaurant whose every field differs from the template.
pub fn hash_burger() -> Restaurant {
    let mut r = Restaurant::scaffold("hb-7", "Hash Burger");
    let cfg = &mut r.config;
    cfg.api_ref_id = "HBx9kQ".to_string();
    cfg.pusher_id = "0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0".to_string();
    cfg.apple_pay_label = "Hash & Burger's (via biteME)".to_string();
    cfg.google_pay_merchant = "Hash Burger Ltd".to_string();
    cfg.ios.build_number = "9".to_string();
    cfg.ios.build_version = "2.0.1".to_string();
    cfg.android.build_number = "31".to_string();
    cfg.android.build_version = "2.0.1".to_string();
    r
}
