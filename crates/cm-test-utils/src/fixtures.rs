//! Canned manifests shared by the cm-core and cm-cli test suites.

use serde_json::{Value, json};

use crate::TestSite;

/// Commit of the floating `symfony/yaml` install in [`installed_packages`].
pub const YAML_REFERENCE: &str = "3346fc090a3eb6b53d408db2903b241af51dcb20";

pub fn core_manifest() -> Value {
    json!({
        "name": "drupal/core",
        "type": "drupal-core",
        "require": {
            "symfony/dependency-injection": "2.6.*"
        }
    })
}

pub fn commerce_kickstart_manifest() -> Value {
    json!({
        "name": "drupal/commerce_kickstart",
        "require": {
            "symfony/css-selector": "2.6.*"
        }
    })
}

pub fn test1_manifest() -> Value {
    json!({
        "name": "drupal/test1",
        "require": {
            "symfony/intl": "2.6.*"
        }
    })
}

pub fn test2_manifest() -> Value {
    json!({
        "name": "drupal/test2",
        "require": {
            "symfony/config": "2.6.*"
        }
    })
}

/// Three installed packages: one requested by core, one orphan that
/// requires the third, a floating `dev-master` install.
pub fn installed_packages() -> Value {
    json!([
        {
            "name": "symfony/dependency-injection",
            "version": "v2.6.3",
            "description": "Symfony DependencyInjection Component",
            "homepage": "http://symfony.com"
        },
        {
            "name": "symfony/event-dispatcher",
            "version": "v2.6.3",
            "description": "Symfony EventDispatcher Component",
            "homepage": "http://symfony.com",
            "require": {
                "symfony/yaml": "dev-master"
            }
        },
        {
            "name": "symfony/yaml",
            "version": "dev-master",
            "source": {
                "type": "git",
                "url": "https://github.com/symfony/Yaml.git",
                "reference": YAML_REFERENCE
            }
        }
    ])
}

/// A site with core, a profile, a root module, a `sites/all` module, the
/// composer_manager module itself and an installed-package snapshot.
///
/// ```text
/// core/composer.json
/// core/vendor/composer/installed.json
/// profiles/commerce_kickstart/
/// modules/test1/
/// modules/contrib/composer_manager/     (no composer.json)
/// sites/all/modules/test2/
/// ```
pub fn standard_site() -> TestSite {
    let site = TestSite::new();
    site.core_manifest(&core_manifest());
    site.installed(&installed_packages());
    site.profile(
        "profiles/commerce_kickstart",
        "commerce_kickstart",
        Some(&commerce_kickstart_manifest()),
    );
    site.module("modules/test1", "test1", Some(&test1_manifest()));
    site.module("modules/contrib/composer_manager", "composer_manager", None);
    site.module("sites/all/modules/test2", "test2", Some(&test2_manifest()));
    site
}
