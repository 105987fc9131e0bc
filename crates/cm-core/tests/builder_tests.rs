//! Tests for root manifest construction

use chrono::{TimeZone, Utc};
use cm_core::builder::{INSTALLER_CONSTRAINT, INSTALLER_PACKAGE};
use cm_core::{ComponentManifest, ComponentPackage, Error, PathSpec, RootPackageBuilder, Stability};
use cm_fs::store::render_json;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn manifest(value: Value) -> ComponentManifest {
    serde_json::from_value(value).expect("fixture manifest should parse")
}

fn core() -> ComponentManifest {
    manifest(json!({
        "name": "drupal/core",
        "type": "drupal-core",
        "license": "GPL-2.0+",
        "require": {
            "sdboyer/gliph": "0.1.*",
            "symfony/class-loader": "2.6.*",
            "symfony/css-selector": "2.6.*",
            "symfony/dependency-injection": "2.6.*"
        }
    }))
}

fn extensions() -> Vec<ComponentPackage> {
    vec![
        ComponentPackage::new(
            "test1",
            "modules/test1",
            manifest(json!({
                "name": "drupal/test1",
                "require": {
                    "symfony/intl": "2.6.*",
                    "php": "~5.5",
                    "ext-intl": "*"
                },
                "minimum-stability": "rc",
                "repositories": [{"type": "pear", "url": "http://pear2.php.net"}]
            })),
        ),
        ComponentPackage::new(
            "test2",
            "modules/test2",
            manifest(json!({
                "name": "drupal/test2",
                "require": {
                    "symfony/class-loader": "2.5.*",
                    "symfony/config": "2.6.*"
                },
                "minimum-stability": "beta",
                "prefer-stable": false,
                "repositories": [{"type": "pear", "url": "http://pear2.php.net"}]
            })),
        ),
        ComponentPackage::new(
            "test3",
            "modules/test3",
            manifest(json!({
                "name": "drupal/test3",
                "repositories": [{"type": "composer", "url": "http://packages.example.com"}]
            })),
        ),
    ]
}

fn builder() -> RootPackageBuilder {
    RootPackageBuilder::new("modules/composer_manager")
        .with_timestamp(Utc.with_ymd_and_hms(2015, 3, 1, 12, 30, 0).unwrap())
}

mod build_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fixed_identity() {
        let root = builder().build(&core(), &extensions()).unwrap();

        assert_eq!(root.name, "drupal/drupal");
        assert_eq!(root.package_type, "project");
        assert_eq!(root.license, "GPL-2.0+");
    }

    #[test]
    fn test_requirements_merged_first_wins() {
        let root = builder().build(&core(), &extensions()).unwrap();

        assert_eq!(root.require.len(), 7);
        assert_eq!(root.require["symfony/intl"], "2.6.*");
        assert_eq!(root.require["symfony/config"], "2.6.*");
        // test2 cannot change a constraint core declared
        assert_eq!(root.require["symfony/class-loader"], "2.6.*");
        assert_eq!(root.require[INSTALLER_PACKAGE], INSTALLER_CONSTRAINT);
    }

    #[test]
    fn test_installer_constraint_cannot_be_overridden() {
        let mut core = core();
        core.require
            .get_or_insert_with(Default::default)
            .insert(INSTALLER_PACKAGE.into(), "^1.5".into());
        let mut components = extensions();
        components.push(ComponentPackage::new(
            "installer_fan",
            "modules/installer_fan",
            manifest(json!({
                "name": "drupal/installer_fan",
                "require": {"composer/installers": "~1.0"}
            })),
        ));

        let root = builder().build(&core, &components).unwrap();

        assert_eq!(root.require[INSTALLER_PACKAGE], INSTALLER_CONSTRAINT);
        assert_eq!(INSTALLER_CONSTRAINT, "^1.0.20");
    }

    #[test]
    fn test_platform_packages_dropped() {
        let root = builder().build(&core(), &extensions()).unwrap();

        assert!(!root.require.contains_key("php"));
        assert!(!root.require.contains_key("ext-intl"));
        assert!(root.require.keys().all(|name| name.contains('/')));
    }

    #[test]
    fn test_repositories_deduplicated_and_requirementless_ignored() {
        let root = builder().build(&core(), &extensions()).unwrap();

        let repositories = root.repositories.expect("repositories should be present");
        assert_eq!(repositories, vec![json!({"type": "pear", "url": "http://pear2.php.net"})]);
    }

    #[test]
    fn test_stability_resolution() {
        let root = builder().build(&core(), &extensions()).unwrap();

        assert_eq!(root.minimum_stability, Stability::Beta);
        assert!(!root.prefer_stable);
    }

    #[test]
    fn test_provenance() {
        let root = builder().build(&core(), &extensions()).unwrap();

        assert_eq!(
            root.extra.generator,
            "Generated by composer_manager on 2015-03-01T12:30:00+00:00"
        );
        assert_eq!(root.extra.sources, "drupal/core, drupal/test1, drupal/test2");
    }

    #[test]
    fn test_command_wiring() {
        let root = builder().build(&core(), &extensions()).unwrap();

        assert_eq!(
            root.autoload.psr4["Drupal\\composer_manager\\Composer\\"],
            PathSpec::One("modules/composer_manager/src/Composer".into())
        );
        assert_eq!(
            root.scripts["drupal-update"],
            json!("Drupal\\composer_manager\\Composer\\Command::update")
        );
        assert_eq!(
            root.scripts["post-install-cmd"],
            json!("Drupal\\composer_manager\\Composer\\Command::rewriteAutoload")
        );
        assert!(root.scripts.contains_key("drupal-rebuild"));
        assert!(root.scripts.contains_key("drupal-install"));
    }

    #[test]
    fn test_replace_and_config() {
        let root = builder().build(&core(), &extensions()).unwrap();

        assert_eq!(root.replace["drupal/core"], "self.version");
        assert_eq!(root.config.preferred_install, "dist");
        assert_eq!(root.config.autoloader_suffix, "Drupal8");
    }

    #[test]
    fn test_core_defaults_without_extensions() {
        let root = builder().build(&core(), &[]).unwrap();

        assert_eq!(root.minimum_stability, Stability::Stable);
        assert!(root.prefer_stable);
        assert!(root.repositories.is_none());
        assert_eq!(root.extra.sources, "drupal/core");
    }
}

mod serialization_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identical_inputs_render_identical_bytes() {
        let first = render_json(&builder().build(&core(), &extensions()).unwrap()).unwrap();
        let second = render_json(&builder().build(&core(), &extensions()).unwrap()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_repositories_key_omitted() {
        let root = builder().build(&core(), &[]).unwrap();
        let value = serde_json::to_value(&root).unwrap();

        assert!(value.get("repositories").is_none());
        assert!(value.get("conflict").is_none());
        assert_eq!(value["require-dev"], json!({}));
    }

    #[test]
    fn test_key_names() {
        let root = builder().build(&core(), &extensions()).unwrap();
        let value = serde_json::to_value(&root).unwrap();

        assert_eq!(value["type"], "project");
        assert_eq!(value["minimum-stability"], "beta");
        assert_eq!(value["prefer-stable"], false);
        assert_eq!(value["config"]["preferred-install"], "dist");
        assert_eq!(value["config"]["autoloader-suffix"], "Drupal8");
        assert!(value["extra"]["_generator"].is_string());
        assert_eq!(value["extra"]["_sources"], "drupal/core, drupal/test1, drupal/test2");
    }
}

mod autoload_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_core_paths_rebased_to_site_root() {
        let mut core = core();
        core.autoload = serde_json::from_value(json!({
            "psr-4": {"Drupal\\Core\\": "lib/Drupal/Core"},
            "classmap": ["lib/Drupal.php"],
            "files": ["../includes/bootstrap.inc"]
        }))
        .unwrap();

        let root = builder().build(&core, &[]).unwrap();

        assert_eq!(root.autoload.psr4["Drupal\\Core\\"], PathSpec::One("core/lib/Drupal/Core".into()));
        assert_eq!(root.autoload.classmap, vec!["core/lib/Drupal.php"]);
        assert_eq!(root.autoload.files, vec!["includes/bootstrap.inc"]);
    }

    #[test]
    fn test_component_paths_prefixed_with_directory() {
        let extension = ComponentPackage::new(
            "foo",
            "modules/foo",
            manifest(json!({
                "name": "drupal/foo",
                "require": {"foo/bar": "^1.0"},
                "autoload": {"psr-4": {"Foo\\": "src/"}}
            })),
        );

        let root = builder().build(&core(), &[extension]).unwrap();

        assert_eq!(root.autoload.psr4["Foo\\"], PathSpec::One("modules/foo/src/".into()));
    }

    #[test]
    fn test_base_scripts_kept_fixed_scripts_overwritten() {
        let mut core = core();
        core.scripts.insert("pre-update-cmd".into(), json!("Drupal\\Core\\Composer::preUpdate"));
        core.scripts.insert("drupal-update".into(), json!("Something\\Else::run"));

        let root = builder().build(&core, &[]).unwrap();

        assert_eq!(root.scripts["pre-update-cmd"], json!("Drupal\\Core\\Composer::preUpdate"));
        assert_eq!(
            root.scripts["drupal-update"],
            json!("Drupal\\composer_manager\\Composer\\Command::update")
        );
    }
}

mod error_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_core_without_name_rejected() {
        let mut core = core();
        core.name = None;

        let err = builder().build(&core, &extensions()).unwrap_err();
        assert!(matches!(err, Error::InvalidCoreManifest { .. }));
    }

    #[test]
    fn test_core_without_require_rejected() {
        let mut core = core();
        core.require = None;

        let err = builder().build(&core, &extensions()).unwrap_err();
        assert!(matches!(err, Error::InvalidCoreManifest { .. }));
        assert!(!err.is_retryable());
    }
}
