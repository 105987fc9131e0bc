//! Typed `composer.json` documents
//!
//! A [`ComponentManifest`] is the dependency metadata of one extension, or of
//! core itself. Only the keys the merge engine reads are modelled; optional
//! keys are `Option` so that "not declared" and "declared empty" stay
//! distinguishable.
//!
//! # Example
//!
//! ```json
//! {
//!     "name": "drupal/test1",
//!     "require": {
//!         "symfony/intl": "2.6.*",
//!         "php": "~5.5"
//!     },
//!     "minimum-stability": "rc",
//!     "autoload": {
//!         "psr-4": { "Drupal\\test1\\": "src/" }
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use cm_fs::NormalizedPath;
use regex::Regex;
use serde::de::{self, Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Package name → version constraint (or suggestion text).
pub type ConstraintMap = BTreeMap<String, String>;

static PACKAGE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([_.-]?[a-z0-9]+)*/[a-z0-9](([_.]?|-{0,2})[a-z0-9]+)*$").unwrap()
});

/// Whether `name` is a valid `vendor/package` identifier.
pub fn is_valid_package_name(name: &str) -> bool {
    PACKAGE_NAME_PATTERN.is_match(name)
}

/// Whether `name` is a platform pseudo-package (`php`, `ext-intl`, ...).
///
/// Platform packages carry no vendor separator.
pub fn is_platform_package(name: &str) -> bool {
    !name.contains('/')
}

/// Release stability, ordered from least to most finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Stability {
    Dev,
    Alpha,
    Beta,
    Rc,
    #[default]
    Stable,
}

impl Stability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Rc => "rc",
            Self::Stable => "stable",
        }
    }
}

impl FromStr for Stability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "alpha" => Ok(Self::Alpha),
            "beta" => Ok(Self::Beta),
            "rc" => Ok(Self::Rc),
            "stable" => Ok(Self::Stable),
            _ => Err(format!("unknown stability '{}'", s)),
        }
    }
}

impl TryFrom<String> for Stability {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Stability> for String {
    fn from(value: Stability) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One or several paths for an autoload namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSpec {
    One(String),
    Many(Vec<String>),
}

impl PathSpec {
    /// Apply `f` to every path.
    pub fn map_paths(&self, f: impl Fn(&str) -> String) -> Self {
        match self {
            Self::One(path) => Self::One(f(path)),
            Self::Many(paths) => Self::Many(paths.iter().map(|p| f(p)).collect()),
        }
    }

    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::One(path) => vec![path.as_str()],
            Self::Many(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

/// The `autoload` section: two namespace styles, a classmap and a files list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autoload {
    #[serde(
        rename = "psr-0",
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "map_or_empty_list"
    )]
    pub psr0: BTreeMap<String, PathSpec>,
    #[serde(
        rename = "psr-4",
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "map_or_empty_list"
    )]
    pub psr4: BTreeMap<String, PathSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classmap: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

impl Autoload {
    pub fn is_empty(&self) -> bool {
        self.psr0.is_empty() && self.psr4.is_empty() && self.classmap.is_empty() && self.files.is_empty()
    }

    /// Return a copy with every path rewritten by `f`.
    pub fn map_paths(&self, f: impl Fn(&str) -> String) -> Self {
        Self {
            psr0: self
                .psr0
                .iter()
                .map(|(ns, spec)| (ns.clone(), spec.map_paths(&f)))
                .collect(),
            psr4: self
                .psr4
                .iter()
                .map(|(ns, spec)| (ns.clone(), spec.map_paths(&f)))
                .collect(),
            classmap: self.classmap.iter().map(|p| f(p)).collect(),
            files: self.files.iter().map(|p| f(p)).collect(),
        }
    }

    /// Merge `other` into this section.
    ///
    /// Namespace collisions are last-write-wins; classmap and files entries
    /// are appended once.
    pub fn extend(&mut self, other: Autoload) {
        for (namespace, spec) in other.psr0 {
            if let Some(previous) = self.psr0.insert(namespace.clone(), spec) {
                tracing::debug!(%namespace, ?previous, "psr-0 namespace overridden");
            }
        }
        for (namespace, spec) in other.psr4 {
            if let Some(previous) = self.psr4.insert(namespace.clone(), spec) {
                tracing::debug!(%namespace, ?previous, "psr-4 namespace overridden");
            }
        }
        for path in other.classmap {
            if !self.classmap.contains(&path) {
                self.classmap.push(path);
            }
        }
        for path in other.files {
            if !self.files.contains(&path) {
                self.files.push(path);
            }
        }
    }
}

/// A `composer.json` document as declared by core or by an extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ComponentManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub package_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_map_or_empty_list"
    )]
    pub require: Option<ConstraintMap>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_map_or_empty_list"
    )]
    pub require_dev: Option<ConstraintMap>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "map_or_empty_list")]
    pub conflict: ConstraintMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "map_or_empty_list")]
    pub replace: ConstraintMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "map_or_empty_list")]
    pub provide: ConstraintMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "map_or_empty_list")]
    pub suggest: ConstraintMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repositories: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Autoload::is_empty")]
    pub autoload: Autoload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_stability: Option<Stability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer_stable: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "map_or_empty_list")]
    pub scripts: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", deserialize_with = "map_or_empty_list")]
    pub extra: BTreeMap<String, Value>,
}

impl ComponentManifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(content: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Declared runtime requirements, empty when the key is absent.
    pub fn requirements(&self) -> &ConstraintMap {
        static EMPTY: ConstraintMap = BTreeMap::new();
        self.require.as_ref().unwrap_or(&EMPTY)
    }

    /// Declared development requirements, empty when the key is absent.
    pub fn dev_requirements(&self) -> &ConstraintMap {
        static EMPTY: ConstraintMap = BTreeMap::new();
        self.require_dev.as_ref().unwrap_or(&EMPTY)
    }

    /// Whether this manifest requests at least one package.
    pub fn has_requirements(&self) -> bool {
        !self.requirements().is_empty() || !self.dev_requirements().is_empty()
    }

    /// Whether this manifest declares a requirement on `package`.
    pub fn requires(&self, package: &str) -> bool {
        self.requirements().contains_key(package)
    }
}

/// A discovered extension together with its manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentPackage {
    /// Machine name of the extension (e.g. `test1`).
    pub extension: String,
    /// Extension directory relative to the site root.
    pub directory: NormalizedPath,
    pub manifest: ComponentManifest,
}

impl ComponentPackage {
    pub fn new(
        extension: impl Into<String>,
        directory: impl Into<NormalizedPath>,
        manifest: ComponentManifest,
    ) -> Self {
        Self {
            extension: extension.into(),
            directory: directory.into(),
            manifest,
        }
    }

    /// The declared package name, if it is usable for merging.
    pub fn package_name(&self) -> Option<&str> {
        self.manifest
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    /// Prefix a manifest-relative path with this extension's directory.
    pub fn rebase_path(&self, path: &str) -> String {
        let directory = self.directory.as_str();
        let path = path.strip_prefix("./").unwrap_or(path);
        if directory.is_empty() {
            path.to_string()
        } else if path.is_empty() {
            directory.to_string()
        } else {
            format!("{}/{}", directory, path)
        }
    }
}

/// Accept either a JSON object or the empty list PHP encoders emit for `[]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum MapOrList<V> {
    Map(BTreeMap<String, V>),
    List(Vec<IgnoredAny>),
}

pub(crate) fn map_or_empty_list<'de, D, V>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    match MapOrList::deserialize(deserializer)? {
        MapOrList::Map(map) => Ok(map),
        MapOrList::List(list) if list.is_empty() => Ok(BTreeMap::new()),
        MapOrList::List(_) => Err(de::Error::custom("expected an object, found a non-empty list")),
    }
}

fn optional_map_or_empty_list<'de, D, V>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, V>>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    map_or_empty_list(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stability_orders_dev_lowest() {
        assert!(Stability::Dev < Stability::Alpha);
        assert!(Stability::Beta < Stability::Rc);
        assert!(Stability::Rc < Stability::Stable);
    }

    #[test]
    fn stability_parses_uppercase_rc() {
        let manifest: ComponentManifest =
            serde_json::from_value(json!({"minimum-stability": "RC"})).unwrap();
        assert_eq!(manifest.minimum_stability, Some(Stability::Rc));
    }

    #[test]
    fn unknown_stability_is_rejected() {
        let result = serde_json::from_value::<ComponentManifest>(json!({"minimum-stability": "gold"}));
        assert!(result.is_err());
    }

    #[test]
    fn empty_list_reads_as_empty_map() {
        let manifest: ComponentManifest =
            serde_json::from_value(json!({"name": "drupal/a", "require": [], "scripts": []})).unwrap();
        assert_eq!(manifest.require, Some(ConstraintMap::new()));
        assert!(manifest.scripts.is_empty());
        assert!(!manifest.has_requirements());
    }

    #[test]
    fn absent_require_is_none() {
        let manifest: ComponentManifest = serde_json::from_value(json!({"name": "drupal/a"})).unwrap();
        assert!(manifest.require.is_none());
        assert!(manifest.repositories.is_none());
    }

    #[test]
    fn autoload_accepts_single_and_multiple_paths() {
        let autoload: Autoload = serde_json::from_value(json!({
            "psr-4": {"Foo\\": "src/", "Bar\\": ["lib/", "extra/"]},
            "classmap": ["lib/legacy.php"]
        }))
        .unwrap();
        assert_eq!(autoload.psr4["Foo\\"], PathSpec::One("src/".into()));
        assert_eq!(autoload.psr4["Bar\\"].paths(), vec!["lib/", "extra/"]);
        assert_eq!(autoload.classmap, vec!["lib/legacy.php"]);
    }

    #[test]
    fn platform_packages_have_no_vendor() {
        assert!(is_platform_package("php"));
        assert!(is_platform_package("ext-intl"));
        assert!(!is_platform_package("symfony/intl"));
    }

    #[test]
    fn package_name_validation() {
        assert!(is_valid_package_name("drupal/test1"));
        assert!(is_valid_package_name("symfony/css-selector"));
        assert!(!is_valid_package_name("Drupal/Test"));
        assert!(!is_valid_package_name("test1"));
    }

    #[test]
    fn rebase_path_prefixes_directory() {
        let package = ComponentPackage::new("foo", "modules/foo", ComponentManifest::default());
        assert_eq!(package.rebase_path("src/"), "modules/foo/src/");
        assert_eq!(package.rebase_path("./lib"), "modules/foo/lib");
        assert_eq!(package.rebase_path(""), "modules/foo");
    }
}
