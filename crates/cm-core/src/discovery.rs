//! Finding the extensions installed on a site
//!
//! An extension is a directory holding a `<name>.info.yml` file. Only modules
//! and installation profiles can contribute dependencies. Core and its bundled
//! extensions are never scanned: core's own manifest already covers them.
//!
//! Search directories, in priority order:
//!
//! 1. `profiles/`
//! 2. `sites/all/`
//! 3. `modules/`
//! 4. `sites/<site>/` for every site directory, alphabetically
//!
//! When two directories hold an extension with the same name, the first one
//! found wins.

use std::collections::HashSet;
use std::fmt;
use std::fs;

use cm_fs::{DocumentStore, NormalizedPath};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::manifest::{ComponentManifest, ComponentPackage};

const INFO_SUFFIX: &str = ".info.yml";

/// Directory names that never contain extensions worth scanning.
const SKIPPED_DIRECTORIES: &[&str] = &["tests", "src", "vendor", "node_modules", "files", "templates"];

/// Kind of extension declared by an info file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    Module,
    Profile,
}

impl ExtensionKind {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "module" => Some(Self::Module),
            "profile" => Some(Self::Profile),
            _ => None,
        }
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module => f.write_str("module"),
            Self::Profile => f.write_str("profile"),
        }
    }
}

/// A discovered extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub name: String,
    pub kind: ExtensionKind,
    /// Directory of the info file, relative to the site root.
    pub directory: NormalizedPath,
}

impl Extension {
    pub fn manifest_path(&self, root: &NormalizedPath) -> NormalizedPath {
        root.join(self.directory.as_str()).join("composer.json")
    }
}

/// Supplies the extensions of a site, in priority order.
pub trait ExtensionSource {
    fn extensions(&self) -> Result<Vec<Extension>>;
}

impl ExtensionSource for Vec<Extension> {
    fn extensions(&self) -> Result<Vec<Extension>> {
        Ok(self.clone())
    }
}

#[derive(Debug, Deserialize)]
struct InfoFile {
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Filesystem scanner for extensions below a site root.
#[derive(Debug, Clone)]
pub struct ExtensionDiscovery {
    root: NormalizedPath,
}

impl ExtensionDiscovery {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    /// Search directories relative to the root, in priority order.
    pub fn search_directories(&self) -> Result<Vec<String>> {
        let mut directories = vec![
            "profiles".to_string(),
            "sites/all".to_string(),
            "modules".to_string(),
        ];
        directories.extend(self.site_directories()?.into_iter().map(|site| format!("sites/{}", site)));
        Ok(directories)
    }

    /// Every directory under `sites/` that represents a site.
    fn site_directories(&self) -> Result<Vec<String>> {
        let sites = self.root.join("sites");
        if !sites.is_dir() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = list_directories(&sites)?
            .into_iter()
            .filter(|name| name != "all" && !name.starts_with('.'))
            .collect();
        names.sort();
        Ok(names)
    }

    fn scan_directory(
        &self,
        relative: &NormalizedPath,
        seen: &mut HashSet<String>,
        found: &mut Vec<Extension>,
    ) -> Result<()> {
        let absolute = self.root.join(relative.as_str());
        let native = absolute.to_native();
        let entries = fs::read_dir(&native).map_err(|source| Error::Discovery {
            path: native.clone(),
            source,
        })?;

        let mut files = Vec::new();
        let mut directories = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            match entry.file_type() {
                Ok(kind) if kind.is_dir() => directories.push(name),
                Ok(kind) if kind.is_file() => files.push(name),
                _ => {}
            }
        }
        files.sort();
        directories.sort();

        for file in files {
            let Some(name) = file.strip_suffix(INFO_SUFFIX) else {
                continue;
            };
            let info_path = absolute.join(&file);
            let info: InfoFile = match fs::read_to_string(info_path.to_native())
                .map_err(|e| e.to_string())
                .and_then(|content| serde_yaml::from_str(&content).map_err(|e| e.to_string()))
            {
                Ok(info) => info,
                Err(error) => {
                    tracing::warn!(path = %info_path, %error, "skipping unreadable info file");
                    continue;
                }
            };
            let Some(kind) = info.kind.as_deref().and_then(ExtensionKind::parse) else {
                continue;
            };
            if !seen.insert(name.to_string()) {
                tracing::debug!(extension = %name, directory = %relative, "extension already discovered");
                continue;
            }
            found.push(Extension {
                name: name.to_string(),
                kind,
                directory: relative.clone(),
            });
        }

        for directory in directories {
            if directory.starts_with('.') || SKIPPED_DIRECTORIES.contains(&directory.as_str()) {
                continue;
            }
            self.scan_directory(&relative.join(&directory), seen, found)?;
        }
        Ok(())
    }

    /// Pair every discovered extension with its `composer.json`.
    ///
    /// Extensions without a manifest are left out. An unreadable manifest is
    /// an error.
    pub fn components(&self) -> Result<Vec<ComponentPackage>> {
        load_components(&self.root, self)
    }
}

impl ExtensionSource for ExtensionDiscovery {
    fn extensions(&self) -> Result<Vec<Extension>> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for directory in self.search_directories()? {
            if !self.root.join(&directory).is_dir() {
                continue;
            }
            self.scan_directory(&NormalizedPath::new(&directory), &mut seen, &mut found)?;
        }
        tracing::debug!(root = %self.root, extensions = found.len(), "discovered extensions");
        Ok(found)
    }
}

/// Load the manifest of every extension from `source` that has one.
pub fn load_components(
    root: &NormalizedPath,
    source: &dyn ExtensionSource,
) -> Result<Vec<ComponentPackage>> {
    let store = DocumentStore::new();
    let mut components = Vec::new();
    for extension in source.extensions()? {
        let path = extension.manifest_path(root);
        if !path.is_file() {
            continue;
        }
        let manifest: ComponentManifest = store.load(&path).map_err(|source| Error::ManifestRead {
            path: path.to_native(),
            source,
        })?;
        tracing::debug!(extension = %extension.name, kind = %extension.kind, "loaded component manifest");
        components.push(ComponentPackage::new(extension.name, extension.directory, manifest));
    }
    Ok(components)
}

fn list_directories(path: &NormalizedPath) -> Result<Vec<String>> {
    let native = path.to_native();
    let entries = fs::read_dir(&native).map_err(|source| Error::Discovery {
        path: native.clone(),
        source,
    })?;
    Ok(entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_dir()))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect())
}
