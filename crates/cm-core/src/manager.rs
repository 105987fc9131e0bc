//! Orchestration of discovery, rebuild, resolver runs and reconciliation
//!
//! [`PackageManager`] is the entry point for a site. It loads the core manifest
//! and every extension manifest once per session, rebuilds the root
//! `composer.json` under an exclusive lock, and answers what is required,
//! installed, missing or orphaned.

use cm_fs::checksum::{compute_content_checksum, compute_file_checksum};
use cm_fs::{DocumentStore, FileLock, NormalizedPath};

use crate::builder::{RootManifest, RootPackageBuilder};
use crate::config::{DEFAULT_MODULE_PATH, Settings};
use crate::discovery::{ExtensionDiscovery, ExtensionSource, load_components};
use crate::error::{Error, Result};
use crate::hooks::Hooks;
use crate::installed::InstalledSnapshot;
use crate::lock::WriteLock;
use crate::manifest::{ComponentManifest, ComponentPackage};
use crate::reconcile::{PackageReconciler, ReconciliationReport};
use crate::resolver::{ComposerCommand, DependencyResolver, ResolverAction, ResolverOutput};

/// Machine name of the extension shipping the Composer command callbacks.
pub const MODULE_NAME: &str = "composer_manager";

/// Outcome of a root manifest rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    pub path: NormalizedPath,
    /// Size of the manifest on disk.
    pub bytes: u64,
    pub checksum: String,
    /// `false` when the file already had this content and was left untouched.
    pub changed: bool,
    pub sources: Vec<String>,
}

/// Manages the Composer packages of one site.
pub struct PackageManager {
    root: NormalizedPath,
    settings: Settings,
    store: DocumentStore,
    source: Box<dyn ExtensionSource>,
    lock: Box<dyn WriteLock>,
    resolver: Box<dyn DependencyResolver>,
    builder: RootPackageBuilder,
    hooks: Hooks,
    session: Session,
    required: Option<ReconciliationReport>,
    last_built: Option<RootManifest>,
    written: bool,
}

impl PackageManager {
    /// Open the site at `root` using `composer_manager.toml` if present.
    pub fn open(root: impl Into<NormalizedPath>) -> Result<Self> {
        let root = root.into();
        let settings = Settings::load(&root)?;
        Self::with_settings(root, settings)
    }

    /// Open the site at `root` with explicit settings.
    ///
    /// Uses filesystem discovery, an advisory file lock and the `composer`
    /// executable named in `settings`.
    pub fn with_settings(root: impl Into<NormalizedPath>, settings: Settings) -> Result<Self> {
        let root = root.into();
        let discovery = ExtensionDiscovery::new(root.clone());
        let module_path = match &settings.module_path {
            Some(path) => NormalizedPath::new(path),
            None => locate_module(&discovery)?,
        };
        tracing::debug!(%root, %module_path, "opening site");

        Ok(Self {
            store: DocumentStore::new(),
            source: Box::new(discovery),
            lock: Box::new(FileLock::new(root.join(&settings.lock_file))),
            resolver: Box::new(ComposerCommand::new(&settings.composer_binary)),
            builder: RootPackageBuilder::new(module_path),
            hooks: Hooks::new(),
            session: Session::default(),
            required: None,
            last_built: None,
            written: false,
            root,
            settings,
        })
    }

    pub fn with_extension_source(mut self, source: impl ExtensionSource + 'static) -> Self {
        self.source = Box::new(source);
        self.clear_cache();
        self
    }

    pub fn with_lock(mut self, lock: impl WriteLock + 'static) -> Self {
        self.lock = Box::new(lock);
        self
    }

    pub fn with_resolver(mut self, resolver: impl DependencyResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_builder(mut self, builder: RootPackageBuilder) -> Self {
        self.builder = builder;
        self.clear_cache();
        self
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn hooks_mut(&mut self) -> &mut Hooks {
        &mut self.hooks
    }

    pub fn root_manifest_path(&self) -> NormalizedPath {
        self.root.join(&self.settings.root_manifest)
    }

    /// The core manifest, loaded once per session.
    pub fn core_package(&mut self) -> Result<&ComponentManifest> {
        Ok(self.session.load(&self.root, &self.settings, self.source.as_ref())?.0)
    }

    /// Every discovered extension that ships a `composer.json`, loaded once
    /// per session.
    pub fn extension_packages(&mut self) -> Result<&[ComponentPackage]> {
        Ok(self.session.load(&self.root, &self.settings, self.source.as_ref())?.1)
    }

    /// Build a fresh root manifest without running alter hooks or writing it.
    pub fn build_root_package(&mut self) -> Result<RootManifest> {
        let (core, components) = self
            .session
            .load(&self.root, &self.settings, self.source.as_ref())?;
        self.builder.build(core, components)
    }

    /// Reconcile a freshly built root manifest with the installed packages.
    pub fn required_packages(&mut self) -> Result<&ReconciliationReport> {
        if let Some(report) = self.required.take() {
            return Ok(self.required.insert(report));
        }
        let root_manifest = self.build_root_package()?;
        let snapshot = InstalledSnapshot::load(&self.root.join(&self.settings.installed))?;
        let (core, components) = self
            .session
            .load(&self.root, &self.settings, self.source.as_ref())?;
        let report = PackageReconciler::new(core, components).reconcile(&root_manifest, &snapshot);
        Ok(self.required.insert(report))
    }

    /// Whether packages are missing or orphaned.
    pub fn needs_update(&mut self) -> Result<bool> {
        Ok(self.required_packages()?.needs_update())
    }

    /// Whether enabling or disabling `extensions` affects the root manifest.
    ///
    /// True when any of them ships a `composer.json`. Unknown names are
    /// ignored.
    pub fn has_changes(&self, extensions: &[&str]) -> Result<bool> {
        let changed = self
            .source
            .extensions()?
            .iter()
            .filter(|extension| extensions.contains(&extension.name.as_str()))
            .any(|extension| extension.manifest_path(&self.root).is_file());
        tracing::debug!(?extensions, changed, "checked extensions for composer manifests");
        Ok(changed)
    }

    /// Rebuild the root manifest and write it to the site root.
    ///
    /// The whole read-merge-write runs under the write lock. Alter hooks run
    /// once, after the build and before the write. A file that already has
    /// the new content is left untouched.
    ///
    /// # Errors
    ///
    /// [`Error::LockTimeout`] when the lock stays held; nothing is written.
    /// [`Error::ManifestWrite`] when the file cannot be written; the built
    /// manifest is still available from [`last_built`](Self::last_built).
    pub fn rebuild_root_package(&mut self) -> Result<RebuildReport> {
        let timeout = self.settings.lock_timeout();
        let _guard = self.lock.acquire(timeout)?;

        self.written = false;
        let mut manifest = self.build_root_package()?;
        self.hooks.alter(&mut manifest);

        let path = self.root_manifest_path();
        let content = self
            .store
            .render(&path, &manifest)
            .map_err(|source| Error::ManifestWrite {
                path: path.to_native(),
                source,
            })?;
        let sources = manifest.sources().into_iter().map(str::to_string).collect();
        self.last_built = Some(manifest);

        let checksum = compute_content_checksum(&content);
        let previous = path
            .is_file()
            .then(|| compute_file_checksum(&path.to_native()).ok())
            .flatten();
        let changed = previous.as_deref() != Some(checksum.as_str());

        let bytes = if changed {
            cm_fs::io::write_text(&path, &content).map_err(|source| Error::ManifestWrite {
                path: path.to_native(),
                source,
            })?
        } else {
            content.len() as u64
        };
        self.written = true;
        tracing::info!(%path, bytes, changed, "root manifest rebuilt");

        Ok(RebuildReport {
            path,
            bytes,
            checksum,
            changed,
            sources,
        })
    }

    /// Whether the last rebuild left the root manifest on disk.
    pub fn root_manifest_written(&self) -> bool {
        self.written
    }

    /// The manifest produced by the last rebuild, written or not.
    pub fn last_built(&self) -> Option<&RootManifest> {
        self.last_built.as_ref()
    }

    /// Install the dependencies recorded in the lock file.
    pub fn install(&mut self) -> Result<ResolverOutput> {
        self.run_resolver(ResolverAction::Install)
    }

    /// Rebuild the root manifest, then re-resolve every dependency.
    pub fn update(&mut self) -> Result<ResolverOutput> {
        self.rebuild_root_package()?;
        self.run_resolver(ResolverAction::Update)
    }

    /// Forget everything loaded during this session.
    pub fn clear_cache(&mut self) {
        self.session = Session::default();
        self.required = None;
    }

    fn run_resolver(&mut self, action: ResolverAction) -> Result<ResolverOutput> {
        let output = self.resolver.run(action, &self.root.to_native())?;
        self.required = None;
        self.hooks.installed(action);
        Ok(output)
    }
}

/// Manifests loaded during one session.
#[derive(Debug, Default)]
struct Session {
    core: Option<ComponentManifest>,
    components: Option<Vec<ComponentPackage>>,
}

impl Session {
    /// Load the core and extension manifests unless already cached.
    fn load(
        &mut self,
        root: &NormalizedPath,
        settings: &Settings,
        source: &dyn ExtensionSource,
    ) -> Result<(&ComponentManifest, &[ComponentPackage])> {
        let core = match self.core.take() {
            Some(core) => core,
            None => {
                let path = root.join(&settings.core_manifest);
                DocumentStore::new()
                    .load(&path)
                    .map_err(|source| Error::ManifestRead {
                        path: path.to_native(),
                        source,
                    })?
            }
        };
        let core = self.core.insert(core);

        let components = match self.components.take() {
            Some(components) => components,
            None => {
                let components = load_components(root, source)?;
                tracing::info!(components = components.len(), "loaded extension manifests");
                components
            }
        };
        let components = self.components.insert(components);

        Ok((&*core, components.as_slice()))
    }
}

impl std::fmt::Debug for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageManager")
            .field("root", &self.root)
            .field("settings", &self.settings)
            .field("builder", &self.builder)
            .field("hooks", &self.hooks)
            .field("written", &self.written)
            .finish_non_exhaustive()
    }
}

/// Directory of this module relative to the site root.
fn locate_module(source: &dyn ExtensionSource) -> Result<NormalizedPath> {
    let found = source
        .extensions()?
        .into_iter()
        .find(|extension| extension.name == MODULE_NAME)
        .map(|extension| extension.directory);
    Ok(found.unwrap_or_else(|| NormalizedPath::new(DEFAULT_MODULE_PATH)))
}
