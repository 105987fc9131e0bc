//! Extension points around a rebuild

use crate::builder::RootManifest;
use crate::resolver::ResolverAction;

/// Adjusts the root manifest after it is built and before it is written.
///
/// Runs once per rebuild. Platform packages and empty repository lists are
/// normalized away again afterwards.
pub trait ManifestAlter {
    fn alter(&self, manifest: &mut RootManifest);
}

impl<F> ManifestAlter for F
where
    F: Fn(&mut RootManifest),
{
    fn alter(&self, manifest: &mut RootManifest) {
        self(manifest)
    }
}

/// Notified after the resolver has installed or updated dependencies.
pub trait InstallListener {
    fn dependencies_installed(&self, action: ResolverAction);
}

impl<F> InstallListener for F
where
    F: Fn(ResolverAction),
{
    fn dependencies_installed(&self, action: ResolverAction) {
        self(action)
    }
}

/// Registered hooks, run in registration order.
#[derive(Default)]
pub struct Hooks {
    alters: Vec<Box<dyn ManifestAlter>>,
    listeners: Vec<Box<dyn InstallListener>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_alter(&mut self, alter: impl ManifestAlter + 'static) -> &mut Self {
        self.alters.push(Box::new(alter));
        self
    }

    pub fn on_installed(&mut self, listener: impl InstallListener + 'static) -> &mut Self {
        self.listeners.push(Box::new(listener));
        self
    }

    pub(crate) fn alter(&self, manifest: &mut RootManifest) {
        for alter in &self.alters {
            alter.alter(manifest);
        }
        if !self.alters.is_empty() {
            manifest.normalize();
        }
    }

    pub(crate) fn installed(&self, action: ResolverAction) {
        for listener in &self.listeners {
            listener.dependencies_installed(action);
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("alters", &self.alters.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
