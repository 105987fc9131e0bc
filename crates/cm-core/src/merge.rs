//! Combining component manifests into one requirement set
//!
//! The merge is "first wins": the base manifest is processed first and every
//! later contributor can only add keys that are not present yet. A component
//! can therefore never change a constraint core already declared, and the
//! first extension to ask for a package fixes its constraint.

use serde_json::Value;

use crate::manifest::{Autoload, ComponentManifest, ComponentPackage, ConstraintMap, Stability};

/// Accumulated requirements of the base manifest and every usable component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedRequirementSet {
    pub require: ConstraintMap,
    pub require_dev: ConstraintMap,
    pub conflict: ConstraintMap,
    pub replace: ConstraintMap,
    pub provide: ConstraintMap,
    pub suggest: ConstraintMap,
    /// Structurally deduplicated, in first-seen order.
    pub repositories: Vec<Value>,
    pub autoload: Autoload,
    /// Lowest stability declared by any contributor.
    pub minimum_stability: Stability,
    /// `false` as soon as one contributor declares `false`.
    pub prefer_stable: bool,
    /// Names of the contributors, base first, then in discovery order.
    pub sources: Vec<String>,
}

/// Stateless merger of component manifests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestMerger;

impl ManifestMerger {
    pub fn new() -> Self {
        Self
    }

    /// Merge `base` and `components` into a single requirement set.
    ///
    /// The base manifest's autoload paths are taken verbatim; component
    /// autoload paths are prefixed with the component directory. Components
    /// without a valid name, or without any requirement, are skipped and do
    /// not show up in [`MergedRequirementSet::sources`].
    pub fn merge(
        &self,
        base: &ComponentManifest,
        components: &[ComponentPackage],
    ) -> MergedRequirementSet {
        let mut merged = MergedRequirementSet::default();
        let mut stabilities = Vec::new();
        let mut prefer_stable = Vec::new();

        if let Some(name) = base.name.as_deref() {
            merged.sources.push(name.to_string());
        }
        absorb(&mut merged, base);
        merged.autoload.extend(base.autoload.clone());
        stabilities.extend(base.minimum_stability);
        prefer_stable.extend(base.prefer_stable);

        for component in components {
            let Some(name) = component.package_name() else {
                tracing::debug!(extension = %component.extension, "skipping manifest without a name");
                continue;
            };
            if !component.manifest.has_requirements() {
                tracing::debug!(extension = %component.extension, "skipping manifest without requirements");
                continue;
            }
            if !crate::manifest::is_valid_package_name(name) {
                tracing::warn!(extension = %component.extension, %name, "merging manifest with a non-canonical package name");
            }

            tracing::debug!(extension = %component.extension, %name, "merging component manifest");
            merged.sources.push(name.to_string());
            absorb(&mut merged, &component.manifest);
            merged
                .autoload
                .extend(component.manifest.autoload.map_paths(|path| component.rebase_path(path)));
            stabilities.extend(component.manifest.minimum_stability);
            prefer_stable.extend(component.manifest.prefer_stable);
        }

        merged.minimum_stability = resolve_minimum_stability(&stabilities);
        merged.prefer_stable = resolve_prefer_stable(&prefer_stable);
        merged
    }
}

/// Fold one manifest's keyed properties into the accumulator.
fn absorb(merged: &mut MergedRequirementSet, manifest: &ComponentManifest) {
    insert_missing(&mut merged.require, manifest.requirements());
    insert_missing(&mut merged.require_dev, manifest.dev_requirements());
    insert_missing(&mut merged.conflict, &manifest.conflict);
    insert_missing(&mut merged.replace, &manifest.replace);
    insert_missing(&mut merged.provide, &manifest.provide);
    insert_missing(&mut merged.suggest, &manifest.suggest);

    for repository in manifest.repositories.iter().flatten() {
        if !merged.repositories.contains(repository) {
            merged.repositories.push(repository.clone());
        }
    }
}

/// Insert each entry of `source` whose key is not in `target` yet.
fn insert_missing(target: &mut ConstraintMap, source: &ConstraintMap) {
    for (package, constraint) in source {
        if !target.contains_key(package) {
            target.insert(package.clone(), constraint.clone());
        }
    }
}

/// Pick the lowest declared stability; `stable` when nothing was declared.
///
/// The lowest value satisfies the widest range of requested packages, e.g.
/// `[stable, rc, beta]` resolves to `beta`.
pub fn resolve_minimum_stability(declared: &[Stability]) -> Stability {
    declared.iter().copied().min().unwrap_or(Stability::Stable)
}

/// `false` only if some contributor explicitly declared `false`.
pub fn resolve_prefer_stable(declared: &[bool]) -> bool {
    !declared.contains(&false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stability_resolves_to_lowest() {
        let declared = [Stability::Stable, Stability::Rc, Stability::Beta];
        assert_eq!(resolve_minimum_stability(&declared), Stability::Beta);
        assert_eq!(resolve_minimum_stability(&[Stability::Stable]), Stability::Stable);
        assert_eq!(resolve_minimum_stability(&[]), Stability::Stable);
    }

    #[test]
    fn prefer_stable_false_wins() {
        assert!(!resolve_prefer_stable(&[true, false, true]));
        assert!(resolve_prefer_stable(&[true, true]));
        assert!(resolve_prefer_stable(&[]));
    }

    #[test]
    fn insert_missing_keeps_existing_constraint() {
        let mut target = ConstraintMap::from([("a/a".to_string(), "^1.0".to_string())]);
        let source = ConstraintMap::from([
            ("a/a".to_string(), "^2.0".to_string()),
            ("b/b".to_string(), "~3.0".to_string()),
        ]);

        insert_missing(&mut target, &source);

        assert_eq!(target["a/a"], "^1.0");
        assert_eq!(target["b/b"], "~3.0");
    }
}
