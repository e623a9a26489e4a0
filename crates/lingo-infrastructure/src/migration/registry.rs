//! Version registry holding the settings migration chain.
//!
//! Steps are stored in an arena indexed by `from_version`, so looking up the
//! step that leaves a given version is O(1). The chain is checked for
//! duplicates and gaps once, when the registry is built.

use lingo_core::migration::MigrationError;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use super::traits::MigrationStep;

/// Errors that make a migration chain unusable. Raised at initialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two steps leave the same version.
    #[error(
        "duplicate migration step from version {from_version}: '{existing}' conflicts with '{duplicate}'"
    )]
    DuplicateStep {
        from_version: u32,
        existing: String,
        duplicate: String,
    },

    /// A step does not advance by exactly one version.
    #[error(
        "migration step '{description}' goes from {from_version} to {to_version}; steps must advance by exactly one version"
    )]
    NonConsecutiveStep {
        from_version: u32,
        to_version: u32,
        description: String,
    },

    /// No step leaves `at_version` although later steps exist.
    #[error("migration chain is broken: no step from version {at_version}")]
    Gap { at_version: u32 },
}

/// Collects steps and checks the chain before producing a [`VersionRegistry`].
///
/// # Example
///
/// ```ignore
/// let mut builder = VersionRegistry::builder();
/// builder.register(Arc::new(TypedStep::<ConfigV0, ConfigV1>::new("...")))?;
/// builder.register(Arc::new(TypedStep::<ConfigV1, ConfigV2>::new("...")))?;
/// let registry = builder.build()?;
/// assert_eq!(registry.latest_version(), 2);
/// ```
#[derive(Debug, Default)]
pub struct VersionRegistryBuilder {
    steps: BTreeMap<u32, Arc<dyn MigrationStep>>,
    /// Versions the chain must cover, when declared.
    span: Option<(u32, u32)>,
}

impl VersionRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that the chain must lead from `base` to `latest`.
    ///
    /// Without a span the chain covers whatever the registered steps cover,
    /// so a missing first or last step would go unnoticed.
    pub fn span(&mut self, base: u32, latest: u32) -> &mut Self {
        self.span = Some((base, latest));
        self
    }

    /// Registers a single step.
    ///
    /// # Errors
    ///
    /// Fails if the step does not advance by exactly one version, or if a step
    /// leaving the same version is already registered. Conflicting definitions
    /// for one version pair are never resolved by picking one.
    pub fn register(&mut self, step: Arc<dyn MigrationStep>) -> Result<&mut Self, RegistryError> {
        let from_version = step.from_version();
        if from_version.checked_add(1) != Some(step.to_version()) {
            return Err(RegistryError::NonConsecutiveStep {
                from_version,
                to_version: step.to_version(),
                description: step.description().to_string(),
            });
        }
        if let Some(existing) = self.steps.get(&from_version) {
            return Err(RegistryError::DuplicateStep {
                from_version,
                existing: existing.description().to_string(),
                duplicate: step.description().to_string(),
            });
        }
        self.steps.insert(from_version, step);
        Ok(self)
    }

    /// Registers multiple steps, stopping at the first failure.
    pub fn register_all(
        &mut self,
        steps: impl IntoIterator<Item = Arc<dyn MigrationStep>>,
    ) -> Result<&mut Self, RegistryError> {
        for step in steps {
            self.register(step)?;
        }
        Ok(self)
    }

    /// Builds the registry, rejecting any gap between the lowest and the
    /// highest registered version.
    pub fn build(self) -> Result<VersionRegistry, RegistryError> {
        let registry = self.build_unchecked();
        if let Some(at_version) = registry.first_gap() {
            return Err(RegistryError::Gap { at_version });
        }
        tracing::debug!(
            "Settings migration registry built: v{} -> v{} ({} steps)",
            registry.base_version,
            registry.latest_version,
            registry.len()
        );
        Ok(registry)
    }

    /// Builds the arena without the contiguity check.
    ///
    /// Only used to exercise the runner's own gap detection.
    pub(crate) fn build_unchecked(self) -> VersionRegistry {
        let lowest = self.steps.keys().next().copied();
        let highest = self.steps.values().map(|step| step.to_version()).max();
        let (base_version, latest_version) = match (self.span, lowest, highest) {
            (Some((base, latest)), Some(lowest), Some(highest)) => {
                (base.min(lowest), latest.max(highest))
            }
            (Some(span), _, _) => span,
            (None, lowest, highest) => (lowest.unwrap_or(0), highest.unwrap_or(0)),
        };

        let mut slots: Vec<Option<Arc<dyn MigrationStep>>> =
            vec![None; (latest_version - base_version) as usize];
        for (from_version, step) in self.steps {
            slots[(from_version - base_version) as usize] = Some(step);
        }

        VersionRegistry {
            base_version,
            latest_version,
            slots,
        }
    }
}

/// The ordered chain of settings migration steps.
///
/// Immutable once built.
#[derive(Debug)]
pub struct VersionRegistry {
    /// Lowest version any step starts from (0 when empty).
    base_version: u32,
    /// Highest version any step produces (0 when empty).
    latest_version: u32,
    /// `slots[v - base_version]` holds the step leaving version `v`.
    slots: Vec<Option<Arc<dyn MigrationStep>>>,
}

impl VersionRegistry {
    pub fn builder() -> VersionRegistryBuilder {
        VersionRegistryBuilder::new()
    }

    /// Returns the highest version reachable through the chain.
    pub fn latest_version(&self) -> u32 {
        self.latest_version
    }

    /// Returns the oldest version the chain can upgrade from.
    pub fn base_version(&self) -> u32 {
        self.base_version
    }

    /// Returns the number of registered steps.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns true if no steps are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the step leaving `version`, if any.
    pub fn step(&self, version: u32) -> Option<&Arc<dyn MigrationStep>> {
        let index = version.checked_sub(self.base_version)? as usize;
        self.slots.get(index)?.as_ref()
    }

    /// Returns every registered step in ascending order.
    pub fn steps(&self) -> impl Iterator<Item = &Arc<dyn MigrationStep>> {
        self.slots.iter().flatten()
    }

    /// Returns the steps needed to bring a document at `version` to the
    /// latest version, in order.
    ///
    /// Empty when `version` is already the latest.
    ///
    /// # Errors
    ///
    /// - `FutureVersionDetected` if `version` is above the latest version
    ///   (callers are expected to check this first).
    /// - `MissingMigrationStep` naming the first version without a step. No
    ///   partial chain is ever returned.
    pub fn steps_from(&self, version: u32) -> Result<Vec<Arc<dyn MigrationStep>>, MigrationError> {
        if version > self.latest_version {
            return Err(MigrationError::FutureVersionDetected {
                stored_version: version,
                latest_version: self.latest_version,
            });
        }

        (version..self.latest_version)
            .map(|v| {
                self.step(v)
                    .cloned()
                    .ok_or(MigrationError::MissingMigrationStep { at_version: v })
            })
            .collect()
    }

    /// Returns the versions visited when migrating from `from`, including
    /// `from` itself. Empty when no complete path exists.
    pub fn path_from(&self, from: u32) -> Vec<u32> {
        match self.steps_from(from) {
            Ok(steps) => std::iter::once(from)
                .chain(steps.iter().map(|step| step.to_version()))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn first_gap(&self) -> Option<u32> {
        self.slots
            .iter()
            .position(Option::is_none)
            .map(|index| self.base_version + index as u32)
    }
}
