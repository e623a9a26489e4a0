//! Settings service.
//!
//! Owns the one-shot "load, migrate, persist" run for the settings document
//! and hands out the resulting [`Config`].

use lingo_core::config::{Config, ConfigStore};
use lingo_core::error::{LingoError, Result};
use lingo_core::migration::MigrationError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{RwLock, watch};

use crate::migration::{MigrationRunner, build_registry, from_document, to_document};
use crate::paths::LingoPaths;
use crate::schema::SchemaValidator;
use crate::storage::FileConfigStore;

type FailureHandler = Box<dyn Fn(&LingoError) + Send + Sync>;

/// Outcome of the one-shot run; `None` until the run settles.
type RunOutcome = Option<Result<Arc<Config>>>;

#[derive(Default)]
struct FailureState {
    handlers: Vec<FailureHandler>,
    recorded: Option<LingoError>,
}

struct Inner {
    store: Arc<dyn ConfigStore>,
    runner: MigrationRunner,
    outcome: watch::Sender<RunOutcome>,
    current: RwLock<Option<Arc<Config>>>,
    failure: Mutex<FailureState>,
}

/// Service for loading, migrating and saving the settings document.
///
/// # Example
///
/// ```ignore
/// let service = ConfigService::open_default()?;
/// service.on_migration_failure(|e| tracing::error!("settings unusable: {}", e));
/// let config = service.get_migrated_config().await?;
/// ```
pub struct ConfigService {
    inner: Arc<Inner>,
    /// Set once the migration task has been spawned.
    started: AtomicBool,
}

impl ConfigService {
    /// Creates a service over `store` with the built-in migration chain.
    ///
    /// Fails if the chain is broken or the default settings do not satisfy
    /// the latest layout.
    pub fn new(store: Arc<dyn ConfigStore>) -> Result<Self> {
        let registry = build_registry()
            .map_err(|e| LingoError::internal(format!("invalid migration chain: {}", e)))?;
        let validator = SchemaValidator::new().map_err(|e| LingoError::internal(e.to_string()))?;
        let runner = MigrationRunner::new(Arc::new(registry), validator);

        let latest = runner.latest_version();
        if runner.validator().latest_version() != latest {
            return Err(LingoError::internal(format!(
                "migration chain ends at v{} but the latest known layout is v{}",
                latest,
                runner.validator().latest_version()
            )));
        }
        let defaults = to_document(&Config::default())?;
        if let Err(violations) = runner.validator().validate(&defaults, latest) {
            return Err(MigrationError::PostMigrationValidationFailed { violations }.into());
        }

        Ok(Self::with_runner(store, runner))
    }

    /// Creates a service with a custom runner.
    pub fn with_runner(store: Arc<dyn ConfigStore>, runner: MigrationRunner) -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                store,
                runner,
                outcome,
                current: RwLock::new(None),
                failure: Mutex::new(FailureState::default()),
            }),
            started: AtomicBool::new(false),
        }
    }

    /// Creates a service over the default settings file.
    pub fn open_default() -> Result<Self> {
        let path = LingoPaths::settings_file().map_err(|e| LingoError::io(e.to_string()))?;
        Self::new(Arc::new(FileConfigStore::new(path)))
    }

    pub fn runner(&self) -> &MigrationRunner {
        &self.inner.runner
    }

    /// Returns the settings at the latest version.
    ///
    /// The first call spawns the task that loads, migrates and, when anything
    /// changed, persists the document. Every caller waits for that same task;
    /// dropping a caller does not cancel it. A failed run is not retried.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn get_migrated_config(&self) -> Result<Arc<Config>> {
        let mut outcome = self.inner.outcome.subscribe();
        if !self.started.swap(true, Ordering::SeqCst) {
            self.spawn_run();
        }

        let settled = outcome
            .wait_for(Option::is_some)
            .await
            .map_err(|_| LingoError::internal("settings migration task ended without an outcome"))?;
        let result = (*settled).clone();
        result.unwrap_or_else(|| Err(LingoError::internal("settings migration outcome missing")))
    }

    /// Registers a callback for a failed migration run.
    ///
    /// The handler is called at most once. If the run has already failed it
    /// is called immediately with the recorded error.
    pub fn on_migration_failure<F>(&self, handler: F)
    where
        F: Fn(&LingoError) + Send + Sync + 'static,
    {
        let recorded = {
            let mut state = self.inner.failure.lock().unwrap_or_else(PoisonError::into_inner);
            match &state.recorded {
                Some(error) => error.clone(),
                None => {
                    state.handlers.push(Box::new(handler));
                    return;
                }
            }
        };
        handler(&recorded);
    }

    /// Returns the current settings, or `None` before a successful
    /// [`get_migrated_config`](Self::get_migrated_config).
    pub async fn current_config(&self) -> Option<Arc<Config>> {
        self.inner.current.read().await.clone()
    }

    /// Validates and persists `config` as the current settings.
    ///
    /// The stored document is migrated first; if that fails nothing is
    /// written so the original document is preserved. Saves are serialized so
    /// the store and [`current_config`](Self::current_config) always agree.
    pub async fn save_config(&self, config: Config) -> Result<Arc<Config>> {
        self.get_migrated_config().await?;

        let runner = &self.inner.runner;
        let latest = runner.latest_version();
        let document = to_document(&config)?;
        if let Err(violations) = runner.validator().validate(&document, latest) {
            tracing::warn!("Rejected settings update with {} violation(s)", violations.len());
            return Err(MigrationError::PostMigrationValidationFailed { violations }.into());
        }

        let mut current = self.inner.current.write().await;
        self.inner.store.set(&document).await?;
        let config = Arc::new(config);
        *current = Some(config.clone());
        tracing::info!("Settings saved");
        Ok(config)
    }

    fn spawn_run(&self) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let worker = tokio::spawn({
                let inner = inner.clone();
                async move { inner.load_and_migrate().await }
            });
            let result = match worker.await {
                Ok(result) => result,
                Err(e) => {
                    let error = LingoError::internal(format!("settings migration task failed: {}", e));
                    inner.notify_failure(&error);
                    Err(error)
                }
            };
            inner.outcome.send_replace(Some(result));
        });
    }
}

impl Inner {
    async fn load_and_migrate(&self) -> Result<Arc<Config>> {
        let result = self.migrate_stored().await;
        match &result {
            Ok(config) => *self.current.write().await = Some(config.clone()),
            Err(error) => self.notify_failure(error),
        }
        result
    }

    async fn migrate_stored(&self) -> Result<Arc<Config>> {
        let latest = self.runner.latest_version();

        let Some(stored) = self.store.get().await? else {
            tracing::info!("No settings found, creating defaults at v{}", latest);
            let config = Config::default();
            let document = to_document(&config)?;
            self.runner
                .validator()
                .validate(&document, latest)
                .map_err(|violations| MigrationError::PostMigrationValidationFailed { violations })?;
            self.store.set(&document).await?;
            return Ok(Arc::new(config));
        };

        let report = self.runner.run(&stored.document, stored.version)?;
        let config = from_document(&report.document)?;

        if report.migrated() {
            self.store.set(&report.document).await?;
            tracing::info!(
                "Persisted settings at v{} after {} migration step(s)",
                report.version,
                report.applied.len()
            );
        }

        Ok(Arc::new(config))
    }

    fn notify_failure(&self, error: &LingoError) {
        tracing::error!("Settings migration failed: {}", error);
        let handlers = {
            let mut state = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
            state.recorded = Some(error.clone());
            std::mem::take(&mut state.handlers)
        };
        for handler in handlers {
            handler(error);
        }
    }
}
