//! Lazily loaded, shared settings cache.
//!
//! A [`SettingsStore`] stands for one reconciliation batch. Building it
//! runs nothing; the first lookup runs the dump, parses it and keeps the
//! snapshot for every later lookup. Share it with `Arc` so every setting
//! in the batch reads from the same dump.

use crate::backend::Backend;
use crate::error::Result;
use crate::parser::{self, Diagnostic, ParseOutcome};
use crate::types::Settings;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Snapshot plus whatever went wrong while parsing it.
struct Loaded {
    settings: Arc<Settings>,
    diagnostic: Option<Diagnostic>,
}

/// Cached, read-only view of the current settings.
pub struct SettingsStore {
    backend: Arc<dyn Backend>,
    /// Guards the one-time load: the first caller dumps while others wait.
    loaded: Mutex<Option<Loaded>>,
    dumps: AtomicUsize,
}

impl SettingsStore {
    /// Create a store. Nothing is executed until the first lookup.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            loaded: Mutex::new(None),
            dumps: AtomicUsize::new(0),
        }
    }

    /// The backend the store dumps through.
    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    /// Current value of a setting, or `None` if the dump did not list it.
    pub fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.snapshot()?.get(name).map(str::to_string))
    }

    /// The whole snapshot, loading it on first use.
    ///
    /// A failed dump is not cached; the next call runs it again.
    pub fn snapshot(&self) -> Result<Arc<Settings>> {
        let mut loaded = self.lock();
        if let Some(loaded) = loaded.as_ref() {
            return Ok(Arc::clone(&loaded.settings));
        }

        let fresh = self.load()?;
        let settings = Arc::clone(&fresh.settings);
        *loaded = Some(fresh);
        Ok(settings)
    }

    /// Parse diagnostic from the load, if the dump was malformed.
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        self.lock().as_ref().and_then(|l| l.diagnostic.clone())
    }

    /// Whether the snapshot has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }

    /// How many times this store has run the dump command.
    pub fn dump_count(&self) -> usize {
        self.dumps.load(Ordering::SeqCst)
    }

    fn load(&self) -> Result<Loaded> {
        self.dumps.fetch_add(1, Ordering::SeqCst);
        let output = self.backend.dump()?;
        let command = self.backend.dump_command();

        let (settings, diagnostic) = match parser::parse_dump(&output, &command) {
            ParseOutcome::Complete(settings) => {
                log::debug!("loaded {} settings from {command}", settings.len());
                (settings, None)
            }
            ParseOutcome::Partial {
                settings,
                diagnostic,
            } => {
                log::error!("{diagnostic}");
                log::debug!(
                    "using {} settings parsed before the malformed record",
                    settings.len()
                );
                (settings, Some(diagnostic))
            }
        };

        Ok(Loaded {
            settings: Arc::new(settings),
            diagnostic,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<Loaded>> {
        self.loaded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("program", &self.backend.program())
            .field("loaded", &self.is_loaded())
            .field("dumps", &self.dump_count())
            .finish()
    }
}
