//! # lwconfig
//!
//! Rust library for reading and writing Likewise Open settings through the
//! `lwconfig` command-line tool.
//!
//! This crate provides functionality for:
//! - Parsing `lwconfig --dump` output, including quoted multi-line values
//! - Caching one dump per reconciliation batch ([`SettingsStore`])
//! - Writing single settings with `lwconfig <name> <value>`
//! - Swapping the real CLI for an in-memory [`backend::MockBackend`]
//!
//! ## Example
//!
//! ```no_run
//! use lwconfig::{Client, CommandConfig, DesiredSetting};
//!
//! let client = Client::new(CommandConfig::default());
//!
//! // One store per batch: the dump runs on the first lookup only
//! let store = client.store();
//! let current = store.get("AssumeDefaultDomain").expect("dump failed");
//!
//! let desired = DesiredSetting::new("AssumeDefaultDomain", "true");
//! if current.as_deref() != Some(desired.value.as_str()) {
//!     client.set(&desired).expect("lwconfig refused the value");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod parser;
pub mod store;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use parser::{Diagnostic, ParseErrorKind, ParseOutcome};
pub use store::SettingsStore;
pub use types::{CommandConfig, DEFAULT_TIMEOUT, DesiredSetting, Setting, Settings};

use backend::{Backend, cli::CliBackend};
use std::sync::Arc;

/// High-level client for lwconfig operations.
pub struct Client {
    backend: Arc<dyn Backend>,
}

impl Client {
    /// Create a client that runs the real `lwconfig` program.
    pub fn new(config: CommandConfig) -> Self {
        Self {
            backend: Arc::new(CliBackend::new(config)),
        }
    }

    /// Create a client with a custom backend (useful for testing).
    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// The backend in use.
    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    /// Check if lwconfig is available.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Fail with [`Error::NotFound`] unless lwconfig can be run.
    pub fn ensure_available(&self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(Error::NotFound {
                program: self.backend.program().to_string(),
            })
        }
    }

    /// Create a fresh store for one batch.
    pub fn store(&self) -> SettingsStore {
        SettingsStore::new(self.backend())
    }

    /// Dump and parse every setting, bypassing any cache.
    pub fn read_settings(&self) -> Result<ParseOutcome> {
        let output = self.backend.dump()?;
        Ok(parser::parse_dump(&output, &self.backend.dump_command()))
    }

    /// Write one setting.
    pub fn set(&self, setting: &DesiredSetting) -> Result<()> {
        log::info!("setting {setting}");
        self.backend.set(&setting.name, &setting.value)
    }
}
