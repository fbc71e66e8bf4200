//! Shared state passed to every command handler.

use std::io::Write;

use crate::config::Config;
use crate::db::Database;
use crate::settings::Settings;

/// Everything a handler may read or change.
pub struct State {
    /// Persisted settings (database URL and logged-in user).
    pub settings: Settings,
    /// Open database.
    pub db: Database,
    /// Application configuration.
    pub config: Config,
    out: Box<dyn Write + Send + Sync>,
}

impl State {
    /// Create state that writes command output to stdout.
    pub fn new(settings: Settings, db: Database, config: Config) -> Self {
        Self {
            settings,
            db,
            config,
            out: Box::new(std::io::stdout()),
        }
    }

    /// Send command output somewhere other than stdout.
    pub fn with_output(mut self, out: impl Write + Send + Sync + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    /// Command output sink.
    pub fn out(&mut self) -> &mut (dyn Write + Send + Sync) {
        self.out.as_mut()
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("settings", &self.settings)
            .field("db", &self.db)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
