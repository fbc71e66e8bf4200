//! Command dispatch for gator.
//!
//! A [`Command`] names an operation and carries its arguments. [`Commands`]
//! maps names to [`Handler`]s. User-scoped handlers are wrapped with
//! [`middleware_logged_in`], which resolves the logged-in user before the
//! handler runs.

pub mod handlers;
pub mod state;

use std::collections::HashMap;

use futures::future::BoxFuture;
use tracing::debug;

use crate::db::{User, UserRepository};
use crate::{GatorError, Result};

pub use handlers::default_commands;
pub use state::State;

/// A named operation with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command name.
    pub name: String,
    /// Positional arguments.
    pub args: Vec<String>,
}

impl Command {
    /// Create a command.
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Build a command from process arguments, program name excluded.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let name = args
            .next()
            .ok_or_else(|| GatorError::Usage("not enough arguments".to_string()))?;
        Ok(Self::new(name, args.collect()))
    }

    /// Required argument at `index`; `usage` is reported if it is missing.
    pub fn arg(&self, index: usize, usage: &str) -> Result<&str> {
        self.args
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| GatorError::Usage(usage.to_string()))
    }

    /// Optional argument at `index`.
    pub fn opt_arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

/// Handler that needs no logged-in user.
pub type HandlerFn = for<'a> fn(&'a mut State, Command) -> BoxFuture<'a, Result<()>>;

/// Handler that runs on behalf of the logged-in user.
pub type UserHandlerFn = for<'a> fn(&'a mut State, Command, User) -> BoxFuture<'a, Result<()>>;

/// A registered command handler.
#[derive(Clone, Copy)]
pub enum Handler {
    /// Runs unconditionally.
    Plain(HandlerFn),
    /// Runs only when a user is logged in; receives that user.
    LoggedIn(UserHandlerFn),
}

impl Handler {
    /// Invoke the handler.
    pub async fn call(&self, state: &mut State, cmd: Command) -> Result<()> {
        match self {
            Handler::Plain(handler) => handler(state, cmd).await,
            Handler::LoggedIn(handler) => {
                let user = current_user(state).await?;
                handler(state, cmd, user).await
            }
        }
    }

    /// Whether the handler requires a logged-in user.
    pub fn requires_login(&self) -> bool {
        matches!(self, Handler::LoggedIn(_))
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Plain(_) => f.write_str("Handler::Plain"),
            Handler::LoggedIn(_) => f.write_str("Handler::LoggedIn"),
        }
    }
}

/// Wrap a user-scoped handler so it only runs for a logged-in user.
///
/// Without a current user in the settings the call fails with
/// [`GatorError::NotLoggedIn`] and `inner` is never invoked.
pub fn middleware_logged_in(inner: UserHandlerFn) -> Handler {
    Handler::LoggedIn(inner)
}

async fn current_user(state: &State) -> Result<User> {
    let name = state
        .settings
        .current_user_name
        .as_deref()
        .ok_or(GatorError::NotLoggedIn)?;

    UserRepository::new(state.db.pool())
        .get_by_name(name)
        .await?
        .ok_or_else(|| GatorError::NotFound(format!("user {name}")))
}

/// Registry of command handlers.
#[derive(Debug, Default)]
pub struct Commands {
    handlers: HashMap<String, Handler>,
}

impl Commands {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, handler: Handler) {
        self.handlers.insert(name.into(), handler);
    }

    /// Look up a handler.
    pub fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run a command.
    pub async fn run(&self, state: &mut State, cmd: Command) -> Result<()> {
        let handler = self
            .handlers
            .get(&cmd.name)
            .ok_or_else(|| GatorError::UnknownCommand(cmd.name.clone()))?;

        debug!(command = %cmd.name, args = ?cmd.args, "running command");
        handler.call(state, cmd).await
    }
}
