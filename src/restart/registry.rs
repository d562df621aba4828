//! Named recovery actions.
//!
//! The restart registry is a LIFO list kept separately from the scope stack.
//! Lookup is first-match by name from the most recent entry, so a newer
//! restart shadows an older one with the same name. Unregistering a restart
//! only removes it; restarts never run on removal.

use crate::tracing_compat::{debug, warn};
use crate::types::{Condition, RestartId, RestartResult};
use core::fmt;
use std::rc::Rc;

/// A named recovery action.
///
/// Any `Fn(&Condition) -> RestartResult` closure is a restart.
pub trait Restart: 'static {
    /// Attempts the recovery action for `condition`.
    fn invoke(&self, condition: &Condition) -> RestartResult;
}

impl<F> Restart for F
where
    F: Fn(&Condition) -> RestartResult + 'static,
{
    fn invoke(&self, condition: &Condition) -> RestartResult {
        self(condition)
    }
}

/// Error type for restart registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RestartError {
    /// The restart is not registered.
    #[error("cannot find restart {id}")]
    NotFound {
        /// The restart that was looked up.
        id: RestartId,
    },
}

/// One registered restart.
pub struct RestartEntry {
    id: RestartId,
    name: String,
    restart: Rc<dyn Restart>,
}

impl RestartEntry {
    /// Returns the entry's identifier.
    #[must_use]
    pub const fn id(&self) -> RestartId {
        self.id
    }

    /// Returns the restart name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for RestartEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestartEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// LIFO registry of named restarts.
#[derive(Debug, Default)]
pub struct RestartRegistry {
    entries: Vec<RestartEntry>,
}

impl RestartRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers `restart` under `name`, shadowing older entries of the same
    /// name.
    pub fn register(&mut self, name: impl Into<String>, restart: impl Restart) -> RestartId {
        let id = RestartId::next();
        let name = name.into();
        debug!(restart = %id, name = %name, "restart registered");
        self.entries.push(RestartEntry {
            id,
            name,
            restart: Rc::new(restart),
        });
        id
    }

    /// Removes the restart `id` without invoking it.
    ///
    /// # Errors
    ///
    /// Returns [`RestartError::NotFound`] (and logs a warning) if the restart
    /// is not registered.
    pub fn unregister(&mut self, id: RestartId) -> Result<(), RestartError> {
        let Some(pos) = self.entries.iter().rposition(|entry| entry.id == id) else {
            warn!(restart = %id, "cannot find restart");
            return Err(RestartError::NotFound { id });
        };
        let entry = self.entries.remove(pos);
        debug!(restart = %id, name = %entry.name, "restart unregistered");
        Ok(())
    }

    /// Returns the most recent restart named `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Rc<dyn Restart>> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.name == name)
            .map(|entry| Rc::clone(&entry.restart))
    }

    /// Invokes the most recent restart named `name` with `condition`.
    ///
    /// Returns the restart's own result, or [`RestartResult::NotFound`] with
    /// no side effect when nothing is registered under `name`.
    pub fn invoke(&self, condition: &Condition, name: &str) -> RestartResult {
        self.find(name)
            .map_or(RestartResult::NotFound, |restart| restart.invoke(condition))
    }

    /// Returns `true` if the restart is registered.
    #[must_use]
    pub fn contains(&self, id: RestartId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Returns the number of registered restarts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no restarts are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &RestartEntry> {
        self.entries.iter().rev()
    }
}
