use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::action::Action;
use crate::error::AgentError;
use crate::executor::{self, ActionHandle, Outcome};
use crate::request::ActionRequest;
use crate::spool::StatusSpool;

/// A loaded module: an external executable together with the immutable
/// table of actions its metadata declared.
///
/// The table is built once by the loader and never mutated, so a single
/// `ExternalModule` serves lookups and dispatches from many tasks at once
/// without locking.
#[derive(Debug)]
pub struct ExternalModule {
    name: String,
    path: PathBuf,
    actions: BTreeMap<String, Action>,
}

impl ExternalModule {
    pub(crate) fn new(name: String, path: PathBuf, actions: BTreeMap<String, Action>) -> Self {
        ExternalModule {
            name,
            path,
            actions,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declared action names, in stable order.
    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// Pure lookup; side-effect-free and never fails.
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Execute `name` synchronously, blocking the calling task for the full
    /// lifetime of the module process.
    ///
    /// An unknown action fails with [`AgentError::Module`] before any
    /// validation happens or process is spawned.
    pub async fn execute_action(
        &self,
        name: &str,
        request: &ActionRequest,
    ) -> Result<Outcome, AgentError> {
        let action = self.action(name)?;
        executor::execute_blocking(action, &self.path, name, request).await
    }

    /// Dispatch `name` without waiting for the module process. Returns as
    /// soon as the request is validated and its `running` record exists;
    /// completion is reported through the returned handle and the spool.
    pub async fn dispatch_action(
        &self,
        name: &str,
        request: &ActionRequest,
        spool: &StatusSpool,
    ) -> Result<ActionHandle, AgentError> {
        let action = self.action(name)?;
        executor::execute_detached(action, &self.path, name, request, spool).await
    }

    fn action(&self, name: &str) -> Result<&Action, AgentError> {
        self.actions.get(name).ok_or_else(|| {
            AgentError::Module(format!("module '{}' has no action '{name}'", self.name))
        })
    }
}
