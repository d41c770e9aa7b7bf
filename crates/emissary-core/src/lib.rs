//! `emissary-core` — the action-execution core of the emissary remote agent.
//!
//! An emissary agent receives task requests over a messaging channel (out of
//! scope here), looks each request up in a set of externally-implemented
//! modules, validates it against the action's declared contract, runs the
//! module as a subprocess, and reports a structured outcome.
//!
//! # Architecture
//!
//! ```text
//! AgentConfig
//!     │
//!     ▼
//! ModuleRegistry  ← scans modules_dir at start-up, one metadata query each
//!     │
//!     ▼
//! ExternalModule  ← immutable name → Action table
//!     │
//!     ├─ execute_action   blocking: validate → spawn → interpret → Outcome
//!     └─ dispatch_action  non-blocking: validate → running record →
//!                         detached task → terminal record + completion
//!                              │
//!                              ▼
//!                         StatusSpool  ← one atomic record per request id
//! ```
//!
//! Two ordering guarantees hold in both modes: input is validated before any
//! process is spawned, and nothing is reported as success unless the module
//! exited 0 with parseable, schema-conforming output.

pub mod action;
pub mod config;
pub mod error;
pub mod executor;
pub mod loader;
pub mod module;
pub mod paths;
pub mod registry;
pub mod request;
pub mod schema;
pub mod spool;

mod io;
mod process;

pub use action::Action;
pub use config::AgentConfig;
pub use error::{AgentError, ConfigError, Result, SpoolError};
pub use executor::{ActionHandle, Outcome};
pub use module::ExternalModule;
pub use registry::ModuleRegistry;
pub use request::{ActionRequest, RequestPayload};
pub use schema::Schema;
pub use spool::{StatusRecord, StatusSpool};
