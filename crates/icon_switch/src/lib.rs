//! Icon-switch coordinator: request, validate, persist intent, apply, reconcile.
//!
//! [`SwitchCoordinator`] owns the pending intent and the failure budget. It validates names
//! against the [`icon_host::IconCatalog`], records intent through a
//! [`icon_host::DurableIntentStore`] before touching the OS, applies through a
//! [`icon_host::PlatformIconApplier`], and re-applies a leftover intent when the host reports a
//! lifecycle checkpoint. The [`command`] module exposes the same operations as a JSON
//! method-call surface for host UI bridges.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod adapters;
pub mod command;
mod config;
mod coordinator;
mod error;

pub use adapters::IconApplierAdapter;
pub use command::{dispatch, CommandResponse, MethodCall};
pub use config::{ApplyMode, LifecycleEvent, SwitchConfig, DEFAULT_MAX_CONSECUTIVE_FAILURES};
pub use coordinator::{ReconcileOutcome, SwitchCoordinator, SwitchOutcome, SwitchState};
pub use error::{ConfigError, ErrorCode, SwitchError};
