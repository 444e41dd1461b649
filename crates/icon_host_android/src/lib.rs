//! Android launcher-icon applier built on activity-alias components.
//!
//! Each catalog icon is one `<activity-alias>` (the default icon is the main activity). The
//! applier toggles them through a [`ComponentRegistry`], the package-manager seam that the JNI
//! host implements; [`MemoryComponentRegistry`] simulates it for tests and previews.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod applier;
mod component;

pub use applier::AndroidIconApplier;
pub use component::{ComponentName, ComponentRegistry, ComponentState, MemoryComponentRegistry};
