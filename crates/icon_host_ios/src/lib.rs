//! iOS launcher-icon applier built on the alternate-icon API.
//!
//! The OS exposes one asynchronous "set alternate icon name" call that reports through a
//! completion handler. [`IosIconApplier`] turns that callback into a suspension point so the
//! coordinator resumes the same logical call once the OS answers.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod applier;
mod controller;

pub use applier::IosIconApplier;
pub use controller::{AlternateIconController, IconChangeCompletion, MemoryAlternateIconController};
