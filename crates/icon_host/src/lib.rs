//! Typed host-domain contracts for switching the launcher icon at runtime.
//!
//! This crate is the API-first boundary between the icon-switch coordinator and the OS. It
//! exposes the icon catalog, the persisted intent model, the synchronous [`DurableIntentStore`]
//! contract, and the async [`PlatformIconApplier`] contract. Concrete platform appliers live in
//! `icon_host_android` and `icon_host_ios`; the file-backed store lives in `icon_store_native`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod applier;
pub mod catalog;
pub mod intent;
pub mod platform;
pub mod storage;

pub use applier::{ApplierFuture, ApplyError, NoopIconApplier, PlatformIconApplier};
pub use catalog::{
    CatalogError, IconCatalog, IconCatalogBuilder, IconEntry, IconIdentifier, DEFAULT_ICON_ID,
};
pub use intent::{IntentRecord, SwitchIntent, ERROR_COUNT_KEY, PENDING_ICON_KEY};
pub use platform::IconPlatform;
pub use storage::intent_store::{
    DurableIntentStore, MemoryIntentStore, NoopIntentStore, StoreError,
};
