//! Platform icon applier contract and the unsupported-host adapter.

use std::{future::Future, pin::Pin};

use thiserror::Error;

use crate::{catalog::IconIdentifier, platform::IconPlatform};

/// Object-safe boxed future used by [`PlatformIconApplier`] async methods.
pub type ApplierFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// OS-level failures while applying or reading the launcher icon.
pub enum ApplyError {
    /// The device cannot present alternate icons.
    #[error("this device does not support alternate icons")]
    UnsupportedDevice,
    /// The OS version or host has no alternate-icon facility at all.
    #[error("dynamic app icons are not supported on this platform")]
    UnsupportedPlatform,
    /// The catalog entry has no identifier for this platform.
    #[error("icon `{0}` has no alias on this platform")]
    MissingAlias(String),
    /// The OS rejected the change.
    #[error("icon change rejected: {0}")]
    Rejected(String),
    /// Reading the active icon from the OS failed.
    #[error("failed to read active icon: {0}")]
    Query(String),
}

/// Applies and reads the launcher icon through OS primitives.
///
/// Appliers never persist state. [`PlatformIconApplier::query_active`] always re-derives the
/// answer from the OS instead of trusting a cached value.
pub trait PlatformIconApplier {
    /// Returns the platform backing this applier.
    fn platform(&self) -> IconPlatform;

    /// Makes `target` the visible launcher icon, resolving once the OS has completed the change.
    fn apply<'a>(&'a self, target: &'a IconIdentifier)
        -> ApplierFuture<'a, Result<(), ApplyError>>;

    /// Reads the icon the OS currently presents.
    fn query_active<'a>(&'a self) -> ApplierFuture<'a, Result<IconIdentifier, ApplyError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Applier for hosts without an alternate-icon facility.
///
/// Every change fails with [`ApplyError::UnsupportedPlatform`]; the default icon is always
/// reported as active.
pub struct NoopIconApplier;

impl PlatformIconApplier for NoopIconApplier {
    fn platform(&self) -> IconPlatform {
        IconPlatform::Unsupported
    }

    fn apply<'a>(
        &'a self,
        _target: &'a IconIdentifier,
    ) -> ApplierFuture<'a, Result<(), ApplyError>> {
        Box::pin(async { Err(ApplyError::UnsupportedPlatform) })
    }

    fn query_active<'a>(&'a self) -> ApplierFuture<'a, Result<IconIdentifier, ApplyError>> {
        Box::pin(async { Ok(IconIdentifier::default_icon()) })
    }
}
