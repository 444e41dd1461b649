//! Coordinator error taxonomy and the stable codes reported to host callers.

use icon_host::{ApplyError, CatalogError, StoreError};
use thiserror::Error;

/// Stable error code reported across the host bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The icon name was missing or blank.
    InvalidArgument,
    /// The icon name is not in the catalog.
    InvalidIcon,
    /// The failure budget is exhausted.
    MaxRetry,
    /// The intent store could not be read or written.
    SaveError,
    /// The OS rejected the change.
    IconChangeFailed,
    /// The device cannot present alternate icons.
    UnsupportedDevice,
    /// The platform or OS version has no alternate-icon facility.
    UnsupportedPlatform,
    /// The active icon could not be read.
    GetIconError,
    /// The bridge method is unknown.
    NotImplemented,
}

impl ErrorCode {
    /// Returns the wire token for this code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidIcon => "INVALID_ICON",
            Self::MaxRetry => "MAX_RETRY",
            Self::SaveError => "SAVE_ERROR",
            Self::IconChangeFailed => "ICON_CHANGE_FAILED",
            Self::UnsupportedDevice => "UNSUPPORTED_DEVICE",
            Self::UnsupportedPlatform => "UNSUPPORTED_PLATFORM",
            Self::GetIconError => "GET_ICON_ERROR",
            Self::NotImplemented => "NOT_IMPLEMENTED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors returned by [`crate::SwitchCoordinator`] operations.
pub enum SwitchError {
    /// The icon name was missing or blank.
    #[error("icon name is required")]
    InvalidArgument,
    /// The icon name is not in the catalog.
    #[error("invalid icon name: {0}")]
    InvalidIcon(String),
    /// The failure budget latched after repeated apply failures.
    #[error("maximum retry count reached ({failures}/{max} consecutive failures)")]
    MaxRetry {
        /// Recorded consecutive failures.
        failures: u32,
        /// Configured maximum.
        max: u32,
    },
    /// The intent store failed; the request was not carried out.
    #[error("icon change request could not be saved: {0}")]
    PersistenceFailed(#[from] StoreError),
    /// The OS failed to apply the icon.
    #[error(transparent)]
    Apply(ApplyError),
    /// The OS failed to report the active icon.
    #[error("could not read the current icon: {0}")]
    Query(ApplyError),
}

impl SwitchError {
    /// Returns the stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument => ErrorCode::InvalidArgument,
            Self::InvalidIcon(_) => ErrorCode::InvalidIcon,
            Self::MaxRetry { .. } => ErrorCode::MaxRetry,
            Self::PersistenceFailed(_) => ErrorCode::SaveError,
            Self::Apply(ApplyError::UnsupportedDevice)
            | Self::Query(ApplyError::UnsupportedDevice) => ErrorCode::UnsupportedDevice,
            Self::Apply(ApplyError::UnsupportedPlatform)
            | Self::Query(ApplyError::UnsupportedPlatform) => ErrorCode::UnsupportedPlatform,
            Self::Apply(_) => ErrorCode::IconChangeFailed,
            Self::Query(_) => ErrorCode::GetIconError,
        }
    }

    /// Returns whether a later reconciliation may still succeed for the same intent.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Apply(_))
    }
}

impl From<CatalogError> for SwitchError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::EmptyName => Self::InvalidArgument,
            other => Self::InvalidIcon(other.to_string()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors while loading [`crate::SwitchConfig`].
pub enum ConfigError {
    /// The JSON payload could not be parsed.
    #[error("invalid switch config: {0}")]
    Parse(String),
    /// The failure budget must allow at least one attempt.
    #[error("maxConsecutiveFailures must be at least 1")]
    ZeroFailureBudget,
}
