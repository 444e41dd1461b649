//! Platform selection shared by applier composition and coordinator defaults.

/// Host platform whose icon facility backs the active [`crate::PlatformIconApplier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconPlatform {
    /// Activity-alias components toggled through the package manager.
    Android,
    /// Alternate-icon names set through the application object.
    Ios,
    /// Host without any alternate-icon facility.
    Unsupported,
}

impl IconPlatform {
    /// Returns a stable string token for diagnostics and logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Unsupported => "unsupported",
        }
    }

    /// Returns whether the host only reliably permits component mutation at a later lifecycle
    /// checkpoint (teardown/task removal) rather than at request time.
    pub const fn defers_apply(self) -> bool {
        matches!(self, Self::Android)
    }
}

impl std::fmt::Display for IconPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
