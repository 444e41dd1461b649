//! Composition-time selection of the platform icon applier.

use icon_host::{
    ApplierFuture, ApplyError, IconIdentifier, IconPlatform, NoopIconApplier, PlatformIconApplier,
};
use icon_host_android::AndroidIconApplier;
use icon_host_ios::IosIconApplier;

#[derive(Clone)]
/// Platform applier chosen by the host at startup.
pub enum IconApplierAdapter {
    /// Activity-alias sweep.
    Android(AndroidIconApplier),
    /// Single alternate-icon call.
    Ios(IosIconApplier),
    /// Host without an alternate-icon facility.
    Unsupported(NoopIconApplier),
}

impl IconApplierAdapter {
    fn inner(&self) -> &dyn PlatformIconApplier {
        match self {
            Self::Android(applier) => applier,
            Self::Ios(applier) => applier,
            Self::Unsupported(applier) => applier,
        }
    }
}

impl Default for IconApplierAdapter {
    fn default() -> Self {
        Self::Unsupported(NoopIconApplier)
    }
}

impl From<AndroidIconApplier> for IconApplierAdapter {
    fn from(applier: AndroidIconApplier) -> Self {
        Self::Android(applier)
    }
}

impl From<IosIconApplier> for IconApplierAdapter {
    fn from(applier: IosIconApplier) -> Self {
        Self::Ios(applier)
    }
}

impl PlatformIconApplier for IconApplierAdapter {
    fn platform(&self) -> IconPlatform {
        self.inner().platform()
    }

    fn apply<'a>(
        &'a self,
        target: &'a IconIdentifier,
    ) -> ApplierFuture<'a, Result<(), ApplyError>> {
        self.inner().apply(target)
    }

    fn query_active<'a>(&'a self) -> ApplierFuture<'a, Result<IconIdentifier, ApplyError>> {
        self.inner().query_active()
    }
}
