//! Alternate-icon applier.

use std::rc::Rc;

use futures::channel::oneshot;
use icon_host::{
    ApplierFuture, ApplyError, IconCatalog, IconIdentifier, IconPlatform, PlatformIconApplier,
};
use tracing::{debug, info, warn};

use crate::controller::AlternateIconController;

#[derive(Clone)]
/// Applies icons with a single awaited alternate-icon call.
///
/// The default icon maps to "no alternate icon". Requests for the icon already presented
/// short-circuit without calling the OS.
pub struct IosIconApplier {
    catalog: IconCatalog,
    controller: Rc<dyn AlternateIconController>,
}

impl IosIconApplier {
    /// Creates an applier over `controller`.
    pub fn new(catalog: IconCatalog, controller: Rc<dyn AlternateIconController>) -> Self {
        Self {
            catalog,
            controller,
        }
    }

    fn ensure_available(&self) -> Result<(), ApplyError> {
        if self.controller.api_available() {
            Ok(())
        } else {
            Err(ApplyError::UnsupportedPlatform)
        }
    }

    fn alternate_name_for<'a>(
        &'a self,
        target: &IconIdentifier,
    ) -> Result<Option<&'a str>, ApplyError> {
        let entry = self
            .catalog
            .entry(target)
            .ok_or_else(|| ApplyError::MissingAlias(target.to_string()))?;
        if entry.id.is_default() {
            return Ok(None);
        }
        entry
            .ios_name()
            .map(Some)
            .ok_or_else(|| ApplyError::MissingAlias(target.to_string()))
    }

    async fn apply_async(&self, target: &IconIdentifier) -> Result<(), ApplyError> {
        self.ensure_available()?;
        if !self.controller.supports_alternate_icons() {
            return Err(ApplyError::UnsupportedDevice);
        }
        let desired = self.alternate_name_for(target)?;
        if self.controller.alternate_icon_name().as_deref() == desired {
            debug!(icon = %target, "alternate icon already active");
            return Ok(());
        }

        let (tx, rx) = oneshot::channel();
        debug!(icon = %target, alternate = ?desired, "setting alternate icon");
        self.controller.set_alternate_icon_name(
            desired,
            Box::new(move |outcome| {
                let _ = tx.send(outcome);
            }),
        );

        match rx.await {
            Ok(Ok(())) => {
                info!(icon = %target, "alternate icon set");
                Ok(())
            }
            Ok(Err(message)) => {
                warn!(icon = %target, error = %message, "alternate icon change failed");
                Err(ApplyError::Rejected(message))
            }
            Err(oneshot::Canceled) => Err(ApplyError::Rejected(
                "completion handler dropped without a result".to_string(),
            )),
        }
    }

    fn query_now(&self) -> Result<IconIdentifier, ApplyError> {
        self.ensure_available()?;
        match self.controller.alternate_icon_name() {
            None => Ok(self.catalog.default_icon().clone()),
            Some(name) => self
                .catalog
                .find_by_ios_name(&name)
                .cloned()
                .ok_or_else(|| ApplyError::Query(format!("unknown alternate icon `{name}`"))),
        }
    }
}

impl PlatformIconApplier for IosIconApplier {
    fn platform(&self) -> IconPlatform {
        IconPlatform::Ios
    }

    fn apply<'a>(
        &'a self,
        target: &'a IconIdentifier,
    ) -> ApplierFuture<'a, Result<(), ApplyError>> {
        Box::pin(self.apply_async(target))
    }

    fn query_active<'a>(&'a self) -> ApplierFuture<'a, Result<IconIdentifier, ApplyError>> {
        Box::pin(async move { self.query_now() })
    }
}
