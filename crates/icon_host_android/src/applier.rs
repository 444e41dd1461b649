//! Activity-alias sweep applier.

use std::rc::Rc;

use icon_host::{
    ApplierFuture, ApplyError, IconCatalog, IconEntry, IconIdentifier, IconPlatform,
    PlatformIconApplier,
};
use tracing::{debug, info, warn};

use crate::component::{ComponentName, ComponentRegistry, ComponentState};

#[derive(Clone)]
/// Applies icons by disabling every other alias and enabling the target last.
///
/// Enabling last keeps the zero-enabled window to the duration of one call. A stale alias whose
/// disable call failed is tolerated: [`PlatformIconApplier::query_active`] scans the registry in
/// catalog order (default first) and reports the first enabled component.
pub struct AndroidIconApplier {
    package: String,
    catalog: IconCatalog,
    registry: Rc<dyn ComponentRegistry>,
}

impl AndroidIconApplier {
    /// Creates an applier for `package` over `registry`.
    pub fn new(
        package: impl Into<String>,
        catalog: IconCatalog,
        registry: Rc<dyn ComponentRegistry>,
    ) -> Self {
        Self {
            package: package.into(),
            catalog,
            registry,
        }
    }

    /// Returns the application package name.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Returns the component backing `id`, if it is in the catalog.
    pub fn component_for(&self, id: &IconIdentifier) -> Option<ComponentName> {
        self.catalog.entry(id).map(|entry| self.component(entry))
    }

    fn component(&self, entry: &IconEntry) -> ComponentName {
        ComponentName::for_alias(&self.package, &entry.android_component)
    }

    fn apply_now(&self, target: &IconIdentifier) -> Result<(), ApplyError> {
        let target_entry = self
            .catalog
            .entry(target)
            .ok_or_else(|| ApplyError::MissingAlias(target.to_string()))?;
        let target_component = self.component(target_entry);

        for entry in self.catalog.entries().iter().filter(|e| &e.id != target) {
            let component = self.component(entry);
            debug!(component = %component, "disabling icon alias");
            if let Err(err) = self
                .registry
                .set_component_enabled(&component, ComponentState::Disabled)
            {
                warn!(component = %component, error = %err, "icon alias disable failed");
            }
        }

        debug!(component = %target_component, "enabling icon alias");
        self.registry
            .set_component_enabled(&target_component, ComponentState::Enabled)
            .map_err(ApplyError::Rejected)?;
        info!(icon = %target, component = %target_component, "icon alias enabled");
        Ok(())
    }

    fn query_now(&self) -> Result<IconIdentifier, ApplyError> {
        for entry in self.catalog.entries() {
            let component = self.component(entry);
            let state = self
                .registry
                .component_enabled(&component)
                .map_err(ApplyError::Query)?;
            debug!(component = %component, state = state.as_str(), "checked icon alias");
            if state.is_enabled(entry.id.is_default()) {
                return Ok(entry.id.clone());
            }
        }
        debug!("no icon alias enabled; reporting default icon");
        Ok(self.catalog.default_icon().clone())
    }
}

impl PlatformIconApplier for AndroidIconApplier {
    fn platform(&self) -> IconPlatform {
        IconPlatform::Android
    }

    fn apply<'a>(
        &'a self,
        target: &'a IconIdentifier,
    ) -> ApplierFuture<'a, Result<(), ApplyError>> {
        Box::pin(async move { self.apply_now(target) })
    }

    fn query_active<'a>(&'a self) -> ApplierFuture<'a, Result<IconIdentifier, ApplyError>> {
        Box::pin(async move { self.query_now() })
    }
}
