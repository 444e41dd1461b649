//! Package-manager component model and the in-memory registry.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Fully qualified activity or activity-alias component.
pub struct ComponentName {
    /// Application package name.
    pub package: String,
    /// Fully qualified class name.
    pub class_name: String,
}

impl ComponentName {
    /// Builds a component using the manifest naming rule: names starting with `.` or containing
    /// no `.` are relative to `package`, anything else is already fully qualified.
    pub fn for_alias(package: &str, alias: &str) -> Self {
        let alias = alias.trim();
        let class_name = if let Some(relative) = alias.strip_prefix('.') {
            format!("{package}.{relative}")
        } else if alias.contains('.') {
            alias.to_string()
        } else {
            format!("{package}.{alias}")
        };
        Self {
            package: package.to_string(),
            class_name,
        }
    }

    /// Returns the class name after the last `.`.
    pub fn short_name(&self) -> &str {
        self.class_name
            .rsplit_once('.')
            .map_or(self.class_name.as_str(), |(_, short)| short)
    }
}

impl std::fmt::Display for ComponentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.package, self.class_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Enabled setting of a component as reported by the package manager.
pub enum ComponentState {
    /// Never overridden; the manifest value applies.
    #[default]
    Default,
    /// Explicitly enabled.
    Enabled,
    /// Explicitly disabled.
    Disabled,
}

impl ComponentState {
    /// Resolves the effective enabled flag given the manifest default.
    pub const fn is_enabled(self, manifest_enabled: bool) -> bool {
        match self {
            Self::Default => manifest_enabled,
            Self::Enabled => true,
            Self::Disabled => false,
        }
    }

    /// Returns a stable token for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

/// Package-manager operations used to toggle launcher components.
///
/// Mutations are applied with "don't kill app" semantics. Each call may fail independently.
pub trait ComponentRegistry {
    /// Sets the enabled state of one component.
    ///
    /// # Errors
    ///
    /// Returns the OS error message when the package manager rejects the change.
    fn set_component_enabled(
        &self,
        component: &ComponentName,
        state: ComponentState,
    ) -> Result<(), String>;

    /// Reads the enabled state of one component.
    ///
    /// # Errors
    ///
    /// Returns the OS error message when the component cannot be inspected.
    fn component_enabled(&self, component: &ComponentName) -> Result<ComponentState, String>;
}

#[derive(Debug, Default)]
struct RegistryState {
    states: BTreeMap<ComponentName, ComponentState>,
    rejected: BTreeSet<String>,
    reject_reads: bool,
    mutations: usize,
}

#[derive(Debug, Clone, Default)]
/// In-memory package-manager simulator keyed by component.
///
/// Clones share state. Mutations of components registered with
/// [`MemoryComponentRegistry::reject_component`] fail without changing state.
pub struct MemoryComponentRegistry {
    inner: Rc<RefCell<RegistryState>>,
}

impl MemoryComponentRegistry {
    /// Makes every mutation of the component with `class_name` fail.
    pub fn reject_component(&self, class_name: impl Into<String>) {
        self.inner.borrow_mut().rejected.insert(class_name.into());
    }

    /// Lets mutations of `class_name` succeed again.
    pub fn allow_component(&self, class_name: &str) {
        self.inner.borrow_mut().rejected.remove(class_name);
    }

    /// Makes every read fail (or succeed again).
    pub fn set_reject_reads(&self, reject: bool) {
        self.inner.borrow_mut().reject_reads = reject;
    }

    /// Overrides a component state directly, bypassing rejection rules.
    pub fn force_state(&self, component: &ComponentName, state: ComponentState) {
        self.inner
            .borrow_mut()
            .states
            .insert(component.clone(), state);
    }

    /// Returns the stored state of a component.
    pub fn state_of(&self, component: &ComponentName) -> ComponentState {
        self.inner
            .borrow()
            .states
            .get(component)
            .copied()
            .unwrap_or_default()
    }

    /// Returns the number of mutation calls, including rejected ones.
    pub fn mutation_count(&self) -> usize {
        self.inner.borrow().mutations
    }
}

impl ComponentRegistry for MemoryComponentRegistry {
    fn set_component_enabled(
        &self,
        component: &ComponentName,
        state: ComponentState,
    ) -> Result<(), String> {
        let mut inner = self.inner.borrow_mut();
        inner.mutations += 1;
        if inner.rejected.contains(&component.class_name) {
            return Err(format!(
                "component {component} rejected setting {}",
                state.as_str()
            ));
        }
        inner.states.insert(component.clone(), state);
        Ok(())
    }

    fn component_enabled(&self, component: &ComponentName) -> Result<ComponentState, String> {
        let inner = self.inner.borrow();
        if inner.reject_reads {
            return Err(format!("component {component} is not readable"));
        }
        Ok(inner.states.get(component).copied().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const PACKAGE: &str = "com.example.magic_app_icon";

    #[test]
    fn for_alias_applies_manifest_naming_rule() {
        assert_eq!(
            ComponentName::for_alias(PACKAGE, ".Red").class_name,
            "com.example.magic_app_icon.Red"
        );
        assert_eq!(
            ComponentName::for_alias(PACKAGE, "MainActivity").class_name,
            "com.example.magic_app_icon.MainActivity"
        );
        assert_eq!(
            ComponentName::for_alias(PACKAGE, "org.other.Launcher").class_name,
            "org.other.Launcher"
        );
        assert_eq!(ComponentName::for_alias(PACKAGE, ".Purple").short_name(), "Purple");
    }

    #[test]
    fn default_state_resolves_to_manifest_value() {
        assert!(ComponentState::Default.is_enabled(true));
        assert!(!ComponentState::Default.is_enabled(false));
        assert!(ComponentState::Enabled.is_enabled(false));
        assert!(!ComponentState::Disabled.is_enabled(true));
    }

    #[test]
    fn memory_registry_records_states_and_rejections() {
        let registry = MemoryComponentRegistry::default();
        let red = ComponentName::for_alias(PACKAGE, ".Red");
        let registry_obj: &dyn ComponentRegistry = &registry;

        assert_eq!(
            registry_obj.component_enabled(&red).expect("read"),
            ComponentState::Default
        );
        registry_obj
            .set_component_enabled(&red, ComponentState::Enabled)
            .expect("enable");
        assert_eq!(registry.state_of(&red), ComponentState::Enabled);

        registry.reject_component(red.class_name.clone());
        let err = registry_obj
            .set_component_enabled(&red, ComponentState::Disabled)
            .expect_err("rejected");
        assert!(err.contains("rejected"));
        assert_eq!(registry.state_of(&red), ComponentState::Enabled);
        assert_eq!(registry.mutation_count(), 2);

        registry.set_reject_reads(true);
        assert!(registry_obj.component_enabled(&red).is_err());
    }
}
