//! Coordinator configuration supplied by the host.

use icon_host::IconPlatform;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Consecutive apply failures tolerated before requests are rejected.
pub const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// When an accepted request reaches the platform applier.
pub enum ApplyMode {
    /// Apply within the same `request_change` call.
    #[default]
    Immediate,
    /// Record the intent and apply at the next configured lifecycle checkpoint.
    Deferred,
}

impl ApplyMode {
    /// Returns a stable lowercase identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Deferred => "deferred",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Process lifecycle signals delivered by the host.
pub enum LifecycleEvent {
    /// The process returned to the foreground.
    Resume,
    /// The main entry point is being destroyed.
    Teardown,
    /// The user removed the task from the recents list.
    TaskRemoved,
}

impl LifecycleEvent {
    /// Every lifecycle signal, in delivery order.
    pub const ALL: [Self; 3] = [Self::Resume, Self::Teardown, Self::TaskRemoved];

    /// Returns a stable camelCase identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::Teardown => "teardown",
            Self::TaskRemoved => "taskRemoved",
        }
    }
}

fn default_max_consecutive_failures() -> u32 {
    DEFAULT_MAX_CONSECUTIVE_FAILURES
}

fn default_reconcile_on() -> Vec<LifecycleEvent> {
    LifecycleEvent::ALL.to_vec()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Failure budget, apply timing, and reconciliation triggers for a [`crate::SwitchCoordinator`].
pub struct SwitchConfig {
    /// Consecutive apply failures after which requests fail with `MAX_RETRY`.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
    /// Whether requests apply immediately or at the next lifecycle checkpoint.
    #[serde(default)]
    pub apply_mode: ApplyMode,
    /// Lifecycle events that trigger reconciliation.
    #[serde(default = "default_reconcile_on")]
    pub reconcile_on: Vec<LifecycleEvent>,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            apply_mode: ApplyMode::Immediate,
            reconcile_on: default_reconcile_on(),
        }
    }
}

impl SwitchConfig {
    /// Returns defaults for `platform`. Android hosts defer application to teardown.
    pub fn for_platform(platform: IconPlatform) -> Self {
        let apply_mode = if platform.defers_apply() {
            ApplyMode::Deferred
        } else {
            ApplyMode::Immediate
        };
        Self {
            apply_mode,
            ..Self::default()
        }
    }

    /// Parses host-supplied JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload is malformed or the failure budget is zero.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can be used by a coordinator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroFailureBudget`] when no attempt would ever be allowed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_consecutive_failures == 0 {
            return Err(ConfigError::ZeroFailureBudget);
        }
        Ok(())
    }

    /// Returns a copy using `apply_mode`.
    pub fn with_apply_mode(mut self, apply_mode: ApplyMode) -> Self {
        self.apply_mode = apply_mode;
        self
    }

    /// Returns a copy allowing `max` consecutive failures.
    pub fn with_max_consecutive_failures(mut self, max: u32) -> Self {
        self.max_consecutive_failures = max;
        self
    }

    /// Returns whether `event` triggers reconciliation.
    pub fn reconciles_on(&self, event: LifecycleEvent) -> bool {
        self.reconcile_on.contains(&event)
    }
}
