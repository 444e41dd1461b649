//! Request/apply/reconcile state machine.

use std::{cell::Cell, rc::Rc};

use futures::lock::Mutex;
use icon_host::{
    DurableIntentStore, IconCatalog, IconIdentifier, PlatformIconApplier, SwitchIntent,
};
use tracing::{debug, error, info, warn};

use crate::{
    adapters::IconApplierAdapter,
    config::{ApplyMode, LifecycleEvent, SwitchConfig},
    error::{ConfigError, SwitchError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Coordinator lifecycle state.
pub enum SwitchState {
    /// No request or reconciliation in flight.
    Idle,
    /// An intent was recorded and awaits application.
    PendingApply,
    /// The platform applier is running.
    Applying,
    /// A leftover intent is being re-applied.
    Reconciling,
}

impl SwitchState {
    /// Returns a stable lowercase identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PendingApply => "pending_apply",
            Self::Applying => "applying",
            Self::Reconciling => "reconciling",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Successful result of [`SwitchCoordinator::request_change`].
pub enum SwitchOutcome {
    /// The OS now presents the icon.
    Applied(IconIdentifier),
    /// The intent is recorded and will be applied at the next lifecycle checkpoint.
    Deferred(IconIdentifier),
}

impl SwitchOutcome {
    /// Returns the requested icon.
    pub fn icon(&self) -> &IconIdentifier {
        match self {
            Self::Applied(icon) | Self::Deferred(icon) => icon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Diagnostic result of a reconciliation pass. Never surfaced to a UI as an error.
pub enum ReconcileOutcome {
    /// No intent was left over.
    NothingPending,
    /// The leftover intent was applied and cleared.
    Applied(IconIdentifier),
    /// The attempt failed; the intent stays recorded for the next checkpoint.
    Failed(SwitchError),
    /// The failure budget is latched; no OS call was made.
    BudgetExhausted {
        /// Recorded consecutive failures.
        failures: u32,
    },
    /// The leftover intent named an icon the catalog no longer has and was dropped.
    Abandoned(String),
}

/// Returns the coordinator to [`SwitchState::Idle`] when an operation ends or its future is
/// dropped mid-apply. Must be bound after the lock guard.
struct IdleOnDrop<'a>(&'a SwitchCoordinator);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.enter(SwitchState::Idle);
    }
}

/// Serializes icon changes, owns the pending intent and the failure budget.
///
/// Every mutating operation holds one async lock for its whole duration, including the awaited
/// OS call, so a request and a reconciliation never interleave on the same component set.
/// [`SwitchCoordinator::get_current_icon`] bypasses the lock and reads the OS directly.
pub struct SwitchCoordinator {
    catalog: IconCatalog,
    store: Rc<dyn DurableIntentStore>,
    applier: Rc<dyn PlatformIconApplier>,
    config: SwitchConfig,
    gate: Mutex<()>,
    state: Cell<SwitchState>,
}

impl SwitchCoordinator {
    /// Creates a coordinator.
    ///
    /// # Errors
    ///
    /// Returns an error when `config` is unusable.
    pub fn new(
        catalog: IconCatalog,
        store: Rc<dyn DurableIntentStore>,
        applier: Rc<dyn PlatformIconApplier>,
        config: SwitchConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            catalog,
            store,
            applier,
            config,
            gate: Mutex::new(()),
            state: Cell::new(SwitchState::Idle),
        })
    }

    /// Creates a coordinator with the platform defaults of `applier`.
    ///
    /// An Android adapter yields [`ApplyMode::Deferred`]: `request_change` only records the
    /// intent and the OS sees it at the next configured [`LifecycleEvent`]. Hosts that want the
    /// change applied within the request call [`SwitchCoordinator::new`] with
    /// [`SwitchConfig::default`] or a config built by [`SwitchConfig::with_apply_mode`].
    pub fn for_host(
        catalog: IconCatalog,
        store: Rc<dyn DurableIntentStore>,
        applier: IconApplierAdapter,
    ) -> Self {
        let config = SwitchConfig::for_platform(applier.platform());
        Self {
            catalog,
            store,
            applier: Rc::new(applier),
            config,
            gate: Mutex::new(()),
            state: Cell::new(SwitchState::Idle),
        }
    }

    /// Returns the icon catalog.
    pub fn catalog(&self) -> &IconCatalog {
        &self.catalog
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &SwitchConfig {
        &self.config
    }

    /// Returns the current state.
    pub fn state(&self) -> SwitchState {
        self.state.get()
    }

    fn enter(&self, next: SwitchState) {
        let prev = self.state.replace(next);
        if prev != next {
            debug!(from = prev.as_str(), to = next.as_str(), "icon switch state");
        }
    }

    /// Validates `raw_name`, records it as the pending intent, and applies it.
    ///
    /// In [`ApplyMode::Deferred`] the call returns after recording; the next configured
    /// lifecycle event applies it.
    ///
    /// # Errors
    ///
    /// Validation and budget errors leave the store untouched. A store failure leaves the budget
    /// unchanged. An apply failure counts against the budget and keeps the intent recorded.
    pub async fn request_change(&self, raw_name: &str) -> Result<SwitchOutcome, SwitchError> {
        if raw_name.trim().is_empty() {
            return Err(SwitchError::InvalidArgument);
        }
        let target = self.catalog.resolve(raw_name)?;

        let _guard = self.gate.lock().await;
        let _idle = IdleOnDrop(self);
        self.request_locked(target).await
    }

    async fn request_locked(&self, target: IconIdentifier) -> Result<SwitchOutcome, SwitchError> {
        let failures = self.store.failure_count()?;
        self.ensure_budget(failures)?;

        let previous = self.store.read_pending()?;
        let intent = SwitchIntent::new(target.clone());
        self.store.record_pending(&intent).map_err(|err| {
            error!(icon = %target, error = %err, "failed to record icon change intent");
            SwitchError::PersistenceFailed(err)
        })?;
        self.enter(SwitchState::PendingApply);

        let is_new_intent = previous.map_or(true, |prev| prev.requested_icon != target);
        let failures = if is_new_intent && failures > 0 {
            debug!(icon = %target, failures, "new intent resets failure budget");
            self.store.set_failure_count(0)?;
            0
        } else {
            failures
        };

        if self.config.apply_mode == ApplyMode::Deferred {
            info!(icon = %target, "icon change deferred to next lifecycle checkpoint");
            return Ok(SwitchOutcome::Deferred(target));
        }

        self.apply_recorded(&target, failures).await?;
        Ok(SwitchOutcome::Applied(target))
    }

    fn ensure_budget(&self, failures: u32) -> Result<(), SwitchError> {
        let max = self.config.max_consecutive_failures;
        if failures >= max {
            warn!(failures, max, "icon change rejected: failure budget exhausted");
            return Err(SwitchError::MaxRetry { failures, max });
        }
        Ok(())
    }

    async fn apply_recorded(
        &self,
        target: &IconIdentifier,
        failures: u32,
    ) -> Result<(), SwitchError> {
        self.enter(SwitchState::Applying);
        match self.applier.apply(target).await {
            Ok(()) => {
                // A failed clear must not leave the budget stale; attempt both writes.
                let reset = if failures > 0 {
                    self.store.set_failure_count(0)
                } else {
                    Ok(())
                };
                if let Err(err) = &reset {
                    error!(icon = %target, error = %err, "failed to reset failure budget");
                }
                let cleared = self.store.clear_pending();
                if let Err(err) = &cleared {
                    error!(icon = %target, error = %err, "failed to clear applied intent");
                }
                reset.and(cleared)?;
                info!(icon = %target, platform = %self.applier.platform(), "icon applied");
                Ok(())
            }
            Err(err) => {
                let failures = failures.saturating_add(1);
                warn!(icon = %target, failures, error = %err, "icon apply failed");
                if let Err(store_err) = self.store.set_failure_count(failures) {
                    error!(error = %store_err, "failed to record icon apply failure");
                }
                Err(SwitchError::Apply(err))
            }
        }
    }

    /// Re-applies a leftover intent. Failures are logged and reported as an outcome, never
    /// returned as errors.
    pub async fn reconcile(&self) -> ReconcileOutcome {
        let _guard = self.gate.lock().await;
        let _idle = IdleOnDrop(self);
        self.enter(SwitchState::Reconciling);
        match self.reconcile_locked().await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "icon reconciliation failed");
                ReconcileOutcome::Failed(err)
            }
        }
    }

    async fn reconcile_locked(&self) -> Result<ReconcileOutcome, SwitchError> {
        let Some(intent) = self.store.read_pending()? else {
            debug!("no pending icon intent to reconcile");
            return Ok(ReconcileOutcome::NothingPending);
        };
        let target = intent.requested_icon;
        if !self.catalog.contains(&target) {
            warn!(icon = %target, "abandoning intent for icon missing from catalog");
            self.store.clear_pending()?;
            return Ok(ReconcileOutcome::Abandoned(target.to_string()));
        }

        let failures = self.store.failure_count()?;
        if failures >= self.config.max_consecutive_failures {
            warn!(icon = %target, failures, "skipping reconciliation: failure budget exhausted");
            return Ok(ReconcileOutcome::BudgetExhausted { failures });
        }

        info!(icon = %target, "reconciling pending icon intent");
        self.apply_recorded(&target, failures).await?;
        Ok(ReconcileOutcome::Applied(target))
    }

    /// Reconciles when `event` is configured as a checkpoint; returns `None` otherwise.
    pub async fn on_lifecycle(&self, event: LifecycleEvent) -> Option<ReconcileOutcome> {
        if !self.config.reconciles_on(event) {
            debug!(event = event.as_str(), "lifecycle event ignored");
            return None;
        }
        debug!(event = event.as_str(), "lifecycle checkpoint");
        Some(self.reconcile().await)
    }

    /// Reads the icon the OS currently presents.
    ///
    /// # Errors
    ///
    /// Returns [`SwitchError::Query`] when the OS cannot report it.
    pub async fn get_current_icon(&self) -> Result<IconIdentifier, SwitchError> {
        self.applier.query_active().await.map_err(SwitchError::Query)
    }

    /// Drops the pending intent without applying it and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be read or written.
    pub async fn abandon_pending(&self) -> Result<Option<SwitchIntent>, SwitchError> {
        let _guard = self.gate.lock().await;
        let pending = self.store.read_pending()?;
        if let Some(intent) = &pending {
            self.store.clear_pending()?;
            info!(icon = %intent.requested_icon, "pending icon intent abandoned");
        }
        Ok(pending)
    }

    /// Reopens a latched failure budget.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be written.
    pub async fn reset_failure_budget(&self) -> Result<(), SwitchError> {
        let _guard = self.gate.lock().await;
        self.store.set_failure_count(0)?;
        info!("icon failure budget reset");
        Ok(())
    }

    /// Returns the durable pending intent.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be read.
    pub fn pending_intent(&self) -> Result<Option<SwitchIntent>, SwitchError> {
        Ok(self.store.read_pending()?)
    }

    /// Returns the durable consecutive-failure count.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be read.
    pub fn failure_count(&self) -> Result<u32, SwitchError> {
        Ok(self.store.failure_count()?)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures::executor::block_on;
    use icon_host::{ApplierFuture, ApplyError, IconPlatform, MemoryIntentStore};
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    struct ScriptedApplier {
        active: RefCell<Option<IconIdentifier>>,
        fail_next: Cell<u32>,
        calls: Cell<u32>,
    }

    impl PlatformIconApplier for ScriptedApplier {
        fn platform(&self) -> IconPlatform {
            IconPlatform::Ios
        }

        fn apply<'a>(
            &'a self,
            target: &'a IconIdentifier,
        ) -> ApplierFuture<'a, Result<(), ApplyError>> {
            Box::pin(async move {
                self.calls.set(self.calls.get() + 1);
                if self.fail_next.get() > 0 {
                    self.fail_next.set(self.fail_next.get() - 1);
                    return Err(ApplyError::Rejected("scripted".to_string()));
                }
                *self.active.borrow_mut() = Some(target.clone());
                Ok(())
            })
        }

        fn query_active<'a>(&'a self) -> ApplierFuture<'a, Result<IconIdentifier, ApplyError>> {
            Box::pin(async move {
                Ok(self
                    .active
                    .borrow()
                    .clone()
                    .unwrap_or_else(IconIdentifier::default_icon))
            })
        }
    }

    fn catalog() -> IconCatalog {
        IconCatalog::builder(".MainActivity")
            .variant("red", ".Red", "Red")
            .variant("purple", ".Purple", "Purple")
            .build()
            .expect("catalog")
    }

    fn coordinator(
        config: SwitchConfig,
    ) -> (SwitchCoordinator, MemoryIntentStore, Rc<ScriptedApplier>) {
        let store = MemoryIntentStore::default();
        let applier = Rc::new(ScriptedApplier::default());
        let coordinator = SwitchCoordinator::new(
            catalog(),
            Rc::new(store.clone()),
            applier.clone(),
            config,
        )
        .expect("coordinator");
        (coordinator, store, applier)
    }

    fn id(name: &str) -> IconIdentifier {
        IconIdentifier::new(name).expect("id")
    }

    #[test]
    fn successful_request_clears_intent() {
        let (coordinator, store, _) = coordinator(SwitchConfig::default());
        let outcome = block_on(coordinator.request_change("Red")).expect("request");
        assert_eq!(outcome, SwitchOutcome::Applied(id("red")));
        assert_eq!(store.snapshot().pending_icon, None);
        assert_eq!(coordinator.state(), SwitchState::Idle);
        assert_eq!(block_on(coordinator.get_current_icon()), Ok(id("red")));
    }

    #[test]
    fn blank_name_is_an_invalid_argument() {
        let (coordinator, store, _) = coordinator(SwitchConfig::default());
        assert_eq!(
            block_on(coordinator.request_change("  ")),
            Err(SwitchError::InvalidArgument)
        );
        assert_eq!(store.read_count(), 0);
    }

    #[test]
    fn failure_keeps_intent_and_counts_against_budget() {
        let (coordinator, store, applier) = coordinator(SwitchConfig::default());
        applier.fail_next.set(1);

        let err = block_on(coordinator.request_change("purple")).expect_err("fails");
        assert_eq!(err, SwitchError::Apply(ApplyError::Rejected("scripted".to_string())));
        assert_eq!(store.snapshot().pending_icon.as_deref(), Some("purple"));
        assert_eq!(coordinator.failure_count(), Ok(1));

        assert_eq!(
            block_on(coordinator.reconcile()),
            ReconcileOutcome::Applied(id("purple"))
        );
        assert_eq!(coordinator.failure_count(), Ok(0));
        assert_eq!(coordinator.pending_intent(), Ok(None));
    }

    #[test]
    fn distinct_intent_resets_budget_before_apply() {
        let (coordinator, _, applier) = coordinator(SwitchConfig::default());
        applier.fail_next.set(3);
        block_on(coordinator.request_change("red")).expect_err("first");
        block_on(coordinator.request_change("red")).expect_err("second");
        assert_eq!(coordinator.failure_count(), Ok(2));

        block_on(coordinator.request_change("purple")).expect_err("third");
        assert_eq!(coordinator.failure_count(), Ok(1));
    }

    #[test]
    fn deferred_mode_records_without_applying() {
        let (coordinator, store, applier) =
            coordinator(SwitchConfig::default().with_apply_mode(ApplyMode::Deferred));
        assert_eq!(
            block_on(coordinator.request_change("red")),
            Ok(SwitchOutcome::Deferred(id("red")))
        );
        assert_eq!(applier.calls.get(), 0);
        assert_eq!(store.snapshot().pending_icon.as_deref(), Some("red"));

        assert_eq!(
            block_on(coordinator.on_lifecycle(LifecycleEvent::Teardown)),
            Some(ReconcileOutcome::Applied(id("red")))
        );
        assert_eq!(applier.calls.get(), 1);
    }

    #[test]
    fn unconfigured_lifecycle_events_are_ignored() {
        let mut config = SwitchConfig::default();
        config.reconcile_on = vec![LifecycleEvent::Resume];
        let (coordinator, _, _) = coordinator(config);
        assert_eq!(
            block_on(coordinator.on_lifecycle(LifecycleEvent::TaskRemoved)),
            None
        );
        assert_eq!(
            block_on(coordinator.on_lifecycle(LifecycleEvent::Resume)),
            Some(ReconcileOutcome::NothingPending)
        );
    }

    #[test]
    fn reconcile_abandons_icons_missing_from_catalog() {
        let store = MemoryIntentStore::with_record(icon_host::IntentRecord {
            pending_icon: Some("blue".to_string()),
            pending_created_at_unix_ms: Some(1),
            error_count: 0,
        });
        let applier = Rc::new(ScriptedApplier::default());
        let coordinator = SwitchCoordinator::new(
            catalog(),
            Rc::new(store.clone()),
            applier.clone(),
            SwitchConfig::default(),
        )
        .expect("coordinator");

        assert_eq!(
            block_on(coordinator.reconcile()),
            ReconcileOutcome::Abandoned("blue".to_string())
        );
        assert_eq!(store.snapshot().pending_icon, None);
        assert_eq!(applier.calls.get(), 0);
    }

    #[test]
    fn reconcile_respects_latched_budget() {
        let (coordinator, store, applier) =
            coordinator(SwitchConfig::default().with_max_consecutive_failures(1));
        applier.fail_next.set(1);
        block_on(coordinator.request_change("red")).expect_err("fails");

        assert_eq!(
            block_on(coordinator.reconcile()),
            ReconcileOutcome::BudgetExhausted { failures: 1 }
        );
        assert_eq!(applier.calls.get(), 1);
        assert_eq!(store.snapshot().pending_icon.as_deref(), Some("red"));
    }

    #[test]
    fn abandon_pending_returns_and_clears_intent() {
        let (coordinator, _, applier) =
            coordinator(SwitchConfig::default().with_apply_mode(ApplyMode::Deferred));
        block_on(coordinator.request_change("purple")).expect("deferred");

        let abandoned = block_on(coordinator.abandon_pending()).expect("abandon");
        assert_eq!(abandoned.map(|intent| intent.requested_icon), Some(id("purple")));
        assert_eq!(block_on(coordinator.abandon_pending()), Ok(None));
        assert_eq!(
            block_on(coordinator.reconcile()),
            ReconcileOutcome::NothingPending
        );
        assert_eq!(applier.calls.get(), 0);
    }

    #[test]
    fn zero_budget_config_is_rejected() {
        let result = SwitchCoordinator::new(
            catalog(),
            Rc::new(MemoryIntentStore::default()),
            Rc::new(ScriptedApplier::default()),
            SwitchConfig::default().with_max_consecutive_failures(0),
        );
        assert!(matches!(result, Err(ConfigError::ZeroFailureBudget)));
    }
}
