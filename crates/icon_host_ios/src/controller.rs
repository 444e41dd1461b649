//! Alternate-icon controller seam and the in-memory simulator.

use std::{cell::RefCell, rc::Rc};

/// Completion handler invoked by the OS once an alternate-icon change finishes.
pub type IconChangeCompletion = Box<dyn FnOnce(Result<(), String>)>;

/// Application-object operations used to present alternate icons.
pub trait AlternateIconController {
    /// Returns whether the OS version exposes the alternate-icon API at all.
    fn api_available(&self) -> bool {
        true
    }

    /// Returns whether this device can present alternate icons.
    fn supports_alternate_icons(&self) -> bool;

    /// Returns the active alternate icon name, `None` for the primary icon.
    fn alternate_icon_name(&self) -> Option<String>;

    /// Requests an icon change; `None` restores the primary icon. `completion` runs exactly once
    /// when the OS finishes, possibly after this call has returned.
    fn set_alternate_icon_name(&self, name: Option<&str>, completion: IconChangeCompletion);
}

struct PendingChange {
    name: Option<String>,
    completion: IconChangeCompletion,
}

struct ControllerState {
    api_available: bool,
    supports_alternate_icons: bool,
    current: Option<String>,
    failure: Option<String>,
    defer_completions: bool,
    pending: Vec<PendingChange>,
    set_calls: usize,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            api_available: true,
            supports_alternate_icons: true,
            current: None,
            failure: None,
            defer_completions: false,
            pending: Vec::new(),
            set_calls: 0,
        }
    }
}

#[derive(Clone, Default)]
/// In-memory alternate-icon simulator.
///
/// Completions run inline by default. With [`MemoryAlternateIconController::set_defer_completions`]
/// they queue until [`MemoryAlternateIconController::complete_pending`] is called, which models
/// the OS answering on a later run-loop turn.
pub struct MemoryAlternateIconController {
    inner: Rc<RefCell<ControllerState>>,
}

impl MemoryAlternateIconController {
    /// Simulates an OS version without the alternate-icon API.
    pub fn set_api_available(&self, available: bool) {
        self.inner.borrow_mut().api_available = available;
    }

    /// Simulates a device with or without alternate-icon support.
    pub fn set_supports_alternate_icons(&self, supported: bool) {
        self.inner.borrow_mut().supports_alternate_icons = supported;
    }

    /// Makes every subsequent change fail with `message`, or succeed again with `None`.
    pub fn set_failure(&self, message: Option<&str>) {
        self.inner.borrow_mut().failure = message.map(str::to_string);
    }

    /// Queues completions instead of running them inline.
    pub fn set_defer_completions(&self, defer: bool) {
        self.inner.borrow_mut().defer_completions = defer;
    }

    /// Overrides the active alternate icon name.
    pub fn force_current(&self, name: Option<&str>) {
        self.inner.borrow_mut().current = name.map(str::to_string);
    }

    /// Returns the number of change requests issued to the simulated OS.
    pub fn set_calls(&self) -> usize {
        self.inner.borrow().set_calls
    }

    /// Returns the number of queued completions.
    pub fn pending_completions(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Finishes every queued change in request order.
    pub fn complete_pending(&self) {
        let pending = std::mem::take(&mut self.inner.borrow_mut().pending);
        for change in pending {
            self.finish(change);
        }
    }

    fn finish(&self, change: PendingChange) {
        let outcome = {
            let mut state = self.inner.borrow_mut();
            match state.failure.clone() {
                Some(message) => Err(message),
                None => {
                    state.current = change.name;
                    Ok(())
                }
            }
        };
        (change.completion)(outcome);
    }
}

impl AlternateIconController for MemoryAlternateIconController {
    fn api_available(&self) -> bool {
        self.inner.borrow().api_available
    }

    fn supports_alternate_icons(&self) -> bool {
        self.inner.borrow().supports_alternate_icons
    }

    fn alternate_icon_name(&self) -> Option<String> {
        self.inner.borrow().current.clone()
    }

    fn set_alternate_icon_name(&self, name: Option<&str>, completion: IconChangeCompletion) {
        let change = PendingChange {
            name: name.map(str::to_string),
            completion,
        };
        let deferred = {
            let mut state = self.inner.borrow_mut();
            state.set_calls += 1;
            state.defer_completions
        };
        if deferred {
            self.inner.borrow_mut().pending.push(change);
        } else {
            self.finish(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<Result<(), String>>>>, impl Fn() -> IconChangeCompletion) {
        let results = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&results);
        let make = move || -> IconChangeCompletion {
            let sink = Rc::clone(&sink);
            Box::new(move |outcome| sink.borrow_mut().push(outcome))
        };
        (results, make)
    }

    #[test]
    fn inline_completion_updates_current_name() {
        let controller = MemoryAlternateIconController::default();
        let (results, completion) = recorder();

        controller.set_alternate_icon_name(Some("Red"), completion());
        assert_eq!(controller.alternate_icon_name(), Some("Red".to_string()));
        controller.set_alternate_icon_name(None, completion());
        assert_eq!(controller.alternate_icon_name(), None);
        assert_eq!(*results.borrow(), vec![Ok(()), Ok(())]);
        assert_eq!(controller.set_calls(), 2);
    }

    #[test]
    fn deferred_completion_waits_for_complete_pending() {
        let controller = MemoryAlternateIconController::default();
        controller.set_defer_completions(true);
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);

        controller.set_alternate_icon_name(Some("Purple"), Box::new(move |_| flag.set(true)));
        assert!(!fired.get());
        assert_eq!(controller.alternate_icon_name(), None);
        assert_eq!(controller.pending_completions(), 1);

        controller.complete_pending();
        assert!(fired.get());
        assert_eq!(controller.alternate_icon_name(), Some("Purple".to_string()));
    }

    #[test]
    fn failure_keeps_current_name() {
        let controller = MemoryAlternateIconController::default();
        controller.set_failure(Some("The operation was cancelled."));
        let (results, completion) = recorder();

        controller.set_alternate_icon_name(Some("Red"), completion());
        assert_eq!(controller.alternate_icon_name(), None);
        assert_eq!(
            *results.borrow(),
            vec![Err("The operation was cancelled.".to_string())]
        );
    }
}
