//! Context lifecycle.
//!
//! A context moves `Created -> Running -> Unloading -> Unloaded`. Teardown
//! hooks registered while it runs are executed in reverse registration order
//! when it unloads.

use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info};

/// Context state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ContextState {
    /// Constructed, mailbox not yet pumping.
    Created = 0,
    /// Receiving and handling frames.
    Running = 1,
    /// Teardown hooks are running.
    Unloading = 2,
    /// Torn down; the address no longer receives frames.
    Unloaded = 3,
}

impl From<u8> for ContextState {
    fn from(v: u8) -> Self {
        match v {
            1 => ContextState::Running,
            2 => ContextState::Unloading,
            3 => ContextState::Unloaded,
            _ => ContextState::Created,
        }
    }
}

type TeardownHook = Box<dyn FnOnce() + Send>;

/// Lifecycle of one context.
pub struct Lifecycle {
    name: String,
    state: AtomicU8,
    hooks: Mutex<Vec<(String, TeardownHook)>>,
}

impl Lifecycle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: AtomicU8::new(ContextState::Created as u8),
            hooks: Mutex::new(Vec::new()),
        }
    }

    pub fn state(&self) -> ContextState {
        ContextState::from(self.state.load(Ordering::SeqCst))
    }

    pub fn is_running(&self) -> bool {
        self.state() == ContextState::Running
    }

    /// Transition `Created -> Running`.
    pub fn mark_running(&self) -> bool {
        self.state
            .compare_exchange(
                ContextState::Created as u8,
                ContextState::Running as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Register a hook to run at teardown.
    ///
    /// If the context is already unloading the hook runs immediately.
    pub fn on_teardown(&self, label: impl Into<String>, hook: impl FnOnce() + Send + 'static) {
        let label = label.into();
        if matches!(self.state(), ContextState::Unloading | ContextState::Unloaded) {
            debug!("{}: running late teardown hook '{}'", self.name, label);
            hook();
            return;
        }
        self.hooks.lock().push((label, Box::new(hook)));
    }

    /// Run teardown hooks in reverse order.
    ///
    /// Returns the number of hooks run, or `None` if teardown already happened.
    pub fn teardown(&self) -> Option<usize> {
        let previous = self.state.swap(ContextState::Unloading as u8, Ordering::SeqCst);
        if matches!(
            ContextState::from(previous),
            ContextState::Unloading | ContextState::Unloaded
        ) {
            self.state.store(previous, Ordering::SeqCst);
            return None;
        }

        let hooks: Vec<_> = self.hooks.lock().drain(..).collect();
        let count = hooks.len();
        for (label, hook) in hooks.into_iter().rev() {
            debug!("{}: teardown '{}'", self.name, label);
            hook();
        }

        self.state.store(ContextState::Unloaded as u8, Ordering::SeqCst);
        info!("{} unloaded ({} teardown hook(s))", self.name, count);
        Some(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_state_transitions() {
        let lifecycle = Lifecycle::new("mediator#1");
        assert_eq!(lifecycle.state(), ContextState::Created);
        assert!(lifecycle.mark_running());
        assert!(!lifecycle.mark_running());
        assert!(lifecycle.is_running());
        assert_eq!(lifecycle.teardown(), Some(0));
        assert_eq!(lifecycle.state(), ContextState::Unloaded);
    }

    #[test]
    fn test_hooks_run_in_reverse() {
        let lifecycle = Lifecycle::new("test");
        lifecycle.mark_running();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = order.clone();
            lifecycle.on_teardown(format!("hook-{}", i), move || order.lock().push(i));
        }

        assert_eq!(lifecycle.teardown(), Some(3));
        assert_eq!(*order.lock(), vec![2, 1, 0]);
    }

    #[test]
    fn test_teardown_once() {
        let lifecycle = Lifecycle::new("test");
        lifecycle.mark_running();
        assert!(lifecycle.teardown().is_some());
        assert!(lifecycle.teardown().is_none());
        assert_eq!(lifecycle.state(), ContextState::Unloaded);
    }

    #[test]
    fn test_late_hook_runs_immediately() {
        let lifecycle = Lifecycle::new("test");
        lifecycle.teardown();
        let ran = Arc::new(Mutex::new(false));
        let flag = ran.clone();
        lifecycle.on_teardown("late", move || *flag.lock() = true);
        assert!(*ran.lock());
    }

    #[test]
    fn test_state_from_u8() {
        assert_eq!(ContextState::from(0), ContextState::Created);
        assert_eq!(ContextState::from(2), ContextState::Unloading);
        assert_eq!(ContextState::from(99), ContextState::Created);
    }
}
