//! Shared fixtures for the PinGuard end-to-end tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pinguard_biometric::AuthCallback;
use pinguard_core::{LifecycleListener, Screen, ScreenId};

/// Screen that records whether it was finished
pub struct TestScreen {
    id: ScreenId,
    finished: Cell<bool>,
}

impl TestScreen {
    pub fn new(id: u64) -> Rc<Self> {
        Rc::new(Self {
            id: ScreenId::new(id),
            finished: Cell::new(false),
        })
    }

    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }
}

impl Screen for TestScreen {
    fn id(&self) -> ScreenId {
        self.id
    }

    fn finish(&self) {
        self.finished.set(true);
    }
}

/// Lock coordinator: asks for the lock screen when a screen resumes while locked
#[derive(Default)]
pub struct LockCoordinator {
    locked: Cell<bool>,
    lock_requests: RefCell<Vec<ScreenId>>,
    interactions: Cell<u32>,
}

impl LockCoordinator {
    pub fn new(locked: bool) -> Rc<Self> {
        let coordinator = Self::default();
        coordinator.locked.set(locked);
        Rc::new(coordinator)
    }

    pub fn unlock(&self) {
        self.locked.set(false);
    }

    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    pub fn lock_requests(&self) -> Vec<ScreenId> {
        self.lock_requests.borrow().clone()
    }

    pub fn interactions(&self) -> u32 {
        self.interactions.get()
    }
}

impl LifecycleListener for LockCoordinator {
    fn on_activity_resumed(&self, screen: &dyn Screen) {
        if self.locked.get() {
            self.lock_requests.borrow_mut().push(screen.id());
        }
    }

    fn on_activity_paused(&self, _screen: &dyn Screen) {
        self.locked.set(true);
    }

    fn on_activity_user_interaction(&self, _screen: &dyn Screen) {
        self.interactions.set(self.interactions.get() + 1);
    }
}

/// Outcome of the fingerprint prompt, shared with the test body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Authenticated,
    Error,
}

/// Callback recording outcomes into a shared log
#[derive(Clone, Default)]
pub struct OutcomeLog {
    outcomes: Rc<RefCell<Vec<Outcome>>>,
}

impl OutcomeLog {
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.outcomes.borrow().clone()
    }
}

impl AuthCallback for OutcomeLog {
    fn on_authenticated(&mut self) {
        self.outcomes.borrow_mut().push(Outcome::Authenticated);
    }

    fn on_error(&mut self) {
        self.outcomes.borrow_mut().push(Outcome::Error);
    }
}

/// Route tracing output through the test harness; `RUST_LOG` picks the level
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
