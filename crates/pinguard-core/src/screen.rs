//! Screen contract and the two guard-attaching adapters
//!
//! Hosts embed one of the adapters and forward their own "created" and
//! "user interaction" callbacks to it. Nothing else is required of a screen
//! beyond [`Screen`].

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::guard::{GuardContext, LifecycleGuard};

/// Identifier of a host screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(u64);

impl ScreenId {
    /// Wrap a raw id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen-{}", self.0)
    }
}

/// A screen that can be protected by the lock flow
pub trait Screen {
    /// Stable id of this screen
    fn id(&self) -> ScreenId;

    /// End this screen's session
    fn finish(&self);
}

/// Flavor of adapter, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    Compat,
    Fragment,
}

/// Guard wiring shared by both adapters
pub struct GuardedScreen {
    screen: Rc<dyn Screen>,
    context: GuardContext,
    guard: Option<LifecycleGuard>,
}

impl GuardedScreen {
    fn new(screen: Rc<dyn Screen>, context: GuardContext) -> Self {
        Self {
            screen,
            context,
            guard: None,
        }
    }
}

/// Behavior common to guard-attaching screen adapters
pub trait PinProtected {
    /// Adapter flavor
    fn kind(&self) -> AdapterKind;

    #[doc(hidden)]
    fn guarded(&self) -> &GuardedScreen;

    #[doc(hidden)]
    fn guarded_mut(&mut self) -> &mut GuardedScreen;

    /// Attach a guard and subscribe it to the cancel topic
    fn on_create(&mut self) {
        let kind = self.kind();
        let inner = self.guarded_mut();
        if inner.guard.is_some() {
            debug!("{:?} adapter for {} already created", kind, inner.screen.id());
            return;
        }

        let mut guard = LifecycleGuard::attach(&inner.screen, inner.context.clone());
        guard.on_create();
        inner.guard = Some(guard);
    }

    /// Forward a user interaction to the guard
    fn on_user_interaction(&self) {
        if let Some(guard) = &self.guarded().guard {
            guard.on_user_interaction();
        }
    }

    /// Forward a resume to the guard
    fn on_resume(&self) {
        if let Some(guard) = &self.guarded().guard {
            guard.on_resume();
        }
    }

    /// Forward a pause to the guard
    fn on_pause(&self) {
        if let Some(guard) = &self.guarded().guard {
            guard.on_pause();
        }
    }

    /// Unsubscribe and release the guard
    fn on_destroy(&mut self) {
        if let Some(mut guard) = self.guarded_mut().guard.take() {
            guard.on_destroy();
        }
    }

    /// The attached guard, once created
    fn guard(&self) -> Option<&LifecycleGuard> {
        self.guarded().guard.as_ref()
    }

    /// The wrapped screen
    fn screen(&self) -> &Rc<dyn Screen> {
        &self.guarded().screen
    }
}

/// Adapter for general-purpose screens
pub struct PinCompatScreen {
    inner: GuardedScreen,
}

impl PinCompatScreen {
    /// Wrap `screen`; the guard is attached on [`PinProtected::on_create`]
    pub fn new(screen: Rc<dyn Screen>, context: GuardContext) -> Self {
        Self {
            inner: GuardedScreen::new(screen, context),
        }
    }
}

impl PinProtected for PinCompatScreen {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Compat
    }

    fn guarded(&self) -> &GuardedScreen {
        &self.inner
    }

    fn guarded_mut(&mut self) -> &mut GuardedScreen {
        &mut self.inner
    }
}

/// Adapter for screens that host nested fragments
pub struct PinProtectedFragmentScreen {
    inner: GuardedScreen,
}

impl PinProtectedFragmentScreen {
    /// Wrap `screen`; the guard is attached on [`PinProtected::on_create`]
    pub fn new(screen: Rc<dyn Screen>, context: GuardContext) -> Self {
        Self {
            inner: GuardedScreen::new(screen, context),
        }
    }
}

impl PinProtected for PinProtectedFragmentScreen {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Fragment
    }

    fn guarded(&self) -> &GuardedScreen {
        &self.inner
    }

    fn guarded_mut(&mut self) -> &mut GuardedScreen {
        &mut self.inner
    }
}
