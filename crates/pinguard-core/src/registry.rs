//! App-wide listener registry
//!
//! Owned by the application root and handed to every guard. Holds at most one
//! [`LifecycleListener`], normally the lock coordinator that decides when the
//! lock screen must be shown.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::screen::Screen;

/// Receiver of screen lifecycle transitions
pub trait LifecycleListener {
    /// A screen came to the foreground
    fn on_activity_resumed(&self, screen: &dyn Screen);

    /// A screen went to the background
    fn on_activity_paused(&self, screen: &dyn Screen);

    /// The user touched or typed on a screen
    fn on_activity_user_interaction(&self, screen: &dyn Screen);
}

/// Registry holding zero or one listener
///
/// Clones share the same slot. Not synchronized: all calls happen on the UI
/// thread.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    slot: Rc<RefCell<Option<Rc<dyn LifecycleListener>>>>,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current listener
    ///
    /// The previous listener is dropped outside the borrow, so its `Drop` may
    /// use the registry.
    pub fn set_listener(&self, listener: Rc<dyn LifecycleListener>) {
        self.clear_listeners();
        *self.slot.borrow_mut() = Some(listener);
        debug!("Lifecycle listener registered");
    }

    /// Remove the current listener
    pub fn clear_listeners(&self) {
        let previous = self.slot.borrow_mut().take();
        drop(previous);
        debug!("Lifecycle listener cleared");
    }

    /// Whether a listener is registered
    pub fn has_listeners(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// The current listener, if any
    ///
    /// The borrow is released before returning so the listener may itself
    /// replace or clear the registry.
    pub fn listener(&self) -> Option<Rc<dyn LifecycleListener>> {
        self.slot.borrow().clone()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("has_listener", &self.has_listeners())
            .finish()
    }
}
