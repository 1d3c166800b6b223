//! Per-screen lifecycle guard
//!
//! A [`LifecycleGuard`] is attached to every protected screen. It forwards
//! resume, pause and user-interaction transitions to the registered
//! [`LifecycleListener`](crate::LifecycleListener) and, while created, listens
//! for the lock-cancelled signal. When that signal fires the guard finishes its
//! own screen no matter which screen raised it, so backing out of the lock flow
//! tears down every screen waiting behind it.

use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::config::GuardConfig;
use crate::registry::{LifecycleListener, ListenerRegistry};
use crate::screen::{Screen, ScreenId};
use crate::signal::{SignalBus, Subscription, LOCK_CANCELLED};

/// Lifecycle transitions a host can feed into a guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Created,
    Resumed,
    Paused,
    UserInteraction,
    Destroyed,
}

/// Collaborators shared by every guard in the application
///
/// Built once at the application root and handed to each screen adapter.
#[derive(Clone, Debug)]
pub struct GuardContext {
    /// Listener registry
    pub registry: ListenerRegistry,
    /// Signal bus carrying the cancel topic
    pub bus: SignalBus,
    /// Topic that ends attached screens
    pub cancel_topic: String,
}

impl Default for GuardContext {
    fn default() -> Self {
        Self::new(ListenerRegistry::new(), SignalBus::new())
    }
}

impl GuardContext {
    /// Context listening on [`LOCK_CANCELLED`]
    pub fn new(registry: ListenerRegistry, bus: SignalBus) -> Self {
        Self {
            registry,
            bus,
            cancel_topic: LOCK_CANCELLED.to_string(),
        }
    }

    /// Context using the topic from `config`
    pub fn from_config(config: &GuardConfig, registry: ListenerRegistry, bus: SignalBus) -> Self {
        Self {
            registry,
            bus,
            cancel_topic: config.cancel_topic.clone(),
        }
    }

    /// Publish the cancel topic, returning how many screens were notified
    pub fn cancel_lock_flow(&self) -> usize {
        self.bus.publish(&self.cancel_topic)
    }
}

/// Lifecycle observer bound to a single screen
pub struct LifecycleGuard {
    screen: Weak<dyn Screen>,
    screen_id: ScreenId,
    context: GuardContext,
    subscription: Option<Subscription>,
}

impl LifecycleGuard {
    /// Bind a guard to `screen` without subscribing yet
    pub fn attach(screen: &Rc<dyn Screen>, context: GuardContext) -> Self {
        Self {
            screen: Rc::downgrade(screen),
            screen_id: screen.id(),
            context,
            subscription: None,
        }
    }

    /// Id of the guarded screen
    pub fn screen_id(&self) -> ScreenId {
        self.screen_id
    }

    /// Whether the cancel subscription is live
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Feed a lifecycle transition
    pub fn dispatch(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Created => self.on_create(),
            LifecycleEvent::Resumed => self.on_resume(),
            LifecycleEvent::Paused => self.on_pause(),
            LifecycleEvent::UserInteraction => self.on_user_interaction(),
            LifecycleEvent::Destroyed => self.on_destroy(),
        }
    }

    /// Subscribe to the cancel topic
    pub fn on_create(&mut self) {
        if self.subscription.is_some() {
            warn!("Guard for screen {} already subscribed", self.screen_id);
            return;
        }

        let screen = self.screen.clone();
        let screen_id = self.screen_id;
        let subscription = self.context.bus.subscribe(&self.context.cancel_topic, move || {
            match screen.upgrade() {
                Some(screen) => {
                    debug!("Lock flow cancelled, finishing screen {}", screen_id);
                    screen.finish();
                }
                None => debug!("Lock flow cancelled, screen {} already gone", screen_id),
            }
        });
        self.subscription = Some(subscription);
    }

    /// Forward a resume to the listener
    pub fn on_resume(&self) {
        self.notify(|listener, screen| listener.on_activity_resumed(screen));
    }

    /// Forward a user interaction to the listener
    pub fn on_user_interaction(&self) {
        self.notify(|listener, screen| listener.on_activity_user_interaction(screen));
    }

    /// Forward a pause to the listener
    pub fn on_pause(&self) {
        self.notify(|listener, screen| listener.on_activity_paused(screen));
    }

    /// Drop the cancel subscription
    ///
    /// Safe to call without a prior [`on_create`](Self::on_create) and more
    /// than once.
    pub fn on_destroy(&mut self) {
        match self.subscription.take() {
            Some(subscription) => {
                self.context.bus.unsubscribe(subscription);
            }
            None => debug!("Guard for screen {} was not subscribed", self.screen_id),
        }
    }

    fn notify<F>(&self, f: F)
    where
        F: FnOnce(&dyn LifecycleListener, &dyn Screen),
    {
        let Some(listener) = self.context.registry.listener() else {
            return;
        };
        match self.screen.upgrade() {
            Some(screen) => f(listener.as_ref(), screen.as_ref()),
            None => debug!("Screen {} dropped before lifecycle event", self.screen_id),
        }
    }
}

impl Drop for LifecycleGuard {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.context.bus.unsubscribe(subscription);
        }
    }
}

impl fmt::Debug for LifecycleGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleGuard")
            .field("screen_id", &self.screen_id)
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}
