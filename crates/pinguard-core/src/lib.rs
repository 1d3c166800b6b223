//! PinGuard Core - screen lifecycle guarding for lock-screen enforcement
//!
//! This crate provides:
//! - A listener registry owned by the application root
//! - A process-local signal bus carrying the lock-cancelled topic
//! - A per-screen lifecycle guard forwarding resume/pause/interaction events
//! - Two screen adapters that attach a guard at creation
//!
//! Everything here runs on the UI thread; the types are `!Send`.

pub mod config;
pub mod error;
pub mod guard;
pub mod registry;
pub mod screen;
pub mod signal;

pub use config::GuardConfig;
pub use error::{GuardError, Result};
pub use guard::{GuardContext, LifecycleEvent, LifecycleGuard};
pub use registry::{LifecycleListener, ListenerRegistry};
pub use screen::{
    AdapterKind, PinCompatScreen, PinProtected, PinProtectedFragmentScreen, Screen, ScreenId,
};
pub use signal::{SignalBus, Subscription, SubscriptionId, LOCK_CANCELLED};
