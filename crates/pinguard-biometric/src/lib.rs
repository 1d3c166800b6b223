//! PinGuard Biometric - fingerprint unlock for the lock flow
//!
//! This crate provides:
//! - A secure key store contract and a software-backed store
//! - A cipher handle that a successful match authorizes for one operation
//! - The platform prompt contract plus a manually driven prompt
//! - The fingerprint helper state machine and its feedback view contract
//!
//! The helper lives on the UI thread. Platform callbacks and timers reach it
//! only as [`UiEvent`]s drained with [`FingerprintUiHelper::pump`] or
//! [`FingerprintUiHelper::run_until_idle`].
//!
//! # Runtime
//!
//! Timers and the [`ManualPrompt`] cancellation watcher are tokio tasks.
//! [`FingerprintUiHelper::start_listening`], the authentication callbacks and
//! [`Scheduler::schedule`] panic when called outside a tokio runtime.

pub mod capability;
pub mod cipher;
pub mod config;
pub mod error;
pub mod feedback;
pub mod helper;
pub mod keystore;
pub mod prompt;
pub mod scheduler;

pub use capability::{BiometricCapability, CapabilityStatus, StaticCapability};
pub use cipher::CryptoObject;
pub use config::{BiometricConfig, BIOMETRIC_CONFIG_FILE, DEFAULT_KEY_ALIAS};
pub use error::{
    AvailabilityError, BiometricError, CipherError, KeyGenerationError, KeyStoreError, Result,
};
pub use feedback::{
    Feedback, FeedbackIcon, FeedbackStrings, FeedbackTone, FeedbackView, RecordingView,
};
pub use helper::{AuthCallback, AuthState, FingerprintUiHelper, UiEvent};
pub use keystore::{
    KeyGenerator, KeySpec, KeyStoreProvider, SecretKey, SecureKeyStore, SoftwareKeyStore, KEY_SIZE,
};
pub use prompt::{
    AuthEvent, AuthenticationResult, BiometricPrompt, ErrorCode, ListenId, ManualPrompt,
    PromptHandle, PromptInfo,
};
pub use scheduler::{ScheduledTask, Scheduler};
