//! Platform biometric prompt contract
//!
//! The platform prompt is started once per listen cycle with a [`PromptHandle`].
//! Whatever thread the platform reports on, the handle only posts events into
//! the helper's UI channel; the helper reacts when the UI thread drains it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cipher::CryptoObject;
use crate::helper::UiEvent;

/// Identifier of one listen cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ListenId(u64);

impl ListenId {
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ListenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listen-{}", self.0)
    }
}

/// Platform error codes reported with a terminal prompt error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    HwUnavailable,
    UnableToProcess,
    Timeout,
    NoSpace,
    Canceled,
    Lockout,
    Vendor,
    LockoutPermanent,
    UserCanceled,
    NoBiometrics,
    HwNotPresent,
    NegativeButton,
    NoDeviceCredential,
    Other(i32),
}

impl ErrorCode {
    /// Numeric platform code
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::HwUnavailable => 1,
            ErrorCode::UnableToProcess => 2,
            ErrorCode::Timeout => 3,
            ErrorCode::NoSpace => 4,
            ErrorCode::Canceled => 5,
            ErrorCode::Lockout => 7,
            ErrorCode::Vendor => 8,
            ErrorCode::LockoutPermanent => 9,
            ErrorCode::UserCanceled => 10,
            ErrorCode::NoBiometrics => 11,
            ErrorCode::HwNotPresent => 12,
            ErrorCode::NegativeButton => 13,
            ErrorCode::NoDeviceCredential => 14,
            ErrorCode::Other(code) => code,
        }
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        match code {
            1 => ErrorCode::HwUnavailable,
            2 => ErrorCode::UnableToProcess,
            3 => ErrorCode::Timeout,
            4 => ErrorCode::NoSpace,
            5 => ErrorCode::Canceled,
            7 => ErrorCode::Lockout,
            8 => ErrorCode::Vendor,
            9 => ErrorCode::LockoutPermanent,
            10 => ErrorCode::UserCanceled,
            11 => ErrorCode::NoBiometrics,
            12 => ErrorCode::HwNotPresent,
            13 => ErrorCode::NegativeButton,
            14 => ErrorCode::NoDeviceCredential,
            other => ErrorCode::Other(other),
        }
    }
}

/// Outcome of a successful match
#[derive(Debug)]
pub struct AuthenticationResult {
    /// The crypto object, authorized for one operation
    pub crypto_object: Option<CryptoObject>,
}

/// Callback the platform prompt reports through
#[derive(Debug)]
pub enum AuthEvent {
    /// Terminal error; the listen is over
    Error { code: ErrorCode, message: String },
    /// One attempt did not match; the listen continues
    Failed,
    /// Match accepted; the listen is over
    Succeeded(AuthenticationResult),
}

/// Texts shown by the platform prompt dialog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptInfo {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub negative_button_text: String,
    /// Require an explicit confirm tap after a passive match
    #[serde(default)]
    pub confirmation_required: bool,
}

impl Default for PromptInfo {
    fn default() -> Self {
        Self {
            title: "Sign in".to_string(),
            subtitle: "Confirm fingerprint to continue".to_string(),
            description: "Touch the fingerprint sensor".to_string(),
            negative_button_text: "Use PIN".to_string(),
            confirmation_required: false,
        }
    }
}

/// Per-listen handle given to the platform prompt
#[derive(Clone)]
pub struct PromptHandle {
    listen: ListenId,
    token: CancellationToken,
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl PromptHandle {
    pub(crate) fn new(
        listen: ListenId,
        token: CancellationToken,
        tx: mpsc::UnboundedSender<UiEvent>,
    ) -> Self {
        Self { listen, token, tx }
    }

    /// Listen cycle this handle belongs to
    pub fn listen_id(&self) -> ListenId {
        self.listen
    }

    /// Token cancelled when the helper stops this listen
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Whether the helper cancelled this listen
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Report a terminal error
    pub fn error(&self, code: ErrorCode, message: impl Into<String>) {
        self.post(AuthEvent::Error {
            code,
            message: message.into(),
        });
    }

    /// Report a non-matching attempt
    pub fn failed(&self) {
        self.post(AuthEvent::Failed);
    }

    /// Report a match, authorizing `crypto_object` for one operation
    pub fn succeeded(&self, crypto_object: Option<CryptoObject>) {
        let crypto_object = crypto_object.map(|mut crypto| {
            crypto.authorize();
            crypto
        });
        self.post(AuthEvent::Succeeded(AuthenticationResult { crypto_object }));
    }

    fn post(&self, event: AuthEvent) {
        if self
            .tx
            .send(UiEvent::Prompt {
                listen: self.listen,
                event,
            })
            .is_err()
        {
            debug!("Prompt event for {} dropped, helper gone", self.listen);
        }
    }
}

impl fmt::Debug for PromptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptHandle")
            .field("listen", &self.listen)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Platform biometric prompt
pub trait BiometricPrompt {
    /// Show the prompt for one listen, reporting through `handle`
    ///
    /// Implementations may spawn tokio tasks; the helper always calls this
    /// from within a runtime.
    fn authenticate(&mut self, info: &PromptInfo, crypto: CryptoObject, handle: PromptHandle);
}

struct PromptSession {
    info: PromptInfo,
    crypto: Option<CryptoObject>,
    handle: PromptHandle,
    /// Cancelled once the session reported a match or a terminal error
    finished: CancellationToken,
}

impl PromptSession {
    fn is_live(&self) -> bool {
        !self.handle.is_cancelled() && !self.finished.is_cancelled()
    }
}

/// Prompt driven by hand
///
/// Records every started listen so a host without biometric hardware, or a
/// test, decides when the user matches, fails or errors. Like a platform
/// prompt, it reports [`ErrorCode::Canceled`] asynchronously once a listen's
/// token is cancelled. A listen ended by [`succeed`](Self::succeed) or
/// [`error`](Self::error) stops watching its token.
#[derive(Clone, Default)]
pub struct ManualPrompt {
    sessions: Rc<RefCell<Vec<PromptSession>>>,
}

impl ManualPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of listens started so far
    pub fn started(&self) -> usize {
        self.sessions.borrow().len()
    }

    /// Listens that are neither cancelled nor finished
    pub fn live_tokens(&self) -> usize {
        self.sessions.borrow().iter().filter(|s| s.is_live()).count()
    }

    /// Handle of the most recent listen
    pub fn last_handle(&self) -> Option<PromptHandle> {
        self.sessions.borrow().last().map(|s| s.handle.clone())
    }

    /// Dialog texts of the most recent listen
    pub fn last_info(&self) -> Option<PromptInfo> {
        self.sessions.borrow().last().map(|s| s.info.clone())
    }

    /// Report a match on the most recent listen
    pub fn succeed(&self) -> bool {
        let mut sessions = self.sessions.borrow_mut();
        match sessions.last_mut() {
            Some(session) => {
                session.handle.succeeded(session.crypto.take());
                session.finished.cancel();
                true
            }
            None => false,
        }
    }

    /// Report a non-matching attempt on the most recent listen
    pub fn fail(&self) -> bool {
        match self.last_handle() {
            Some(handle) => {
                handle.failed();
                true
            }
            None => false,
        }
    }

    /// Report a terminal error on the most recent listen
    pub fn error(&self, code: ErrorCode, message: &str) -> bool {
        let sessions = self.sessions.borrow();
        match sessions.last() {
            Some(session) => {
                session.handle.error(code, message);
                session.finished.cancel();
                true
            }
            None => false,
        }
    }
}

impl BiometricPrompt for ManualPrompt {
    fn authenticate(&mut self, info: &PromptInfo, crypto: CryptoObject, handle: PromptHandle) {
        debug!("Prompt shown for {}", handle.listen_id());

        let finished = CancellationToken::new();
        let watcher = handle.clone();
        let done = finished.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = watcher.token().cancelled() => {
                    watcher.error(ErrorCode::Canceled, "Fingerprint operation canceled.");
                }
                _ = done.cancelled() => {}
            }
        });

        self.sessions.borrow_mut().push(PromptSession {
            info: info.clone(),
            crypto: Some(crypto),
            handle,
            finished,
        });
    }
}
