//! Fingerprint helper: key lifecycle plus the prompt state machine
//!
//! ```text
//! Idle ──start──▶ Listening ──match──────▶ Succeeded ──delay──▶ Idle (on_authenticated)
//!                     │  ▲
//!                     │  └──reset── TransientFailure ◀──no match──┘
//!                     └──error──▶ TerminalError ──delay──▶ Idle (on_error)
//! ```
//!
//! All state lives in [`FingerprintUiHelper`]. The platform prompt and the
//! delay timers never touch it directly; they post [`UiEvent`]s that the UI
//! thread feeds back through [`FingerprintUiHelper::handle`].

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::capability::BiometricCapability;
use crate::cipher::CryptoObject;
use crate::config::BiometricConfig;
use crate::error::{BiometricError, Result};
use crate::feedback::{FeedbackIcon, FeedbackTone, FeedbackView};
use crate::keystore::{KeySpec, KeyStoreProvider, SecureKeyStore};
use crate::prompt::{
    AuthEvent, AuthenticationResult, BiometricPrompt, ErrorCode, ListenId, PromptHandle,
};
use crate::scheduler::{ScheduledTask, Scheduler};

/// Receiver of the final outcome, usually the screen hosting the prompt
pub trait AuthCallback {
    /// The user authenticated; fired after the success delay
    fn on_authenticated(&mut self);

    /// The prompt failed terminally; fired after the error timeout
    fn on_error(&mut self);
}

/// Helper state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Idle,
    Listening,
    Succeeded,
    TransientFailure,
    TerminalError,
}

/// Events drained on the UI thread
#[derive(Debug)]
pub enum UiEvent {
    /// Callback from the platform prompt for one listen
    Prompt { listen: ListenId, event: AuthEvent },
    /// Error display timed out; restore the hint
    ResetFeedback { seq: u64 },
    /// Deliver [`AuthCallback::on_error`]
    NotifyError,
    /// Deliver [`AuthCallback::on_authenticated`]
    NotifyAuthenticated,
}

/// Owns the biometric key and drives the platform prompt
pub struct FingerprintUiHelper<V, C> {
    config: BiometricConfig,
    provider: Box<dyn KeyStoreProvider>,
    capability: Box<dyn BiometricCapability>,
    prompt: Box<dyn BiometricPrompt>,
    view: V,
    callback: C,

    key_store: Option<Box<dyn SecureKeyStore>>,
    crypto: Option<CryptoObject>,
    authorized: Option<CryptoObject>,

    /// Present exactly while a listen is outstanding
    token: Option<CancellationToken>,
    self_cancelled: bool,
    listen_id: ListenId,
    state: AuthState,

    reset_task: Option<ScheduledTask>,
    reset_seq: u64,

    tx: mpsc::UnboundedSender<UiEvent>,
    rx: mpsc::UnboundedReceiver<UiEvent>,
    scheduler: Scheduler<UiEvent>,
}

impl<V: FeedbackView, C: AuthCallback> FingerprintUiHelper<V, C> {
    /// Create a helper; the key is created lazily on the first listen
    ///
    /// The helper itself can be built anywhere, but listening and every
    /// authentication callback schedule tokio timers, so those must run
    /// inside a tokio runtime (a current-thread runtime or `LocalSet` on the
    /// UI thread is enough).
    pub fn new(
        config: BiometricConfig,
        provider: impl KeyStoreProvider + 'static,
        capability: impl BiometricCapability + 'static,
        prompt: impl BiometricPrompt + 'static,
        view: V,
        callback: C,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx.clone());

        Self {
            config,
            provider: Box::new(provider),
            capability: Box::new(capability),
            prompt: Box::new(prompt),
            view,
            callback,
            key_store: None,
            crypto: None,
            authorized: None,
            token: None,
            self_cancelled: false,
            listen_id: ListenId::default(),
            state: AuthState::Idle,
            reset_task: None,
            reset_seq: 0,
            tx,
            rx,
            scheduler,
        }
    }

    /// Start a listen cycle
    ///
    /// Key store trouble aborts quietly: the prompt simply does not start.
    /// Key generation failures and refused capability checks are returned.
    pub fn start_listening(&mut self) -> Result<()> {
        if self.token.is_some() {
            debug!("Restarting while {} is outstanding", self.listen_id);
            self.stop_listening();
        }

        if !self.init_cipher()? {
            debug!("init_cipher() returned false, not listening");
            return Ok(());
        }
        if !self.is_fingerprint_auth_available()? {
            debug!("Fingerprint auth unavailable, not listening");
            return Ok(());
        }
        let Some(crypto) = self.crypto.take() else {
            return Ok(());
        };

        self.listen_id = self.listen_id.next();
        let token = CancellationToken::new();
        self.token = Some(token.clone());
        self.self_cancelled = false;

        let handle = PromptHandle::new(self.listen_id, token, self.tx.clone());
        self.prompt.authenticate(&self.config.prompt, crypto, handle);
        self.view.set_icon(FeedbackIcon::Fingerprint);
        self.state = AuthState::Listening;

        info!("Listening for fingerprint ({})", self.listen_id);
        Ok(())
    }

    /// Cancel the outstanding listen, if any
    ///
    /// The platform's resulting error callback is swallowed.
    pub fn stop_listening(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };

        self.self_cancelled = true;
        token.cancel();
        if matches!(self.state, AuthState::Listening | AuthState::TransientFailure) {
            self.state = AuthState::Idle;
        }
        debug!("Stopped listening ({})", self.listen_id);
    }

    /// Whether the platform reports biometric authentication as ready
    pub fn is_fingerprint_auth_available(&self) -> Result<bool> {
        Ok(self.capability.can_authenticate()?.is_available())
    }

    /// (Re)create the biometric key
    pub fn create_key(&mut self) -> Result<()> {
        let mut generator = self.provider.key_generator()?;
        generator.generate_key(&KeySpec::biometric(self.config.key_alias.as_str()))?;
        Ok(())
    }

    /// Prepare the cipher for the next listen
    ///
    /// Returns `Ok(false)` when the key store cannot produce a usable key right
    /// now, e.g. after the lock screen was reset or a fingerprint enrolled.
    pub fn init_cipher(&mut self) -> Result<bool> {
        let mut store = match self.key_store.take() {
            Some(store) => store,
            None => match self.provider.open() {
                Ok(store) => store,
                Err(e) => {
                    warn!("Could not open key store: {}", e);
                    return Ok(false);
                }
            },
        };

        let prepared = self.prepare_crypto(store.as_mut());
        self.key_store = Some(store);

        match prepared {
            Ok(crypto) => {
                self.crypto = Some(crypto);
                Ok(true)
            }
            Err(BiometricError::KeyStore(e)) => {
                warn!("Cipher initialization failed: {}", e);
                self.crypto = None;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn prepare_crypto(&mut self, store: &mut dyn SecureKeyStore) -> Result<CryptoObject> {
        self.create_key()?;
        store.load()?;
        let key = store.get_key(&self.config.key_alias)?;
        Ok(CryptoObject::init_encrypt(&key)?)
    }

    /// Terminal prompt error
    pub fn on_authentication_error(&mut self, code: ErrorCode, message: &str) {
        if self.self_cancelled {
            debug!("Ignoring {:?} after self-cancel", code);
            return;
        }

        debug!("Authentication error {:?}: {}", code, message);
        self.token = None;
        self.show_error(message);
        self.state = AuthState::TerminalError;
        self.scheduler
            .schedule(self.config.error_timeout(), UiEvent::NotifyError);
    }

    /// A single attempt did not match; the prompt keeps listening
    pub fn on_authentication_failed(&mut self) {
        debug!("Fingerprint not recognized");
        let message = self.config.strings.not_recognized.clone();
        self.show_error(&message);
        self.state = AuthState::TransientFailure;
    }

    /// The prompt accepted a match
    pub fn on_authentication_succeeded(&mut self, result: AuthenticationResult) {
        debug!("Authentication succeeded ({})", self.listen_id);
        self.cancel_reset();
        self.token = None;
        self.authorized = result.crypto_object;

        self.view.set_icon(FeedbackIcon::Success);
        self.view.set_tone(FeedbackTone::Success);
        self.view.set_text(&self.config.strings.success);
        self.state = AuthState::Succeeded;

        self.scheduler
            .schedule(self.config.success_delay(), UiEvent::NotifyAuthenticated);
    }

    /// Dispatch one UI-thread event
    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::Prompt { listen, event } => {
                if listen != self.listen_id {
                    debug!("Dropping event from stale {}", listen);
                    return;
                }
                match event {
                    AuthEvent::Error { code, message } => {
                        self.on_authentication_error(code, &message)
                    }
                    AuthEvent::Failed => self.on_authentication_failed(),
                    AuthEvent::Succeeded(result) => self.on_authentication_succeeded(result),
                }
            }
            UiEvent::ResetFeedback { seq } => self.reset_feedback(seq),
            UiEvent::NotifyError => {
                if self.state == AuthState::TerminalError {
                    self.state = AuthState::Idle;
                }
                self.callback.on_error();
            }
            UiEvent::NotifyAuthenticated => {
                if self.state == AuthState::Succeeded {
                    self.state = AuthState::Idle;
                }
                self.callback.on_authenticated();
            }
        }
    }

    /// Wait for the next UI event and dispatch it
    pub async fn pump(&mut self) {
        if let Some(event) = self.rx.recv().await {
            self.handle(event);
        }
    }

    /// Dispatch every event already queued, returning how many ran
    pub fn run_until_idle(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    fn show_error(&mut self, message: &str) {
        self.view.set_icon(FeedbackIcon::Error);
        self.view.set_text(message);
        self.view.set_tone(FeedbackTone::Warning);

        // Last error wins: a pending reset is replaced, never queued
        self.cancel_reset();
        self.reset_seq += 1;
        self.reset_task = Some(self.scheduler.schedule(
            self.config.error_timeout(),
            UiEvent::ResetFeedback {
                seq: self.reset_seq,
            },
        ));
    }

    fn cancel_reset(&mut self) {
        if let Some(task) = self.reset_task.take() {
            task.cancel();
        }
    }

    fn reset_feedback(&mut self, seq: u64) {
        if self.reset_task.is_none() || seq != self.reset_seq {
            debug!("Ignoring cancelled feedback reset #{}", seq);
            return;
        }
        self.reset_task = None;

        self.view.set_tone(FeedbackTone::Hint);
        self.view.set_text(&self.config.strings.hint);
        self.view.set_icon(FeedbackIcon::Fingerprint);

        if matches!(
            self.state,
            AuthState::TransientFailure | AuthState::TerminalError
        ) {
            self.state = if self.token.is_some() {
                AuthState::Listening
            } else {
                AuthState::Idle
            };
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Whether a listen is outstanding
    pub fn is_listening(&self) -> bool {
        self.token.is_some()
    }

    /// Whether the last cancellation came from [`stop_listening`](Self::stop_listening)
    pub fn is_self_cancelled(&self) -> bool {
        self.self_cancelled
    }

    /// Id of the most recent listen cycle
    pub fn listen_id(&self) -> ListenId {
        self.listen_id
    }

    /// Whether an error display is waiting to be reset
    pub fn has_pending_reset(&self) -> bool {
        self.reset_task.is_some()
    }

    /// Crypto object authorized by the last successful match
    pub fn take_crypto_object(&mut self) -> Option<CryptoObject> {
        self.authorized.take()
    }

    pub fn config(&self) -> &BiometricConfig {
        &self.config
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn callback_mut(&mut self) -> &mut C {
        &mut self.callback
    }
}
