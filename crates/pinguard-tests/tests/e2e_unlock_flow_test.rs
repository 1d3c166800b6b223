//! End-to-end tests for the PinGuard unlock flow
//!
//! These tests drive protected screens through their lifecycle, raise the
//! lock screen, and unlock (or back out) through the fingerprint helper.

use std::rc::Rc;
use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

use pinguard_biometric::{
    AuthState, BiometricConfig, ErrorCode, FeedbackIcon, FingerprintUiHelper, ManualPrompt,
    SoftwareKeyStore, StaticCapability,
};
use pinguard_core::{
    GuardConfig, GuardContext, ListenerRegistry, PinCompatScreen, PinProtected,
    PinProtectedFragmentScreen, Screen, ScreenId, SignalBus,
};
use pinguard_tests::{init_tracing, LockCoordinator, Outcome, OutcomeLog, TestScreen};
use pinguard_tui::FeedbackPanel;

type LockHelper = FingerprintUiHelper<FeedbackPanel, OutcomeLog>;

fn lock_helper(config: BiometricConfig) -> (LockHelper, ManualPrompt, OutcomeLog) {
    let prompt = ManualPrompt::new();
    let outcomes = OutcomeLog::default();
    let helper = FingerprintUiHelper::new(
        config,
        SoftwareKeyStore::new(),
        StaticCapability::available(),
        prompt.clone(),
        FeedbackPanel::new("Unlock"),
        outcomes.clone(),
    );
    (helper, prompt, outcomes)
}

fn render_row(panel: &FeedbackPanel, y: u16) -> String {
    let area = Rect::new(0, 0, 48, 3);
    let mut buf = Buffer::empty(area);
    panel.render(area, &mut buf);

    let width = area.width as usize;
    buf.content()[y as usize * width..(y as usize + 1) * width]
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

/// Simulates returning to a locked app and unlocking with a fingerprint
#[tokio::test(start_paused = true)]
async fn test_full_unlock_flow() -> anyhow::Result<()> {
    init_tracing();

    // ==========================================
    // STEP 1: Application root wiring
    // ==========================================
    let context = GuardContext::new(ListenerRegistry::new(), SignalBus::new());
    let coordinator = LockCoordinator::new(false);
    context.registry.set_listener(coordinator.clone());

    let home = TestScreen::new(1);
    let detail = TestScreen::new(2);
    let mut home_adapter = PinCompatScreen::new(home.clone(), context.clone());
    let mut detail_adapter = PinProtectedFragmentScreen::new(detail.clone(), context.clone());

    home_adapter.on_create();
    home_adapter.on_resume();
    home_adapter.on_user_interaction();
    detail_adapter.on_create();
    detail_adapter.on_resume();

    assert!(coordinator.lock_requests().is_empty());
    assert_eq!(coordinator.interactions(), 1);

    // ==========================================
    // STEP 2: App goes to the background and comes back
    // ==========================================
    detail_adapter.on_pause();
    assert!(coordinator.is_locked());
    detail_adapter.on_resume();
    assert_eq!(coordinator.lock_requests(), vec![ScreenId::new(2)]);

    // ==========================================
    // STEP 3: Lock screen listens for a fingerprint
    // ==========================================
    let (mut helper, prompt, outcomes) = lock_helper(BiometricConfig::default());
    helper.start_listening()?;
    assert_eq!(prompt.started(), 1);

    prompt.fail();
    helper.pump().await;
    assert!(render_row(helper.view(), 1).contains("✗ Fingerprint not recognized"));

    prompt.succeed();
    helper.pump().await;
    assert_eq!(helper.view().feedback().icon, FeedbackIcon::Success);
    assert!(render_row(helper.view(), 1).contains("✓ Fingerprint recognized"));

    while outcomes.outcomes().is_empty() {
        helper.pump().await;
    }
    assert_eq!(outcomes.outcomes(), vec![Outcome::Authenticated]);

    // ==========================================
    // STEP 4: Unlock with the authorized key
    // ==========================================
    let mut crypto = helper
        .take_crypto_object()
        .ok_or_else(|| anyhow::anyhow!("no crypto object after success"))?;
    let sealed = crypto.encrypt(b"1234")?;
    assert!(sealed.len() > 4);
    coordinator.unlock();

    detail_adapter.on_pause();
    detail_adapter.on_destroy();
    home_adapter.on_destroy();
    assert_eq!(context.bus.subscriber_count(&context.cancel_topic), 0);
    assert!(!home.is_finished());
    assert!(!detail.is_finished());

    Ok(())
}

/// Backing out of the lock screen finishes every protected screen behind it
#[tokio::test(start_paused = true)]
async fn test_back_out_finishes_waiting_screens() -> anyhow::Result<()> {
    init_tracing();

    let context = GuardContext::default();
    let coordinator = LockCoordinator::new(true);
    context.registry.set_listener(coordinator.clone());

    let screens: Vec<Rc<TestScreen>> = (1..=3).map(TestScreen::new).collect();
    let mut adapters: Vec<PinCompatScreen> = screens
        .iter()
        .map(|s| PinCompatScreen::new(s.clone() as Rc<dyn Screen>, context.clone()))
        .collect();
    for adapter in &mut adapters {
        adapter.on_create();
        adapter.on_resume();
    }
    assert_eq!(coordinator.lock_requests().len(), 3);

    // Third screen is already gone
    adapters[2].on_destroy();

    let (mut helper, prompt, outcomes) = lock_helper(BiometricConfig::default());
    helper.start_listening()?;
    prompt.error(ErrorCode::NegativeButton, "Use PIN");
    helper.pump().await;
    assert!(render_row(helper.view(), 1).contains("Use PIN"));

    while outcomes.outcomes().is_empty() {
        helper.pump().await;
    }
    assert_eq!(outcomes.outcomes(), vec![Outcome::Error]);

    // The lock screen gives up and cancels the lock flow
    assert_eq!(context.cancel_lock_flow(), 2);
    assert!(screens[0].is_finished());
    assert!(screens[1].is_finished());
    assert!(!screens[2].is_finished());

    Ok(())
}

/// Leaving the lock screen mid-prompt stops listening without reporting
#[tokio::test(start_paused = true)]
async fn test_lock_screen_paused_mid_prompt() -> anyhow::Result<()> {
    init_tracing();

    let (mut helper, prompt, outcomes) = lock_helper(BiometricConfig::default());
    helper.start_listening()?;
    let before = render_row(helper.view(), 1);

    helper.stop_listening();
    assert_eq!(prompt.live_tokens(), 0);

    helper.pump().await;
    tokio::time::sleep(Duration::from_secs(5)).await;
    helper.run_until_idle();

    assert!(outcomes.outcomes().is_empty());
    assert_eq!(render_row(helper.view(), 1), before);

    // Coming back starts a fresh listen
    helper.start_listening()?;
    prompt.succeed();
    while outcomes.outcomes().is_empty() {
        helper.pump().await;
    }
    assert_eq!(outcomes.outcomes(), vec![Outcome::Authenticated]);

    Ok(())
}

/// Persisted configuration drives both the guard topic and the helper timing
#[tokio::test(start_paused = true)]
async fn test_configured_flow() -> anyhow::Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;

    let guard_path = dir.path().join("guard.json");
    GuardConfig {
        cancel_topic: "vault-lock-cancelled".to_string(),
    }
    .save(&guard_path)?;

    let biometric_path = dir.path().join("biometric.json");
    BiometricConfig {
        key_alias: "vault_key".to_string(),
        error_timeout_ms: 500,
        ..Default::default()
    }
    .save(&biometric_path)?;

    let guard_config = GuardConfig::load(&guard_path)?;
    let context =
        GuardContext::from_config(&guard_config, ListenerRegistry::new(), SignalBus::new());
    let screen = TestScreen::new(7);
    let mut adapter = PinProtectedFragmentScreen::new(screen.clone(), context.clone());
    adapter.on_create();

    assert_eq!(context.bus.publish(pinguard_core::LOCK_CANCELLED), 0);
    assert!(!screen.is_finished());

    let (mut helper, prompt, outcomes) = lock_helper(BiometricConfig::load(&biometric_path)?);
    helper.start_listening()?;
    prompt.error(ErrorCode::Timeout, "Timed out");
    helper.pump().await;
    let shown_at = tokio::time::Instant::now();

    while outcomes.outcomes().is_empty() {
        helper.pump().await;
    }
    let elapsed = shown_at.elapsed();
    assert!(elapsed >= Duration::from_millis(500) && elapsed < Duration::from_millis(1600));

    assert_eq!(context.cancel_lock_flow(), 1);
    assert!(screen.is_finished());

    helper.start_listening()?;
    prompt.succeed();
    while helper.state() != AuthState::Succeeded {
        helper.pump().await;
    }
    let crypto_alias = helper
        .take_crypto_object()
        .map(|c| c.alias().to_string())
        .unwrap_or_default();
    assert_eq!(crypto_alias, "vault_key");

    Ok(())
}
