//! Icon and text feedback shown next to the biometric prompt

use serde::{Deserialize, Serialize};

/// Icon shown beside the feedback text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackIcon {
    /// Idle / listening fingerprint glyph
    #[default]
    Fingerprint,
    /// Match accepted
    Success,
    /// Attempt rejected or prompt errored
    Error,
}

/// Color role of the feedback text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackTone {
    #[default]
    Hint,
    Success,
    Warning,
}

/// View surface the helper writes feedback into
pub trait FeedbackView {
    fn set_icon(&mut self, icon: FeedbackIcon);
    fn set_text(&mut self, text: &str);
    fn set_tone(&mut self, tone: FeedbackTone);
}

/// User-facing feedback strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackStrings {
    /// Idle hint shown while waiting for a finger
    #[serde(default = "default_hint")]
    pub hint: String,
    /// Shown after a single non-matching attempt
    #[serde(default = "default_not_recognized")]
    pub not_recognized: String,
    /// Shown when the match is accepted
    #[serde(default = "default_success")]
    pub success: String,
}

fn default_hint() -> String {
    "Touch sensor".to_string()
}

fn default_not_recognized() -> String {
    "Fingerprint not recognized. Try again".to_string()
}

fn default_success() -> String {
    "Fingerprint recognized".to_string()
}

impl Default for FeedbackStrings {
    fn default() -> Self {
        Self {
            hint: default_hint(),
            not_recognized: default_not_recognized(),
            success: default_success(),
        }
    }
}

/// Snapshot of what a view currently shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Feedback {
    pub icon: FeedbackIcon,
    pub text: String,
    pub tone: FeedbackTone,
}

impl FeedbackView for Feedback {
    fn set_icon(&mut self, icon: FeedbackIcon) {
        self.icon = icon;
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn set_tone(&mut self, tone: FeedbackTone) {
        self.tone = tone;
    }
}

/// Headless view that records every update
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    current: Feedback,
    updates: usize,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// What the view currently shows
    pub fn current(&self) -> &Feedback {
        &self.current
    }

    /// Number of setter calls received so far
    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl FeedbackView for RecordingView {
    fn set_icon(&mut self, icon: FeedbackIcon) {
        self.updates += 1;
        self.current.set_icon(icon);
    }

    fn set_text(&mut self, text: &str) {
        self.updates += 1;
        self.current.set_text(text);
    }

    fn set_tone(&mut self, tone: FeedbackTone) {
        self.updates += 1;
        self.current.set_tone(tone);
    }
}
