//! Color palette for the feedback panel

use ratatui::style::{Color, Modifier, Style};

use pinguard_biometric::FeedbackTone;

/// PinGuard color palette
#[derive(Debug, Clone)]
pub struct Theme {
    // Feedback tones
    pub hint: Color,
    pub success: Color,
    pub warning: Color,

    // UI elements
    pub border: Color,
    pub title: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            hint: Color::Rgb(189, 189, 189),    // #BDBDBD
            success: Color::Rgb(0, 150, 136),   // #009688 - Teal
            warning: Color::Rgb(244, 81, 30),   // #F4511E - Deep orange
            border: Color::Rgb(66, 66, 66),     // #424242
            title: Color::Rgb(250, 250, 250),   // #FAFAFA
        }
    }
}

impl Theme {
    /// Get hint text style
    pub fn hint(&self) -> Style {
        Style::default().fg(self.hint)
    }

    /// Get success style
    pub fn success(&self) -> Style {
        Style::default()
            .fg(self.success)
            .add_modifier(Modifier::BOLD)
    }

    /// Get warning style
    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Get border style
    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Get title style
    pub fn title(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    /// Style for a feedback tone
    pub fn tone(&self, tone: FeedbackTone) -> Style {
        match tone {
            FeedbackTone::Hint => self.hint(),
            FeedbackTone::Success => self.success(),
            FeedbackTone::Warning => self.warning(),
        }
    }
}
