//! Fingerprint feedback panel

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use pinguard_biometric::{Feedback, FeedbackIcon, FeedbackTone, FeedbackView};

use crate::theme::Theme;

/// Bordered panel showing the helper's icon and text
///
/// The helper writes into it through [`FeedbackView`]; the host renders it
/// each frame with `frame.render_widget(&panel, area)`.
#[derive(Debug, Clone, Default)]
pub struct FeedbackPanel {
    feedback: Feedback,
    title: String,
    theme: Theme,
}

impl FeedbackPanel {
    /// Create a panel titled `title`
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Use a custom theme
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// What the panel currently shows
    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    /// Get icon glyph
    pub fn glyph(&self) -> &'static str {
        match self.feedback.icon {
            FeedbackIcon::Fingerprint => "◉",
            FeedbackIcon::Success => "✓",
            FeedbackIcon::Error => "✗",
        }
    }
}

impl FeedbackView for FeedbackPanel {
    fn set_icon(&mut self, icon: FeedbackIcon) {
        self.feedback.set_icon(icon);
    }

    fn set_text(&mut self, text: &str) {
        self.feedback.set_text(text);
    }

    fn set_tone(&mut self, tone: FeedbackTone) {
        self.feedback.set_tone(tone);
    }
}

impl Widget for &FeedbackPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = self.theme.tone(self.feedback.tone);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(self.title.as_str(), self.theme.title()));

        let line = Line::from(vec![
            Span::styled(self.glyph(), style),
            Span::raw(" "),
            Span::styled(self.feedback.text.as_str(), style),
        ]);

        Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(block)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(panel: &FeedbackPanel) -> Buffer {
        let mut buf = Buffer::empty(Rect::new(0, 0, 44, 3));
        panel.render(buf.area, &mut buf);
        buf
    }

    fn row(buf: &Buffer, y: u16) -> String {
        let width = buf.area.width as usize;
        buf.content()[y as usize * width..(y as usize + 1) * width]
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_renders_icon_and_text() {
        let mut panel = FeedbackPanel::new("Unlock");
        panel.set_icon(FeedbackIcon::Error);
        panel.set_text("Fingerprint not recognized");
        panel.set_tone(FeedbackTone::Warning);

        let buf = rendered(&panel);
        assert!(row(&buf, 0).contains("Unlock"));
        assert!(row(&buf, 1).contains("✗ Fingerprint not recognized"));
    }

    #[test]
    fn test_text_uses_tone_color() {
        let mut panel = FeedbackPanel::new("Unlock");
        panel.set_icon(FeedbackIcon::Success);
        panel.set_text("Fingerprint recognized");
        panel.set_tone(FeedbackTone::Success);

        let buf = rendered(&panel);
        let glyph = buf
            .content()
            .iter()
            .find(|cell| cell.symbol() == "✓")
            .unwrap();
        assert_eq!(glyph.fg, Theme::default().success);
    }

    #[test]
    fn test_default_shows_fingerprint() {
        let panel = FeedbackPanel::default();
        assert_eq!(panel.glyph(), "◉");
        assert_eq!(panel.feedback().tone, FeedbackTone::Hint);
    }
}
