//! Semantic color roles for the TUI, one dark palette. Roles over raw
//! colors so the view code never hard-codes an RGB value.

use ratatui::style::{Color, Modifier, Style};

/// RGB triple, converted to a ratatui color at render time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub surface: Rgb,
    pub border: Rgb,
    pub border_focused: Rgb,
    pub text: Rgb,
    pub text_muted: Rgb,
    pub text_placeholder: Rgb,
    pub accent: Rgb,
    pub success: Rgb,
    pub warning: Rgb,
    pub danger: Rgb,
    pub selection: Rgb,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            background: Rgb(8, 8, 12),
            surface: Rgb(16, 17, 24),
            border: Rgb(28, 30, 42),
            border_focused: Rgb(99, 148, 255),
            text: Rgb(200, 210, 245),
            text_muted: Rgb(96, 106, 140),
            text_placeholder: Rgb(70, 78, 110),
            accent: Rgb(99, 148, 255),
            success: Rgb(120, 220, 120),
            warning: Rgb(240, 185, 100),
            danger: Rgb(255, 100, 120),
            selection: Rgb(36, 40, 59),
        }
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text.into())
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.text_muted.into())
    }

    pub fn placeholder_style(&self) -> Style {
        Style::default().fg(self.text_placeholder.into())
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent.into())
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success.into())
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning.into())
    }

    pub fn danger_style(&self) -> Style {
        Style::default().fg(self.danger.into())
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.text.into())
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        let color = if focused {
            self.border_focused
        } else {
            self.border
        };
        Style::default().fg(color.into())
    }

    /// Row style for the selected task.
    pub fn selection_style(&self) -> Style {
        Style::default()
            .fg(self.text.into())
            .bg(self.selection.into())
    }

    /// Struck-through dim style for completed tasks.
    pub fn done_style(&self) -> Style {
        Style::default()
            .fg(self.text_muted.into())
            .add_modifier(Modifier::CROSSED_OUT)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}
