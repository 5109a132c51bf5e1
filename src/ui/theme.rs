//! Theme configuration for the TUI.
//!
//! Supports light and dark themes. The saved preference wins; without one
//! the terminal background decides.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::client::notify::NotificationKind;
use crate::client::status::IndicatorState;
use crate::client::ThemePreference;

/// Color and style theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Which palette this is.
    pub preference: ThemePreference,
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for warnings.
    pub warning: Color,
    /// Color for errors and abnormal indicators.
    pub critical: Color,
    /// Color for success and normal indicators.
    pub healthy: Color,
    /// Color for informational notifications.
    pub info: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            preference: ThemePreference::Dark,
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            info: Color::LightBlue,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            preference: ThemePreference::Light,
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            info: Color::Blue,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    pub fn for_preference(preference: ThemePreference) -> Self {
        match preference {
            ThemePreference::Light => Self::light(),
            ThemePreference::Dark => Self::dark(),
        }
    }

    /// Guess a preference from the terminal background luminance.
    pub fn detect_preference() -> ThemePreference {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => ThemePreference::Light,
            _ => ThemePreference::Dark,
        }
    }

    /// Get style for a status indicator
    pub fn indicator_style(&self, state: IndicatorState) -> Style {
        match state {
            IndicatorState::Normal => Style::default().fg(self.healthy),
            IndicatorState::Abnormal => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
            IndicatorState::Unknown => Style::default().add_modifier(Modifier::DIM),
        }
    }

    pub fn notification_color(&self, kind: NotificationKind) -> Color {
        match kind {
            NotificationKind::Success => self.healthy,
            NotificationKind::Error => self.critical,
            NotificationKind::Warning => self.warning,
            NotificationKind::Info => self.info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_preference() {
        assert_eq!(
            Theme::for_preference(ThemePreference::Light).preference,
            ThemePreference::Light
        );
        assert_eq!(
            Theme::for_preference(ThemePreference::Dark).highlight,
            Color::Cyan
        );
    }
}
