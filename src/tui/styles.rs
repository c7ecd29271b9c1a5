//! Medical-themed color palette and styles.
//!
//! Dark navy background with a sky-blue accent; green and red mark the
//! healthy and at-risk panels.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::RiskLevel;

/// Medical theme color palette.
pub struct MedicalTheme;

impl MedicalTheme {
    // === Primary Colors ===

    /// Sky blue - Primary color (titles, focus)
    pub const PRIMARY: Color = Color::Rgb(56, 189, 248); // #38BDF8

    // === Secondary Colors ===

    /// Light slate for borders and subtitles
    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184); // #94A3B8

    // === Semantic Colors ===

    /// Green - Healthy
    pub const SUCCESS: Color = Color::Rgb(34, 197, 94); // #22C55E

    /// Red - High risk
    pub const DANGER: Color = Color::Rgb(239, 68, 68); // #EF4444

    // === Background Colors ===

    /// Application background
    pub const BG_DARK: Color = Color::Rgb(2, 6, 23); // #020617

    /// Panel background for the healthy result
    pub const BG_GOOD: Color = Color::Rgb(5, 46, 22); // #052E16

    /// Panel background for the at-risk result
    pub const BG_BAD: Color = Color::Rgb(69, 10, 10); // #450A0A

    // === Text Colors ===

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC

    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8

    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    // === Preset Styles ===

    /// Base style painted under every screen
    #[must_use]
    pub fn background() -> Style {
        Style::default().bg(Self::BG_DARK).fg(Self::TEXT_PRIMARY)
    }

    /// Style for the application title
    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for section titles
    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    /// Style for focused elements
    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the input cursor
    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    /// Style for key hints
    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for key descriptions
    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Diagnosis panel style: red band when at risk, green otherwise
    #[must_use]
    pub fn diagnosis(at_risk: bool) -> Style {
        if at_risk {
            Style::default().fg(Self::DANGER).bg(Self::BG_BAD)
        } else {
            Style::default().fg(Self::SUCCESS).bg(Self::BG_GOOD)
        }
    }

    /// Get risk level style
    #[must_use]
    pub fn risk_level(level: RiskLevel) -> Style {
        let (r, g, b) = level.color();
        Style::default()
            .fg(Color::Rgb(r, g, b))
            .add_modifier(Modifier::BOLD)
    }
}

/// ASCII logo shown beside the report header
pub const LOGO: &str = r"
 _  _  __
| || |/ _\
| __ |  _ \
|_||_|_/ \_\
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnosis_style_tracks_label() {
        assert_eq!(MedicalTheme::diagnosis(true).fg, Some(MedicalTheme::DANGER));
        assert_eq!(MedicalTheme::diagnosis(false).bg, Some(MedicalTheme::BG_GOOD));
    }

    #[test]
    fn test_background_is_dark_navy() {
        assert_eq!(MedicalTheme::background().bg, Some(MedicalTheme::BG_DARK));
    }

    #[test]
    fn test_logo_fits_header() {
        assert!(LOGO.lines().all(|l| l.chars().count() <= 12));
    }
}
