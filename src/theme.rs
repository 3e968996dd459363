//! Theme selection, including OS light/dark detection.
//!
//! Themes are a small closed set named in [`Config`](crate::Config). The
//! special name [`AUTO_THEME`] defers the choice to the user's OS color mode.

use dark_light::{detect as detect_os_theme, Mode as OsThemeMode};
use once_cell::sync::Lazy;
use std::sync::Mutex;

/// Theme name that selects light or dark from the OS color mode.
pub const AUTO_THEME: &str = "auto";

/// The user's preferred color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Light,
    Dark,
}

impl ColorMode {
    /// Theme name conventionally paired with this mode.
    pub fn theme_name(self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        }
    }
}

/// Resolves `auto` to a color mode. The default asks the OS.
pub type ThemeDetector = fn() -> ColorMode;

static DETECTOR: Lazy<Mutex<ThemeDetector>> = Lazy::new(|| Mutex::new(system_color_mode));

fn detector_slot() -> std::sync::MutexGuard<'static, ThemeDetector> {
    DETECTOR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Installs the function that `auto` resolves through, for every store and
/// export created afterwards. Tests pin a mode with it.
pub fn set_theme_detector(detector: ThemeDetector) {
    *detector_slot() = detector;
}

/// The color mode `auto` currently resolves to.
pub fn detect_color_mode() -> ColorMode {
    let detector = *detector_slot();
    detector()
}

fn system_color_mode() -> ColorMode {
    if matches!(detect_os_theme(), OsThemeMode::Dark) {
        ColorMode::Dark
    } else {
        ColorMode::Light
    }
}

/// Picks a concrete theme name from `requested`.
///
/// Named themes are returned as-is when they belong to `themes`. [`AUTO_THEME`]
/// maps through the detector. Anything unknown falls back to the first
/// configured theme.
pub fn select_theme(requested: &str, themes: &[String]) -> Option<String> {
    let wanted = if requested == AUTO_THEME {
        detect_color_mode().theme_name()
    } else {
        requested
    };

    themes
        .iter()
        .find(|t| t.as_str() == wanted)
        .or_else(|| themes.first())
        .cloned()
}
