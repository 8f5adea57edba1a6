use std::io::IsTerminal;

use clap::{
  ValueEnum,
  builder::styling::{AnsiColor, Color as ClapColor, RgbColor, Style, Styles},
};
use comfy_table::Color as ComfyColor;
use crossterm::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
  Always,
  Auto,
  Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeMode {
  Dark,
  Light,
  Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
  Dark,
  Light,
}

/// Role colors of one theme, as `(r, g, b)`.
struct Palette {
  timestamp: (u8, u8, u8),
  primary: (u8, u8, u8),
  accent: (u8, u8, u8),
  warning: (u8, u8, u8),
  success: (u8, u8, u8),
  label: (u8, u8, u8),
  value: (u8, u8, u8),
}

const DARK: Palette = Palette {
  timestamp: (128, 150, 170),
  primary: (214, 222, 235),
  accent: (247, 140, 108),
  warning: (255, 203, 107),
  success: (195, 232, 141),
  label: (130, 170, 255),
  value: (240, 220, 78),
};

const LIGHT: Palette = Palette {
  timestamp: (96, 108, 120),
  primary: (40, 44, 52),
  accent: (196, 78, 48),
  warning: (170, 110, 0),
  success: (46, 125, 50),
  label: (38, 90, 180),
  value: (120, 80, 10),
};

pub struct Colors {
  enabled: bool,
  theme: Theme,
}

pub trait IntoComfyColor {
  fn into(self) -> ComfyColor;
}

impl IntoComfyColor for Color {
  fn into(self) -> ComfyColor {
    match self {
      Color::Rgb { r, g, b } => ComfyColor::Rgb { r, g, b },
      Color::AnsiValue(value) => ComfyColor::AnsiValue(value),
      _ => ComfyColor::Reset,
    }
  }
}

impl Colors {
  pub const fn new(enabled: bool, theme: Theme) -> Self {
    Self { enabled, theme }
  }

  const fn palette(&self) -> &'static Palette {
    match self.theme {
      Theme::Dark => &DARK,
      Theme::Light => &LIGHT,
    }
  }

  const fn pick(&self, (r, g, b): (u8, u8, u8)) -> Color {
    if self.enabled { Color::Rgb { r, g, b } } else { Color::Reset }
  }

  pub const fn timestamp(&self) -> Color {
    self.pick(self.palette().timestamp)
  }

  pub const fn primary(&self) -> Color {
    self.pick(self.palette().primary)
  }

  pub const fn accent(&self) -> Color {
    self.pick(self.palette().accent)
  }

  pub const fn warning(&self) -> Color {
    self.pick(self.palette().warning)
  }

  pub const fn success(&self) -> Color {
    self.pick(self.palette().success)
  }

  pub const fn label(&self) -> Color {
    self.pick(self.palette().label)
  }

  pub const fn value(&self) -> Color {
    self.pick(self.palette().value)
  }

  /// Help output styling; always the dark palette since clap renders before themes are resolved.
  pub const fn clap_styles() -> Styles {
    const fn rgb((r, g, b): (u8, u8, u8)) -> Option<ClapColor> {
      Some(ClapColor::Rgb(RgbColor(r, g, b)))
    }

    Styles::styled()
      .header(Style::new().bold().underline().fg_color(rgb(DARK.label)))
      .usage(Style::new().bold().fg_color(rgb(DARK.label)))
      .literal(Style::new().fg_color(rgb(DARK.success)))
      .placeholder(Style::new().fg_color(Some(ClapColor::Ansi(AnsiColor::Cyan))))
      .error(Style::new().bold().fg_color(rgb(DARK.accent)))
      .valid(Style::new().fg_color(rgb(DARK.success)))
      .invalid(Style::new().bold().fg_color(rgb(DARK.accent)))
  }
}

pub fn colors_enabled(mode: ColorMode) -> bool {
  match mode {
    ColorMode::Always => true,
    ColorMode::Never => false,
    ColorMode::Auto => std::io::stdout().is_terminal(),
  }
}

pub fn detect_theme(mode: ThemeMode) -> Theme {
  match mode {
    ThemeMode::Dark => Theme::Dark,
    ThemeMode::Light => Theme::Light,
    ThemeMode::Auto => theme_from_env(
      std::env::var("COLORFGBG").ok().as_deref(),
      std::env::var("TERM_PROGRAM").ok().as_deref(),
      std::env::var("ITERM_PROFILE").ok().as_deref(),
    ),
  }
}

/// `COLORFGBG` ends with the background color index; 8 and above are light backgrounds.
fn theme_from_env(colorfgbg: Option<&str>, term_program: Option<&str>, iterm_profile: Option<&str>) -> Theme {
  if let Some(background) = colorfgbg.and_then(|value| value.rsplit(';').next())
    && let Ok(index) = background.parse::<u8>()
  {
    return if index >= 8 { Theme::Light } else { Theme::Dark };
  }

  if matches!(term_program, Some("Apple_Terminal" | "iTerm.app"))
    && iterm_profile.is_some_and(|profile| profile.to_lowercase().contains("light"))
  {
    return Theme::Light;
  }

  Theme::Dark
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_theme_from_colorfgbg() {
    assert_eq!(theme_from_env(Some("0;15"), None, None), Theme::Light);
    assert_eq!(theme_from_env(Some("15;0"), None, None), Theme::Dark);
    assert_eq!(theme_from_env(Some("default"), None, None), Theme::Dark);
  }

  #[test]
  fn test_theme_from_iterm_profile() {
    assert_eq!(theme_from_env(None, Some("iTerm.app"), Some("Solarized Light")), Theme::Light);
    assert_eq!(theme_from_env(None, Some("vscode"), Some("Light")), Theme::Dark);
  }

  #[test]
  fn test_disabled_colors_reset() {
    let colors = Colors::new(false, Theme::Light);
    assert_eq!(colors.accent(), Color::Reset);
    assert!(matches!(IntoComfyColor::into(colors.value()), ComfyColor::Reset));

    let colors = Colors::new(true, Theme::Dark);
    assert_eq!(colors.label(), Color::Rgb { r: 130, g: 170, b: 255 });
  }
}
