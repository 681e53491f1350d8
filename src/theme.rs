//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::board::PALETTE_SIZE;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Tile colours (index 0..=5): red, green, blue, yellow, cyan, magenta.
    pub tiles: [Color; PALETTE_SIZE as usize],
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, counters).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Selection outline and dimmed board after game over.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// Hardcoded One Dark defaults: exact hex values from onedark.theme (no saturation tweaks).
    pub fn onedark_default() -> Self {
        Self {
            tiles: [
                Color::Rgb(0xE0, 0x6C, 0x75), // cpu_end / red
                Color::Rgb(0x98, 0xC3, 0x79), // mem_box / green
                Color::Rgb(0x61, 0xAF, 0xEF), // cpu_box / blue
                Color::Rgb(0xE5, 0xC0, 0x7B), // title / yellow
                Color::Rgb(0x56, 0xB6, 0xC2), // hi_fg / cyan
                Color::Rgb(0xC6, 0x78, 0xDD), // net_box / magenta
            ],
            bg: Color::Rgb(0x31, 0x35, 0x3F),          // meter_bg
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),    // div_line
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),     // main_fg
            title: Color::Rgb(0xE5, 0xC0, 0x7B),       // title
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70), // inactive_fg
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or file is missing/invalid.
    /// `palette` selects colour variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Like [`Theme::load`], but an unreadable file is logged and replaced by
    /// the default theme for the same palette.
    pub fn load_or_default(path: Option<&Path>, palette: crate::Palette) -> Self {
        Self::load(path, palette).unwrap_or_else(|err| {
            warn!(%err, "could not load theme, using default");
            Self::default_for_palette(palette)
        })
    }

    /// Default theme for a palette when no file is loaded.
    pub fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override tile colours for high-contrast or colorblind.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.tiles = [
                    Color::Rgb(0xFF, 0x00, 0x00), // red
                    Color::Rgb(0x00, 0xFF, 0x00), // bright green
                    Color::Rgb(0x00, 0x88, 0xFF), // blue
                    Color::Rgb(0xFF, 0xFF, 0x00), // yellow
                    Color::Rgb(0x00, 0xFF, 0xFF), // cyan
                    Color::Rgb(0xFF, 0x00, 0xFF), // magenta
                ];
            }
            crate::Palette::Colorblind => {
                // Tol "bright"-style set; no red/green pair carries meaning alone
                self.tiles = [
                    Color::Rgb(0x00, 0x77, 0xBB), // blue
                    Color::Rgb(0xEE, 0x77, 0x33), // orange
                    Color::Rgb(0x00, 0x99, 0x88), // teal
                    Color::Rgb(0xCC, 0x33, 0x11), // red
                    Color::Rgb(0xEE, 0x33, 0x77), // magenta
                    Color::Rgb(0xBB, 0xBB, 0x00), // yellow
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .and_then(|v| parse_hex(v.trim_matches('"').trim_matches('\'').trim()).ok())
        };
        // Keys match onedark.theme; missing keys keep the One Dark value.
        let d = Self::onedark_default();
        Self {
            tiles: [
                get("cpu_end").or_else(|| get("temp_end")).unwrap_or(d.tiles[0]),
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(d.tiles[1]),
                get("cpu_box").unwrap_or(d.tiles[2]),
                get("title").or_else(|| get("cpu_mid")).unwrap_or(d.tiles[3]),
                get("hi_fg").or_else(|| get("proc_misc")).unwrap_or(d.tiles[4]),
                get("net_box").unwrap_or(d.tiles[5]),
            ],
            bg: get("meter_bg").unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
        }
    }

    /// Colour for a tile's colour index.
    #[inline]
    pub fn tile_color(&self, index: u8) -> Color {
        self.tiles[index as usize % self.tiles.len()]
    }
}

/// `theme[key]="value"` lines → map. Comments, blank lines and empty values are skipped.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| {
            let (key, rest) = line.strip_prefix("theme[")?.split_once(']')?;
            let (_, value) = rest.split_once('=')?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (!value.is_empty()).then(|| (key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// `#RRGGBB` or shorthand `#RGB` → `Color::Rgb`.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let hex = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(hex.to_string());
    let channel = |digits: &str, scale: u8| {
        u8::from_str_radix(digits, 16)
            .map(|v| v * scale)
            .map_err(|_| invalid())
    };
    if !hex.is_ascii() {
        return Err(invalid());
    }
    match hex.len() {
        6 => Ok(Color::Rgb(
            channel(&hex[0..2], 1)?,
            channel(&hex[2..4], 1)?,
            channel(&hex[4..6], 1)?,
        )),
        3 => Ok(Color::Rgb(
            channel(&hex[0..1], 17)?,
            channel(&hex[1..2], 17)?,
            channel(&hex[2..3], 17)?,
        )),
        _ => Err(invalid()),
    }
}
