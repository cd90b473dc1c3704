//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use voxstack::BrickColor;

/// Brick colours plus UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Indexed by [`BrickColor::index`]: red, green, blue, yellow, magenta, cyan.
    pub bricks: [Color; 6],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, level).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Empty cells, hints, the stack limit line.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

const ONEDARK_BRICKS: [Color; 6] = [
    Color::Rgb(0xE0, 0x6C, 0x75), // cpu_end / red
    Color::Rgb(0x98, 0xC3, 0x79), // mem_box / green
    Color::Rgb(0x61, 0xAF, 0xEF), // cpu_box / blue
    Color::Rgb(0xE5, 0xC0, 0x7B), // cpu_mid / yellow
    Color::Rgb(0xC6, 0x78, 0xDD), // net_box / magenta
    Color::Rgb(0x56, 0xB6, 0xC2), // hi_fg / cyan
];

/// Theme keys tried per brick colour, same order as [`ONEDARK_BRICKS`].
const BRICK_KEYS: [&[&str]; 6] = [
    &["cpu_end", "temp_end"],
    &["mem_box", "cpu_start"],
    &["cpu_box"],
    &["cpu_mid", "title"],
    &["net_box"],
    &["hi_fg", "proc_misc"],
];

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// One Dark values from onedark.theme.
    pub const fn onedark_default() -> Self {
        Self {
            bricks: ONEDARK_BRICKS,
            bg: Color::Rgb(0x31, 0x35, 0x3F),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => {
                let s = std::fs::read_to_string(p)?;
                Self::from_map(&parse_theme_file(&s))
            }
            _ => Self::onedark_default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Override brick colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.bricks = [
                    Color::Rgb(0xFF, 0x00, 0x00),
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0x00, 0x88, 0xFF),
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                    Color::Rgb(0x00, 0xFF, 0xFF),
                ];
            }
            crate::Palette::Colorblind => {
                // Paul Tol's vibrant set; no red/green pair.
                self.bricks = [
                    Color::Rgb(0xCC, 0x33, 0x11),
                    Color::Rgb(0x00, 0x99, 0x88),
                    Color::Rgb(0x00, 0x77, 0xBB),
                    Color::Rgb(0xEE, 0x77, 0x33),
                    Color::Rgb(0xEE, 0x33, 0x77),
                    Color::Rgb(0xBB, 0xBB, 0x00),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let defaults = Self::onedark_default();
        let mut bricks = ONEDARK_BRICKS;
        for (slot, keys) in bricks.iter_mut().zip(BRICK_KEYS) {
            if let Some(c) = keys.iter().find_map(|&k| get(k)) {
                *slot = c;
            }
        }
        Self {
            bricks,
            bg: get("meter_bg").unwrap_or(defaults.bg),
            div_line: get("div_line").unwrap_or(defaults.div_line),
            main_fg: get("main_fg").unwrap_or(defaults.main_fg),
            title: get("title").unwrap_or(defaults.title),
            inactive_fg: get("inactive_fg").unwrap_or(defaults.inactive_fg),
        }
    }

    #[inline]
    pub fn brick(&self, color: BrickColor) -> Color {
        self.bricks[color.index() as usize % 6]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let bad = || ThemeError::InvalidHex(s.to_string());
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| bad());
    match s.len() {
        6 => Ok(Color::Rgb(
            channel(&s[0..2])?,
            channel(&s[2..4])?,
            channel(&s[4..6])?,
        )),
        3 => Ok(Color::Rgb(
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        )),
        _ => Err(bad()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GG0000").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_brick_colours_follow_keys() {
        let map = parse_theme_file("theme[cpu_box]=\"#0000FF\"\ntheme[meter_bg]='#000000'");
        let theme = Theme::from_map(&map);
        assert_eq!(theme.brick(BrickColor::Blue), Color::Rgb(0, 0, 255));
        assert_eq!(theme.brick(BrickColor::Red), ONEDARK_BRICKS[0]);
        assert_eq!(theme.bg, Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_palette_override() {
        let mut theme = Theme::default();
        theme.apply_palette(crate::Palette::HighContrast);
        assert_eq!(theme.brick(BrickColor::Green), Color::Rgb(0, 255, 0));
    }
}
