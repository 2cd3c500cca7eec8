//! Theme loading: btop-style `theme[key]="value"` files mapped onto candy and UI colours.

use candytui::Token;
use candytui::grid::MAX_VARIANTS;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const CANDIES: usize = MAX_VARIANTS as usize;

/// One Dark candy colours, in token order 1..=6.
const ONEDARK_CANDY: [&str; CANDIES] = [
    "#E06C75", // red
    "#98C379", // green
    "#61AFEF", // blue
    "#E5C07B", // yellow
    "#C678DD", // magenta
    "#56B6C2", // cyan
];

const HIGH_CONTRAST_CANDY: [&str; CANDIES] =
    ["#FF0000", "#00FF00", "#0088FF", "#FFFF00", "#FF00FF", "#00FFFF"];

/// Blue/orange based set that stays distinct without red/green.
const COLORBLIND_CANDY: [&str; CANDIES] =
    ["#CC3311", "#009988", "#0077BB", "#EE7733", "#EE3377", "#BBBB00"];

/// Theme keys tried for each candy, first hit wins. `candyN` keys are our own;
/// the rest are btop keys so an existing btop theme gives sensible colours.
const CANDY_KEYS: [&[&str]; CANDIES] = [
    &["candy1", "cpu_end", "temp_end"],
    &["candy2", "mem_box", "cpu_start"],
    &["candy3", "cpu_box"],
    &["candy4", "cpu_mid", "title"],
    &["candy5", "net_box"],
    &["candy6", "hi_fg", "proc_misc"],
];

#[derive(Debug, Clone)]
pub struct Theme {
    /// Candy colours for tokens 1..=6.
    pub candy: [Color; CANDIES],
    /// Board background.
    pub bg: Color,
    /// Board border and sidebar rules.
    pub div_line: Color,
    /// Score and help text.
    pub main_fg: Color,
    pub title: Color,
    /// Greyed-out candy: rejected clicks and swaps.
    pub inactive_fg: Color,
    /// Draw a distinct glyph per candy, for palettes that must not rely on hue.
    pub shaped: bool,
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
        Self::onedark()
    }
}

fn hex_table(table: [&str; CANDIES]) -> [Color; CANDIES] {
    table.map(|h| parse_hex(h).unwrap_or(Color::Gray))
}

impl Theme {
    pub fn onedark() -> Self {
        Self {
            candy: hex_table(ONEDARK_CANDY),
            bg: Color::Rgb(0x28, 0x2C, 0x34),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
            shaped: false,
        }
    }

    /// Load a theme file, or One Dark when `path` is None or missing.
    /// `palette` then overrides the candy colours.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => {
                let s = std::fs::read_to_string(p)?;
                Self::from_map(&parse_theme_file(&s))
            }
            _ => Self::onedark(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => self.candy = hex_table(HIGH_CONTRAST_CANDY),
            crate::Palette::Colorblind => {
                self.candy = hex_table(COLORBLIND_CANDY);
                self.shaped = true;
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let base = Self::onedark();
        let mut candy = base.candy;
        for (slot, keys) in candy.iter_mut().zip(CANDY_KEYS) {
            if let Some(c) = keys.iter().find_map(|k| get(*k)) {
                *slot = c;
            }
        }
        Self {
            candy,
            bg: get("main_bg").or_else(|| get("meter_bg")).unwrap_or(base.bg),
            div_line: get("div_line").unwrap_or(base.div_line),
            main_fg: get("main_fg").unwrap_or(base.main_fg),
            title: get("title").unwrap_or(base.title),
            inactive_fg: get("inactive_fg").unwrap_or(base.inactive_fg),
            shaped: base.shaped,
        }
    }

    /// Colour for a non-empty token; empty cells use the background.
    #[inline]
    pub fn candy_color(&self, token: Token) -> Color {
        match token {
            0 => self.bg,
            t => self.candy[(usize::from(t) - 1) % CANDIES],
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let rest = line.strip_prefix("theme[")?;
            let (key, rest) = rest.split_once(']')?;
            let (_, value) = rest.split_once('=')?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (!value.is_empty()).then(|| (key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let hex = s.trim().trim_start_matches('#');
    let bad = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>, scale: u8| {
        hex.get(range)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .map(|v| v * scale)
            .ok_or_else(bad)
    };
    match hex.len() {
        6 => Ok(Color::Rgb(channel(0..2, 1)?, channel(2..4, 1)?, channel(4..6, 1)?)),
        3 => Ok(Color::Rgb(channel(0..1, 17)?, channel(1..2, 17)?, channel(2..3, 17)?)),
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
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[candy3]="#31353F""##);
        assert_eq!(map.get("candy3"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_btop_keys_fill_candies() {
        let map = parse_theme_file("theme[cpu_box]=\"#010203\"\n# comment\ntheme[candy1]='#FF0000'");
        let theme = Theme::from_map(&map);
        assert_eq!(theme.candy_color(1), Color::Rgb(255, 0, 0));
        assert_eq!(theme.candy_color(3), Color::Rgb(1, 2, 3));
        assert_eq!(theme.candy_color(0), theme.bg);
    }

    #[test]
    fn test_colorblind_palette_uses_shapes() {
        let mut theme = Theme::onedark();
        theme.apply_palette(crate::Palette::Colorblind);
        assert!(theme.shaped);
        assert_eq!(theme.candy_color(3), Color::Rgb(0x00, 0x77, 0xBB));
    }
}
