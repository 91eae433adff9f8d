//! Named colour palette
//!
//! Markup refers to colours by name. Lookups never fail: `reset` and unknown
//! names resolve to the palette default for the channel being set.

use gridmark_config::PaletteConfig;
use std::collections::HashMap;

/// One of the sixteen palette colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Orange,
    Magenta,
    LightBlue,
    Yellow,
    Lime,
    Pink,
    Gray,
    LightGray,
    Cyan,
    Purple,
    Blue,
    Brown,
    Green,
    Red,
    Black,
}

impl Color {
    /// All palette entries in palette order.
    pub const ALL: [Self; 16] = [
        Self::White,
        Self::Orange,
        Self::Magenta,
        Self::LightBlue,
        Self::Yellow,
        Self::Lime,
        Self::Pink,
        Self::Gray,
        Self::LightGray,
        Self::Cyan,
        Self::Purple,
        Self::Blue,
        Self::Brown,
        Self::Green,
        Self::Red,
        Self::Black,
    ];

    /// Case-insensitive lookup of a palette name.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let color = match lower.as_str() {
            "white" => Self::White,
            "orange" => Self::Orange,
            "magenta" => Self::Magenta,
            "lightblue" => Self::LightBlue,
            "yellow" => Self::Yellow,
            "lime" => Self::Lime,
            "pink" => Self::Pink,
            "gray" | "grey" => Self::Gray,
            "lightgray" | "lightgrey" => Self::LightGray,
            "cyan" => Self::Cyan,
            "purple" => Self::Purple,
            "blue" => Self::Blue,
            "brown" => Self::Brown,
            "green" => Self::Green,
            "red" => Self::Red,
            "black" => Self::Black,
            _ => return None,
        };
        Some(color)
    }

    /// Canonical markup name.
    pub fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Orange => "orange",
            Self::Magenta => "magenta",
            Self::LightBlue => "lightBlue",
            Self::Yellow => "yellow",
            Self::Lime => "lime",
            Self::Pink => "pink",
            Self::Gray => "gray",
            Self::LightGray => "lightGray",
            Self::Cyan => "cyan",
            Self::Purple => "purple",
            Self::Blue => "blue",
            Self::Brown => "brown",
            Self::Green => "green",
            Self::Red => "red",
            Self::Black => "black",
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::White => (0xF0, 0xF0, 0xF0),
            Self::Orange => (0xF2, 0xB2, 0x33),
            Self::Magenta => (0xE5, 0x7F, 0xD8),
            Self::LightBlue => (0x99, 0xB2, 0xF2),
            Self::Yellow => (0xDE, 0xDE, 0x6C),
            Self::Lime => (0x7F, 0xCC, 0x19),
            Self::Pink => (0xF2, 0xB2, 0xCC),
            Self::Gray => (0x4C, 0x4C, 0x4C),
            Self::LightGray => (0x99, 0x99, 0x99),
            Self::Cyan => (0x4C, 0x99, 0xB2),
            Self::Purple => (0xB2, 0x66, 0xE5),
            Self::Blue => (0x33, 0x66, 0xCC),
            Self::Brown => (0x7F, 0x66, 0x4C),
            Self::Green => (0x57, 0xA6, 0x4E),
            Self::Red => (0xCC, 0x4C, 0x4C),
            Self::Black => (0x11, 0x11, 0x11),
        }
    }

    /// Terminal colour used when a grid is written out as ANSI text.
    pub fn to_crossterm(self) -> crossterm::style::Color {
        let (r, g, b) = self.rgb();
        crossterm::style::Color::Rgb { r, g, b }
    }
}

/// Palette defaults plus configured alias names.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub foreground: Color,
    pub background: Color,
    aliases: HashMap<String, Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            background: Color::Black,
            aliases: HashMap::new(),
        }
    }
}

impl Palette {
    pub fn from_config(config: &PaletteConfig) -> Self {
        let foreground = Color::from_name(&config.foreground).unwrap_or_else(|| {
            tracing::warn!(name = %config.foreground, "unknown default foreground, using white");
            Color::White
        });
        let background = Color::from_name(&config.background).unwrap_or_else(|| {
            tracing::warn!(name = %config.background, "unknown default background, using black");
            Color::Black
        });

        let mut aliases = HashMap::new();
        for (alias, target) in &config.aliases {
            match Color::from_name(target) {
                Some(color) => {
                    aliases.insert(alias.to_ascii_lowercase(), color);
                }
                None => tracing::warn!(%alias, %target, "colour alias targets unknown name, ignored"),
            }
        }

        Self {
            foreground,
            background,
            aliases,
        }
    }

    /// Palette or alias lookup without fallback.
    pub fn lookup(&self, name: &str) -> Option<Color> {
        Color::from_name(name).or_else(|| {
            self.aliases
                .get(&name.trim().to_ascii_lowercase())
                .copied()
        })
    }

    /// Foreground for `name`; `reset` and unknown names give the default.
    pub fn resolve_fg(&self, name: &str) -> Color {
        self.lookup(name).unwrap_or(self.foreground)
    }

    /// Background for `name`; `reset` and unknown names give the default.
    pub fn resolve_bg(&self, name: &str) -> Color {
        self.lookup(name).unwrap_or(self.background)
    }
}
