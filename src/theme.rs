//! The catalog of visual themes an invitation can use.
//!
//! Both theme kinds are closed enums, every variant resolves to a descriptor
//! through an exhaustive match. Unknown theme names are rejected while parsing.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rorm::DbEnum;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The background color scheme of an invitation
#[derive(DbEnum, Serialize, Deserialize, ToSchema, Copy, Clone, Debug, Default, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    /// Blue to violet
    #[default]
    #[serde(alias = "roxo")]
    Purple,
    /// Light pink to coral
    #[serde(alias = "rosa")]
    Pink,
    /// Sky blue to cyan
    #[serde(alias = "azul")]
    Blue,
    /// Green to turquoise
    #[serde(alias = "verde")]
    Green,
    /// Rose to yellow
    #[serde(alias = "laranja")]
    Orange,
    /// Mint to light pink
    Pastel,
}

impl ColorTheme {
    /// All available color themes
    pub const ALL: [ColorTheme; 6] = [
        ColorTheme::Purple,
        ColorTheme::Pink,
        ColorTheme::Blue,
        ColorTheme::Green,
        ColorTheme::Orange,
        ColorTheme::Pastel,
    ];

    /// The identifier used in forms and the API
    pub fn name(self) -> &'static str {
        match self {
            ColorTheme::Purple => "purple",
            ColorTheme::Pink => "pink",
            ColorTheme::Blue => "blue",
            ColorTheme::Green => "green",
            ColorTheme::Orange => "orange",
            ColorTheme::Pastel => "pastel",
        }
    }

    /// The css gradient used as page background and accent
    pub fn gradient(self) -> &'static str {
        match self {
            ColorTheme::Purple => "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
            ColorTheme::Pink => "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
            ColorTheme::Blue => "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)",
            ColorTheme::Green => "linear-gradient(135deg, #43e97b 0%, #38f9d7 100%)",
            ColorTheme::Orange => "linear-gradient(135deg, #fa709a 0%, #fee140 100%)",
            ColorTheme::Pastel => "linear-gradient(135deg, #a8edea 0%, #fed6e3 100%)",
        }
    }
}

impl FromStr for ColorTheme {
    type Err = UnknownThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "purple" | "roxo" => Ok(ColorTheme::Purple),
            "pink" | "rosa" => Ok(ColorTheme::Pink),
            "blue" | "azul" => Ok(ColorTheme::Blue),
            "green" | "verde" => Ok(ColorTheme::Green),
            "orange" | "laranja" => Ok(ColorTheme::Orange),
            "pastel" => Ok(ColorTheme::Pastel),
            _ => Err(UnknownThemeError::Color(s.to_string())),
        }
    }
}

impl Display for ColorTheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The typeface family of an invitation
#[derive(DbEnum, Serialize, Deserialize, ToSchema, Copy, Clone, Debug, Default, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum FontTheme {
    /// Serif
    #[default]
    #[serde(alias = "elegante")]
    Elegant,
    /// Sans serif
    #[serde(alias = "moderna")]
    Modern,
    /// Handwriting
    #[serde(alias = "divertida")]
    Playful,
}

impl FontTheme {
    /// All available font themes
    pub const ALL: [FontTheme; 3] = [FontTheme::Elegant, FontTheme::Modern, FontTheme::Playful];

    /// The identifier used in forms and the API
    pub fn name(self) -> &'static str {
        match self {
            FontTheme::Elegant => "elegant",
            FontTheme::Modern => "modern",
            FontTheme::Playful => "playful",
        }
    }

    /// The css `font-family` value
    pub fn font_stack(self) -> &'static str {
        match self {
            FontTheme::Elegant => "'Times New Roman', serif",
            FontTheme::Modern => "'Arial', sans-serif",
            FontTheme::Playful => "'Comic Sans MS', cursive",
        }
    }
}

impl FromStr for FontTheme {
    type Err = UnknownThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "elegant" | "elegante" => Ok(FontTheme::Elegant),
            "modern" | "moderna" => Ok(FontTheme::Modern),
            "playful" | "divertida" => Ok(FontTheme::Playful),
            _ => Err(UnknownThemeError::Font(s.to_string())),
        }
    }
}

impl Display for FontTheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A theme name that is not part of the catalog
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum UnknownThemeError {
    /// Unknown color theme
    Color(String),
    /// Unknown font theme
    Font(String),
}

impl Display for UnknownThemeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UnknownThemeError::Color(name) => write!(f, "Unknown color theme: {name}"),
            UnknownThemeError::Font(name) => write!(f, "Unknown font theme: {name}"),
        }
    }
}

impl std::error::Error for UnknownThemeError {}
