use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{GifStackError, GifStackResult};

/// Straight-alpha RGBA8 color.
///
/// Parses the CSS-like syntaxes accepted as color sources: `#rgb`, `#rrggbb`, `#rrggbbaa`,
/// `rgb(r, g, b)`, `rgba(r, g, b, a)` (alpha in `0..=1`) and a small set of named colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels as `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Premultiplied `[r, g, b, a]`.
    pub fn to_premul_array(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| -> u8 { (((u16::from(c) * a) + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }

    /// Same color with `a` replaced.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse any supported color syntax.
    pub fn parse(s: &str) -> GifStackResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(GifStackError::invalid_param("color must be non-empty"));
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).map_err(GifStackError::invalid_param);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(body) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            let body = body.strip_suffix(')').ok_or_else(|| {
                GifStackError::invalid_param(format!("unterminated color function \"{s}\""))
            })?;
            return parse_rgb_fn(body).map_err(GifStackError::invalid_param);
        }
        named(&lower)
            .ok_or_else(|| GifStackError::invalid_param(format!("unrecognized color \"{s}\"")))
    }
}

impl FromStr for Color {
    type Err = GifStackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Arr(Vec<u8>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                )),
            },
        }
    }
}

fn parse_hex(s: &str) -> Result<Color, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }
    fn hex_nibble(c: &str) -> Result<u8, String> {
        let v = u8::from_str_radix(c, 16).map_err(|_| format!("invalid hex digit \"{c}\""))?;
        Ok(v * 17)
    }

    if !s.is_ascii() {
        return Err("hex color must be ASCII".to_owned());
    }
    match s.len() {
        3 => Ok(Color::rgb(
            hex_nibble(&s[0..1])?,
            hex_nibble(&s[1..2])?,
            hex_nibble(&s[2..3])?,
        )),
        6 => Ok(Color::rgb(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        8 => Ok(Color::rgba(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err("hex color must be #RGB, #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned()),
    }
}

fn parse_rgb_fn(body: &str) -> Result<Color, String> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let channel = |p: &str| -> Result<u8, String> {
        p.parse::<u8>()
            .map_err(|_| format!("color channel \"{p}\" must be an integer in 0..=255"))
    };
    match parts.as_slice() {
        [r, g, b] => Ok(Color::rgb(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => {
            let a: f64 = a
                .parse()
                .map_err(|_| format!("alpha \"{a}\" must be a number in 0..=1"))?;
            if !(0.0..=1.0).contains(&a) {
                return Err(format!("alpha {a} must be in 0..=1"));
            }
            Ok(Color::rgba(
                channel(r)?,
                channel(g)?,
                channel(b)?,
                (a * 255.0).round() as u8,
            ))
        }
        _ => Err("rgb()/rgba() take 3 or 4 comma-separated values".to_owned()),
    }
}

fn named(name: &str) -> Option<Color> {
    let c = match name {
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "transparent" => Color::TRANSPARENT,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" | "aqua" => Color::rgb(0, 255, 255),
        "magenta" | "fuchsia" => Color::rgb(255, 0, 255),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "pink" => Color::rgb(255, 192, 203),
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
