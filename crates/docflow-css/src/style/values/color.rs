//! CSS Color values and parsing
//!
//! [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)

use serde::Serialize;

use super::length::parse_number;
use super::split_components;

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorValue {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

impl ColorValue {
    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White (#ffffff)
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Opaque color from channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    /// "The syntax of a <hex-color> is a <hash-token> token whose value consists of
    /// 3, 4, 6, or 8 hexadecimal digits."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let digits: Vec<u8> = match hex.len() {
            // "The three-digit RGB notation (#RGB) is converted into six-digit form (#RRGGBB)
            // by replicating digits, not by adding zeros."
            3 | 4 => hex
                .chars()
                .map(|c| u8::from_str_radix(&c.to_string().repeat(2), 16).ok())
                .collect::<Option<_>>()?,
            6 | 8 => (0..hex.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
                .collect::<Option<_>>()?,
            _ => return None,
        };
        Some(Self {
            r: digits[0],
            g: digits[1],
            b: digits[2],
            a: digits.get(3).copied().unwrap_or(255),
        })
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    ///
    /// The sixteen HTML colors plus the extended keywords that show up most in
    /// authored documents.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let (r, g, b) = match name.to_ascii_lowercase().as_str() {
            "transparent" => return Some(Self::TRANSPARENT),
            "black" => (0, 0, 0),
            "silver" => (192, 192, 192),
            "gray" | "grey" => (128, 128, 128),
            "white" => (255, 255, 255),
            "maroon" => (128, 0, 0),
            "red" => (255, 0, 0),
            "purple" => (128, 0, 128),
            "fuchsia" | "magenta" => (255, 0, 255),
            "green" => (0, 128, 0),
            "lime" => (0, 255, 0),
            "olive" => (128, 128, 0),
            "yellow" => (255, 255, 0),
            "navy" => (0, 0, 128),
            "blue" => (0, 0, 255),
            "teal" => (0, 128, 128),
            "aqua" | "cyan" => (0, 255, 255),
            "orange" => (255, 165, 0),
            "pink" => (255, 192, 203),
            "brown" => (165, 42, 42),
            "gold" => (255, 215, 0),
            "indigo" => (75, 0, 130),
            "violet" => (238, 130, 238),
            "darkgray" | "darkgrey" => (169, 169, 169),
            "lightgray" | "lightgrey" => (211, 211, 211),
            "dimgray" | "dimgrey" => (105, 105, 105),
            "whitesmoke" => (245, 245, 245),
            "gainsboro" => (220, 220, 220),
            "darkblue" => (0, 0, 139),
            "darkred" => (139, 0, 0),
            "darkgreen" => (0, 100, 0),
            "lightblue" => (173, 216, 230),
            "lightgreen" => (144, 238, 144),
            "lightyellow" => (255, 255, 224),
            "steelblue" => (70, 130, 180),
            "slategray" | "slategrey" => (112, 128, 144),
            "crimson" => (220, 20, 60),
            "tomato" => (255, 99, 71),
            "beige" => (245, 245, 220),
            "ivory" => (255, 255, 240),
            "aliceblue" => (240, 248, 255),
            _ => return None,
        };
        Some(Self::rgb(r, g, b))
    }

    /// Convert to hex string notation (#RRGGBB or #RRGGBBAA if alpha != 255)
    ///
    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Parse a color. `currentcolor` is not handled here: it depends on the
/// element's `color`, which the caller knows.
#[must_use]
pub fn parse_color(text: &str) -> Option<ColorValue> {
    let text = text.trim();
    if text.starts_with('#') {
        return ColorValue::from_hex(text);
    }
    if let Some(open) = text.find('(') {
        let inner = text[open + 1..].strip_suffix(')')?;
        return parse_color_function(&text[..open], inner);
    }
    ColorValue::from_named(text)
}

/// [§ 4.1 The RGB Functions: rgb() and rgba()](https://www.w3.org/TR/css-color-4/#rgb-functions)
/// [§ 7.1 The HSL Functions: hsl() and hsla()](https://www.w3.org/TR/css-color-4/#the-hsl-notation)
///
/// "For legacy reasons, rgb() also supports an alternate syntax that
/// separates all of its arguments with commas."
fn parse_color_function(name: &str, args: &str) -> Option<ColorValue> {
    let normalized = args.replace([',', '/'], " ");
    let parts = split_components(&normalized);
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let alpha = match parts.get(3) {
        Some(a) => channel(a, 1.0)?,
        None => 1.0,
    };
    let (r, g, b) = match name.trim().to_ascii_lowercase().as_str() {
        "rgb" | "rgba" => (
            channel(parts[0], 255.0)?,
            channel(parts[1], 255.0)?,
            channel(parts[2], 255.0)?,
        ),
        "hsl" | "hsla" => {
            let hue = parse_number(parts[0].trim_end_matches("deg"))?;
            let sat = channel(parts[1], 1.0)?;
            let light = channel(parts[2], 1.0)?;
            let (r, g, b) = hsl_to_rgb(hue, sat, light);
            (r * 255.0, g * 255.0, b * 255.0)
        }
        _ => return None,
    };
    Some(ColorValue {
        r: to_byte(r),
        g: to_byte(g),
        b: to_byte(b),
        a: to_byte(alpha * 255.0),
    })
}

/// A number in `0..=scale` or a percentage of `scale`.
fn channel(text: &str, scale: f32) -> Option<f32> {
    let value = match text.strip_suffix('%') {
        Some(pct) => parse_number(pct)? * scale / 100.0,
        None => parse_number(text)?,
    };
    Some(value.clamp(0.0, scale))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_byte(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// [§ 7.1 Converting HSL colors to sRGB](https://www.w3.org/TR/css-color-4/#hsl-to-rgb)
fn hsl_to_rgb(hue: f32, sat: f32, light: f32) -> (f32, f32, f32) {
    let hue = hue.rem_euclid(360.0);
    let f = |n: f32| {
        let k = (n + hue / 30.0) % 12.0;
        let a = sat * light.min(1.0 - light);
        light - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
    };
    (f(0.0), f(8.0), f(4.0))
}
