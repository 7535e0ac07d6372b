//! Colour literals.
//!
//! Style values express colours in the usual web-ish notations:
//!
//! - `#rgb` / `#rgba` (each digit doubled)
//! - `#rrggbb` / `#rrggbbaa` (short forms padded with `F`)
//! - `rgb(r, g, b)` / `rgba(r, g, b, a)` with `a` in `0.0..=1.0`
//! - `hsl(h, s%, l%)` / `hsla(h, s%, l%, a)`
//! - a named colour such as `cornflowerblue`
//!
//! A malformed literal never fails the cascade; conversion just yields no
//! value and the caller keeps its default.

use crate::tree::{FromValue, IntoValue, Value};

/// A 32-bit ARGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    /// Build an opaque colour from channel bytes.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(0xFF, r, g, b)
    }

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Parse any supported colour notation. Returns `None` for anything
    /// malformed.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(args) = strip_function(text, "rgba").or_else(|| strip_function(text, "rgb")) {
            return parse_rgb(&args);
        }
        if let Some(args) = strip_function(text, "hsla").or_else(|| strip_function(text, "hsl")) {
            return parse_hsl(&args);
        }

        named_color(text)
    }
}

impl FromValue for Color {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Color::parse(s),
            // A bare number is taken as a packed ARGB word.
            Value::Number(n) if *n >= 0.0 && *n <= u32::MAX as f64 => Some(Color(*n as u32)),
            _ => None,
        }
    }
}

impl IntoValue for Color {
    fn into_value(self) -> Value {
        Value::String(format!("#{:08X}", self.0))
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        // Short forms double each digit: #123 is #112233.
        3 => Some(Color::argb(
            0xFF,
            digit(0)? * 17,
            digit(1)? * 17,
            digit(2)? * 17,
        )),
        4 => Some(Color::argb(
            digit(3)? * 17,
            digit(0)? * 17,
            digit(1)? * 17,
            digit(2)? * 17,
        )),
        6 => Some(Color::argb(0xFF, byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::argb(byte(6)?, byte(0)?, byte(2)?, byte(4)?)),
        _ => None,
    }
}

/// Strip `name(` and the closing `)`, returning the argument text.
fn strip_function<'a>(text: &'a str, name: &str) -> Option<String> {
    let rest = text.strip_prefix(name)?.trim_start();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner.to_string())
}

fn parse_rgb(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        let n: f64 = s.parse().ok()?;
        (0.0..=255.0).contains(&n).then(|| n.round() as u8)
    };

    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = match parts.get(3) {
        Some(s) => {
            let alpha: f64 = s.parse().ok()?;
            (0.0..=1.0).contains(&alpha).then(|| (alpha * 255.0).round() as u8)?
        }
        None => 0xFF,
    };

    Some(Color::argb(a, r, g, b))
}

fn parse_hsl(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let hue: f64 = parts[0].parse().ok()?;
    let saturation: f64 = parts[1].strip_suffix('%')?.parse().ok()?;
    let lightness: f64 = parts[2].strip_suffix('%')?.parse().ok()?;
    let alpha = match parts.get(3) {
        Some(s) => {
            let a: f64 = s.parse().ok()?;
            (0.0..=1.0).contains(&a).then_some(a)?
        }
        None => 1.0,
    };

    let h = hue.rem_euclid(360.0) / 360.0;
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let l = (lightness / 100.0).clamp(0.0, 1.0);

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = chroma * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = l - chroma / 2.0;

    let (r, g, b) = match (h * 6.0) as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let to_byte = |v: f64| ((v + m) * 255.0).round() as u8;
    Some(Color::argb(
        (alpha * 255.0).round() as u8,
        to_byte(r),
        to_byte(g),
        to_byte(b),
    ))
}

fn named_color(name: &str) -> Option<Color> {
    let lower = name.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, argb)| Color(*argb))
}

/// The common web colour names.
const NAMED_COLORS: &[(&str, u32)] = &[
    ("aqua", 0xFF00FFFF),
    ("black", 0xFF000000),
    ("blue", 0xFF0000FF),
    ("cornflowerblue", 0xFF6495ED),
    ("crimson", 0xFFDC143C),
    ("cyan", 0xFF00FFFF),
    ("darkgrey", 0xFFA9A9A9),
    ("fuchsia", 0xFFFF00FF),
    ("gold", 0xFFFFD700),
    ("gray", 0xFF808080),
    ("green", 0xFF008000),
    ("grey", 0xFF808080),
    ("lightgrey", 0xFFD3D3D3),
    ("lime", 0xFF00FF00),
    ("magenta", 0xFFFF00FF),
    ("maroon", 0xFF800000),
    ("navy", 0xFF000080),
    ("olive", 0xFF808000),
    ("orange", 0xFFFFA500),
    ("pink", 0xFFFFC0CB),
    ("purple", 0xFF800080),
    ("red", 0xFFFF0000),
    ("silver", 0xFFC0C0C0),
    ("teal", 0xFF008080),
    ("tomato", 0xFFFF6347),
    ("transparent", 0x00000000),
    ("white", 0xFFFFFFFF),
    ("yellow", 0xFFFFFF00),
];
