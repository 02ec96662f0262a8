//! RGBA color values and the channel edits the encoding passes need
//!
//! Colors arrive as hex strings in option documents and leave as resolved
//! `Rgba` values on node/item visuals. The two HSL edits (saturation
//! replacement, alpha replacement) are what border derivation and the
//! `colorSaturation`/`colorAlpha` attributes are built on.

use std::fmt;
use std::str::FromStr;

use serde::de::{Deserializer, Error as DeError};
use serde::Deserialize;

use crate::error::VisualError;

/// An RGB color with 8-bit channels and a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

/// HSL representation: h in degrees [0, 360), s and l in [0.0, 1.0].
#[derive(Debug, Clone, Copy)]
struct Hsl {
    h: f64,
    s: f64,
    l: f64,
}

impl Rgba {
    /// Opaque color from RGB channels.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }

    /// Parse a hex color string to an `Rgba`.
    ///
    /// Supports formats:
    /// - `#RRGGBB` (6 hex digits)
    /// - `#RRGGBBAA` (8 hex digits)
    /// - `RRGGBB` / `RRGGBBAA` (without #)
    pub fn parse(hex: &str) -> Option<Rgba> {
        let hex = hex.trim_start_matches('#');

        if hex.len() != 6 && hex.len() != 8 {
            eprintln!("WARN: Invalid hex color length '{}': {}", hex, hex.len());
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        let a = if hex.len() == 8 {
            u8::from_str_radix(&hex[6..8], 16).ok()? as f64 / 255.0
        } else {
            1.0
        };

        Some(Rgba { r, g, b, a })
    }

    /// Replace the HSL saturation channel, keeping hue, lightness and alpha.
    ///
    /// The value is clamped to [0, 1]; negative saturations fully desaturate.
    pub fn with_saturation(self, saturation: f64) -> Rgba {
        let mut hsl = self.to_hsl();
        hsl.s = saturation.clamp(0.0, 1.0);
        let mut out = Rgba::from_hsl(hsl);
        out.a = self.a;
        out
    }

    /// Replace the alpha channel, clamped to [0, 1].
    pub fn with_alpha(self, alpha: f64) -> Rgba {
        Rgba {
            a: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    fn to_hsl(self) -> Hsl {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return Hsl { h: 0.0, s: 0.0, l };
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let mut h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        h /= 6.0;

        Hsl { h: h * 360.0, s, l }
    }

    fn from_hsl(hsl: Hsl) -> Rgba {
        let h = (hsl.h / 360.0).rem_euclid(1.0);
        let s = hsl.s.clamp(0.0, 1.0);
        let l = hsl.l.clamp(0.0, 1.0);

        if s == 0.0 {
            let v = (l * 255.0).round() as u8;
            return Rgba::rgb(v, v, v);
        }

        fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                return p + (q - p) * 6.0 * t;
            }
            if t < 1.0 / 2.0 {
                return q;
            }
            if t < 2.0 / 3.0 {
                return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
            }
            p
        }

        let q = if l < 0.5 {
            l * (1.0 + s)
        } else {
            l + s - l * s
        };
        let p = 2.0 * l - q;

        Rgba {
            r: (hue_to_channel(p, q, h + 1.0 / 3.0) * 255.0).round() as u8,
            g: (hue_to_channel(p, q, h) * 255.0).round() as u8,
            b: (hue_to_channel(p, q, h - 1.0 / 3.0) * 255.0).round() as u8,
            a: 1.0,
        }
    }

    /// Linear interpolation between two colors at position t ∈ [0, 1].
    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a * (1.0 - t) + other.a * t,
        }
    }
}

/// Interpolate a color from a stop list at position t ∈ [0, 1].
///
/// t=0 returns the first stop, t=1 the last. Positions in between are
/// linearly interpolated between the two surrounding stops. Empty stop
/// lists yield a gray fallback; callers are expected to reject empty
/// ranges before mapping.
pub fn interpolate_stops(stops: &[Rgba], t: f64) -> Rgba {
    if stops.is_empty() {
        return Rgba::rgb(128, 128, 128);
    }

    let t = t.clamp(0.0, 1.0);
    let n = stops.len();
    if n == 1 {
        return stops[0];
    }

    let pos = t * (n - 1) as f64;
    let idx_low = pos.floor() as usize;
    let idx_high = (idx_low + 1).min(n - 1);
    let frac = pos - idx_low as f64;

    stops[idx_low].lerp(stops[idx_high], frac)
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r,
                self.g,
                self.b,
                (self.a * 255.0).round() as u8
            )
        }
    }
}

impl FromStr for Rgba {
    type Err = VisualError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgba::parse(s).ok_or_else(|| VisualError::InvalidColor(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(DeError::custom)
    }
}
