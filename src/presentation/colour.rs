//! Linear RGB interpolation for tier tinting.

use std::fmt;
use std::str::FromStr;

use crate::types::DraftError;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Blend towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(&self, other: &Rgb, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| -> u8 {
            (a as f64 + t * (b as f64 - a as f64))
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

/// CSS functional notation: `rgb(r,g,b)`.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Parse the first three runs of decimal digits: `rgb(1, 2, 3)`, `1,2,3`.
impl FromStr for Rgb {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components: Vec<&str> = s
            .split(|c: char| !c.is_ascii_digit())
            .filter(|part| !part.is_empty())
            .collect();

        let &[r, g, b] = components.as_slice() else {
            return Err(DraftError::InvalidInput(format!(
                "colour '{s}' does not have exactly three components"
            )));
        };

        let channel = |v: &str| {
            v.parse::<u8>().map_err(|_| {
                DraftError::InvalidInput(format!("colour '{s}' has a component above 255"))
            })
        };
        Ok(Rgb::new(channel(r)?, channel(g)?, channel(b)?))
    }
}

/// Colour for `value` on a linear scale from `min_colour` at `min` to
/// `max_colour` at `max`, as a CSS `rgb(...)` string.
///
/// Values outside the domain clamp to the end colours. An empty or
/// inverted domain (`max <= min`) yields `min_colour`.
pub fn interpolate_rgb_colour(
    min_colour: &str,
    max_colour: &str,
    min: f64,
    max: f64,
    value: f64,
) -> Result<String, DraftError> {
    let from: Rgb = min_colour.parse()?;
    let to: Rgb = max_colour.parse()?;

    let span = max - min;
    if span.is_nan() || span <= 0.0 {
        return Ok(from.to_string());
    }
    Ok(from.lerp(&to, (value - min) / span).to_string())
}
