//! Nearest-name lookup for dominant colors.
//!
//! Plain Euclidean distance in sRGB against a fixed 12-entry palette. The
//! palette and its order are part of the output contract: on equal distance
//! the entry listed first wins.

use serde::{Deserialize, Serialize};

/// An 8-bit sRGB triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Build from possibly fractional or out-of-range channel values.
    ///
    /// Each channel is rounded to the nearest integer and clamped to
    /// [0,255]; non-finite values map to 0.
    pub fn from_channels(red: f64, green: f64, blue: f64) -> Self {
        Self::new(channel(red), channel(green), channel(blue))
    }

    fn squared_distance(self, other: Rgb) -> u32 {
        let d = |a: u8, b: u8| {
            let diff = i32::from(a) - i32::from(b);
            (diff * diff) as u32
        };
        d(self.red, other.red) + d(self.green, other.green) + d(self.blue, other.blue)
    }
}

fn channel(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedColor {
    pub name: &'static str,
    pub rgb: Rgb,
}

const fn named(name: &'static str, red: u8, green: u8, blue: u8) -> NamedColor {
    NamedColor {
        name,
        rgb: Rgb::new(red, green, blue),
    }
}

/// Reference palette, in tie-break order.
pub static PALETTE: [NamedColor; 12] = [
    named("black", 0, 0, 0),
    named("white", 255, 255, 255),
    named("red", 255, 0, 0),
    named("green", 0, 255, 0),
    named("blue", 0, 0, 255),
    named("yellow", 255, 255, 0),
    named("purple", 128, 0, 128),
    named("pink", 255, 192, 203),
    named("brown", 165, 42, 42),
    named("gray", 128, 128, 128),
    named("navy", 0, 0, 128),
    named("beige", 245, 245, 220),
];

/// Closest palette entry and its Euclidean distance from `rgb`.
pub fn nearest_color(rgb: Rgb) -> (&'static NamedColor, f64) {
    let mut best = &PALETTE[0];
    let mut best_distance = rgb.squared_distance(best.rgb);
    for entry in &PALETTE[1..] {
        let distance = rgb.squared_distance(entry.rgb);
        // strict: earlier entries keep ties
        if distance < best_distance {
            best = entry;
            best_distance = distance;
        }
    }
    (best, f64::from(best_distance).sqrt())
}

pub fn color_name(rgb: Rgb) -> &'static str {
    nearest_color(rgb).0.name
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn exact_palette_entries_name_themselves() {
        for entry in &PALETTE {
            let (found, distance) = nearest_color(entry.rgb);
            assert_eq!(found.name, entry.name);
            assert_eq!(distance, 0.0);
        }
    }

    #[rstest]
    #[case(Rgb::new(10, 10, 10), "black")]
    #[case(Rgb::new(250, 250, 240), "white")]
    #[case(Rgb::new(200, 30, 30), "brown")]
    #[case(Rgb::new(240, 240, 215), "beige")]
    #[case(Rgb::new(20, 20, 140), "navy")]
    #[case(Rgb::new(250, 180, 200), "pink")]
    #[case(Rgb::new(120, 130, 125), "gray")]
    fn approximate_colors(#[case] rgb: Rgb, #[case] expected: &str) {
        assert_eq!(color_name(rgb), expected);
    }

    #[test]
    fn equidistant_point_resolves_to_first_listed() {
        // (0,0,64) is 64 from black and 64 from navy
        let (found, distance) = nearest_color(Rgb::new(0, 0, 64));
        assert_eq!(found.name, "black");
        assert_relative_eq!(distance, 64.0);
    }

    #[test]
    fn out_of_range_channels_are_clamped() {
        assert_eq!(color_name(Rgb::from_channels(-40.0, -1.0, -300.0)), "black");
        assert_eq!(color_name(Rgb::from_channels(999.0, 0.0, 0.0)), "red");
        assert_eq!(Rgb::from_channels(300.2, -5.0, f64::NAN), Rgb::new(255, 0, 0));
    }

    #[test]
    fn non_finite_channels_become_zero() {
        assert_eq!(
            Rgb::from_channels(f64::INFINITY, f64::NEG_INFINITY, 128.0),
            Rgb::new(0, 0, 128)
        );
    }

    #[test]
    fn fractional_channels_round_to_nearest() {
        assert_eq!(Rgb::from_channels(12.5, 12.49, 0.51), Rgb::new(13, 12, 1));
    }

    #[test]
    fn lookup_is_deterministic() {
        let rgb = Rgb::new(77, 140, 201);
        let first = color_name(rgb);
        for _ in 0..10 {
            assert_eq!(color_name(rgb), first);
        }
    }
}
