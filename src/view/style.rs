use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};

pub const LABEL_MIN_LINE_LENGTH: f64 = 15.0;
pub const LABEL_MAX_LINE_LENGTH: f64 = 30.0;
pub const LABEL_LINES_TARGET: f64 = 3.0;

const BRIGHTER: f64 = 1.0 / 0.7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    fn from_channels(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
        }
    }

    /// Scales every channel up for contrast against a light background.
    pub fn brighter(self) -> Self {
        Self::from_channels(
            self.r as f64 * BRIGHTER,
            self.g as f64 * BRIGHTER,
            self.b as f64 * BRIGHTER,
        )
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, 255.0) as u8
    }
}

/// Cyclic cubehelix rainbow; `t` wraps into `[0, 1]`.
pub fn rainbow(t: f64) -> Rgb {
    const A: f64 = -0.14861;
    const B: f64 = 1.78277;
    const C: f64 = -0.29227;
    const D: f64 = -0.90649;
    const E: f64 = 1.97294;

    let t = if (0.0..=1.0).contains(&t) {
        t
    } else {
        t - t.floor()
    };
    let ts = (t - 0.5).abs();
    let hue = 360.0 * t - 100.0;
    let saturation = 1.5 - 1.5 * ts;
    let lightness = 0.8 - 0.9 * ts;

    let angle = (hue + 120.0).to_radians();
    let amplitude = saturation * lightness * (1.0 - lightness);
    let (sin, cos) = angle.sin_cos();

    Rgb::from_channels(
        255.0 * (lightness + amplitude * (A * cos + B * sin)),
        255.0 * (lightness + amplitude * (C * cos + D * sin)),
        255.0 * (lightness + amplitude * (E * cos)),
    )
}

/// Gives each distinct type a colour spaced evenly around the rainbow.
///
/// Types are ordered ordinally first, so the mapping depends only on the set
/// of types, not on the order they were seen in.
pub fn assign_colors<'a, I>(types: I) -> BTreeMap<String, Rgb>
where
    I: IntoIterator<Item = &'a str>,
{
    let distinct = types.into_iter().collect::<BTreeSet<_>>();
    let count = distinct.len() as f64;

    distinct
        .into_iter()
        .enumerate()
        .map(|(ordinal, node_type)| {
            (
                node_type.to_string(),
                rainbow(ordinal as f64 / count).brighter(),
            )
        })
        .collect()
}

/// Breaks a node label into display lines of roughly a third of its length.
pub fn wrap_label(name: &str) -> Vec<String> {
    let max_line_length = (name.chars().count() as f64 / LABEL_LINES_TARGET)
        .clamp(LABEL_MIN_LINE_LENGTH, LABEL_MAX_LINE_LENGTH);

    let mut lines: Vec<String> = Vec::new();
    for word in name.replace('-', "- ").split(' ').filter(|word| !word.is_empty()) {
        match lines.last_mut() {
            Some(line)
                if (line.chars().count() + 1 + word.chars().count()) as f64
                    <= max_line_length =>
            {
                line.push(' ');
                line.push_str(word);
            }
            _ => lines.push(word.to_string()),
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
