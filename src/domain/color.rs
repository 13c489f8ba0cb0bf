use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 24-bit ANSI background escape, for terminal rendering.
    pub fn ansi_background(&self) -> String {
        format!("\x1b[48;2;{};{};{}m", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

// Light and saturated pastel green endpoints for the upper half-range.
const GREEN_LIGHT: (f64, f64, f64) = (230.0, 244.0, 239.0);
const GREEN_DROP: (f64, f64, f64) = (51.0, 20.0, 30.0);
const RED_DROP: f64 = 51.0;

/// Cell background for a 1-5 score. Low scores fade from pastel red to
/// white at 3, high scores deepen from light to saturated pastel green.
/// Zero means "not rated" and renders white.
pub fn score_color(score: u8) -> Rgb {
    if score < 1 {
        return Rgb::WHITE;
    }
    let score = f64::from(score.min(5));

    if score <= 3.0 {
        let intensity = (3.0 - score) / 2.0;
        let gb = channel(255.0 - intensity * RED_DROP);
        Rgb::new(255, gb, gb)
    } else {
        let intensity = (score - 3.0) / 2.0;
        Rgb::new(
            channel(GREEN_LIGHT.0 - intensity * GREEN_DROP.0),
            channel(GREEN_LIGHT.1 - intensity * GREEN_DROP.1),
            channel(GREEN_LIGHT.2 - intensity * GREEN_DROP.2),
        )
    }
}

pub fn cell_color(score: Option<u8>) -> Rgb {
    score.map(score_color).unwrap_or(Rgb::WHITE)
}

fn channel(value: f64) -> u8 {
    value.floor().clamp(0.0, 255.0) as u8
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub caption: &'static str,
    pub color: Rgb,
}

pub fn legend() -> Vec<LegendEntry> {
    vec![
        LegendEntry {
            caption: "낮음 (1-2점)",
            color: score_color(1),
        },
        LegendEntry {
            caption: "중간 (3점)",
            color: score_color(3),
        },
        LegendEntry {
            caption: "높음 (4-5점)",
            color: score_color(5),
        },
    ]
}
