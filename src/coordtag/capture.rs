//! Capture variants and their fixed-precision wire format.
//!
//! A capture is one recorded position or area bound to a tag and a map.
//! The on-disk format is the single source of truth: comma-joined decimal
//! fields with exactly one fractional digit, half-up rounding, no trailing
//! separator. Points carry five fields (`x,y,z,yaw,pitch`), areas carry
//! six (two corners).

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Whether a tag records single positions or bounding areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    Point,
    Area,
}

impl TagMode {
    pub fn label(self) -> &'static str {
        match self {
            TagMode::Point => "point",
            TagMode::Area => "area",
        }
    }
}

/// One recorded capture.
#[derive(Debug, Clone, PartialEq)]
pub enum Capture {
    /// A position with orientation.
    Point {
        x: f64,
        y: f64,
        z: f64,
        yaw: f32,
        pitch: f32,
    },
    /// An axis-aligned bounding region between two corner points.
    Area {
        corner1: (f64, f64, f64),
        corner2: (f64, f64, f64),
    },
}

impl Capture {
    pub fn mode(&self) -> TagMode {
        match self {
            Capture::Point { .. } => TagMode::Point,
            Capture::Area { .. } => TagMode::Area,
        }
    }

    /// Serialize to the fixed wire format.
    pub fn serialize(&self) -> String {
        let fields: Vec<String> = match *self {
            Capture::Point { x, y, z, yaw, pitch } => [x, y, z, f64::from(yaw), f64::from(pitch)]
                .iter()
                .map(|v| fixed1(*v))
                .collect(),
            Capture::Area { corner1, corner2 } => {
                [corner1.0, corner1.1, corner1.2, corner2.0, corner2.1, corner2.2]
                    .iter()
                    .map(|v| fixed1(*v))
                    .collect()
            }
        };
        fields.join(",")
    }

    /// Parse the wire format back into a capture of the given mode.
    pub fn deserialize(mode: TagMode, text: &str) -> Result<Capture> {
        let fields = parse_fields(text)?;
        match (mode, fields.as_slice()) {
            (TagMode::Point, &[x, y, z, yaw, pitch]) => Ok(Capture::Point {
                x,
                y,
                z,
                yaw: yaw as f32,
                pitch: pitch as f32,
            }),
            (TagMode::Area, &[x1, y1, z1, x2, y2, z2]) => Ok(Capture::Area {
                corner1: (x1, y1, z1),
                corner2: (x2, y2, z2),
            }),
            _ => Err(GameError::faulty(format!(
                "capture '{}' has {} fields, expected {} for a {} tag",
                text,
                fields.len(),
                match mode {
                    TagMode::Point => 5,
                    TagMode::Area => 6,
                },
                mode.label()
            ))),
        }
    }
}

fn parse_fields(text: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(|field| {
            field
                .trim()
                .parse::<f64>()
                .map_err(|_| GameError::faulty(format!("capture field '{}' is not a number", field)))
        })
        .collect()
}

/// Round half-up to one decimal place and format with exactly one
/// fractional digit. `format!("{:.1}")` alone rounds half-to-even, which
/// would not match the persisted corpus.
fn fixed1(v: f64) -> String {
    let scaled = (v * 10.0).round() / 10.0;
    // Normalize -0.0 so it never leaks a sign into the file.
    let scaled = if scaled == 0.0 { 0.0 } else { scaled };
    format!("{:.1}", scaled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_serializes_five_fields_no_trailing_separator() {
        let cap = Capture::Point {
            x: 1.0,
            y: 64.5,
            z: -3.25,
            yaw: 90.0,
            pitch: -12.34,
        };
        assert_eq!(cap.serialize(), "1.0,64.5,-3.3,90.0,-12.3");
    }

    #[test]
    fn area_serializes_six_fields() {
        let cap = Capture::Area {
            corner1: (0.0, 60.0, 0.0),
            corner2: (15.56, 70.0, 15.44),
        };
        assert_eq!(cap.serialize(), "0.0,60.0,0.0,15.6,70.0,15.4");
    }

    #[test]
    fn half_up_rounds_ties_away_from_zero() {
        // Exactly representable ties round away from zero, not to even.
        assert_eq!(super::fixed1(0.25), "0.3");
        assert_eq!(super::fixed1(-0.25), "-0.3");
        assert_eq!(super::fixed1(0.75), "0.8");
    }

    #[test]
    fn negative_zero_never_appears() {
        assert_eq!(super::fixed1(-0.04), "0.0");
    }

    #[test]
    fn round_trip_within_tolerance() {
        let values: [(f64, f64, f64, f32, f32); 3] = [
            (0.0, 0.0, 0.0, 0.0, 0.0),
            (12.34, -64.78, 1000.05, 179.99, -89.91),
            (-0.04, 0.05, -0.05, 359.95, 0.15),
        ];
        for (x, y, z, yaw, pitch) in values {
            let cap = Capture::Point { x, y, z, yaw, pitch };
            let text = cap.serialize();
            let back = Capture::deserialize(TagMode::Point, &text).unwrap();
            match back {
                Capture::Point {
                    x: bx,
                    y: by,
                    z: bz,
                    yaw: byaw,
                    pitch: bpitch,
                } => {
                    assert!((bx - x).abs() <= 0.05, "x {} vs {}", bx, x);
                    assert!((by - y).abs() <= 0.05, "y {} vs {}", by, y);
                    assert!((bz - z).abs() <= 0.05, "z {} vs {}", bz, z);
                    assert!((f64::from(byaw) - f64::from(yaw)).abs() <= 0.05);
                    assert!((f64::from(bpitch) - f64::from(pitch)).abs() <= 0.05);
                }
                _ => panic!("mode changed during round trip"),
            }
        }
    }

    #[test]
    fn field_count_mismatch_is_rejected() {
        assert!(Capture::deserialize(TagMode::Point, "1.0,2.0,3.0").is_err());
        assert!(Capture::deserialize(TagMode::Area, "1.0,2.0,3.0,4.0,5.0").is_err());
    }

    #[test]
    fn junk_field_is_rejected() {
        assert!(Capture::deserialize(TagMode::Point, "1.0,2.0,three,4.0,5.0").is_err());
    }
}
