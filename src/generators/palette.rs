//! Color palette generator

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolkitError};

pub const MIN_PALETTE_SIZE: usize = 3;
pub const MAX_PALETTE_SIZE: usize = 10;

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

/// Palette scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteType {
    Monochromatic,
    Complementary,
    Triadic,
    #[default]
    Random,
}

/// Input for `generate-color-palette`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteParams {
    pub base_color: Option<String>,
    #[serde(rename = "type", default)]
    pub palette_type: PaletteType,
    #[serde(default = "default_count")]
    pub count: usize,
}

impl Default for PaletteParams {
    fn default() -> Self {
        Self {
            base_color: None,
            palette_type: PaletteType::default(),
            count: default_count(),
        }
    }
}

fn default_count() -> usize {
    5
}

/// Output of `generate-color-palette`
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPalette {
    pub colors: Vec<String>,
    #[serde(rename = "type")]
    pub palette_type: PaletteType,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb {
    fn parse(hex: &str) -> Option<Self> {
        let value = u32::from_str_radix(hex.strip_prefix('#')?, 16).ok()?;
        Some(Self::from_u24(value))
    }

    fn from_u24(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    fn scale(self, factor: f64) -> Self {
        let channel = |c: u8| (c as f64 * factor).floor().min(255.0) as u8;
        Self {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
        }
    }

    /// Hue in degrees, saturation and lightness in 0..=1
    fn to_hsl(self) -> (f64, f64, f64) {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let d = max - min;
        if d == 0.0 {
            return (0.0, 0.0, l);
        }
        let s = d / (1.0 - (2.0 * l - 1.0).abs());
        let h = if max == r {
            60.0 * (((g - b) / d).rem_euclid(6.0))
        } else if max == g {
            60.0 * ((b - r) / d + 2.0)
        } else {
            60.0 * ((r - g) / d + 4.0)
        };
        (h, s, l)
    }

    fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let h = h.rem_euclid(360.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;
        let (r, g, b) = match (h / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
        }
    }
}

/// Move lightness `steps` tenths toward the middle of the range
fn shade(l: f64, steps: usize) -> f64 {
    let delta = 0.1 * steps as f64;
    if l > 0.5 {
        (l - delta).max(0.1)
    } else {
        (l + delta).min(0.9)
    }
}

/// Generate a palette of `count` colors
pub fn generate_palette(params: &PaletteParams) -> Result<GeneratedPalette> {
    if !(MIN_PALETTE_SIZE..=MAX_PALETTE_SIZE).contains(&params.count) {
        return Err(ToolkitError::Generation(format!(
            "count must be between {} and {}",
            MIN_PALETTE_SIZE, MAX_PALETTE_SIZE
        )));
    }

    let base = match params.base_color.as_deref() {
        Some(hex) if HEX_COLOR.is_match(hex) => Rgb::parse(hex),
        Some(_) => {
            return Err(ToolkitError::Generation(
                "baseColor must be a hex color like #1A2B3C".to_string(),
            ))
        }
        None => None,
    };

    let colors: Vec<Rgb> = match (params.palette_type, base) {
        (PaletteType::Random, _) | (_, None) => {
            let mut rng = rand::thread_rng();
            (0..params.count)
                .map(|_| Rgb::from_u24(rng.gen_range(0..=0xFF_FFFF)))
                .collect()
        }
        (PaletteType::Monochromatic, Some(base)) => (0..params.count)
            .map(|i| {
                if i == 0 {
                    base
                } else {
                    base.scale(0.8 + i as f64 * 0.1)
                }
            })
            .collect(),
        (PaletteType::Complementary, Some(base)) => {
            rotations(base, params.count, &[0.0, 180.0])
        }
        (PaletteType::Triadic, Some(base)) => {
            rotations(base, params.count, &[0.0, 120.0, 240.0])
        }
    };

    Ok(GeneratedPalette {
        count: colors.len(),
        colors: colors.into_iter().map(Rgb::to_hex).collect(),
        palette_type: params.palette_type,
    })
}

/// Cycle through hue offsets, shading each full cycle further from the base
fn rotations(base: Rgb, count: usize, offsets: &[f64]) -> Vec<Rgb> {
    let (h, s, l) = base.to_hsl();
    (0..count)
        .map(|i| {
            if i == 0 {
                return base;
            }
            let offset = offsets[i % offsets.len()];
            Rgb::from_hsl(h + offset, s, shade(l, i / offsets.len()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(base: &str, palette_type: PaletteType, count: usize) -> PaletteParams {
        PaletteParams {
            base_color: Some(base.to_string()),
            palette_type,
            count,
        }
    }

    #[test]
    fn test_random_palette() {
        let out = generate_palette(&PaletteParams::default()).unwrap();
        assert_eq!(out.count, 5);
        assert!(out.colors.iter().all(|c| HEX_COLOR.is_match(c)));
        assert!(out.colors.iter().all(|c| c.to_uppercase() == *c));
    }

    #[test]
    fn test_monochromatic() {
        let out = generate_palette(&params("#336699", PaletteType::Monochromatic, 3)).unwrap();
        assert_eq!(out.colors[0], "#336699");
        assert_eq!(out.colors[1], "#2D5B89");
        assert_eq!(out.count, 3);
    }

    #[test]
    fn test_complementary() {
        let out = generate_palette(&params("#ff0000", PaletteType::Complementary, 3)).unwrap();
        assert_eq!(out.colors[0], "#FF0000");
        assert_eq!(out.colors[1], "#00FFFF");
        assert_eq!(out.count, 3);
    }

    #[test]
    fn test_triadic() {
        let out = generate_palette(&params("#FF0000", PaletteType::Triadic, 3)).unwrap();
        assert_eq!(out.colors, vec!["#FF0000", "#00FF00", "#0000FF"]);
    }

    #[test]
    fn test_scheme_without_base_is_random() {
        let p = PaletteParams {
            base_color: None,
            palette_type: PaletteType::Triadic,
            count: 4,
        };
        let out = generate_palette(&p).unwrap();
        assert_eq!(out.count, 4);
        assert_eq!(out.palette_type, PaletteType::Triadic);
    }

    #[test]
    fn test_validation() {
        assert!(generate_palette(&params("#FF0000", PaletteType::Random, 2)).is_err());
        assert!(generate_palette(&params("#FF0000", PaletteType::Random, 11)).is_err());
        assert!(generate_palette(&params("red", PaletteType::Triadic, 5)).is_err());
        assert!(generate_palette(&params("#GG0000", PaletteType::Triadic, 5)).is_err());
    }

    #[test]
    fn test_hsl_roundtrip_primary() {
        let teal = Rgb::parse("#008080").unwrap();
        let (h, s, l) = teal.to_hsl();
        assert_eq!(Rgb::from_hsl(h, s, l), teal);
    }
}
