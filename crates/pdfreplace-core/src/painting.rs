//! Fill colours carried by extracted text and used for re-inserted text.

/// Simple RGB color.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    /// Create a new RGB color with values in [0.0, 1.0].
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Black color (0, 0, 0).
    pub fn black() -> Self {
        Self {
            r: 0.0,
            g: 0.0,
            b: 0.0,
        }
    }

    pub fn white() -> Self {
        Self {
            r: 1.0,
            g: 1.0,
            b: 1.0,
        }
    }

    pub fn gray(level: f64) -> Self {
        Self::new(level, level, level)
    }

    /// Naive CMYK to RGB conversion (no colour management).
    pub fn from_cmyk(c: f64, m: f64, y: f64, k: f64) -> Self {
        Self::new(
            (1.0 - c) * (1.0 - k),
            (1.0 - m) * (1.0 - k),
            (1.0 - y) * (1.0 - k),
        )
    }

    /// Build a colour from a packed `0xRRGGBB` integer.
    pub fn from_rgb_int(value: u32) -> Self {
        Self::new(
            f64::from((value >> 16) & 0xFF) / 255.0,
            f64::from((value >> 8) & 0xFF) / 255.0,
            f64::from(value & 0xFF) / 255.0,
        )
    }

    /// Build a colour from 1 (gray), 3 (RGB) or 4 (CMYK) components.
    pub fn from_components(components: &[f64]) -> Option<Self> {
        match *components {
            [g] => Some(Self::gray(g)),
            [r, g, b] => Some(Self::new(r, g, b)),
            [c, m, y, k] => Some(Self::from_cmyk(c, m, y, k)),
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb_int() {
        let c = Color::from_rgb_int(0xFF0000);
        assert_eq!(c, Color::new(1.0, 0.0, 0.0));
        let c = Color::from_rgb_int(0x000080);
        assert!((c.b - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_components() {
        assert_eq!(Color::from_components(&[0.0]), Some(Color::black()));
        assert_eq!(
            Color::from_components(&[0.0, 0.0, 0.0, 0.0]),
            Some(Color::white())
        );
        assert_eq!(Color::from_components(&[0.1, 0.2]), None);
    }

    #[test]
    fn test_components_are_clamped() {
        let c = Color::new(1.5, -0.2, 0.5);
        assert_eq!(c, Color::new(1.0, 0.0, 0.5));
    }
}
