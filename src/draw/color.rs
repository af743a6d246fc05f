//! Annotation colors and the named palette.

/// Straight (non-premultiplied) RGBA, each channel in 0.0..=1.0.
///
/// ```
/// use inkshot::draw::Color;
/// let marker = Color::from_rgb8(255, 80, 80).with_opacity(0.5);
/// assert_eq!(marker.to_rgba8()[3], 128);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    /// Creates a new color from RGBA components in the range 0.0 to 1.0.
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Creates an opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8([r, g, b, 255])
    }

    pub fn from_rgba8([r, g, b, a]: [u8; 4]) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a as f64 / 255.0,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Same color with its alpha multiplied by `opacity`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        Self {
            a: self.a * opacity.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Perceived brightness, used to pick a contrasting outline.
    pub fn brightness(&self) -> f64 {
        self.r * 0.299 + self.g * 0.587 + self.b * 0.114
    }
}

/// Named palette accepted in config files, matched case-insensitively.
const PALETTE: [(&str, Color); 8] = [
    ("red", RED),
    ("green", GREEN),
    ("blue", BLUE),
    ("yellow", YELLOW),
    ("orange", ORANGE),
    ("pink", PINK),
    ("white", WHITE),
    ("black", BLACK),
];

pub fn name_to_color(name: &str) -> Option<Color> {
    PALETTE
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, c)| *c)
}

pub const RED: Color = Color::opaque(1.0, 0.0, 0.0);
pub const GREEN: Color = Color::opaque(0.0, 1.0, 0.0);
pub const BLUE: Color = Color::opaque(0.0, 0.0, 1.0);
pub const YELLOW: Color = Color::opaque(1.0, 1.0, 0.0);
pub const ORANGE: Color = Color::opaque(1.0, 0.5, 0.0);
pub const PINK: Color = Color::opaque(1.0, 0.0, 1.0);
pub const WHITE: Color = Color::opaque(1.0, 1.0, 1.0);
pub const BLACK: Color = Color::opaque(0.0, 0.0, 0.0);
