//! RGB color values and color-space tokens
//!
//! Colors are stored as linear-working-space floats. Parsing helpers accept the
//! usual authoring formats (`0xRRGGBB`, `"#rgb"`, `"#rrggbb"`, `"rgb(r, g, b)"`
//! and CSS color names) and optionally convert from sRGB on the way in.

use serde::{Deserialize, Serialize};

/// Legacy numeric encoding constant meaning "sRGB"
pub const LEGACY_SRGB_ENCODING: u32 = 3001;

/// Legacy numeric encoding constant meaning "linear"
pub const LEGACY_LINEAR_ENCODING: u32 = 3000;

/// Named color spaces understood by textures and output surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    /// No color space tagging (data textures)
    #[default]
    NoColorSpace,
    /// sRGB transfer function
    Srgb,
    /// Linear sRGB primaries
    SrgbLinear,
}

impl ColorSpace {
    /// Token used in descriptors (`""`, `"srgb"`, `"srgb-linear"`)
    pub fn token(self) -> &'static str {
        match self {
            Self::NoColorSpace => "",
            Self::Srgb => "srgb",
            Self::SrgbLinear => "srgb-linear",
        }
    }

    /// Parse a descriptor token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "" => Some(Self::NoColorSpace),
            "srgb" => Some(Self::Srgb),
            "srgb-linear" => Some(Self::SrgbLinear),
            _ => None,
        }
    }

    /// Translate a legacy numeric encoding: 3001 is sRGB, anything else linear
    pub fn from_legacy_encoding(encoding: f32) -> Self {
        if (encoding - LEGACY_SRGB_ENCODING as f32).abs() < f32::EPSILON {
            Self::Srgb
        } else {
            Self::SrgbLinear
        }
    }
}

/// RGB color with float components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x00_00_00),
    ("white", 0xff_ff_ff),
    ("red", 0xff_00_00),
    ("lime", 0x00_ff_00),
    ("green", 0x00_80_00),
    ("blue", 0x00_00_ff),
    ("yellow", 0xff_ff_00),
    ("cyan", 0x00_ff_ff),
    ("aqua", 0x00_ff_ff),
    ("magenta", 0xff_00_ff),
    ("fuchsia", 0xff_00_ff),
    ("orange", 0xff_a5_00),
    ("purple", 0x80_00_80),
    ("pink", 0xff_c0_cb),
    ("hotpink", 0xff_69_b4),
    ("gray", 0x80_80_80),
    ("grey", 0x80_80_80),
    ("silver", 0xc0_c0_c0),
    ("brown", 0xa5_2a_2a),
    ("navy", 0x00_00_80),
    ("teal", 0x00_80_80),
    ("gold", 0xff_d7_00),
    ("royalblue", 0x41_69_e1),
    ("skyblue", 0x87_ce_eb),
    ("tomato", 0xff_63_47),
];

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };
    /// Black
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };

    /// Create a color from raw components
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a `0xRRGGBB` value without any conversion
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;
        Self { r, g, b }
    }

    /// Parse a style string without any conversion
    pub fn from_style(style: &str) -> Option<Self> {
        let style = style.trim();
        if let Some(hex) = style.strip_prefix('#') {
            return Self::parse_hex_digits(hex);
        }
        if let Some(body) = style.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
            let parts: Vec<&str> = body.split(',').map(str::trim).collect();
            if parts.len() != 3 {
                return None;
            }
            let mut channels = [0.0_f32; 3];
            for (channel, part) in channels.iter_mut().zip(parts) {
                *channel = part.parse::<f32>().ok()?.clamp(0.0, 255.0) / 255.0;
            }
            return Some(Self::new(channels[0], channels[1], channels[2]));
        }
        let lower = style.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, hex)| Self::from_hex(*hex))
    }

    fn parse_hex_digits(digits: &str) -> Option<Self> {
        match digits.len() {
            3 => {
                let value = u32::from_str_radix(digits, 16).ok()?;
                let expand = |n: u32| (n << 4) | n;
                let r = expand((value >> 8) & 0xf);
                let g = expand((value >> 4) & 0xf);
                let b = expand(value & 0xf);
                Some(Self::from_hex((r << 16) | (g << 8) | b))
            }
            6 => u32::from_str_radix(digits, 16).ok().map(Self::from_hex),
            _ => None,
        }
    }

    /// Set from a `0xRRGGBB` value, converting from sRGB when `color_managed`
    pub fn set_hex(&mut self, hex: u32, color_managed: bool) {
        *self = Self::from_hex(hex);
        if color_managed {
            self.convert_srgb_to_linear();
        }
    }

    /// Set from a style string, converting from sRGB when `color_managed`.
    ///
    /// Returns `false` and leaves the color untouched when the style is not
    /// understood.
    pub fn set_style(&mut self, style: &str, color_managed: bool) -> bool {
        match Self::from_style(style) {
            Some(parsed) => {
                *self = parsed;
                if color_managed {
                    self.convert_srgb_to_linear();
                }
                true
            }
            None => false,
        }
    }

    /// Convert every component from sRGB to linear in place
    pub fn convert_srgb_to_linear(&mut self) -> &mut Self {
        self.r = srgb_to_linear(self.r);
        self.g = srgb_to_linear(self.g);
        self.b = srgb_to_linear(self.b);
        self
    }

    /// Components as an array
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Pack into `0xRRGGBB` (components are clamped, no conversion)
    pub fn to_hex(self) -> u32 {
        let pack = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (pack(self.r) << 16) | (pack(self.g) << 8) | pack(self.b)
    }
}

/// sRGB transfer function, decode direction
pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

/// sRGB transfer function, encode direction
pub fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(0.416_666_66) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_named_and_hex_styles_agree() {
        assert_eq!(Color::from_style("red"), Some(Color::new(1.0, 0.0, 0.0)));
        assert_eq!(Color::from_style("#f00"), Color::from_style("#ff0000"));
        assert_eq!(Color::from_style("RoyalBlue"), Some(Color::from_hex(0x41_69_e1)));
        assert!(Color::from_style("not-a-color").is_none());
    }

    #[test]
    fn test_rgb_function_style() {
        let c = Color::from_style("rgb(255, 128, 0)").unwrap();
        assert_relative_eq!(c.g, 128.0 / 255.0, epsilon = 1e-6);
    }

    #[test]
    fn test_srgb_round_trip() {
        for value in [0.0_f32, 0.02, 0.2, 0.5, 0.9, 1.0] {
            assert_relative_eq!(linear_to_srgb(srgb_to_linear(value)), value, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_set_style_conversion_depends_on_management() {
        let mut managed = Color::BLACK;
        managed.set_style("gray", true);
        let mut raw = Color::BLACK;
        raw.set_style("gray", false);
        assert_relative_eq!(raw.r, 128.0 / 255.0, epsilon = 1e-6);
        assert_relative_eq!(managed.r, srgb_to_linear(128.0 / 255.0), epsilon = 1e-6);
    }

    #[test]
    fn test_legacy_encoding_mapping() {
        assert_eq!(ColorSpace::from_legacy_encoding(3001.0), ColorSpace::Srgb);
        assert_eq!(ColorSpace::from_legacy_encoding(3000.0), ColorSpace::SrgbLinear);
        assert_eq!(ColorSpace::from_token("srgb-linear"), Some(ColorSpace::SrgbLinear));
    }
}
