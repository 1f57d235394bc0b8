//! Light sources

use crate::descriptor::PropValue;
use crate::foundation::math::Vec3;
use crate::reconcile::reflect::{expect_number, mismatch, unknown};
use crate::reconcile::{PropertyError, Reflect, Slot};

use super::color::Color;

/// Which light model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    /// Uniform fill
    Ambient,
    /// Sky/ground gradient
    Hemisphere,
    /// Omnidirectional point
    Point,
    /// Cone
    Spot,
    /// Parallel rays
    Directional,
}

impl LightKind {
    /// Constructor identity
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Ambient => "AmbientLight",
            Self::Hemisphere => "HemisphereLight",
            Self::Point => "PointLight",
            Self::Spot => "SpotLight",
            Self::Directional => "DirectionalLight",
        }
    }

    fn has_field(self, key: &str) -> bool {
        match key {
            "color" | "intensity" => true,
            "groundColor" => self == Self::Hemisphere,
            "distance" | "decay" => matches!(self, Self::Point | Self::Spot),
            "angle" | "penumbra" => self == Self::Spot,
            "target" => matches!(self, Self::Spot | Self::Directional),
            _ => false,
        }
    }
}

/// Light parameters carried by a light node
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Light model
    pub kind: LightKind,
    /// Emitted color (sky color for hemisphere lights)
    pub color: Color,
    /// Ground color (hemisphere)
    pub ground_color: Color,
    /// Brightness
    pub intensity: f32,
    /// Cutoff distance, 0 for none (point, spot)
    pub distance: f32,
    /// Falloff exponent (point, spot)
    pub decay: f32,
    /// Cone half-angle in radians (spot)
    pub angle: f32,
    /// Cone edge softness (spot)
    pub penumbra: f32,
    /// Aim point (spot, directional)
    pub target: Vec3,
}

impl Light {
    /// Factory-default light of a kind
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            color: Color::WHITE,
            ground_color: Color::WHITE,
            intensity: 1.0,
            distance: 0.0,
            decay: 2.0,
            angle: std::f32::consts::FRAC_PI_3,
            penumbra: 0.0,
            target: Vec3::zeros(),
        }
    }

    /// Light from positional arguments `[color, intensity, ...]`.
    ///
    /// Colors may be hex numbers or style strings. `fallback` is used as the
    /// color when no arguments are given at all.
    pub fn from_args(kind: LightKind, args: &[PropValue], fallback: Option<Color>, color_managed: bool) -> Self {
        let mut light = Self::new(kind);
        if args.is_empty() {
            if let Some(color) = fallback {
                light.color = color;
            }
            return light;
        }
        if let Some(color) = args.first().and_then(|v| parse_color(v, color_managed)) {
            light.color = color;
        }
        let mut rest = &args[1..];
        if kind == LightKind::Hemisphere {
            if let Some(ground) = rest.first().and_then(|v| parse_color(v, color_managed)) {
                light.ground_color = ground;
            }
            rest = rest.get(1..).unwrap_or(&[]);
        }
        let numbers: Vec<Option<f32>> = rest.iter().map(PropValue::as_number).collect();
        let slots: &mut [&mut f32] = &mut [
            &mut light.intensity,
            &mut light.distance,
            &mut light.angle,
            &mut light.penumbra,
            &mut light.decay,
        ];
        let order: &[usize] = match kind {
            LightKind::Point => &[0, 1, 4],
            LightKind::Spot => &[0, 1, 2, 3, 4],
            _ => &[0],
        };
        for (value, slot) in numbers.iter().zip(order) {
            if let Some(n) = value {
                *slots[*slot] = *n;
            }
        }
        light
    }
}

fn parse_color(value: &PropValue, color_managed: bool) -> Option<Color> {
    let mut color = Color::WHITE;
    match value {
        PropValue::Number(hex) => color.set_hex(*hex as u32, color_managed),
        PropValue::Text(style) => {
            if !color.set_style(style, color_managed) {
                return None;
            }
        }
        PropValue::Color(c) => color = *c,
        _ => return None,
    }
    Some(color)
}

impl Reflect for Light {
    fn type_name(&self) -> Option<&'static str> {
        Some(self.kind.type_name())
    }

    fn blank(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(Self::new(self.kind)))
    }

    fn get(&self, key: &str) -> Option<PropValue> {
        if !self.kind.has_field(key) {
            return None;
        }
        Some(match key {
            "color" => PropValue::Color(self.color),
            "groundColor" => PropValue::Color(self.ground_color),
            "intensity" => PropValue::Number(self.intensity),
            "distance" => PropValue::Number(self.distance),
            "decay" => PropValue::Number(self.decay),
            "angle" => PropValue::Number(self.angle),
            "penumbra" => PropValue::Number(self.penumbra),
            "target" => PropValue::Vector3(self.target),
            _ => return None,
        })
    }

    fn set(&mut self, key: &str, value: PropValue) -> Result<(), PropertyError> {
        if !self.kind.has_field(key) {
            return Err(unknown(self.kind.type_name(), key));
        }
        let field = match key {
            "intensity" => &mut self.intensity,
            "distance" => &mut self.distance,
            "decay" => &mut self.decay,
            "angle" => &mut self.angle,
            "penumbra" => &mut self.penumbra,
            _ => return Err(mismatch(key, "structured value", &value)),
        };
        *field = expect_number(key, &value)?;
        Ok(())
    }

    fn slot_mut(&mut self, key: &str) -> Option<Slot<'_>> {
        if !self.kind.has_field(key) {
            return None;
        }
        match key {
            "color" => Some(Slot::Structured(&mut self.color)),
            "groundColor" => Some(Slot::Structured(&mut self.ground_color)),
            "target" => Some(Slot::Structured(&mut self.target)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_only_without_args() {
        let red = Some(Color::from_hex(0xff0000));
        let fallback = Light::from_args(LightKind::Point, &[], red, false);
        assert_eq!(fallback.color, Color::new(1.0, 0.0, 0.0));

        let explicit = Light::from_args(LightKind::Point, &[PropValue::from("blue")], red, false);
        assert_eq!(explicit.color, Color::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_spot_positional_order() {
        let args = [
            PropValue::Number(0xffffff as f32),
            PropValue::Number(2.0),
            PropValue::Number(10.0),
            PropValue::Number(0.5),
            PropValue::Number(0.1),
            PropValue::Number(1.0),
        ];
        let spot = Light::from_args(LightKind::Spot, &args, None, false);
        assert_eq!(spot.intensity, 2.0);
        assert_eq!(spot.distance, 10.0);
        assert_eq!(spot.angle, 0.5);
        assert_eq!(spot.penumbra, 0.1);
        assert_eq!(spot.decay, 1.0);
    }

    #[test]
    fn test_hemisphere_takes_ground_color() {
        let args = [PropValue::from("white"), PropValue::from("black"), PropValue::Number(0.5)];
        let hemi = Light::from_args(LightKind::Hemisphere, &args, None, false);
        assert_eq!(hemi.ground_color, Color::BLACK);
        assert_eq!(hemi.intensity, 0.5);
    }

    #[test]
    fn test_ambient_has_no_distance() {
        let mut ambient = Light::new(LightKind::Ambient);
        assert!(ambient.set("distance", PropValue::Number(3.0)).is_err());
    }
}
