//! Surface materials
//!
//! One struct covers every kind; fields that only make sense for some kinds
//! (roughness, shininess, emissive, ...) are rejected as unknown on the others.

use crate::descriptor::PropValue;
use crate::reconcile::reflect::{expect_bool, expect_number, expect_text, mismatch, unknown};
use crate::reconcile::{PropertyError, Reflect, Slot};

use super::color::Color;
use super::texture::Texture;

/// Which material model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Unlit
    Basic,
    /// Physically based (roughness/metalness)
    Standard,
    /// Diffuse only
    Lambert,
    /// Blinn-Phong specular
    Phong,
    /// Cel shaded
    Toon,
}

impl MaterialKind {
    /// Constructor identity
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Basic => "MeshBasicMaterial",
            Self::Standard => "MeshStandardMaterial",
            Self::Lambert => "MeshLambertMaterial",
            Self::Phong => "MeshPhongMaterial",
            Self::Toon => "MeshToonMaterial",
        }
    }

    /// Whether the kind reacts to light (and therefore has emissive fields)
    pub fn is_lit(self) -> bool {
        !matches!(self, Self::Basic)
    }
}

/// Which faces are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Front faces (constant 0)
    #[default]
    Front,
    /// Back faces (constant 1)
    Back,
    /// Both (constant 2)
    Double,
}

impl Side {
    /// Numeric constant
    pub fn constant(self) -> u32 {
        match self {
            Self::Front => 0,
            Self::Back => 1,
            Self::Double => 2,
        }
    }

    /// Parse a numeric constant or a name (`"front"`, `"DoubleSide"`, ...)
    pub fn from_value(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Number(n) => match *n as u32 {
                0 => Some(Self::Front),
                1 => Some(Self::Back),
                2 => Some(Self::Double),
                _ => None,
            },
            PropValue::Text(name) => {
                let name = name.to_ascii_lowercase();
                match name.strip_suffix("side").unwrap_or(&name) {
                    "front" => Some(Self::Front),
                    "back" => Some(Self::Back),
                    "double" => Some(Self::Double),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Surface appearance of a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Material model
    pub kind: MaterialKind,
    /// Display name
    pub name: String,
    /// Base color
    pub color: Color,
    /// Opacity in [0, 1]
    pub opacity: f32,
    /// Whether blending is enabled
    pub transparent: bool,
    /// Whether the material is drawn at all
    pub visible: bool,
    /// Rendered faces
    pub side: Side,
    /// Draw edges only
    pub wireframe: bool,
    /// Emitted color (lit kinds)
    pub emissive: Color,
    /// Emission multiplier (lit kinds)
    pub emissive_intensity: f32,
    /// Microfacet roughness (standard)
    pub roughness: f32,
    /// Metalness (standard)
    pub metalness: f32,
    /// Specular exponent (phong)
    pub shininess: f32,
    /// Specular color (phong)
    pub specular: Color,
    /// Color map
    pub map: Option<Texture>,
}

impl Material {
    /// Factory-default material of a kind
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            kind,
            name: String::new(),
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
            visible: true,
            side: Side::Front,
            wireframe: false,
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            roughness: 1.0,
            metalness: 0.0,
            shininess: 30.0,
            specular: Color::from_hex(0x11_11_11),
            map: None,
        }
    }

    fn has_field(&self, key: &str) -> bool {
        match key {
            "emissive" | "emissiveIntensity" => self.kind.is_lit(),
            "roughness" | "metalness" => self.kind == MaterialKind::Standard,
            "shininess" | "specular" => self.kind == MaterialKind::Phong,
            "name" | "color" | "opacity" | "transparent" | "visible" | "side" | "wireframe" | "map" => true,
            _ => false,
        }
    }
}

impl Reflect for Material {
    fn type_name(&self) -> Option<&'static str> {
        Some(self.kind.type_name())
    }

    fn blank(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(Self::new(self.kind)))
    }

    fn get(&self, key: &str) -> Option<PropValue> {
        if !self.has_field(key) {
            return None;
        }
        Some(match key {
            "name" => PropValue::Text(self.name.clone()),
            "color" => PropValue::Color(self.color),
            "opacity" => PropValue::Number(self.opacity),
            "transparent" => PropValue::Bool(self.transparent),
            "visible" => PropValue::Bool(self.visible),
            "side" => PropValue::Number(self.side.constant() as f32),
            "wireframe" => PropValue::Bool(self.wireframe),
            "emissive" => PropValue::Color(self.emissive),
            "emissiveIntensity" => PropValue::Number(self.emissive_intensity),
            "roughness" => PropValue::Number(self.roughness),
            "metalness" => PropValue::Number(self.metalness),
            "shininess" => PropValue::Number(self.shininess),
            "specular" => PropValue::Color(self.specular),
            "map" => self
                .map
                .clone()
                .map_or(PropValue::Undefined, PropValue::from),
            _ => return None,
        })
    }

    fn set(&mut self, key: &str, value: PropValue) -> Result<(), PropertyError> {
        if !self.has_field(key) {
            return Err(unknown(self.kind.type_name(), key));
        }
        match key {
            "name" => self.name = expect_text(key, value)?,
            "opacity" => self.opacity = expect_number(key, &value)?,
            "transparent" => self.transparent = expect_bool(key, &value)?,
            "visible" => self.visible = expect_bool(key, &value)?,
            "wireframe" => self.wireframe = expect_bool(key, &value)?,
            "emissiveIntensity" => self.emissive_intensity = expect_number(key, &value)?,
            "roughness" => self.roughness = expect_number(key, &value)?,
            "metalness" => self.metalness = expect_number(key, &value)?,
            "shininess" => self.shininess = expect_number(key, &value)?,
            "side" => {
                self.side = Side::from_value(&value).ok_or_else(|| PropertyError::InvalidValue {
                    field: key.to_string(),
                    reason: format!("unknown side {value:?}"),
                })?;
            }
            "map" => {
                self.map = match value {
                    PropValue::Texture(texture) => Some(*texture),
                    PropValue::Undefined => None,
                    other => return Err(mismatch(key, "texture", &other)),
                }
            }
            // Colors are structured and only reach here with a non-color value
            _ => return Err(mismatch(key, "color", &value)),
        }
        Ok(())
    }

    fn slot_mut(&mut self, key: &str) -> Option<Slot<'_>> {
        if !self.has_field(key) {
            return None;
        }
        match key {
            "color" => Some(Slot::Structured(&mut self.color)),
            "emissive" => Some(Slot::Structured(&mut self.emissive)),
            "specular" => Some(Slot::Structured(&mut self.specular)),
            "map" => self.map.as_mut().map(|t| Slot::Object(t as &mut dyn Reflect)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_gated_fields() {
        let mut basic = Material::new(MaterialKind::Basic);
        assert!(matches!(
            basic.set("roughness", PropValue::Number(0.5)),
            Err(PropertyError::UnknownField { .. })
        ));
        let mut standard = Material::new(MaterialKind::Standard);
        standard.set("roughness", PropValue::Number(0.5)).unwrap();
        assert_eq!(standard.roughness, 0.5);
        assert!(standard.get("shininess").is_none());
    }

    #[test]
    fn test_side_names_and_constants() {
        assert_eq!(Side::from_value(&PropValue::Number(2.0)), Some(Side::Double));
        assert_eq!(Side::from_value(&PropValue::from("BackSide")), Some(Side::Back));
        assert_eq!(Side::from_value(&PropValue::from("front")), Some(Side::Front));
        assert_eq!(Side::from_value(&PropValue::from("sideways")), None);
    }

    #[test]
    fn test_map_slot_only_when_present() {
        let mut m = Material::new(MaterialKind::Standard);
        assert!(m.slot_mut("map").is_none());
        m.set("map", Texture::from_source("wood.png").into()).unwrap();
        assert!(matches!(m.slot_mut("map"), Some(Slot::Object(_))));
    }
}
