//! Texture descriptors

use crate::descriptor::PropValue;
use crate::foundation::math::Vec2;
use crate::reconcile::reflect::{expect_bool, expect_text, mismatch, unknown};
use crate::reconcile::{PropertyError, Reflect, Slot};

use super::color::ColorSpace;

/// An image reference with sampling state
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// Display name
    pub name: String,
    /// Image source (URL or asset key)
    pub source: Option<String>,
    /// Color space of the texel data
    pub color_space: ColorSpace,
    /// Flip rows on upload
    pub flip_y: bool,
    /// UV repeat
    pub repeat: Vec2,
    /// UV offset
    pub offset: Vec2,
}

impl Default for Texture {
    fn default() -> Self {
        Self {
            name: String::new(),
            source: None,
            color_space: ColorSpace::NoColorSpace,
            flip_y: true,
            repeat: Vec2::new(1.0, 1.0),
            offset: Vec2::zeros(),
        }
    }
}

impl Texture {
    /// Texture referencing an image source
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }
}

impl Reflect for Texture {
    fn type_name(&self) -> Option<&'static str> {
        Some("Texture")
    }

    fn blank(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(Self::default()))
    }

    fn get(&self, key: &str) -> Option<PropValue> {
        Some(match key {
            "name" => PropValue::Text(self.name.clone()),
            "source" => self
                .source
                .clone()
                .map_or(PropValue::Undefined, PropValue::Text),
            "colorSpace" => PropValue::Text(self.color_space.token().to_string()),
            "flipY" => PropValue::Bool(self.flip_y),
            "repeat" => PropValue::Vector2(self.repeat),
            "offset" => PropValue::Vector2(self.offset),
            _ => return None,
        })
    }

    fn set(&mut self, key: &str, value: PropValue) -> Result<(), PropertyError> {
        match key {
            "name" => self.name = expect_text(key, value)?,
            "source" => {
                self.source = match value {
                    PropValue::Undefined => None,
                    other => Some(expect_text(key, other)?),
                }
            }
            "colorSpace" => {
                let token = value.as_text().ok_or_else(|| mismatch(key, "color space token", &value))?;
                self.color_space = ColorSpace::from_token(token).ok_or_else(|| PropertyError::InvalidValue {
                    field: key.to_string(),
                    reason: format!("unknown color space '{token}'"),
                })?;
            }
            "flipY" => self.flip_y = expect_bool(key, &value)?,
            _ => return Err(unknown("Texture", key)),
        }
        Ok(())
    }

    fn slot_mut(&mut self, key: &str) -> Option<Slot<'_>> {
        match key {
            "repeat" => Some(Slot::Structured(&mut self.repeat)),
            "offset" => Some(Slot::Structured(&mut self.offset)),
            _ => None,
        }
    }

    fn has_color_space(&self) -> bool {
        true
    }
}
