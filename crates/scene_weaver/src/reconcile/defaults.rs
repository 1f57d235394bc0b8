//! Factory defaults for the reset sentinel

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::reflect::Reflect;
use crate::descriptor::PropValue;

/// Constructor identity: the concrete holder type plus the kind it reports.
/// Holders of different types may share a kind name (a light node and its
/// light payload), so the name alone is not enough.
type Identity = (TypeId, &'static str);

/// Lazily populated map from constructor identity to a blank instance.
///
/// Entries are never evicted for the lifetime of the owning reconciler.
#[derive(Default)]
pub struct DefaultCache {
    blanks: HashMap<Identity, Box<dyn Reflect>>,
}

impl DefaultCache {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory default of `key` for holders of the same kind as `holder`.
    ///
    /// Holders without constructor identity resolve to numeric zero. Fields
    /// the blank instance does not have resolve to `Undefined`.
    pub fn default_for(&mut self, holder: &dyn Reflect, key: &str) -> PropValue {
        let Some(name) = holder.type_name() else {
            return PropValue::Number(0.0);
        };
        let identity = (Any::type_id(holder), name);
        if !self.blanks.contains_key(&identity) {
            let Some(blank) = holder.blank() else {
                return PropValue::Number(0.0);
            };
            log::debug!("caching blank {name} for reset");
            self.blanks.insert(identity, blank);
        }
        self.blanks
            .get(&identity)
            .and_then(|blank| blank.get(key))
            .unwrap_or_default()
    }

    /// Number of cached kinds
    pub fn len(&self) -> usize {
        self.blanks.len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.blanks.is_empty()
    }
}

impl std::fmt::Debug for DefaultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultCache")
            .field("kinds", &self.blanks.keys().map(|(_, name)| *name).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::reconcile::PropertyError;
    use crate::scene::{Light, LightKind, Object3D};

    struct Anonymous;

    impl Reflect for Anonymous {
        fn type_name(&self) -> Option<&'static str> {
            None
        }
        fn blank(&self) -> Option<Box<dyn Reflect>> {
            None
        }
        fn get(&self, _key: &str) -> Option<PropValue> {
            None
        }
        fn set(&mut self, key: &str, _value: PropValue) -> Result<(), PropertyError> {
            Err(PropertyError::UnknownField {
                holder: "anonymous",
                field: key.to_string(),
            })
        }
    }

    #[test]
    fn test_anonymous_holder_resets_to_zero() {
        let mut cache = DefaultCache::new();
        assert_eq!(cache.default_for(&Anonymous, "anything"), PropValue::Number(0.0));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_blank_cached_once() {
        let mut cache = DefaultCache::new();
        let v = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(cache.default_for(&v, "y"), PropValue::Number(0.0));
        assert_eq!(cache.default_for(&v, "w"), PropValue::Undefined);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_same_kind_name_on_different_types_gets_separate_blanks() {
        let mut cache = DefaultCache::new();
        let light = Light::new(LightKind::Point);
        let node = Object3D::light(Light::new(LightKind::Point));
        assert_eq!(light.type_name(), node.type_name());

        assert_ne!(cache.default_for(&light, "intensity"), PropValue::Undefined);
        assert_eq!(cache.default_for(&node, "visible"), PropValue::Bool(true));
        assert_eq!(cache.len(), 2);
    }
}
