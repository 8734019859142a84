use std::collections::HashMap;

use super::{Drawable, IndexBinding};
use crate::bindable::SharedBindable;

/// Procedural geometry kinds the demo scene can instantiate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Cube,
    Plane,
    Cylinder,
    Sphere,
}

impl GeometryKind {
    pub fn tag(self) -> &'static str {
        match self {
            GeometryKind::Cube => "cube",
            GeometryKind::Plane => "plane",
            GeometryKind::Cylinder => "cylinder",
            GeometryKind::Sphere => "sphere",
        }
    }
}

/// The shared bind list for one geometry kind: pipeline, vertex buffer and
/// friends, plus the index binding every instance registers for itself.
pub struct StaticBindings {
    pub binds: Vec<SharedBindable>,
    pub index: IndexBinding,
}

/// Explicit mapping from geometry kind to its shared static bind list,
/// populated once during scene setup. Replaces hidden per-type one-time
/// initialization state: all instances of one kind clone the same shared
/// handles, while per-instance bindings (transform, material) are added on
/// top by the caller.
#[derive(Default)]
pub struct BindingRegistry {
    entries: HashMap<GeometryKind, StaticBindings>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the static bindings for `kind`. Static bindings are
    /// initialized exactly once per kind.
    pub fn register(&mut self, kind: GeometryKind, bindings: StaticBindings) {
        let prev = self.entries.insert(kind, bindings);
        assert!(
            prev.is_none(),
            "static bindings for {kind:?} registered twice"
        );
    }

    pub fn contains(&self, kind: GeometryKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn get(&self, kind: GeometryKind) -> Option<&StaticBindings> {
        self.entries.get(&kind)
    }

    /// Builds a drawable carrying the shared static bindings of `kind`.
    /// The instance's own index binding references the shared buffer.
    pub fn instantiate(&self, kind: GeometryKind) -> Option<Drawable> {
        let entry = self.entries.get(&kind)?;
        let mut drawable = Drawable::new();
        for bind in &entry.binds {
            drawable.add_bind(bind.clone());
        }
        drawable.set_index_binding(entry.index.clone());
        Some(drawable)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::test_support::NullBind;
    use super::*;

    fn fake_statics() -> StaticBindings {
        StaticBindings {
            binds: vec![
                NullBind::shared("Pipeline#phong"),
                NullBind::shared("VertexBuffer#cube"),
            ],
            index: IndexBinding::from_parts(NullBind::shared("IndexBuffer#cube"), 36),
        }
    }

    #[test]
    fn instances_share_the_static_bindings() {
        let mut registry = BindingRegistry::new();
        registry.register(GeometryKind::Cube, fake_statics());

        let a = registry.instantiate(GeometryKind::Cube).unwrap();
        let b = registry.instantiate(GeometryKind::Cube).unwrap();

        // same underlying objects, by pointer identity
        for (x, y) in a.binds().iter().zip(b.binds().iter()) {
            assert!(Arc::ptr_eq(x, y));
        }
        assert_eq!(a.index_count(), Some(36));
        assert_eq!(b.index_count(), Some(36));
    }

    #[test]
    fn instance_bind_lists_are_independent() {
        let mut registry = BindingRegistry::new();
        registry.register(GeometryKind::Cube, fake_statics());

        let mut a = registry.instantiate(GeometryKind::Cube).unwrap();
        let b = registry.instantiate(GeometryKind::Cube).unwrap();

        // a per-instance binding on one instance leaves the other untouched
        a.add_bind(NullBind::shared("TransformUniform#cube0"));
        assert_eq!(a.binds().len(), 4);
        assert_eq!(b.binds().len(), 3);
    }

    #[test]
    fn unregistered_kind_yields_nothing() {
        let registry = BindingRegistry::new();
        assert!(registry.instantiate(GeometryKind::Sphere).is_none());
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn double_registration_is_a_programmer_error() {
        let mut registry = BindingRegistry::new();
        registry.register(GeometryKind::Cube, fake_statics());
        registry.register(GeometryKind::Cube, fake_statics());
    }
}
