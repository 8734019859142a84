use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::gfx::GfxError;

/// Identity-keyed cache for GPU-resident resources.
///
/// The first resolution of an identity runs the creation closure and stores
/// the result; later resolutions of the same identity return the same
/// shared handle without touching the device. A failed creation leaves no
/// entry behind, so the identity stays resolvable on the next attempt.
///
/// Draw submission is single-threaded, so lookup-or-insert needs no
/// synchronization; the stored handles are still `Send + Sync` so resolved
/// resources can cross threads if scene construction ever does.
#[derive(Default)]
pub struct BindableCache {
    entries: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl BindableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `uid`, creating the resource on a miss.
    ///
    /// Resolving the same identity with a different type is a programmer
    /// error (identity strings embed the type name) and panics.
    pub fn resolve<T, F>(&mut self, uid: &str, create: F) -> Result<Arc<T>, GfxError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<T, GfxError>,
    {
        if let Some(entry) = self.entries.get(uid) {
            let hit = entry.clone().downcast::<T>().unwrap_or_else(|_| {
                panic!("cache identity `{uid}` already resolved to a different resource type")
            });
            return Ok(hit);
        }

        let created = Arc::new(create()?);
        log::debug!("resource cache miss: {uid}");
        self.entries.insert(uid.to_owned(), created.clone());
        Ok(created)
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.entries.contains_key(uid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fake {
        tag: u32,
    }

    #[test]
    fn equal_identity_returns_same_instance() {
        let mut cache = BindableCache::new();
        let a = cache.resolve("Fake#plane", || Ok(Fake { tag: 1 })).unwrap();
        let b = cache.resolve("Fake#plane", || Ok(Fake { tag: 2 })).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        // the second creation closure never ran
        assert_eq!(b.tag, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_identity_returns_distinct_instances() {
        let mut cache = BindableCache::new();
        let a = cache.resolve("Fake#plane", || Ok(Fake { tag: 1 })).unwrap();
        let b = cache.resolve("Fake#plane2", || Ok(Fake { tag: 1 })).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_creation_leaves_identity_unresolved() {
        let mut cache = BindableCache::new();
        let err = cache.resolve::<Fake, _>("Fake#broken", || {
            Err(GfxError::UnknownShader("nope".into()))
        });
        assert!(err.is_err());
        assert!(!cache.contains("Fake#broken"));

        // the next attempt with the same identity may succeed
        let ok = cache.resolve("Fake#broken", || Ok(Fake { tag: 7 })).unwrap();
        assert_eq!(ok.tag, 7);
        assert!(cache.contains("Fake#broken"));
    }

    #[test]
    #[should_panic(expected = "different resource type")]
    fn identity_collision_across_types_panics() {
        struct Other;
        let mut cache = BindableCache::new();
        cache.resolve("Fake#x", || Ok(Fake { tag: 0 })).unwrap();
        let _ = cache.resolve("Fake#x", || Ok(Other));
    }
}
