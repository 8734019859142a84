//! Uniform bind-then-draw contract over a composed list of bindables.

pub mod geometry;
pub mod registry;

use std::sync::Arc;

use glam::Mat4;

use crate::bindable::buffer::IndexBuffer;
use crate::bindable::SharedBindable;
use crate::gfx::{BindContext, DrawError};

/// The drawable's record of its index buffer: the shared bindable plus the
/// count needed for the final draw call. Every instance registers its own
/// binding even when the buffer object itself is shared.
#[derive(Clone)]
pub struct IndexBinding {
    bind: SharedBindable,
    count: u32,
}

impl IndexBinding {
    pub fn new(buffer: Arc<IndexBuffer>) -> Self {
        let count = buffer.count();
        Self {
            bind: buffer,
            count,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(bind: SharedBindable, count: u32) -> Self {
        Self { bind, count }
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// A drawable object: an ordered bind list (mixing cache-shared and
/// exclusively owned bindables) plus the index binding. `draw` attaches
/// every bindable in insertion order, then issues exactly one indexed draw
/// call with the recorded count.
#[derive(Default)]
pub struct Drawable {
    binds: Vec<SharedBindable>,
    index: Option<IndexBinding>,
}

impl Drawable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bind(&mut self, bind: SharedBindable) {
        self.binds.push(bind);
    }

    /// Registers the index buffer. A drawable draws from exactly one index
    /// buffer; registering a second is a programmer error.
    pub fn set_index_buffer(&mut self, buffer: Arc<IndexBuffer>) {
        self.set_index_binding(IndexBinding::new(buffer));
    }

    pub fn set_index_binding(&mut self, binding: IndexBinding) {
        assert!(
            self.index.is_none(),
            "drawable already has an index buffer registered"
        );
        self.binds.push(binding.bind.clone());
        self.index = Some(binding);
    }

    pub fn index_count(&self) -> Option<u32> {
        self.index.as_ref().map(IndexBinding::count)
    }

    pub fn binds(&self) -> &[SharedBindable] {
        &self.binds
    }

    /// Checks the draw contract: a non-empty bind list and a registered
    /// index buffer. Returns the index count used by the draw call.
    pub fn validate(&self) -> Result<u32, DrawError> {
        if self.binds.is_empty() {
            return Err(DrawError::EmptyBindList);
        }
        match &self.index {
            Some(binding) => Ok(binding.count()),
            None => Err(DrawError::MissingIndexBuffer),
        }
    }

    pub fn draw(&self, ctx: &mut BindContext<'_, '_>, world: Mat4) -> Result<(), DrawError> {
        let count = self.validate()?;
        ctx.world = world;
        for bind in &self.binds {
            bind.bind(ctx);
        }
        ctx.pass.draw_indexed(0..count, 0, 0..1);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::bindable::Bindable;

    /// Bindable stand-in for contract tests; `bind` is never reached
    /// because no render pass exists in unit tests.
    pub struct NullBind {
        uid: String,
    }

    impl NullBind {
        pub fn new(uid: &str) -> Self {
            Self {
                uid: uid.to_owned(),
            }
        }

        pub fn shared(uid: &str) -> SharedBindable {
            Arc::new(Self::new(uid))
        }
    }

    impl Bindable for NullBind {
        fn uid(&self) -> &str {
            &self.uid
        }

        fn bind(&self, _ctx: &mut BindContext<'_, '_>) {}
    }
}
