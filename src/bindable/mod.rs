//! Pipeline state abstraction: everything attached to the graphics pipeline
//! before an indexed draw call is a `Bindable`. Bindables with identical
//! construction parameters share one GPU resource through [`cache::BindableCache`].

pub mod buffer;
pub mod cache;
pub mod pipeline;
pub mod shader;
pub mod texture;
pub mod transform;
pub mod uniform;
pub mod vertex;

use std::sync::Arc;

use crate::gfx::BindContext;

/// A piece of pipeline state that can be attached before a draw call.
///
/// The identity string is a pure function of the semantic construction
/// parameters: two bindables built from equal parameters produce equal
/// identities and are interchangeable.
pub trait Bindable: Send + Sync {
    fn uid(&self) -> &str;

    /// Pushes this resource into the active pipeline state.
    fn bind(&self, ctx: &mut BindContext<'_, '_>);
}

pub type SharedBindable = Arc<dyn Bindable>;
