pub mod context;
pub mod error;
pub mod frame;

pub use context::{DepthTexture, WgpuContext};
pub use error::{DrawError, GfxError, RenderError};
pub use frame::{BindContext, FrameContext};
