use std::path::PathBuf;

use thiserror::Error;

/// Construction-time failures. These are fatal for the object being built;
/// the caller decides whether to abort or skip it.
#[derive(Debug, Error)]
pub enum GfxError {
    #[error("failed to create rendering surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to acquire GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,

    #[error("shader `{name}` failed validation: {message}")]
    ShaderValidation { name: String, message: String },

    #[error("unknown shader `{0}`")]
    UnknownShader(String),

    #[error("failed to load model `{path}`: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("model `{0}` contains no drawable content")]
    EmptyModel(PathBuf),

    #[error("mesh `{mesh}` is missing required `{attribute}` data")]
    MissingAttribute {
        mesh: String,
        attribute: &'static str,
    },

    #[error("mesh `{mesh}` has mismatched attribute counts ({detail})")]
    AttributeMismatch { mesh: String, detail: String },

    #[error("texture `{name}` uses unsupported pixel format {format:?}")]
    UnsupportedTextureFormat {
        name: String,
        format: gltf::image::Format,
    },
}

/// Draw-contract violations. A drawable that cannot legally be drawn fails
/// loudly instead of silently skipping the draw call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("drawable has an empty bind list")]
    EmptyBindList,

    #[error("drawable has no index buffer")]
    MissingIndexBuffer,
}

/// Per-frame failure, split so the caller can triage: surface errors are
/// often recoverable (reconfigure or skip a frame), draw-contract errors
/// are defects.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Surface(#[from] wgpu::SurfaceError),

    #[error(transparent)]
    Draw(#[from] DrawError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_attribute_names_mesh_and_attribute() {
        let err = GfxError::MissingAttribute {
            mesh: "lantern.0".into(),
            attribute: "NORMAL",
        };
        let msg = err.to_string();
        assert!(msg.contains("lantern.0"));
        assert!(msg.contains("NORMAL"));
    }

    #[test]
    fn draw_errors_are_distinguishable() {
        assert_ne!(DrawError::EmptyBindList, DrawError::MissingIndexBuffer);
    }
}
