use crate::gfx::GfxError;

/// Cached WGSL shader module. Not bound directly: wgpu consumes shader
/// stages at pipeline creation, so this resource feeds
/// [`super::pipeline::PipelineState`] construction instead of a bind list.
pub struct ShaderModule {
    uid: String,
    name: String,
    module: wgpu::ShaderModule,
}

impl ShaderModule {
    pub fn generate_uid(name: &str) -> String {
        format!("Shader#{name}")
    }

    fn source_for(name: &str) -> Option<&'static str> {
        match name {
            "phong" => Some(include_str!("../shaders/phong.wgsl")),
            "phong_textured" => Some(include_str!("../shaders/phong_textured.wgsl")),
            "emissive" => Some(include_str!("../shaders/emissive.wgsl")),
            _ => None,
        }
    }

    pub fn new(device: &wgpu::Device, name: &str) -> Result<Self, GfxError> {
        let source =
            Self::source_for(name).ok_or_else(|| GfxError::UnknownShader(name.to_owned()))?;

        // Validation errors surface through an error scope rather than a
        // return value; trap them so a bad shader fails construction
        // instead of crashing at first use.
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(GfxError::ShaderValidation {
                name: name.to_owned(),
                message: err.to_string(),
            });
        }

        Ok(Self {
            uid: Self::generate_uid(name),
            name: name.to_owned(),
            module,
        })
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_derives_from_shader_name() {
        assert_eq!(ShaderModule::generate_uid("phong"), "Shader#phong");
        assert_ne!(
            ShaderModule::generate_uid("phong"),
            ShaderModule::generate_uid("phong_textured"),
        );
    }

    #[test]
    fn known_shaders_have_sources() {
        for name in ["phong", "phong_textured", "emissive"] {
            assert!(ShaderModule::source_for(name).is_some(), "{name}");
        }
        assert!(ShaderModule::source_for("missing").is_none());
    }
}
