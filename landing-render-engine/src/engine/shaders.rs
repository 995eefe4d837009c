/// Additive billboard material for the background particle field
use bevy::{
    pbr::{MaterialPipeline, MaterialPipelineKey},
    prelude::*,
    reflect::TypePath,
    render::{
        mesh::{MeshVertexAttribute, MeshVertexBufferLayoutRef},
        render_resource::{
            AsBindGroup, RenderPipelineDescriptor, ShaderRef, SpecializedMeshPipelineError,
            VertexFormat,
        },
    },
};

/// Per-vertex particle size, world units before scaling.
pub const ATTRIBUTE_PARTICLE_SIZE: MeshVertexAttribute =
    MeshVertexAttribute::new("ParticleSize", 988_540_917, VertexFormat::Float32);

/// Scales particle sizes to world units at the default camera distance.
pub const PARTICLE_WORLD_SCALE: f32 = 0.6;

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct ParticleFieldMaterial {
    /// x: elapsed seconds, y: size scale, z: opacity multiplier.
    #[uniform(0)]
    pub params: Vec4,
}

impl ParticleFieldMaterial {
    pub fn new() -> Self {
        Self {
            params: Vec4::new(0.0, PARTICLE_WORLD_SCALE, 1.0, 0.0),
        }
    }

    pub fn set_time(&mut self, elapsed: f32) {
        self.params.x = elapsed;
    }
}

impl Default for ParticleFieldMaterial {
    fn default() -> Self {
        Self::new()
    }
}

impl Material for ParticleFieldMaterial {
    fn vertex_shader() -> ShaderRef {
        "shaders/particle_field.wgsl".into()
    }

    fn fragment_shader() -> ShaderRef {
        "shaders/particle_field.wgsl".into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(1),
            Mesh::ATTRIBUTE_COLOR.at_shader_location(2),
            ATTRIBUTE_PARTICLE_SIZE.at_shader_location(3),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}
