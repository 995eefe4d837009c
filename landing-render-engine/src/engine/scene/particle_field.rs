use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;
use constants::scene::{PARTICLE_CUBE_EDGE, PARTICLE_SIZE_RANGE};
use rand::Rng;

use crate::engine::shaders::ATTRIBUTE_PARTICLE_SIZE;

/// Two triangles per particle, expanded to a camera-facing quad in the shader.
const QUAD_CORNERS: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

/// Particle field entity; remembers what it was built from.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ParticleField {
    pub count: usize,
    pub palette: [Color; 2],
}

/// How many particles the field should hold. Written by config and degradation.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleDensity {
    pub count: usize,
    degraded: bool,
}

impl ParticleDensity {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            degraded: false,
        }
    }

    /// Reduce once per session. The floor only holds while it is below the
    /// current count, so a live field always loses particles.
    pub fn degrade(&mut self, factor: f32, min_count: usize) -> bool {
        if self.degraded {
            return false;
        }
        self.degraded = true;
        if self.count == 0 {
            return false;
        }
        let reduced = ((self.count as f32 * factor.clamp(0.0, 1.0)) as usize)
            .max(min_count)
            .min(self.count - 1);
        self.count = reduced;
        true
    }

    /// A configured count never raises the density above a degraded ceiling.
    pub fn configure(&mut self, count: usize) {
        self.count = if self.degraded {
            count.min(self.count)
        } else {
            count
        };
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

impl Default for ParticleDensity {
    fn default() -> Self {
        Self::new(constants::scene::PARTICLE_COUNT)
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ParticlePalette(pub [Color; 2]);

/// Generated once per build; any density or palette change rebuilds it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleBuffer {
    pub positions: Vec<Vec3>,
    pub colors: Vec<LinearRgba>,
    pub sizes: Vec<f32>,
}

impl ParticleBuffer {
    pub fn generate(count: usize, palette: [Color; 2], rng: &mut impl Rng) -> Self {
        let palette = palette.map(LinearRgba::from);
        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        let mut sizes = Vec::with_capacity(count);

        for _ in 0..count {
            positions.push(Vec3::new(
                (rng.random::<f32>() - 0.5) * PARTICLE_CUBE_EDGE,
                (rng.random::<f32>() - 0.5) * PARTICLE_CUBE_EDGE,
                (rng.random::<f32>() - 0.5) * PARTICLE_CUBE_EDGE,
            ));
            colors.push(if rng.random_bool(0.5) {
                palette[0]
            } else {
                palette[1]
            });
            sizes.push(rng.random_range(PARTICLE_SIZE_RANGE.0..PARTICLE_SIZE_RANGE.1));
        }

        Self {
            positions,
            colors,
            sizes,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn to_mesh(&self) -> Mesh {
        let vertex_count = self.len() * QUAD_CORNERS.len();
        let mut positions = Vec::with_capacity(vertex_count);
        let mut corners = Vec::with_capacity(vertex_count);
        let mut colors = Vec::with_capacity(vertex_count);
        let mut sizes = Vec::with_capacity(vertex_count);

        for i in 0..self.len() {
            for corner in QUAD_CORNERS {
                positions.push(self.positions[i].to_array());
                corners.push(corner);
                colors.push(self.colors[i].to_f32_array());
                sizes.push(self.sizes[i]);
            }
        }

        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, corners)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
        .with_inserted_attribute(ATTRIBUTE_PARTICLE_SIZE, sizes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn palette() -> [Color; 2] {
        [Color::srgb(0.0, 1.0, 1.0), Color::srgb(1.0, 0.0, 0.5)]
    }

    #[test]
    fn particles_stay_inside_the_cube() {
        let mut rng = StdRng::seed_from_u64(3);
        let buffer = ParticleBuffer::generate(500, palette(), &mut rng);
        let half = PARTICLE_CUBE_EDGE / 2.0;

        assert_eq!(buffer.len(), 500);
        for position in &buffer.positions {
            assert!(position.abs().max_element() <= half);
        }
        for size in &buffer.sizes {
            assert!(*size >= PARTICLE_SIZE_RANGE.0 && *size < PARTICLE_SIZE_RANGE.1);
        }
        let [a, b] = palette().map(LinearRgba::from);
        assert!(buffer.colors.iter().all(|c| *c == a || *c == b));
        assert!(buffer.colors.contains(&a) && buffer.colors.contains(&b));
    }

    #[test]
    fn same_seed_same_field() {
        let first = ParticleBuffer::generate(50, palette(), &mut StdRng::seed_from_u64(11));
        let second = ParticleBuffer::generate(50, palette(), &mut StdRng::seed_from_u64(11));
        assert_eq!(first, second);
    }

    #[test]
    fn mesh_has_six_vertices_per_particle() {
        let buffer = ParticleBuffer::generate(12, palette(), &mut StdRng::seed_from_u64(5));
        let mesh = buffer.to_mesh();
        assert_eq!(mesh.count_vertices(), 72);
        assert!(mesh.attribute(ATTRIBUTE_PARTICLE_SIZE).is_some());
    }

    #[test]
    fn degradation_reduces_once_and_respects_the_floor() {
        let mut density = ParticleDensity::new(200);
        assert!(density.degrade(0.5, 40));
        assert_eq!(density.count, 100);
        assert!(!density.degrade(0.5, 40));
        assert_eq!(density.count, 100);

        density.configure(300);
        assert_eq!(density.count, 100);
        density.configure(60);
        assert_eq!(density.count, 60);

        let mut small = ParticleDensity::new(50);
        assert!(small.degrade(0.5, 40));
        assert_eq!(small.count, 40);
    }

    #[test]
    fn degradation_still_reduces_at_or_below_the_floor() {
        let mut at_floor = ParticleDensity::new(40);
        assert!(at_floor.degrade(0.5, 40));
        assert_eq!(at_floor.count, 39);

        let mut below_floor = ParticleDensity::new(30);
        assert!(below_floor.degrade(0.5, 40));
        assert_eq!(below_floor.count, 29);

        let mut empty = ParticleDensity::new(0);
        assert!(!empty.degrade(0.5, 40));
        assert_eq!(empty.count, 0);
        assert!(empty.is_degraded());
    }
}
