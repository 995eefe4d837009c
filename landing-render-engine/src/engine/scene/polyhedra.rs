use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::render_asset::RenderAssetUsages;
use constants::scene::{
    DODECAHEDRON, FLOAT_SPEED_RANGE, ICOSAHEDRON, NODE_BOX, OCTAHEDRON, OPACITY_AMPLITUDE,
    OPACITY_BASE, OPACITY_FREQUENCY, OPACITY_POSITION_PHASE, REFERENCE_FPS, ROTATION_SPEED_MAX,
    SCROLL_NODE_ROTATION, TETRAHEDRON,
};
use rand::Rng;
use std::f32::consts::PI;

const GOLDEN_RATIO: f32 = 1.618_034;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeShape {
    Tetrahedron,
    Octahedron,
    Icosahedron,
    Dodecahedron,
}

impl NodeShape {
    pub const ALL: [NodeShape; 4] = [
        NodeShape::Tetrahedron,
        NodeShape::Octahedron,
        NodeShape::Icosahedron,
        NodeShape::Dodecahedron,
    ];

    pub fn radius(self) -> f32 {
        self.settings().0
    }

    pub fn base_count(self) -> usize {
        self.settings().1
    }

    fn settings(self) -> (f32, usize) {
        match self {
            NodeShape::Tetrahedron => TETRAHEDRON,
            NodeShape::Octahedron => OCTAHEDRON,
            NodeShape::Icosahedron => ICOSAHEDRON,
            NodeShape::Dodecahedron => DODECAHEDRON,
        }
    }

    /// Outward-facing triangles on a sphere of the shape's radius.
    pub fn triangles(self) -> Vec<[Vec3; 3]> {
        let triangles = match self {
            NodeShape::Tetrahedron => {
                let vertices = [
                    Vec3::new(1.0, 1.0, 1.0),
                    Vec3::new(1.0, -1.0, -1.0),
                    Vec3::new(-1.0, 1.0, -1.0),
                    Vec3::new(-1.0, -1.0, 1.0),
                ];
                to_triangles(&vertices, &equilateral_faces(&vertices, 2.0 * 2f32.sqrt()))
            }
            NodeShape::Octahedron => {
                let vertices = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
                to_triangles(&vertices, &equilateral_faces(&vertices, 2f32.sqrt()))
            }
            NodeShape::Icosahedron => {
                let vertices = icosahedron_vertices();
                to_triangles(&vertices, &equilateral_faces(&vertices, 2.0))
            }
            NodeShape::Dodecahedron => dodecahedron_triangles(),
        };
        let radius = self.radius();
        triangles
            .into_iter()
            .map(|tri| outward(tri.map(|v| v.normalize() * radius)))
            .collect()
    }

    /// Flat-shaded mesh, one normal per face.
    pub fn mesh(self) -> Mesh {
        let triangles = self.triangles();
        let mut positions = Vec::with_capacity(triangles.len() * 3);
        let mut normals = Vec::with_capacity(triangles.len() * 3);
        for [a, b, c] in triangles {
            let normal = (b - a).cross(c - a).normalize();
            for vertex in [a, b, c] {
                positions.push(vertex.to_array());
                normals.push(normal.to_array());
            }
        }
        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    }
}

fn icosahedron_vertices() -> Vec<Vec3> {
    let mut vertices = Vec::with_capacity(12);
    for a in [-1.0, 1.0] {
        for b in [-GOLDEN_RATIO, GOLDEN_RATIO] {
            vertices.push(Vec3::new(0.0, a, b));
            vertices.push(Vec3::new(a, b, 0.0));
            vertices.push(Vec3::new(b, 0.0, a));
        }
    }
    vertices
}

/// Vertex triples whose pairwise distances all equal `edge`.
fn equilateral_faces(vertices: &[Vec3], edge: f32) -> Vec<[usize; 3]> {
    let is_edge = |a: Vec3, b: Vec3| (a.distance(b) - edge).abs() < 1e-3;
    let mut faces = Vec::new();
    for i in 0..vertices.len() {
        for j in i + 1..vertices.len() {
            if !is_edge(vertices[i], vertices[j]) {
                continue;
            }
            for k in j + 1..vertices.len() {
                if is_edge(vertices[j], vertices[k]) && is_edge(vertices[i], vertices[k]) {
                    faces.push([i, j, k]);
                }
            }
        }
    }
    faces
}

fn to_triangles(vertices: &[Vec3], faces: &[[usize; 3]]) -> Vec<[Vec3; 3]> {
    faces
        .iter()
        .map(|face| face.map(|i| vertices[i]))
        .collect()
}

/// Dual of the icosahedron: one pentagon per icosahedron vertex, with
/// corners at the centroids of the five faces around it.
fn dodecahedron_triangles() -> Vec<[Vec3; 3]> {
    let vertices = icosahedron_vertices();
    let faces = equilateral_faces(&vertices, 2.0);
    let centroids: Vec<Vec3> = faces
        .iter()
        .map(|face| face.iter().map(|&i| vertices[i]).sum::<Vec3>() / 3.0)
        .collect();

    let mut triangles = Vec::with_capacity(36);
    for (index, vertex) in vertices.iter().enumerate() {
        let axis = vertex.normalize();
        let mut corners: Vec<Vec3> = faces
            .iter()
            .zip(&centroids)
            .filter(|(face, _)| face.contains(&index))
            .map(|(_, centroid)| *centroid)
            .collect();

        let reference = (corners[0] - axis * corners[0].dot(axis)).normalize();
        let side = axis.cross(reference);
        corners.sort_by(|a, b| {
            let angle = |p: &Vec3| p.dot(side).atan2(p.dot(reference));
            angle(a).total_cmp(&angle(b))
        });

        for i in 1..corners.len() - 1 {
            triangles.push([corners[0], corners[i], corners[i + 1]]);
        }
    }
    triangles
}

fn outward([a, b, c]: [Vec3; 3]) -> [Vec3; 3] {
    if (b - a).cross(c - a).dot(a + b + c) < 0.0 {
        [a, c, b]
    } else {
        [a, b, c]
    }
}

/// Parameters of one floating polyhedron. Never mutated after spawn.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct FloatingNode {
    pub shape: NodeShape,
    pub index: usize,
    pub origin: Vec3,
    pub initial_rotation: Vec3,
    pub float_speed: f32,
    /// Radians per reference frame, per axis.
    pub rotation_speed: Vec3,
    pub wireframe: bool,
    pub accent: Color,
}

impl FloatingNode {
    pub fn random(shape: NodeShape, index: usize, palette: [Color; 2], rng: &mut impl Rng) -> Self {
        let mut centred = |extent: f32| (rng.random::<f32>() - 0.5) * extent;
        let origin = Vec3::new(centred(NODE_BOX[0]), centred(NODE_BOX[1]), centred(NODE_BOX[2]));
        let initial_rotation = Vec3::new(
            rng.random::<f32>() * PI,
            rng.random::<f32>() * PI,
            rng.random::<f32>() * PI,
        );
        let mut speed = || rng.random_range(-ROTATION_SPEED_MAX..ROTATION_SPEED_MAX);
        let rotation_speed = Vec3::new(speed(), speed(), speed());

        Self {
            shape,
            index,
            origin,
            initial_rotation,
            float_speed: rng.random_range(FLOAT_SPEED_RANGE.0..FLOAT_SPEED_RANGE.1),
            rotation_speed,
            wireframe: rng.random_bool(0.5),
            accent: if rng.random_bool(0.5) {
                palette[0]
            } else {
                palette[1]
            },
        }
    }

    /// Transform at `elapsed` seconds with the page scrolled to `scroll_fraction`.
    pub fn transform_at(&self, elapsed: f32, scroll_fraction: f32, amplitude: f32) -> Transform {
        let y = self.origin.y + (elapsed * self.float_speed).sin() * amplitude;
        let spin = self.initial_rotation + self.rotation_speed * elapsed * REFERENCE_FPS;
        let scroll_spin =
            scroll_fraction.clamp(0.0, 1.0) * (self.index + 1) as f32 * SCROLL_NODE_ROTATION;

        Transform::from_xyz(self.origin.x, y, self.origin.z).with_rotation(Quat::from_euler(
            EulerRot::XYZ,
            spin.x,
            spin.y + scroll_spin,
            spin.z,
        ))
    }

    pub fn opacity_at(&self, elapsed: f32) -> f32 {
        OPACITY_BASE
            + (elapsed * OPACITY_FREQUENCY + self.origin.x * OPACITY_POSITION_PHASE).sin()
                * OPACITY_AMPLITUDE
    }
}

/// Base count per shape, shifted by up to `jitter` either way.
pub fn jittered_count(shape: NodeShape, jitter: usize, rng: &mut impl Rng) -> usize {
    let base = shape.base_count();
    let low = base.saturating_sub(jitter);
    rng.random_range(low..=base + jitter)
}
