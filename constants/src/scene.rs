/// Particle count of a fresh session.
pub const PARTICLE_COUNT: usize = 200;

/// Particle count never drops below this under degradation.
pub const MIN_PARTICLE_COUNT: usize = 40;

/// Edge length of the cube particles are scattered in.
pub const PARTICLE_CUBE_EDGE: f32 = 400.0;

/// Particle sizes are drawn from `[min, max)`.
pub const PARTICLE_SIZE_RANGE: (f32, f32) = (1.0, 4.0);

/// Per-frame self-rotation of the particle field (x, y), radians.
pub const PARTICLE_SPIN_PER_FRAME: (f32, f32) = (0.001, 0.002);

/// Fraction of the remaining distance the scene rotation covers per frame.
pub const ROTATION_SMOOTHING: f32 = 0.05;

/// Pointer / orientation input to target rotation factor.
pub const ROTATION_INPUT_SCALE: f32 = 0.1;

/// Bounding box polyhedra are placed in (x, y, z extents).
pub const NODE_BOX: [f32; 3] = [300.0, 300.0, 200.0];

/// Vertical float amplitude of polyhedra.
pub const FLOAT_AMPLITUDE: f32 = 20.0;

/// Float speeds are drawn from `[min, max)`.
pub const FLOAT_SPEED_RANGE: (f32, f32) = (0.01, 0.03);

/// Per-axis rotation speeds are drawn from `[-max, max)`, radians per reference frame.
pub const ROTATION_SPEED_MAX: f32 = 0.01;

/// Frame rate the per-frame rotation speeds are expressed against.
pub const REFERENCE_FPS: f32 = 60.0;

/// Opacity pulse: `base + sin(t * freq + x * phase) * amplitude`.
pub const OPACITY_BASE: f32 = 0.2;
pub const OPACITY_AMPLITUDE: f32 = 0.1;
pub const OPACITY_FREQUENCY: f32 = 2.0;
pub const OPACITY_POSITION_PHASE: f32 = 0.01;

/// Extra y rotation per node index at full scroll.
pub const SCROLL_NODE_ROTATION: f32 = 0.1;

/// Circumradius and base count of each polyhedron kind.
pub const TETRAHEDRON: (f32, usize) = (8.0, 5);
pub const OCTAHEDRON: (f32, usize) = (6.0, 4);
pub const ICOSAHEDRON: (f32, usize) = (5.0, 6);
pub const DODECAHEDRON: (f32, usize) = (7.0, 3);

/// Each kind's count is randomised by up to this many nodes either way.
pub const NODE_COUNT_JITTER: usize = 1;
