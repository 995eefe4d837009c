/// Primary accent used by particles, lights and the idle cursor follower.
pub const CYAN: u32 = 0x00ffff;

/// Secondary accent used by particles, polyhedra and the hover follower.
pub const PINK: u32 = 0xff0080;

pub const BLUE: u32 = 0x0080ff;

/// Fog colour matching the page background.
pub const BACKGROUND: u32 = 0x0a0a0f;

/// Default two-colour particle palette.
pub const DEFAULT_PARTICLE_PALETTE: [u32; 2] = [CYAN, PINK];

/// Split a packed `0xRRGGBB` value into byte channels.
pub const fn rgb_channels(hex: u32) -> [u8; 3] {
    [
        ((hex >> 16) & 0xff) as u8,
        ((hex >> 8) & 0xff) as u8,
        (hex & 0xff) as u8,
    ]
}
