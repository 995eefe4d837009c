use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Session-wide random source shared by the scene and the reveal sparkles.
#[derive(Resource, Debug, Clone)]
pub struct SessionRng(pub StdRng);

impl SessionRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Seed derived from the wall clock.
pub fn session_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default()
    }
}
