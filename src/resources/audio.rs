use glam::{Affine3A, Vec3};

/// Positional audio source attached to a node.
///
/// Playback itself belongs to the audio layer; the scene only keeps the
/// source's spatial state in step with its node. The renderer calls
/// [`AudioEmitter::sync`] once per frame for every visible emitter.
#[derive(Debug, Clone)]
pub struct AudioEmitter {
    pub gain: f32,
    pub looping: bool,
    position: Vec3,
    direction: Vec3,
    syncs: u64,
}

impl AudioEmitter {
    #[must_use]
    pub fn new(gain: f32) -> Self {
        Self {
            gain,
            looping: false,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            syncs: 0,
        }
    }

    /// Copies position and forward direction out of the node's world matrix.
    pub fn sync(&mut self, world: &Affine3A) {
        self.position = world.translation.into();
        self.direction = world.transform_vector3(Vec3::NEG_Z).normalize_or_zero();
        self.syncs += 1;
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Number of frames this emitter has been synced.
    #[inline]
    #[must_use]
    pub fn sync_count(&self) -> u64 {
        self.syncs
    }
}

impl Default for AudioEmitter {
    fn default() -> Self {
        Self::new(1.0)
    }
}
