//! What happens to chunks once the viewer has left them behind.

use serde::{Deserialize, Serialize};

/// Chunk retention policy applied at the end of every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum RetentionPolicy {
    /// Never remove a chunk once created. Memory grows with the explored area.
    #[default]
    KeepAll,
    /// Remove hidden chunks whose bounds are further than `distance` from the
    /// viewer. Their in-flight results are discarded on arrival.
    EvictBeyond { distance: f32 },
}

impl RetentionPolicy {
    /// Whether a chunk at `distance` from the viewer should be dropped.
    pub fn should_evict(&self, distance: f32, visible: bool) -> bool {
        match *self {
            Self::KeepAll => false,
            Self::EvictBeyond { distance: limit } => !visible && distance > limit,
        }
    }
}
