//! Small 2D math helpers shared by the Ridge terrain crates.

mod rect;

pub use rect::{Rect2, inverse_lerp, lerp};
