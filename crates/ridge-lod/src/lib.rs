//! Distance-based level-of-detail selection for terrain chunks.

pub mod selector;

pub use selector::{DetailLevels, LodError, LodInfo};
