pub mod geometry;
pub mod landmarks;

pub use geometry::*;
pub use landmarks::*;
