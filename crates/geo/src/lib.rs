pub mod coord;
pub mod distance;
pub mod precision;
pub mod screen;

// Geo crate: small, well-tested geographic primitives only.
pub use coord::*;
pub use distance::*;
pub use screen::*;
