pub mod events;
pub mod map;
pub mod popup;

pub use events::*;
pub use map::*;
pub use popup::*;
