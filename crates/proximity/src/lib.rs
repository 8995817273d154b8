pub mod filter;
pub mod selection;

pub use filter::*;
pub use selection::*;
