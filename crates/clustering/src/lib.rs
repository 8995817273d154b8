pub mod cluster;
pub mod spiderfy;

pub use cluster::*;
pub use spiderfy::*;
