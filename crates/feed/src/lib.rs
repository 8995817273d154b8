pub mod marker;
pub mod presence;
pub mod record;
pub mod snapshot;

pub use marker::*;
pub use presence::*;
pub use record::*;
pub use snapshot::*;
