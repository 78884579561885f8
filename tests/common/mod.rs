pub mod docs;
pub mod workers;

pub use docs::*;
pub use workers::*;
