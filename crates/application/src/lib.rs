pub mod clock;
pub mod usecase;

pub use clock::*;
pub use usecase::*;
