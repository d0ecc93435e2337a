pub mod obligation;
pub mod reserve;

pub use obligation::*;
pub use reserve::*;
