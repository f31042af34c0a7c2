//! Ditto Core - Fundamental types shared by the engine crates

mod error;
mod types;
mod positions;

pub use error::*;
pub use types::*;
pub use positions::*;
