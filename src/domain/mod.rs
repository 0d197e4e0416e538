//! Domain layer - entities and trait seams

pub mod entities;
pub mod traits;
