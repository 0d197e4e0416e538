//! Application layer - filtering, dispatch, lifecycle

pub mod dispatcher;
pub mod errors;
pub mod lifecycle;
pub mod normalizer;
