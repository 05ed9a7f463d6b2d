//! Data models

pub mod model_info;
pub mod score;

pub use model_info::*;
pub use score::*;
