pub mod constants;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod material;
pub mod math_utils;
pub mod model_setup;
pub mod phase;
pub mod temp_utils;
pub mod thermal;
pub mod transform;
pub mod volcano;

pub use error::{Result, SetupError};
