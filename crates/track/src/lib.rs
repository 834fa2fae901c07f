pub mod error;
pub mod geo_track;
pub mod raw;
pub mod sampler;
pub mod window;

pub use error::*;
pub use geo_track::*;
pub use raw::*;
pub use sampler::*;
pub use window::*;
