pub mod geojson;
pub mod upload;

pub use geojson::*;
pub use upload::*;
