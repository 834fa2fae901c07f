pub mod config;
pub mod drawing;
pub mod error;
pub mod playback;
pub mod renderer;

pub use config::*;
pub use drawing::*;
pub use error::*;
pub use playback::*;
pub use renderer::*;
