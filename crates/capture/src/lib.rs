pub mod session;
pub mod shape;

pub use session::*;
pub use shape::*;
