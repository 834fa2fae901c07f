/// Earth-centered, Earth-fixed Cartesian coordinates (meters).
///
/// This is the frame the globe renderer picks world positions in.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ecef {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Ecef {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Distance from the polar axis.
    pub fn axis_distance(self) -> f64 {
        self.x.hypot(self.y)
    }
}
