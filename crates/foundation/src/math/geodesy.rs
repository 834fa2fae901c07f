//! WGS84 ellipsoid helpers.
//!
//! Latitudes here are geodetic and in radians. `p` is the distance of a
//! world position from the polar axis, `sqrt(x² + y²)`.

/// Semi-major axis, meters.
pub const WGS84_A: f64 = 6_378_137.0;
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// Semi-minor axis, meters.
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// First eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);
/// Second eccentricity squared.
pub const WGS84_EP2: f64 = WGS84_E2 / (1.0 - WGS84_E2);

/// Prime-vertical radius of curvature.
pub fn prime_vertical_radius(lat_rad: f64) -> f64 {
    let sin_lat = lat_rad.sin();
    WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt()
}

/// Geodetic latitude of `(p, z)`, Bowring's closed form.
pub fn geodetic_latitude(p: f64, z: f64) -> f64 {
    let (sin_u, cos_u) = (z * WGS84_A).atan2(p * WGS84_B).sin_cos();
    let num = z + WGS84_EP2 * WGS84_B * sin_u.powi(3);
    let den = p - WGS84_E2 * WGS84_A * cos_u.powi(3);
    num.atan2(den)
}

/// Height of `(p, z)` above the ellipsoid, measured along the normal at
/// `lat_rad`. Finite everywhere, the polar axis included.
pub fn ellipsoid_height(p: f64, z: f64, lat_rad: f64) -> f64 {
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    p * cos_lat + z * sin_lat - WGS84_A * WGS84_A / prime_vertical_radius(lat_rad)
}
