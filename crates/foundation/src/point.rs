use crate::math::{Ecef, WGS84_E2, ellipsoid_height, geodetic_latitude, prime_vertical_radius};

/// A position as delivered by the upload server: longitude/latitude in
/// degrees and altitude in meters above the WGS84 ellipsoid.
///
/// Values are carried through untouched; nothing here validates ranges.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RawPoint {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub alt_m: f64,
}

impl RawPoint {
    pub fn new(lon_deg: f64, lat_deg: f64, alt_m: f64) -> Self {
        Self {
            lon_deg,
            lat_deg,
            alt_m,
        }
    }

    /// `[lon, lat, alt]`, the GeoJSON position order.
    pub fn as_array(self) -> [f64; 3] {
        [self.lon_deg, self.lat_deg, self.alt_m]
    }

    pub fn from_array([lon_deg, lat_deg, alt_m]: [f64; 3]) -> Self {
        Self::new(lon_deg, lat_deg, alt_m)
    }

    pub fn to_ecef(self) -> Ecef {
        let (sin_lat, cos_lat) = self.lat_deg.to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.lon_deg.to_radians().sin_cos();
        let n = prime_vertical_radius(self.lat_deg.to_radians());
        let r = (n + self.alt_m) * cos_lat;
        Ecef::new(
            r * cos_lon,
            r * sin_lon,
            (n * (1.0 - WGS84_E2) + self.alt_m) * sin_lat,
        )
    }

    /// Inverse of [`RawPoint::to_ecef`]. On the polar axis the longitude
    /// is reported as 0.
    pub fn from_ecef(ecef: Ecef) -> Self {
        let p = ecef.axis_distance();
        let lat = geodetic_latitude(p, ecef.z);
        Self::new(
            ecef.y.atan2(ecef.x).to_degrees(),
            lat.to_degrees(),
            ellipsoid_height(p, ecef.z, lat),
        )
    }

    /// Component-wise linear interpolation; `t` is not clamped.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            self.lon_deg + (other.lon_deg - self.lon_deg) * t,
            self.lat_deg + (other.lat_deg - self.lat_deg) * t,
            self.alt_m + (other.alt_m - self.alt_m) * t,
        )
    }
}
