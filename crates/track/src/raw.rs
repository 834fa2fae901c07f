use foundation::RawPoint;

/// Track as received from the upload server: positions and ISO-8601 times
/// in parallel arrays.
///
/// The lengths are expected to match; `sample` reports a mismatch instead of
/// the constructor so a payload can be inspected before it is rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTrack {
    pub coordinates: Vec<RawPoint>,
    pub times: Vec<String>,
}

impl RawTrack {
    pub fn new(coordinates: Vec<RawPoint>, times: Vec<String>) -> Self {
        Self { coordinates, times }
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}
