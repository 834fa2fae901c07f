#[derive(Debug, Clone, PartialEq)]
pub enum TrackError {
    LengthMismatch { coordinates: usize, times: usize },
    MalformedTimestamp { index: usize, value: String },
    EmptyTrack,
    InvalidThreshold(f64),
}

impl std::fmt::Display for TrackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackError::LengthMismatch { coordinates, times } => write!(
                f,
                "track has {coordinates} coordinates but {times} timestamps"
            ),
            TrackError::MalformedTimestamp { index, value } => {
                write!(f, "malformed timestamp at index {index}: {value:?}")
            }
            TrackError::EmptyTrack => write!(f, "track has no samples"),
            TrackError::InvalidThreshold(t) => {
                write!(f, "jump threshold must be positive, got {t}")
            }
        }
    }
}

impl std::error::Error for TrackError {}
