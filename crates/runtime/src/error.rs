use capture::CaptureError;
use formats::{NormalizeError, UploadError};
use track::TrackError;

use crate::config::ConfigError;

#[derive(Debug)]
pub enum RuntimeError {
    Track(TrackError),
    Capture(CaptureError),
    Normalize(NormalizeError),
    Upload(UploadError),
    Config(ConfigError),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeError::Track(e) => write!(f, "track: {e}"),
            RuntimeError::Capture(e) => write!(f, "capture: {e}"),
            RuntimeError::Normalize(e) => write!(f, "normalize: {e}"),
            RuntimeError::Upload(e) => write!(f, "upload: {e}"),
            RuntimeError::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Track(e) => Some(e),
            RuntimeError::Capture(e) => Some(e),
            RuntimeError::Normalize(e) => Some(e),
            RuntimeError::Upload(e) => Some(e),
            RuntimeError::Config(e) => Some(e),
        }
    }
}

impl From<TrackError> for RuntimeError {
    fn from(e: TrackError) -> Self {
        RuntimeError::Track(e)
    }
}

impl From<CaptureError> for RuntimeError {
    fn from(e: CaptureError) -> Self {
        RuntimeError::Capture(e)
    }
}

impl From<NormalizeError> for RuntimeError {
    fn from(e: NormalizeError) -> Self {
        RuntimeError::Normalize(e)
    }
}

impl From<UploadError> for RuntimeError {
    fn from(e: UploadError) -> Self {
        RuntimeError::Upload(e)
    }
}

impl From<ConfigError> for RuntimeError {
    fn from(e: ConfigError) -> Self {
        RuntimeError::Config(e)
    }
}
