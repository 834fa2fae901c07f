use foundation::{Instant, RawPoint, TimeSpan};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: Instant,
    pub position: RawPoint,
}

impl Sample {
    pub fn new(timestamp: Instant, position: RawPoint) -> Self {
        Self {
            timestamp,
            position,
        }
    }
}

/// Cleaned position/time track ready for interpolated playback.
///
/// Samples are strictly increasing by timestamp. Only the sampler builds
/// these; a new filter run produces a new track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoTrack {
    samples: Vec<Sample>,
}

impl GeoTrack {
    pub(crate) fn from_samples(samples: Vec<Sample>) -> Self {
        debug_assert!(
            samples.windows(2).all(|w| w[0].timestamp < w[1].timestamp),
            "track samples must be strictly increasing"
        );
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn positions(&self) -> impl Iterator<Item = RawPoint> + '_ {
        self.samples.iter().map(|s| s.position)
    }

    pub fn span(&self) -> Option<TimeSpan> {
        Some(TimeSpan::new(self.first()?.timestamp, self.last()?.timestamp))
    }

    /// Position at `t`, linearly interpolated between the bracketing samples.
    ///
    /// Returns `None` outside the track's span.
    pub fn position_at(&self, t: Instant) -> Option<RawPoint> {
        let idx = self.samples.partition_point(|s| s.timestamp <= t);
        if idx == 0 {
            return None;
        }
        let prev = &self.samples[idx - 1];
        if prev.timestamp == t {
            return Some(prev.position);
        }
        let next = self.samples.get(idx)?;

        let total = (next.timestamp - prev.timestamp).num_microseconds()? as f64;
        let elapsed = (t - prev.timestamp).num_microseconds()? as f64;
        Some(prev.position.lerp(next.position, elapsed / total))
    }
}
