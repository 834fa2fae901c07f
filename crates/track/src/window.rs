use chrono::Duration;
use foundation::{Instant, TimeSpan};

use crate::{GeoTrack, TrackError};

/// Clock parameters for animating a track.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlaybackWindow {
    pub start: Instant,
    pub stop: Instant,
    /// Simulated seconds per wall-clock second.
    pub multiplier: f64,
}

impl PlaybackWindow {
    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.stop)
    }

    /// Track time covered, in seconds.
    pub fn duration_s(&self) -> f64 {
        self.span().duration_s()
    }

    /// Simulated clock after `elapsed_s` wall-clock seconds of playback,
    /// starting at `start` and holding at `stop`.
    pub fn clock_at(&self, elapsed_s: f64) -> Instant {
        let advanced_us = (elapsed_s.max(0.0) * self.multiplier * 1.0e6).round();
        if !advanced_us.is_finite() {
            return self.stop;
        }
        self.start
            .checked_add_signed(Duration::microseconds(advanced_us as i64))
            .unwrap_or(self.stop)
            .min(self.stop)
            .max(self.start)
    }
}

/// Full span of `track` with the caller's speed multiplier. No clamping.
pub fn compute_window(track: &GeoTrack, multiplier: f64) -> Result<PlaybackWindow, TrackError> {
    let span = track.span().ok_or(TrackError::EmptyTrack)?;
    Ok(PlaybackWindow {
        start: span.start,
        stop: span.end,
        multiplier,
    })
}

#[cfg(test)]
mod tests {
    use super::compute_window;
    use crate::{GeoTrack, RawTrack, TrackError, sample};
    use chrono::{Duration, TimeZone, Utc};
    use foundation::RawPoint;

    fn sampled(times: &[&str]) -> GeoTrack {
        let raw = RawTrack::new(
            times.iter().map(|_| RawPoint::new(1.0, 2.0, 3.0)).collect(),
            times.iter().map(|t| t.to_string()).collect(),
        );
        sample(&raw, 0, f64::INFINITY).unwrap()
    }

    #[test]
    fn window_spans_first_to_last_sample() {
        let track = sampled(&[
            "2020-01-01T00:00:00Z",
            "2020-01-01T00:00:10Z",
            "2020-01-01T00:01:00Z",
        ]);
        let w = compute_window(&track, 5.0).unwrap();
        assert_eq!(w.start, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(w.stop, Utc.with_ymd_and_hms(2020, 1, 1, 0, 1, 0).unwrap());
        assert_eq!(w.multiplier, 5.0);
        assert_eq!(w.duration_s(), 60.0);
    }

    #[test]
    fn single_sample_window_is_instant() {
        let track = sampled(&["2020-01-01T00:00:00Z"]);
        let w = compute_window(&track, 1.0).unwrap();
        assert_eq!(w.start, w.stop);
    }

    #[test]
    fn empty_track_is_an_error() {
        assert_eq!(
            compute_window(&GeoTrack::default(), 1.0),
            Err(TrackError::EmptyTrack)
        );
    }

    #[test]
    fn multiplier_is_forwarded_verbatim() {
        let track = sampled(&["2020-01-01T00:00:00Z", "2020-01-01T00:00:01Z"]);
        assert_eq!(compute_window(&track, -3.5).unwrap().multiplier, -3.5);
    }

    #[test]
    fn clock_advances_by_multiplier_and_holds_at_stop() {
        let track = sampled(&["2020-01-01T00:00:00Z", "2020-01-01T00:01:00Z"]);
        let w = compute_window(&track, 5.0).unwrap();
        assert_eq!(w.clock_at(0.0), w.start);
        assert_eq!(w.clock_at(2.0), w.start + Duration::seconds(10));
        assert_eq!(w.clock_at(1_000.0), w.stop);
        assert_eq!(w.clock_at(-4.0), w.start);
    }
}
