//! Raw upload track → `GeoTrack`.
//!
//! Upload tracks tend to open with a non-informative lead-in (device warm-up)
//! and carry the occasional telemetry spike. The sampler skips the lead-in by
//! index and drops any sample whose longitude jumps further than the
//! threshold from the last *accepted* sample. A rejected sample never becomes
//! the reference for the next comparison.
//!
//! Accepted samples are then ordered by timestamp. A late-arriving sample
//! slots into place, and of two samples sharing an instant the one that
//! arrived later wins.

use foundation::parse_instant;
use tracing::debug;

use crate::{GeoTrack, RawTrack, Sample, TrackError};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SamplerOptions {
    /// First raw index considered; earlier samples are skipped.
    pub start_index: usize,
    /// Maximum accepted longitude delta (degrees) between consecutive samples.
    pub jump_threshold: f64,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            start_index: 0,
            jump_threshold: f64::INFINITY,
        }
    }
}

pub fn sample(
    raw: &RawTrack,
    start_index: usize,
    jump_threshold: f64,
) -> Result<GeoTrack, TrackError> {
    sample_with(
        raw,
        SamplerOptions {
            start_index,
            jump_threshold,
        },
    )
}

pub fn sample_with(raw: &RawTrack, opts: SamplerOptions) -> Result<GeoTrack, TrackError> {
    if raw.coordinates.len() != raw.times.len() {
        return Err(TrackError::LengthMismatch {
            coordinates: raw.coordinates.len(),
            times: raw.times.len(),
        });
    }
    // `!(x > 0.0)` also rejects NaN.
    if !(opts.jump_threshold > 0.0) {
        return Err(TrackError::InvalidThreshold(opts.jump_threshold));
    }

    let mut samples: Vec<Sample> = Vec::new();
    let mut last_lon: Option<f64> = None;
    let mut discarded = 0usize;

    let candidates = raw
        .coordinates
        .iter()
        .zip(&raw.times)
        .enumerate()
        .skip(opts.start_index);

    for (index, (position, time)) in candidates {
        if let Some(prev_lon) = last_lon {
            let delta = (prev_lon - position.lon_deg).abs();
            if delta > opts.jump_threshold {
                debug!(index, delta, "discarding longitude jump");
                discarded += 1;
                continue;
            }
        }

        let timestamp = parse_instant(time).map_err(|e| TrackError::MalformedTimestamp {
            index,
            value: e.input,
        })?;

        last_lon = Some(position.lon_deg);
        samples.push(Sample::new(timestamp, *position));
    }

    let accepted = samples.len();
    let samples = order_by_time(samples);

    debug!(
        accepted,
        discarded,
        superseded = accepted - samples.len(),
        start_index = opts.start_index,
        "sampled track"
    );

    Ok(GeoTrack::from_samples(samples))
}

/// Stable sort by timestamp, then collapse equal instants onto the sample
/// that came last in input order.
fn order_by_time(mut samples: Vec<Sample>) -> Vec<Sample> {
    if samples.windows(2).all(|w| w[0].timestamp < w[1].timestamp) {
        return samples;
    }
    samples.sort_by_key(|s| s.timestamp);

    let mut ordered: Vec<Sample> = Vec::with_capacity(samples.len());
    for s in samples {
        match ordered.last_mut() {
            Some(prev) if prev.timestamp == s.timestamp => {
                debug!(timestamp = %s.timestamp, "later sample replaces one at same instant");
                *prev = s;
            }
            _ => ordered.push(s),
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::{SamplerOptions, sample, sample_with};
    use crate::{RawTrack, TrackError};
    use foundation::RawPoint;

    fn raw(lons: &[f64]) -> RawTrack {
        RawTrack::new(
            lons.iter().map(|&lon| RawPoint::new(lon, 20.0, 0.0)).collect(),
            (0..lons.len())
                .map(|i| format!("2021-06-01T12:00:{i:02}Z"))
                .collect(),
        )
    }

    fn lons(track: &crate::GeoTrack) -> Vec<f64> {
        track.positions().map(|p| p.lon_deg).collect()
    }

    #[test]
    fn infinite_threshold_keeps_everything_in_order() {
        let input = raw(&[10.0, 50.0, -120.0, 179.0, 0.0]);
        let track = sample(&input, 0, f64::INFINITY).unwrap();
        assert_eq!(track.len(), 5);
        assert_eq!(lons(&track), vec![10.0, 50.0, -120.0, 179.0, 0.0]);
    }

    #[test]
    fn default_options_keep_everything() {
        let input = raw(&[1.0, 2.0, 90.0]);
        let track = sample_with(&input, SamplerOptions::default()).unwrap();
        assert_eq!(track.len(), 3);
    }

    #[test]
    fn drops_jump_and_compares_next_against_last_accepted() {
        let input = RawTrack::new(
            vec![
                RawPoint::new(10.0, 20.0, 0.0),
                RawPoint::new(10.005, 20.0, 0.0),
                RawPoint::new(50.0, 20.0, 0.0),
                RawPoint::new(10.01, 20.0, 0.0),
            ],
            vec![
                "2021-06-01T12:00:00Z".to_string(),
                "2021-06-01T12:00:01Z".to_string(),
                "2021-06-01T12:00:02Z".to_string(),
                "2021-06-01T12:00:03Z".to_string(),
            ],
        );
        let track = sample(&input, 0, 0.01).unwrap();
        assert_eq!(lons(&track), vec![10.0, 10.005, 10.01]);

        let secs: Vec<u32> = track
            .samples()
            .iter()
            .map(|s| chrono::Timelike::second(&s.timestamp))
            .collect();
        assert_eq!(secs, vec![0, 1, 3]);
    }

    #[test]
    fn consecutive_spikes_stay_anchored_to_last_accepted() {
        let input = raw(&[10.0, 40.0, 41.0, 10.001]);
        let track = sample(&input, 0, 0.01).unwrap();
        assert_eq!(lons(&track), vec![10.0, 10.001]);
    }

    #[test]
    fn start_index_skips_lead_in_and_first_is_always_accepted() {
        let input = raw(&[0.0, 0.0, 90.0, 90.005]);
        let track = sample(&input, 2, 0.01).unwrap();
        assert_eq!(lons(&track), vec![90.0, 90.005]);
    }

    #[test]
    fn start_index_past_end_is_empty() {
        let input = raw(&[1.0, 2.0]);
        assert!(sample(&input, 2, 1.0).unwrap().is_empty());
        assert!(sample(&input, 99, 1.0).unwrap().is_empty());
        assert!(sample(&RawTrack::default(), 0, 1.0).unwrap().is_empty());
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut input = raw(&[1.0, 2.0]);
        input.times.pop();
        assert_eq!(
            sample(&input, 0, 1.0),
            Err(TrackError::LengthMismatch {
                coordinates: 2,
                times: 1
            })
        );
    }

    #[test]
    fn malformed_timestamp_on_accepted_sample_fails() {
        let mut input = raw(&[1.0, 1.0, 1.0]);
        input.times[1] = "not-a-time".to_string();
        assert_eq!(
            sample(&input, 0, 1.0),
            Err(TrackError::MalformedTimestamp {
                index: 1,
                value: "not-a-time".to_string()
            })
        );
    }

    #[test]
    fn malformed_timestamp_on_discarded_sample_is_ignored() {
        let mut input = raw(&[1.0, 70.0, 1.0]);
        input.times[1] = "not-a-time".to_string();
        let track = sample(&input, 0, 1.0).unwrap();
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn out_of_order_samples_are_slotted_into_time_order() {
        let mut input = raw(&[1.0, 2.0, 3.0]);
        input.times = vec![
            "2021-06-01T12:00:05Z".to_string(),
            "2021-06-01T12:00:03Z".to_string(),
            "2021-06-01T12:00:01Z".to_string(),
        ];
        let track = sample(&input, 0, f64::INFINITY).unwrap();
        assert_eq!(track.len(), 3);
        assert_eq!(lons(&track), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn late_early_sample_does_not_truncate_track() {
        let mut input = raw(&[1.0, 2.0, 3.0]);
        input.times = vec![
            "2021-06-01T12:00:05Z".to_string(),
            "2021-06-01T12:00:05Z".to_string(),
            "2021-06-01T12:00:01Z".to_string(),
        ];
        let track = sample(&input, 0, f64::INFINITY).unwrap();
        // Shared instant keeps the later arrival.
        assert_eq!(lons(&track), vec![3.0, 2.0]);
        assert!(
            track
                .samples()
                .windows(2)
                .all(|w| w[0].timestamp < w[1].timestamp)
        );
    }

    #[test]
    fn non_positive_threshold_is_rejected() {
        let input = raw(&[1.0]);
        assert_eq!(
            sample(&input, 0, 0.0),
            Err(TrackError::InvalidThreshold(0.0))
        );
        assert!(matches!(
            sample(&input, 0, f64::NAN),
            Err(TrackError::InvalidThreshold(_))
        ));
    }
}
