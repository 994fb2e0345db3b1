//! Timestamp → speaker resolution over one recording's diarization segments.
//!
//! Transcript word/sentence timestamps rarely line up exactly with
//! diarization boundaries — words land in small inter-segment gaps all the
//! time. Resolution therefore runs in three tiers: exact containment,
//! nearest boundary within a tolerance, and finally carry-forward
//! ("whoever spoke last is still speaking into the gap").

use std::cmp::Ordering;
use std::collections::HashMap;

use super::DiarizationSegment;

/// Default boundary tolerance for plain resolution (seconds).
pub const RESOLVE_TOLERANCE_SECS: f64 = 1.0;

/// Tighter tolerance applied before falling back to carry-forward.
const CARRY_FORWARD_TOLERANCE_SECS: f64 = 0.5;

/// Read-only view over one recording's segments for time-based lookups.
pub struct SpeakerTimeline {
    segments: Vec<DiarizationSegment>,
}

impl SpeakerTimeline {
    pub fn new(segments: Vec<DiarizationSegment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[DiarizationSegment] {
        &self.segments
    }

    /// Resolve the speaker active at `time`.
    ///
    /// Exact containment (`start ≤ time ≤ end`) wins; otherwise the segment
    /// whose start or end boundary lies nearest `time` is accepted if that
    /// distance is within `tolerance`. Returns `None` when `time` is too far
    /// from all speech.
    pub fn speaker_at(&self, time: f64, tolerance: f64) -> Option<&str> {
        for segment in &self.segments {
            if segment.start_time <= time && time <= segment.end_time {
                return Some(&segment.speaker_tag);
            }
        }

        let mut nearest: Option<(&DiarizationSegment, f64)> = None;
        for segment in &self.segments {
            let distance = (segment.start_time - time)
                .abs()
                .min((segment.end_time - time).abs());
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((segment, distance));
            }
        }

        nearest.and_then(|(segment, distance)| {
            (distance <= tolerance).then_some(segment.speaker_tag.as_str())
        })
    }

    /// Resolve with carry-forward: never `None` for a non-empty timeline.
    ///
    /// Tries exact/tolerant resolution with the tighter 0.5 s tolerance
    /// first; failing that, attributes `time` to the most recent segment
    /// that ended at or before it. A timestamp preceding all speech falls
    /// back to the first segment. Gap speech may thus be credited to the
    /// wrong adjacent speaker — an accepted cost, since downstream treats
    /// the label as best-effort.
    pub fn speaker_at_with_carry_forward(&self, time: f64) -> Option<&str> {
        if let Some(tag) = self.speaker_at(time, CARRY_FORWARD_TOLERANCE_SECS) {
            return Some(tag);
        }

        let last_ended = self
            .segments
            .iter()
            .filter(|segment| segment.end_time <= time)
            .max_by(|a, b| {
                a.end_time
                    .partial_cmp(&b.end_time)
                    .unwrap_or(Ordering::Equal)
            });
        if let Some(segment) = last_ended {
            return Some(&segment.speaker_tag);
        }

        self.segments
            .first()
            .map(|segment| segment.speaker_tag.as_str())
    }

    /// Assign a speaker tag to each `(id, timestamp)` transcript unit via
    /// carry-forward resolution. IDs that cannot resolve — possible only
    /// when the timeline has no segments at all — are omitted.
    pub fn assign_speakers(&self, items: &[(String, f64)]) -> HashMap<String, String> {
        let mut assigned = HashMap::with_capacity(items.len());
        for (id, time) in items {
            if let Some(tag) = self.speaker_at_with_carry_forward(*time) {
                assigned.insert(id.clone(), tag.to_string());
            }
        }
        assigned
    }
}
