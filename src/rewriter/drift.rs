//! Wall-clock drift tracking.
//!
//! Each media channel starts uncalibrated. The first audio/video tag after
//! metadata calibrates it; afterwards a tag recalibrates the channel when
//! `|elapsed - timestamp + correction|` exceeds the threshold. Every
//! calibration asks for a clock-sync tag. Independently, a bandwidth-budget
//! tag is requested once per budget interval.

use flvsync_media::TagType;

/// Default resynchronization threshold.
pub const DEFAULT_DRIFT_THRESHOLD_MS: u32 = 200;

/// Default spacing between bandwidth-budget tags.
pub const DEFAULT_BUDGET_INTERVAL_MS: u64 = 5000;

/// Media channel with its own correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Audio,
    Video,
}

impl Channel {
    /// Channel for a tag type; script and other tags have none.
    pub fn for_tag(tag_type: TagType) -> Option<Self> {
        match tag_type {
            TagType::Audio => Some(Self::Audio),
            TagType::Video => Some(Self::Video),
            _ => None,
        }
    }
}

/// A synthetic tag the tracker wants emitted before the current tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRequest {
    ClockSync {
        channel: Channel,
        /// Timestamp of the triggering tag.
        stream_clock: i32,
        stream_clock_base: i32,
        /// Elapsed wall-clock milliseconds.
        wall_clock: u64,
    },
    BandwidthBudget,
}

/// Per-run clock state. `None` corrections mean uncalibrated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamClockState {
    pub start_wall_ms: Option<u64>,
    pub last_budget_wall_ms: Option<u64>,
    pub have_metadata: bool,
    pub correction_video_ms: Option<i64>,
    pub correction_audio_ms: Option<i64>,
}

impl StreamClockState {
    pub fn correction(&self, channel: Channel) -> Option<i64> {
        match channel {
            Channel::Audio => self.correction_audio_ms,
            Channel::Video => self.correction_video_ms,
        }
    }

    fn correction_mut(&mut self, channel: Channel) -> &mut Option<i64> {
        match channel {
            Channel::Audio => &mut self.correction_audio_ms,
            Channel::Video => &mut self.correction_video_ms,
        }
    }
}

/// Decides when clock-sync and bandwidth-budget tags are due.
#[derive(Debug, Clone)]
pub struct DriftTracker {
    state: StreamClockState,
    threshold_ms: i64,
    budget_interval_ms: u64,
}

impl DriftTracker {
    pub fn new(threshold_ms: u32, budget_interval_ms: u64) -> Self {
        Self {
            state: StreamClockState::default(),
            threshold_ms: i64::from(threshold_ms),
            budget_interval_ms,
        }
    }

    pub fn state(&self) -> &StreamClockState {
        &self.state
    }

    /// Elapsed wall time for a reading; the first reading fixes the start.
    pub fn elapsed_ms(&mut self, now_wall_ms: u64) -> u64 {
        let start = *self.state.start_wall_ms.get_or_insert(now_wall_ms);
        now_wall_ms.saturating_sub(start)
    }

    /// Record that the metadata announcement has been written.
    pub fn mark_metadata(&mut self) {
        self.state.have_metadata = true;
    }

    /// Inspect one input tag and return the synthetic tags due before it.
    ///
    /// Nothing is requested until metadata has been seen.
    pub fn observe(&mut self, tag_type: TagType, timestamp: i32, elapsed_ms: u64) -> Vec<SyncRequest> {
        let mut requests = Vec::new();
        if !self.state.have_metadata {
            return requests;
        }

        if let Some(channel) = Channel::for_tag(tag_type) {
            let drift = elapsed_ms as i64 - i64::from(timestamp);
            let threshold = self.threshold_ms;
            let correction = self.state.correction_mut(channel);
            let recalibrate = match *correction {
                None => true,
                Some(c) => (drift + c).abs() > threshold,
            };

            if recalibrate {
                tracing::debug!(
                    ?channel,
                    drift_ms = drift,
                    previous = ?*correction,
                    "Recalibrating stream clock"
                );
                *correction = Some(-drift);
                requests.push(SyncRequest::ClockSync {
                    channel,
                    stream_clock: timestamp,
                    stream_clock_base: 0,
                    wall_clock: elapsed_ms,
                });
            }
        }

        let budget_due = match self.state.last_budget_wall_ms {
            None => true,
            Some(last) => elapsed_ms.saturating_sub(last) >= self.budget_interval_ms,
        };
        if budget_due {
            self.state.last_budget_wall_ms = Some(elapsed_ms);
            requests.push(SyncRequest::BandwidthBudget);
        }

        requests
    }
}

impl Default for DriftTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DRIFT_THRESHOLD_MS, DEFAULT_BUDGET_INTERVAL_MS)
    }
}
