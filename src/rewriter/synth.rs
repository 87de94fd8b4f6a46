//! Synthetic script events.
//!
//! Field values are what the downstream recorder expects to find; only the
//! stream name, dimensions and clock readings vary.

use super::drift::SyncRequest;
use flvsync_media::{Object, ScriptEvent, ON_METADATA};

/// Clock-sync event name.
pub const ON_CLOCK_SYNC: &str = "onClockSync";

/// Bandwidth-budget event name.
pub const ON_MPMA: &str = "onMpma";

/// Frame rate announced in the metadata event.
pub const VIDEO_FPS: u32 = 15;

const AUDIO_BANDWIDTH: u32 = 64_000;
const AUDIO_CHANNELS: u32 = 1;
const AUDIO_FREQUENCY: u32 = 48_000;

/// Every bound in the budget structure.
const BUDGET_BANDWIDTH: u32 = 1_500_000;
const BUDGET_TARGET: f64 = 75_000.0;

/// Channel and bandwidth announced for a video width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoProfile {
    pub channel_id: u32,
    pub video_bandwidth: u32,
}

impl VideoProfile {
    pub fn for_width(width: u32) -> Self {
        let (channel_id, video_bandwidth) = match width {
            1920 => (0, 3_000_000),
            1024 | 1280 => (2, 1_500_000),
            640 => (1, 300_000),
            _ => (0, 3_000_000),
        };
        Self {
            channel_id,
            video_bandwidth,
        }
    }
}

/// Metadata announcement replacing the source `onMetaData`.
pub fn metadata_event(stream_name: &str, width: u32, height: u32) -> ScriptEvent {
    let profile = VideoProfile::for_width(width);
    let object = Object::new()
        .with("audioBandwidth", AUDIO_BANDWIDTH)
        .with("audioChannels", AUDIO_CHANNELS)
        .with("audioFrequency", AUDIO_FREQUENCY)
        .with("channelId", profile.channel_id)
        .with("extendedFormat", true)
        .with("hasAudio", true)
        .with("hasVideo", true)
        .with("streamId", profile.channel_id)
        .with("streamName", stream_name)
        .with("videoBandwidth", profile.video_bandwidth)
        .with("videoFps", VIDEO_FPS)
        .with("videoHeight", height)
        .with("videoWidth", width);
    ScriptEvent::new(ON_METADATA, object)
}

pub fn clock_sync_event(stream_clock: i32, stream_clock_base: i32, wall_clock: u64) -> ScriptEvent {
    let object = Object::new()
        .with("streamClock", stream_clock)
        .with("streamClockBase", stream_clock_base)
        .with("wallClock", wall_clock as f64);
    ScriptEvent::new(ON_CLOCK_SYNC, object)
}

/// Static bandwidth budget; not a measurement.
pub fn bandwidth_budget_event() -> ScriptEvent {
    let bounds = || {
        Object::new()
            .with("cur", BUDGET_BANDWIDTH)
            .with("max", BUDGET_BANDWIDTH)
            .with("min", BUDGET_BANDWIDTH)
    };
    let object = Object::new()
        .with("cs", bounds())
        .with("m", bounds())
        .with("r", 0u32)
        .with("sp", bounds())
        .with("t", BUDGET_TARGET);
    ScriptEvent::new(ON_MPMA, object)
}

/// Event for a tracker request.
pub fn event_for(request: &SyncRequest) -> ScriptEvent {
    match *request {
        SyncRequest::ClockSync {
            stream_clock,
            stream_clock_base,
            wall_clock,
            ..
        } => clock_sync_event(stream_clock, stream_clock_base, wall_clock),
        SyncRequest::BandwidthBudget => bandwidth_budget_event(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewriter::drift::Channel;
    use flvsync_media::Value;

    #[test]
    fn test_video_profile_lookup() {
        assert_eq!(VideoProfile::for_width(1920), VideoProfile { channel_id: 0, video_bandwidth: 3_000_000 });
        assert_eq!(VideoProfile::for_width(1280), VideoProfile { channel_id: 2, video_bandwidth: 1_500_000 });
        assert_eq!(VideoProfile::for_width(1024), VideoProfile { channel_id: 2, video_bandwidth: 1_500_000 });
        assert_eq!(VideoProfile::for_width(640), VideoProfile { channel_id: 1, video_bandwidth: 300_000 });
        assert_eq!(VideoProfile::for_width(800), VideoProfile { channel_id: 0, video_bandwidth: 3_000_000 });
    }

    #[test]
    fn test_metadata_event_fields() {
        let event = metadata_event("cam1", 640, 360);
        assert_eq!(event.name, "onMetaData");

        let object = event.object().unwrap();
        let keys: Vec<&str> = object.keys().collect();
        assert_eq!(
            keys,
            vec![
                "audioBandwidth",
                "audioChannels",
                "audioFrequency",
                "channelId",
                "extendedFormat",
                "hasAudio",
                "hasVideo",
                "streamId",
                "streamName",
                "videoBandwidth",
                "videoFps",
                "videoHeight",
                "videoWidth",
            ]
        );
        assert_eq!(object.get_number("channelId"), Some(1.0));
        assert_eq!(object.get_number("streamId"), Some(1.0));
        assert_eq!(object.get_number("videoBandwidth"), Some(300_000.0));
        assert_eq!(object.get_number("videoFps"), Some(15.0));
        assert_eq!(object.get("extendedFormat"), Some(&Value::Boolean(true)));
        assert_eq!(object.get("streamName").and_then(Value::as_str), Some("cam1"));
    }

    #[test]
    fn test_clock_sync_event() {
        let request = SyncRequest::ClockSync {
            channel: Channel::Video,
            stream_clock: 2_500,
            stream_clock_base: 0,
            wall_clock: 2_000,
        };
        let event = event_for(&request);
        assert_eq!(event.name, "onClockSync");

        let object = event.object().unwrap();
        assert_eq!(object.get_number("streamClock"), Some(2_500.0));
        assert_eq!(object.get_number("streamClockBase"), Some(0.0));
        assert_eq!(object.get_number("wallClock"), Some(2_000.0));
    }

    #[test]
    fn test_bandwidth_budget_is_constant() {
        let event = event_for(&SyncRequest::BandwidthBudget);
        assert_eq!(event, bandwidth_budget_event());
        assert_eq!(event.name, "onMpma");

        let object = event.object().unwrap();
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["cs", "m", "r", "sp", "t"]);
        for name in ["cs", "m", "sp"] {
            let bounds = object.get(name).and_then(Value::as_object).unwrap();
            assert_eq!(bounds.keys().collect::<Vec<_>>(), vec!["cur", "max", "min"]);
            assert!(bounds.iter().all(|(_, v)| v.as_number() == Some(1_500_000.0)));
        }
        assert_eq!(object.get_number("r"), Some(0.0));
        assert_eq!(object.get_number("t"), Some(75_000.0));
    }
}
