//! Shared FLV fixtures for integration tests.
//!
//! [`FlvBuilder`] assembles raw source streams tag by tag so tests can feed
//! the rewriter exact bytes and compare against them afterwards.

#![allow(dead_code)]

use flvsync_media::{Object, ScriptEvent, TagHeader, TagType, ON_METADATA};

/// Header a typical camera muxer writes: version 1, audio+video flags.
pub const SOURCE_HEADER: [u8; 13] = [b'F', b'L', b'V', 1, 5, 0, 0, 0, 9, 0, 0, 0, 0];

/// Builds a source FLV stream in memory.
#[derive(Debug, Clone)]
pub struct FlvBuilder {
    data: Vec<u8>,
}

impl FlvBuilder {
    pub fn new() -> Self {
        Self {
            data: SOURCE_HEADER.to_vec(),
        }
    }

    /// Append a tag with its previous-tag-size field.
    pub fn tag(mut self, tag_type: TagType, timestamp: i32, payload: &[u8]) -> Self {
        self.data.extend_from_slice(&tag_bytes(tag_type, timestamp, payload));
        self
    }

    pub fn video(self, timestamp: i32) -> Self {
        self.tag(TagType::Video, timestamp, &VIDEO_PAYLOAD)
    }

    pub fn audio(self, timestamp: i32) -> Self {
        self.tag(TagType::Audio, timestamp, &AUDIO_PAYLOAD)
    }

    pub fn script(self, event: &ScriptEvent, timestamp: i32) -> Self {
        let payload = event.encode_payload().unwrap();
        self.tag(TagType::Script, timestamp, &payload)
    }

    pub fn metadata(self, stream_name: Option<&str>, width: f64, height: f64) -> Self {
        self.script(&source_metadata(stream_name, width, height), 0)
    }

    /// Drop the last `n` bytes.
    pub fn truncate(mut self, n: usize) -> Self {
        let len = self.data.len().saturating_sub(n);
        self.data.truncate(len);
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

pub const VIDEO_PAYLOAD: [u8; 5] = [0x27, 0x01, 0x00, 0x00, 0x00];
pub const AUDIO_PAYLOAD: [u8; 3] = [0xAF, 0x01, 0x21];

/// Tag header, payload and previous-tag-size field.
pub fn tag_bytes(tag_type: TagType, timestamp: i32, payload: &[u8]) -> Vec<u8> {
    let header = TagHeader {
        tag_type,
        data_size: payload.len() as u32,
        timestamp,
        stream_id: 0,
    };
    let mut out = header.to_bytes().to_vec();
    out.extend_from_slice(payload);
    out.extend_from_slice(&header.tag_size().to_be_bytes());
    out
}

/// Script payload built from an event name and raw AMF0 argument bytes.
pub fn raw_script_payload(name: &str, arguments: &[u8]) -> Vec<u8> {
    let mut out = vec![0x02];
    out.extend_from_slice(&(name.len() as u16).to_be_bytes());
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(arguments);
    out
}

/// `onMetaData` as a camera sends it, including fields the rewriter ignores.
pub fn source_metadata(stream_name: Option<&str>, width: f64, height: f64) -> ScriptEvent {
    let mut object = Object::new()
        .with("duration", 0.0)
        .with("width", width)
        .with("height", height)
        .with("videocodecid", 7.0)
        .with("framerate", 30.0)
        .with("audiocodecid", 10.0);
    if let Some(name) = stream_name {
        object.insert("streamName", name);
    }
    ScriptEvent::new(ON_METADATA, object)
}
