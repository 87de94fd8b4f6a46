//! Out-of-band timing trailer.
//!
//! Every tag written is followed by a zero lead byte, an 11-byte marker and
//! the elapsed wall-clock milliseconds as a big-endian u32. The marker tells
//! audio tags apart from everything else; the downstream recorder matches it
//! byte for byte.

use flvsync_media::{FlvWriter, TagType};
use std::io::Write;

/// Marker following the lead byte for audio tags.
pub const AUDIO_MARKER: [u8; 11] = [0x01, 0x5F, 0x90, 0, 0, 0, 0, 0, 0, 0, 0];

/// Marker following the lead byte for all other tags.
pub const DEFAULT_MARKER: [u8; 11] = [0x00, 0x2B, 0x11, 0, 0, 0, 0, 0, 0, 0, 0];

/// Total trailer size.
pub const TRAILER_LEN: usize = 1 + 11 + 4;

/// Build the trailer for a tag.
///
/// Elapsed time wraps at `u32::MAX` like FLV timestamps do.
pub fn trailer(tag_type: TagType, elapsed_ms: u64) -> [u8; TRAILER_LEN] {
    let marker = if tag_type.is_audio() {
        &AUDIO_MARKER
    } else {
        &DEFAULT_MARKER
    };

    let mut out = [0u8; TRAILER_LEN];
    out[1..12].copy_from_slice(marker);
    out[12..].copy_from_slice(&(elapsed_ms as u32).to_be_bytes());
    out
}

/// Append the trailer for a tag.
pub fn write_trailer<W: Write>(
    writer: &mut FlvWriter<W>,
    tag_type: TagType,
    elapsed_ms: u64,
) -> flvsync_media::Result<()> {
    writer.write_raw(&trailer(tag_type, elapsed_ms))
}

/// Decoded trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailerInfo {
    pub audio: bool,
    pub elapsed_ms: u32,
}

/// Parse a trailer, returning `None` if the lead byte or marker do not match.
pub fn parse_trailer(bytes: &[u8; TRAILER_LEN]) -> Option<TrailerInfo> {
    if bytes[0] != 0 {
        return None;
    }
    let audio = if bytes[1..12] == AUDIO_MARKER {
        true
    } else if bytes[1..12] == DEFAULT_MARKER {
        false
    } else {
        return None;
    };
    Some(TrailerInfo {
        audio,
        elapsed_ms: u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
    })
}
