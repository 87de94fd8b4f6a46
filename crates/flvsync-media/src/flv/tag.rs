//! FLV tag definitions.

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// Size of a tag header in bytes.
pub const TAG_HEADER_SIZE: usize = 11;

/// Size of the previous-tag-size field that follows every tag.
pub const PREVIOUS_TAG_SIZE_LEN: usize = 4;

/// Largest payload the 24-bit length field can describe.
pub const MAX_DATA_SIZE: u32 = 0x00FF_FFFF;

/// Tag type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagType {
    Audio,
    Video,
    Script,
    Other(u8),
}

impl TagType {
    pub const AUDIO: u8 = 8;
    pub const VIDEO: u8 = 9;
    pub const SCRIPT: u8 = 18;

    pub fn from_u8(byte: u8) -> Self {
        match byte {
            Self::AUDIO => Self::Audio,
            Self::VIDEO => Self::Video,
            Self::SCRIPT => Self::Script,
            other => Self::Other(other),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Audio => Self::AUDIO,
            Self::Video => Self::VIDEO,
            Self::Script => Self::SCRIPT,
            Self::Other(byte) => *byte,
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio)
    }

    pub fn is_script(&self) -> bool {
        matches!(self, Self::Script)
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
            Self::Script => write!(f, "script"),
            Self::Other(byte) => write!(f, "type-{}", byte),
        }
    }
}

/// Serializes as the display name, e.g. `"video"`.
#[cfg(feature = "serialize")]
impl serde::Serialize for TagType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parsed tag header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    /// Tag type.
    pub tag_type: TagType,
    /// Payload size (24-bit).
    pub data_size: u32,
    /// Timestamp in milliseconds, extension byte already folded in.
    pub timestamp: i32,
    /// Stream id (24-bit, always 0 in practice).
    pub stream_id: u32,
}

impl TagHeader {
    /// Parse the 11 header bytes.
    ///
    /// The timestamp is stored as three low-order bytes followed by an
    /// extension byte holding bits 24..32.
    pub fn parse(b: &[u8; TAG_HEADER_SIZE]) -> Self {
        Self {
            tag_type: TagType::from_u8(b[0]),
            data_size: u32::from_be_bytes([0, b[1], b[2], b[3]]),
            timestamp: i32::from_be_bytes([b[7], b[4], b[5], b[6]]),
            stream_id: u32::from_be_bytes([0, b[8], b[9], b[10]]),
        }
    }

    /// Serialize back to the 11-byte wire layout.
    pub fn to_bytes(&self) -> [u8; TAG_HEADER_SIZE] {
        let size = self.data_size.to_be_bytes();
        let ts = self.timestamp.to_be_bytes();
        let sid = self.stream_id.to_be_bytes();
        [
            self.tag_type.as_u8(),
            size[1],
            size[2],
            size[3],
            ts[1],
            ts[2],
            ts[3],
            ts[0],
            sid[1],
            sid[2],
            sid[3],
        ]
    }

    /// Value the previous-tag-size field after this tag should hold.
    pub fn tag_size(&self) -> u32 {
        TAG_HEADER_SIZE as u32 + self.data_size
    }
}

/// A tag read from the input, payload kept opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub header: TagHeader,
    pub payload: Bytes,
}

impl Tag {
    pub fn tag_type(&self) -> TagType {
        self.header.tag_type
    }

    pub fn timestamp(&self) -> i32 {
        self.header.timestamp
    }

    /// Append header and payload to `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.header.to_bytes());
        buf.put_slice(&self.payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_type_mapping() {
        assert_eq!(TagType::from_u8(8), TagType::Audio);
        assert_eq!(TagType::from_u8(9), TagType::Video);
        assert_eq!(TagType::from_u8(18), TagType::Script);
        assert_eq!(TagType::from_u8(15), TagType::Other(15));
        assert_eq!(TagType::Other(15).as_u8(), 15);
        assert_eq!(TagType::Script.to_string(), "script");
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn test_tag_type_serializes_as_name() {
        assert_eq!(serde_json::to_string(&TagType::Video).unwrap(), r#""video""#);
        assert_eq!(serde_json::to_string(&TagType::Other(15)).unwrap(), r#""type-15""#);
    }

    #[test]
    fn test_header_parse() {
        let bytes = [9, 0x00, 0x01, 0x00, 0x12, 0x34, 0x56, 0x00, 0, 0, 0];
        let header = TagHeader::parse(&bytes);
        assert_eq!(header.tag_type, TagType::Video);
        assert_eq!(header.data_size, 256);
        assert_eq!(header.timestamp, 0x123456);
        assert_eq!(header.stream_id, 0);
        assert_eq!(header.tag_size(), 267);
    }

    #[test]
    fn test_header_timestamp_extension_is_most_significant() {
        let bytes = [8, 0, 0, 1, 0x00, 0x00, 0x01, 0x01, 0, 0, 0];
        let header = TagHeader::parse(&bytes);
        assert_eq!(header.timestamp, 0x0100_0001);
        assert_eq!(header.to_bytes(), bytes);
    }

    #[test]
    fn test_header_negative_timestamp() {
        let bytes = [9, 0, 0, 0, 0xFF, 0xFF, 0xFE, 0xFF, 0, 0, 0];
        let header = TagHeader::parse(&bytes);
        assert_eq!(header.timestamp, -2);
        assert_eq!(header.to_bytes(), bytes);
    }

    #[test]
    fn test_tag_encode() {
        let tag = Tag {
            header: TagHeader {
                tag_type: TagType::Audio,
                data_size: 2,
                timestamp: 40,
                stream_id: 0,
            },
            payload: Bytes::from_static(&[0xAF, 0x01]),
        };
        let mut buf = BytesMut::new();
        tag.encode(&mut buf);
        assert_eq!(&buf[..], &[8, 0, 0, 2, 0, 0, 40, 0, 0, 0, 0, 0xAF, 0x01]);
    }
}
