//! Tag listing for raw and timing-annotated FLV streams.
//!
//! Annotated streams (flags byte `0x07`) carry a timing trailer after every
//! tag; those are decoded alongside the tags.

use crate::rewriter::{parse_trailer, TRAILER_LEN};
use flvsync_media::flv::ANNOTATED_FLAGS;
use flvsync_media::{FlvReader, Framed, ScriptEvent, TagType, Value};
use serde::Serialize;
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error(transparent)]
    Media(#[from] flvsync_media::Error),

    #[error("Expected a timing trailer after the {tag_type} tag at offset {offset}")]
    MissingTrailer { tag_type: TagType, offset: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    pub header: Option<HeaderSummary>,
    pub annotated: bool,
    pub tags: Vec<TagSummary>,
    /// Input ended inside a header, tag, size field or trailer.
    pub truncated: bool,
}

impl Inspection {
    pub fn count(&self, tag_type: TagType) -> usize {
        self.tags.iter().filter(|t| t.tag_type == tag_type).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderSummary {
    pub version: u8,
    pub flags: u8,
    pub data_offset: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagSummary {
    /// Byte offset of the tag header.
    pub offset: u64,
    pub tag_type: TagType,
    pub timestamp: i32,
    pub data_size: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_tag_size: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailer: Option<TrailerSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrailerSummary {
    pub audio: bool,
    pub elapsed_ms: u32,
}

/// Walk a stream and summarize every complete tag.
///
/// Script payloads that fail to decode are reported per tag, not as errors.
pub fn inspect<R: Read>(input: R) -> Result<Inspection, InspectError> {
    let mut reader = FlvReader::new(input);
    let mut inspection = Inspection {
        header: None,
        annotated: false,
        tags: Vec::new(),
        truncated: false,
    };

    match reader.read_header()? {
        Framed::Complete(header) => {
            inspection.annotated = header.flags == ANNOTATED_FLAGS;
            inspection.header = Some(HeaderSummary {
                version: header.version,
                flags: header.flags,
                data_offset: header.data_offset,
            });
        }
        Framed::EndOfStream(_) => {
            inspection.truncated = true;
            return Ok(inspection);
        }
    }

    loop {
        let offset = reader.bytes_read();
        let tag = match reader.read_tag()? {
            Framed::Complete(tag) => tag,
            Framed::EndOfStream(partial) => {
                inspection.truncated = !partial.is_empty();
                break;
            }
        };

        let mut summary = TagSummary {
            offset,
            tag_type: tag.tag_type(),
            timestamp: tag.timestamp(),
            data_size: tag.header.data_size,
            previous_tag_size: None,
            event: None,
            value: None,
            decode_error: None,
            trailer: None,
        };

        if tag.tag_type().is_script() {
            match ScriptEvent::decode(&tag.payload) {
                Ok(event) => {
                    summary.event = Some(event.name);
                    summary.value = Some(event.value);
                }
                Err(e) => summary.decode_error = Some(e.to_string()),
            }
        }

        match reader.read_previous_tag_size()? {
            Framed::Complete(field) => summary.previous_tag_size = Some(u32::from_be_bytes(field)),
            Framed::EndOfStream(_) => {
                inspection.tags.push(summary);
                inspection.truncated = true;
                break;
            }
        }

        if inspection.annotated {
            match reader.read_array::<TRAILER_LEN>()? {
                Framed::Complete(bytes) => {
                    let info = parse_trailer(&bytes).ok_or(InspectError::MissingTrailer {
                        tag_type: tag.tag_type(),
                        offset,
                    })?;
                    summary.trailer = Some(TrailerSummary {
                        audio: info.audio,
                        elapsed_ms: info.elapsed_ms,
                    });
                }
                Framed::EndOfStream(_) => {
                    inspection.tags.push(summary);
                    inspection.truncated = true;
                    break;
                }
            }
        }

        inspection.tags.push(summary);
    }

    tracing::debug!(
        tags = inspection.tags.len(),
        annotated = inspection.annotated,
        truncated = inspection.truncated,
        "Inspection finished"
    );
    Ok(inspection)
}
